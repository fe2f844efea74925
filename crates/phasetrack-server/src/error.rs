use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use phasetrack_core::error::PhasetrackError;

/// Carries an explicit 400 through the `anyhow::Error` chain for input
/// problems the core never sees (empty bodies, missing reasons).
#[derive(Debug)]
struct BadRequestError(String);

impl std::fmt::Display for BadRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BadRequestError {}

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(BadRequestError(msg.into()).into())
    }

    fn status(&self) -> StatusCode {
        if self.0.downcast_ref::<BadRequestError>().is_some() {
            return StatusCode::BAD_REQUEST;
        }
        match self.0.downcast_ref::<PhasetrackError>() {
            Some(PhasetrackError::TaskNotFound(_) | PhasetrackError::PhaseNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            Some(PhasetrackError::TaskExists(_) | PhasetrackError::PhaseExists(_)) => {
                StatusCode::CONFLICT
            }
            Some(PhasetrackError::InvalidTaskId(_) | PhasetrackError::InvalidPhase(_)) => {
                StatusCode::BAD_REQUEST
            }
            Some(
                PhasetrackError::Io(_) | PhasetrackError::Yaml(_) | PhasetrackError::Json(_),
            )
            | None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {:#}", self.0);
        }
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: PhasetrackError) -> StatusCode {
        AppError(err.into()).into_response().status()
    }

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(status_of(PhasetrackError::TaskNotFound("t1".into())), StatusCode::NOT_FOUND);
        assert_eq!(status_of(PhasetrackError::PhaseNotFound(9)), StatusCode::NOT_FOUND);
    }

    #[test]
    fn exists_maps_to_409() {
        assert_eq!(status_of(PhasetrackError::TaskExists("t1".into())), StatusCode::CONFLICT);
        assert_eq!(status_of(PhasetrackError::PhaseExists(1)), StatusCode::CONFLICT);
    }

    #[test]
    fn invalid_input_maps_to_400() {
        assert_eq!(status_of(PhasetrackError::InvalidPhase("0".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(PhasetrackError::InvalidTaskId(String::new())), StatusCode::BAD_REQUEST);
        let response = AppError::bad_request("reason is required").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn io_error_maps_to_500() {
        let err = PhasetrackError::Io(std::io::Error::other("disk full"));
        assert_eq!(status_of(err), StatusCode::INTERNAL_SERVER_ERROR);
        let response = AppError(anyhow::anyhow!("something unexpected")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn response_body_is_json() {
        let response = AppError(PhasetrackError::TaskNotFound("t1".into()).into()).into_response();
        let ct = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .expect("should have content-type");
        assert!(ct.to_str().unwrap().contains("application/json"));
    }
}
