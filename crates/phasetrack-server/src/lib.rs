pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use phasetrack_core::config::Config;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(root: PathBuf, config: &Config) -> Router {
    let app_state = state::AppState::new(root, config);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(routes::health))
        // Tasks
        .route(
            "/api/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/api/tasks/{id}",
            get(routes::tasks::get_task).patch(routes::tasks::update_task),
        )
        .route("/api/tasks/{id}/start", post(routes::tasks::start_task))
        .route(
            "/api/tasks/{id}/complete",
            post(routes::tasks::complete_task),
        )
        .route("/api/tasks/{id}/block", post(routes::tasks::block_task))
        .route(
            "/api/tasks/{id}/context",
            get(routes::tasks::preview_context),
        )
        // Phases
        .route(
            "/api/phases",
            get(routes::phases::list_phases).post(routes::phases::create_phase),
        )
        .route("/api/progress", get(routes::phases::get_progress))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the API server on a pre-bound listener.
///
/// The caller can read the actual port before starting, which matters when
/// `port = 0` and the OS picks a free one.
pub async fn serve_on(
    root: PathBuf,
    config: Config,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(root, &config);

    tracing::info!("phasetrack API listening on http://localhost:{actual_port}");

    if open_browser {
        let url = format!("http://localhost:{actual_port}/api/progress");
        if let Err(e) = open::that(&url) {
            tracing::warn!("could not open browser: {e}");
        }
    }

    axum::serve(listener, app).await?;
    Ok(())
}
