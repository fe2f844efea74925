use thiserror::Error;

#[derive(Debug, Error)]
pub enum PhasetrackError {
    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("task already exists: {0}")]
    TaskExists(String),

    #[error("invalid task id '{0}': must be non-empty with no path separators")]
    InvalidTaskId(String),

    #[error("phase not found: {0}")]
    PhaseNotFound(u32),

    #[error("phase already exists: {0}")]
    PhaseExists(u32),

    #[error("invalid phase: {0}")]
    InvalidPhase(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PhasetrackError>;
