use thiserror::Error;

/// Failure of a single record source. Never surfaced past the engine.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("activity log error: {0}")]
    Activity(#[from] mission_activity::ActivityError),
}

pub type Result<T> = std::result::Result<T, SearchError>;
