use thiserror::Error;

/// Errors that can occur within the scheduler subsystem.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Underlying SQLite / rusqlite error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The provided schedule definition is invalid or unsupported.
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    /// A caller-supplied field on a write path is missing or malformed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No local task with the given ID exists in the store.
    #[error("Task not found: {id}")]
    TaskNotFound { id: i64 },
}

impl From<SchedulerError> for mission_core::MissionError {
    fn from(e: SchedulerError) -> Self {
        use mission_core::MissionError;
        match e {
            SchedulerError::Database(e) => MissionError::Database(e.to_string()),
            SchedulerError::InvalidSchedule(msg) | SchedulerError::InvalidInput(msg) => {
                MissionError::InvalidInput(msg)
            }
            SchedulerError::TaskNotFound { id } => MissionError::NotFound(format!("task {id}")),
        }
    }
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
