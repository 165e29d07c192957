use thiserror::Error;

#[derive(Debug, Error)]
pub enum ActivityError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("invalid activity: {0}")]
    InvalidInput(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<ActivityError> for mission_core::MissionError {
    fn from(e: ActivityError) -> Self {
        use mission_core::MissionError;
        match e {
            ActivityError::Database(e) => MissionError::Database(e.to_string()),
            ActivityError::InvalidInput(msg) => MissionError::InvalidInput(msg),
            ActivityError::Serialization(e) => MissionError::Serialization(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, ActivityError>;
