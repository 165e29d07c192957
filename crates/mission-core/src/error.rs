use thiserror::Error;

#[derive(Debug, Error)]
pub enum MissionError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// The caller's own request is malformed. Never touches a source.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Source error ({source_name}): {reason}")]
    Source { source_name: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Request timeout after {ms}ms")]
    Timeout { ms: u64 },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MissionError {
    /// Short error code string sent to clients in error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            MissionError::Config(_) => "CONFIG_ERROR",
            MissionError::InvalidInput(_) => "INVALID_INPUT",
            MissionError::NotFound(_) => "NOT_FOUND",
            MissionError::Database(_) => "DATABASE_ERROR",
            MissionError::Source { .. } => "SOURCE_ERROR",
            MissionError::Serialization(_) => "SERIALIZATION_ERROR",
            MissionError::Io(_) => "IO_ERROR",
            MissionError::Timeout { .. } => "TIMEOUT",
            MissionError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// True when the failure was caused by the caller rather than infrastructure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            MissionError::InvalidInput(_) | MissionError::NotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, MissionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_is_client_error() {
        let err = MissionError::InvalidInput("title is required".into());
        assert!(err.is_client_error());
        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[test]
    fn database_error_is_not_client_error() {
        let err = MissionError::Database("disk full".into());
        assert!(!err.is_client_error());
        assert_eq!(err.code(), "DATABASE_ERROR");
    }

    #[test]
    fn source_error_display_names_source() {
        let err = MissionError::Source {
            source_name: "calendar".into(),
            reason: "exit 1".into(),
        };
        assert_eq!(err.to_string(), "Source error (calendar): exit 1");
    }
}
