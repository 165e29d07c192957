//! Error types for the mission-sources crate.

use thiserror::Error;

/// Everything that can go wrong talking to an external process.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The binary could not be started or its pipes failed.
    #[error("failed to run `{program}`: {reason}")]
    Spawn { program: String, reason: String },

    /// The child exceeded its time budget and was killed.
    #[error("`{program}` timed out after {ms}ms")]
    Timeout { program: String, ms: u64 },

    #[error("`{program}` exited with {code:?}: {stderr}")]
    NonZeroExit {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Output was not the JSON shape expected.
    #[error("malformed payload: {0}")]
    Malformed(String),

    /// Caller-supplied value rejected before anything was run.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<SourceError> for mission_core::MissionError {
    fn from(e: SourceError) -> Self {
        use mission_core::MissionError;
        match e {
            SourceError::InvalidInput(msg) => MissionError::InvalidInput(msg),
            SourceError::Timeout { ms, .. } => MissionError::Timeout { ms },
            SourceError::Spawn { ref program, .. } | SourceError::NonZeroExit { ref program, .. } => {
                MissionError::Source {
                    source_name: program.clone(),
                    reason: e.to_string(),
                }
            }
            SourceError::Malformed(reason) => MissionError::Source {
                source_name: "payload".into(),
                reason,
            },
        }
    }
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, SourceError>;
