use serde::{Deserialize, Serialize};

use crate::error::{ActivityError, Result};

/// Well-known activity types. The log accepts any non-empty type string.
pub mod kinds {
    pub const EMAIL: &str = "email";
    pub const CALENDAR: &str = "calendar";
    pub const SEARCH: &str = "search";
    pub const TASK: &str = "task";
    pub const COMMAND: &str = "command";
    pub const DOCUMENT: &str = "document";
    pub const INFO: &str = "info";
}

/// One row of the activity log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub description: Option<String>,
    /// Free-form JSON attached by the writer.
    pub metadata: Option<serde_json::Value>,
    pub created_at: String,
}

/// Fields accepted by [`crate::ActivityLog::append`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewActivity {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl NewActivity {
    pub fn new(kind: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Type and title are required.
    pub fn validate(&self) -> Result<()> {
        if self.kind.trim().is_empty() {
            return Err(ActivityError::InvalidInput("type is required".into()));
        }
        if self.title.trim().is_empty() {
            return Err(ActivityError::InvalidInput("title is required".into()));
        }
        Ok(())
    }
}
