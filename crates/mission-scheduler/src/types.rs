use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a schedule entry came from. Serialized as the `source` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceTag {
    /// Listed by the external job scheduler.
    #[serde(rename = "openclaw")]
    External,
    /// Persisted in the local `scheduled_tasks` table.
    #[serde(rename = "local")]
    Local,
}

impl std::fmt::Display for SourceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceTag::External => write!(f, "openclaw"),
            SourceTag::Local => write!(f, "local"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Active,
    Disabled,
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryStatus::Active => write!(f, "active"),
            EntryStatus::Disabled => write!(f, "disabled"),
        }
    }
}

impl std::str::FromStr for EntryStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "active" => Ok(EntryStatus::Active),
            "disabled" => Ok(EntryStatus::Disabled),
            other => Err(format!("unknown task status: {other}")),
        }
    }
}

/// A job reduced to one comparable next-execution instant.
///
/// Computed per request, never persisted. `next_run_at`, when present, is
/// strictly later than the instant the entry was normalized at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedScheduleEntry {
    pub id: String,
    pub name: String,
    #[serde(rename = "scheduleType")]
    pub kind: String,
    #[serde(rename = "scheduleExpr")]
    pub expr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_run_at: Option<DateTime<Utc>>,
    pub status: EntryStatus,
    pub source: SourceTag,
}

/// A row of the local `scheduled_tasks` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalTask {
    pub id: i64,
    /// Optional link to an external job this task mirrors.
    pub job_id: Option<String>,
    pub name: String,
    /// `cron`, `every` or `interval`.
    pub schedule_type: String,
    /// Cron expression, or interval in milliseconds (optional `ms` suffix).
    pub schedule_expr: String,
    /// RFC 3339 next run computed when the task was stored.
    pub next_run_at: Option<String>,
    pub last_run_at: Option<String>,
    pub status: EntryStatus,
    pub created_at: String,
}

/// Caller-supplied fields for a new local task.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLocalTask {
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub schedule_type: String,
    #[serde(default)]
    pub schedule_expr: String,
    #[serde(default)]
    pub status: Option<EntryStatus>,
}
