use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 3010;
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_SOURCE_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_TIMEZONE: &str = "UTC";
pub const MAX_SEARCH_RESULTS: usize = 20;

/// Top-level config (mission.toml + MISSION_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MissionConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub notes: NotesConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// External processes the dashboard reads from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Per-call timeout applied to every external process, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub jobs: JobsSourceConfig,
    #[serde(default)]
    pub calendar: CalendarSourceConfig,
    #[serde(default)]
    pub mail: MailSourceConfig,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_SOURCE_TIMEOUT_SECS,
            jobs: JobsSourceConfig::default(),
            calendar: CalendarSourceConfig::default(),
            mail: MailSourceConfig::default(),
        }
    }
}

/// Recurring-job lister, e.g. `openclaw cron list --json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsSourceConfig {
    #[serde(default = "default_jobs_command")]
    pub command: String,
    #[serde(default = "default_jobs_args")]
    pub args: Vec<String>,
}

impl Default for JobsSourceConfig {
    fn default() -> Self {
        Self {
            command: default_jobs_command(),
            args: default_jobs_args(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarSourceConfig {
    #[serde(default = "default_gog_command")]
    pub command: String,
    /// Calendar to list. Defaults to the account's primary calendar.
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
    /// Account passed via `--account` and `GOG_ACCOUNT`. Omitted when unset.
    pub account: Option<String>,
}

impl Default for CalendarSourceConfig {
    fn default() -> Self {
        Self {
            command: default_gog_command(),
            calendar_id: default_calendar_id(),
            account: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailSourceConfig {
    #[serde(default = "default_gog_command")]
    pub command: String,
    pub account: Option<String>,
}

impl Default for MailSourceConfig {
    fn default() -> Self {
        Self {
            command: default_gog_command(),
            account: None,
        }
    }
}

/// Free-text note corpus: a directory of `*.md` files plus one top-level document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotesConfig {
    #[serde(default = "default_notes_dir")]
    pub dir: String,
    #[serde(default = "default_notes_top_level")]
    pub top_level: String,
    /// Prefix used when reporting a corpus document's path, e.g. `memory/2026-01-02.md`.
    #[serde(default = "default_notes_prefix")]
    pub path_prefix: String,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            dir: default_notes_dir(),
            top_level: default_notes_top_level(),
            path_prefix: default_notes_prefix(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// IANA zone used for cron jobs without their own zone and for day bucketing.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_bucket_per_kind")]
    pub bucket_per_kind: usize,
    #[serde(default = "default_upcoming_limit")]
    pub upcoming_limit: usize,
    /// Calendar look-ahead when the caller does not pass `days`.
    #[serde(default = "default_days")]
    pub default_days: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            bucket_per_kind: default_bucket_per_kind(),
            upcoming_limit: default_upcoming_limit(),
            default_days: default_days(),
        }
    }
}

impl ScheduleConfig {
    /// Resolve the configured zone, falling back to UTC on an unknown name.
    pub fn tz(&self) -> chrono_tz::Tz {
        self.timezone.parse().unwrap_or_else(|_| {
            tracing::warn!(timezone = %self.timezone, "unknown timezone, using UTC");
            chrono_tz::UTC
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Upper bound on event-log records considered per query.
    #[serde(default = "default_max_results")]
    pub activity_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: MAX_SEARCH_RESULTS,
            activity_limit: MAX_SEARCH_RESULTS,
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_SOURCE_TIMEOUT_SECS
}
fn default_jobs_command() -> String {
    "openclaw".to_string()
}
fn default_jobs_args() -> Vec<String> {
    vec!["cron".to_string(), "list".to_string(), "--json".to_string()]
}
fn default_gog_command() -> String {
    "gog".to_string()
}
fn default_calendar_id() -> String {
    "primary".to_string()
}
fn default_notes_dir() -> String {
    format!("{}/memory", home_dir())
}
fn default_notes_top_level() -> String {
    format!("{}/MEMORY.md", home_dir())
}
fn default_notes_prefix() -> String {
    "memory".to_string()
}
fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}
fn default_bucket_per_kind() -> usize {
    2
}
fn default_upcoming_limit() -> usize {
    5
}
fn default_days() -> u32 {
    7
}
fn default_max_results() -> usize {
    MAX_SEARCH_RESULTS
}
fn default_db_path() -> String {
    format!("{}/.mission-control/mission-control.db", home_dir())
}

fn home_dir() -> String {
    std::env::var("HOME").unwrap_or_else(|_| ".".to_string())
}

impl MissionConfig {
    /// Load config from a TOML file with MISSION_* env var overrides.
    ///
    /// Nested keys use a double underscore: `MISSION_SOURCES__TIMEOUT_SECS=5`.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        Self::figment(&path)
            .extract()
            .map_err(|e| crate::error::MissionError::Config(e.to_string()))
    }

    fn figment(path: &str) -> Figment {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("MISSION_").split("__"))
    }
}

fn default_config_path() -> String {
    format!("{}/.mission-control/mission.toml", home_dir())
}
