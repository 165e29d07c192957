//! `mission-sources`: adapters around the external processes the dashboard
//! reads from.
//!
//! Every adapter spawns a fixed, configured binary in argument-vector form
//! with a per-call timeout, and degrades to an empty [`Fetched`] with
//! `ok = false` instead of returning an error.
//!
//! | Adapter            | Command (defaults)                          |
//! |--------------------|---------------------------------------------|
//! | [`JobLister`]      | `openclaw cron list --json`                 |
//! | [`CalendarReader`] | `gog calendar events <id> --from --to ...`  |
//! | [`MailReader`]     | `gog gmail messages search <q> --max <n>`   |
//!
//! [`Fetched`]: mission_core::Fetched

pub mod calendar;
pub mod error;
pub mod jobs;
pub mod mail;
pub mod runner;
pub mod sanitize;
pub mod source;

pub use calendar::{CalendarReader, EventWindow};
pub use error::{Result, SourceError};
pub use jobs::JobLister;
pub use mail::{MailMessage, MailReader};
pub use runner::{run, CommandSpec};
pub use sanitize::sanitize_arg;
pub use source::{CalendarSource, JobSource};
