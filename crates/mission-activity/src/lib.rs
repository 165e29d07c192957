//! `mission-activity`: the durable activity log.
//!
//! Activities are appended to the SQLite `activities` table and read back
//! newest first, either paged by type or by case-insensitive text match.

pub mod db;
pub mod error;
pub mod log;
pub mod types;

pub use error::{ActivityError, Result};
pub use log::ActivityLog;
pub use types::{kinds, Activity, NewActivity};
