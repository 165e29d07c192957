//! `mission-core`: configuration, shared error type and the read-only data
//! model exchanged between source adapters and the aggregation layer.

pub mod config;
pub mod error;
pub mod types;

pub use config::MissionConfig;
pub use error::{MissionError, Result};
pub use types::{CalendarItem, EventTime, Fetched, JobSchedule, RawJobDescriptor};
