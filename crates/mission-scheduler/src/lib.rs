//! `mission-scheduler`: schedule normalization, day bucketing and the local
//! task store.
//!
//! # Overview
//!
//! Job descriptors from any source are reduced by [`normalize::normalize`] to
//! a [`NormalizedScheduleEntry`] carrying one comparable `next_run_at`
//! instant. [`timeline`] then groups entries and calendar items into per-day
//! buckets and a short "upcoming" list. Locally persisted tasks live in the
//! `scheduled_tasks` SQLite table behind [`LocalTaskStore`] and pass through
//! the same normalizer.
//!
//! # Schedule kinds
//!
//! | Kind       | Next run                                              |
//! |------------|-------------------------------------------------------|
//! | `cron`     | First matching wall-clock minute after now, in a zone |
//! | `interval` | `now + interval_ms`                                   |
//! | other      | none; the entry is kept but never placed in time      |

pub mod cron;
pub mod db;
pub mod error;
pub mod normalize;
pub mod store;
pub mod timeline;
pub mod types;

pub use cron::CronExpr;
pub use error::{Result, SchedulerError};
pub use normalize::{compute_next_run, normalize, normalize_all};
pub use store::LocalTaskStore;
pub use timeline::{bucket_days, upcoming, BucketLimits, DayBucket, DayWindow, UpcomingItem};
pub use types::{EntryStatus, LocalTask, NewLocalTask, NormalizedScheduleEntry, SourceTag};
