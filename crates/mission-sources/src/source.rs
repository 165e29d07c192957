use async_trait::async_trait;
use mission_core::{CalendarItem, Fetched, RawJobDescriptor};

use crate::calendar::EventWindow;

/// Lists the recurring jobs known to an external scheduler.
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Never fails: an unreachable scheduler yields [`Fetched::failed`].
    async fn list_jobs(&self) -> Fetched<RawJobDescriptor>;
}

/// Lists calendar events inside a time window.
#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Events ordered by start, undated ones first. Never fails.
    async fn list_events(&self, window: &EventWindow) -> Fetched<CalendarItem>;
}
