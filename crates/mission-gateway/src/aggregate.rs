//! Fan-out to every source and assembly of the merged views.
//!
//! Sources are queried concurrently and each one may fail on its own; a
//! failed source contributes nothing and is reported through its `ok` flag.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use mission_activity::ActivityLog;
use mission_core::{CalendarItem, Fetched, RawJobDescriptor};
use mission_scheduler::{
    bucket_days, normalize_all, upcoming, BucketLimits, DayBucket, DayWindow, LocalTaskStore,
    NormalizedScheduleEntry, SourceTag, UpcomingItem,
};
use mission_search::{ActivityRecords, NoteCorpus, SearchEngine, SearchRecord};
use mission_sources::{CalendarSource, EventWindow, JobSource};
use serde::Serialize;
use tracing::{debug, warn};

/// Merged schedule: external entries first, then local ones.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleView {
    pub tasks: Vec<NormalizedScheduleEntry>,
    #[serde(skip)]
    pub jobs_ok: bool,
    #[serde(skip)]
    pub local_ok: bool,
}

/// Which sources answered while building an overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceStatus {
    pub jobs: bool,
    pub local: bool,
    pub calendar: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub days: Vec<DayBucket>,
    pub upcoming: Vec<UpcomingItem>,
    pub sources: SourceStatus,
}

pub struct Aggregator {
    pub jobs: Arc<dyn JobSource>,
    pub calendar: Arc<dyn CalendarSource>,
    pub tasks: LocalTaskStore,
    pub activity: Arc<ActivityLog>,
    pub notes: NoteCorpus,
    pub tz: Tz,
    pub limits: BucketLimits,
    pub upcoming_limit: usize,
    pub engine: SearchEngine,
    pub activity_limit: u32,
}

impl Aggregator {
    /// Local tasks as descriptors; a store failure counts as a failed source.
    fn local_jobs(&self) -> Fetched<RawJobDescriptor> {
        match self.tasks.list_tasks() {
            Ok(tasks) => Fetched::ok(tasks.iter().map(|t| t.to_descriptor()).collect()),
            Err(e) => {
                warn!(source = "local_tasks", error = %e, "local task store unavailable");
                Fetched::failed()
            }
        }
    }

    pub async fn schedule(&self, now: DateTime<Utc>) -> ScheduleView {
        let (external, local) = tokio::join!(self.jobs.list_jobs(), async { self.local_jobs() });

        let mut tasks = normalize_all(&external.items, SourceTag::External, now, &self.tz);
        tasks.extend(normalize_all(&local.items, SourceTag::Local, now, &self.tz));
        debug!(
            external = external.items.len(),
            local = local.items.len(),
            "schedule assembled"
        );

        ScheduleView {
            tasks,
            jobs_ok: external.ok,
            local_ok: local.ok,
        }
    }

    /// Events from the start of `today` through the end of `today + days`.
    pub async fn calendar(&self, now: DateTime<Utc>, days: u32) -> Fetched<CalendarItem> {
        let today = now.with_timezone(&self.tz).date_naive();
        let window = EventWindow::days_from(today, days, &self.tz);
        self.calendar.list_events(&window).await
    }

    /// Day buckets for `window` plus the upcoming list, from one concurrent fetch.
    pub async fn overview(&self, window: DayWindow, now: DateTime<Utc>) -> Overview {
        let dates = window.dates();
        let first = dates.first().copied().unwrap_or_else(|| now.with_timezone(&self.tz).date_naive());
        let span = dates.len().saturating_sub(1) as u32;
        let event_window = EventWindow::days_from(first, span, &self.tz);

        let (schedule, events) = tokio::join!(
            self.schedule(now),
            self.calendar.list_events(&event_window)
        );

        Overview {
            days: bucket_days(&schedule.tasks, &events.items, &window, &self.tz, self.limits),
            upcoming: upcoming(
                &schedule.tasks,
                &events.items,
                now,
                &self.tz,
                self.upcoming_limit,
            ),
            sources: SourceStatus {
                jobs: schedule.jobs_ok,
                local: schedule.local_ok,
                calendar: events.ok,
            },
        }
    }

    pub async fn search(&self, raw: &str) -> Vec<SearchRecord> {
        let activities = ActivityRecords::new(Arc::clone(&self.activity), self.activity_limit);
        self.engine.search(raw, &[&activities, &self.notes]).await
    }
}
