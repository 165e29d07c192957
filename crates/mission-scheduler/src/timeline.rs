use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use mission_core::CalendarItem;
use serde::Serialize;

use crate::types::NormalizedScheduleEntry;

/// The run of local calendar days a view covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayWindow {
    /// Monday through Sunday of the week containing `anchor`.
    Week { anchor: NaiveDate },
    /// `days` consecutive days beginning at `start`.
    Forward { start: NaiveDate, days: u32 },
}

impl DayWindow {
    pub fn dates(&self) -> Vec<NaiveDate> {
        let (first, len) = match *self {
            DayWindow::Week { anchor } => {
                let offset = anchor.weekday().num_days_from_monday() as i64;
                (anchor - Duration::days(offset), 7)
            }
            DayWindow::Forward { start, days } => (start, days),
        };
        first.iter_days().take(len as usize).collect()
    }
}

/// Per-kind cap on the items rendered in one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketLimits {
    pub per_kind: usize,
}

impl Default for BucketLimits {
    fn default() -> Self {
        Self { per_kind: 2 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBucket {
    pub date: NaiveDate,
    pub schedule_entries: Vec<NormalizedScheduleEntry>,
    pub calendar_items: Vec<CalendarItem>,
    /// Entries plus items that matched this day but were cut by the cap.
    pub overflow_count: usize,
}

/// Group entries and calendar items into one bucket per day of `window`.
///
/// Entries land on the local date of `next_run_at` in `tz`; calendar items on
/// the local date of their start (all-day items on their raw date). Anything
/// without a date is left out. Input order is kept within a bucket.
pub fn bucket_days(
    entries: &[NormalizedScheduleEntry],
    items: &[CalendarItem],
    window: &DayWindow,
    tz: &Tz,
    limits: BucketLimits,
) -> Vec<DayBucket> {
    window
        .dates()
        .into_iter()
        .map(|date| {
            let mut schedule_entries: Vec<NormalizedScheduleEntry> = entries
                .iter()
                .filter(|e| {
                    e.next_run_at
                        .is_some_and(|at| at.with_timezone(tz).date_naive() == date)
                })
                .cloned()
                .collect();
            let mut calendar_items: Vec<CalendarItem> = items
                .iter()
                .filter(|i| i.start.is_some_and(|s| s.local_date(tz) == date))
                .cloned()
                .collect();

            let overflow_count = schedule_entries.len().saturating_sub(limits.per_kind)
                + calendar_items.len().saturating_sub(limits.per_kind);
            schedule_entries.truncate(limits.per_kind);
            calendar_items.truncate(limits.per_kind);

            DayBucket {
                date,
                schedule_entries,
                calendar_items,
                overflow_count,
            }
        })
        .collect()
}

/// One row of the "upcoming" list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UpcomingItem {
    Task {
        at: DateTime<Utc>,
        entry: NormalizedScheduleEntry,
    },
    Event {
        at: DateTime<Utc>,
        item: CalendarItem,
    },
}

impl UpcomingItem {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            UpcomingItem::Task { at, .. } | UpcomingItem::Event { at, .. } => *at,
        }
    }
}

/// The next `limit` future entries and events, soonest first.
///
/// Ties keep schedule entries ahead of calendar items, each in input order.
pub fn upcoming(
    entries: &[NormalizedScheduleEntry],
    items: &[CalendarItem],
    now: DateTime<Utc>,
    tz: &Tz,
    limit: usize,
) -> Vec<UpcomingItem> {
    let tasks = entries.iter().filter_map(|entry| {
        let at = entry.next_run_at.filter(|at| *at > now)?;
        Some(UpcomingItem::Task {
            at,
            entry: entry.clone(),
        })
    });
    let events = items.iter().filter_map(|item| {
        let at = item.effective_instant(tz).filter(|at| *at > now)?;
        Some(UpcomingItem::Event {
            at,
            item: item.clone(),
        })
    });

    let mut merged: Vec<UpcomingItem> = tasks.chain(events).collect();
    // sort_by_key is stable
    merged.sort_by_key(UpcomingItem::at);
    merged.truncate(limit);
    merged
}
