use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone};
use chrono_tz::Tz;
use mission_core::config::CalendarSourceConfig;
use mission_core::{CalendarItem, EventTime, Fetched};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{Result, SourceError};
use crate::runner::{run, CommandSpec};
use crate::source::CalendarSource;

const UNTITLED: &str = "Untitled Event";
const WINDOW_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Inclusive local time range handed to the calendar CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventWindow {
    pub from: DateTime<FixedOffset>,
    pub to: DateTime<FixedOffset>,
}

impl EventWindow {
    /// Start of `today` through the end of `today + days`, local to `tz`.
    pub fn days_from(today: NaiveDate, days: u32, tz: &Tz) -> Self {
        let last = today + chrono::Duration::days(days as i64);
        Self {
            from: local(tz, today.and_time(NaiveTime::default())),
            to: local(tz, last.and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default())),
        }
    }

    pub fn from_arg(&self) -> String {
        self.from.format(WINDOW_FORMAT).to_string()
    }

    pub fn to_arg(&self) -> String {
        self.to.format(WINDOW_FORMAT).to_string()
    }
}

/// Resolve a wall-clock time, stepping past a DST gap when it does not exist.
fn local(tz: &Tz, naive: NaiveDateTime) -> DateTime<FixedOffset> {
    let mut probe = naive;
    for _ in 0..=24 {
        if let Some(dt) = tz.from_local_datetime(&probe).earliest() {
            return dt.with_timezone(&dt.offset().fix());
        }
        probe += chrono::Duration::hours(1);
    }
    // No zone has a day-long gap; fall back to reading the time as UTC.
    naive.and_utc().fixed_offset()
}

/// Reads events through a calendar CLI such as `gog calendar events`.
pub struct CalendarReader {
    command: String,
    calendar_id: String,
    account: Option<String>,
    tz: Tz,
    timeout: Duration,
}

impl CalendarReader {
    pub fn new(config: &CalendarSourceConfig, tz: Tz, timeout: Duration) -> Self {
        Self {
            command: config.command.clone(),
            calendar_id: config.calendar_id.clone(),
            account: config.account.clone(),
            tz,
            timeout,
        }
    }

    fn spec(&self, window: &EventWindow) -> CommandSpec {
        let mut spec = CommandSpec::new(&self.command).args([
            "calendar".to_string(),
            "events".to_string(),
            self.calendar_id.clone(),
            "--from".to_string(),
            window.from_arg(),
            "--to".to_string(),
            window.to_arg(),
        ]);
        if let Some(account) = &self.account {
            spec = spec
                .arg("--account")
                .arg(account)
                .env("GOG_ACCOUNT", account);
        }
        spec.arg("--json")
    }
}

#[async_trait]
impl CalendarSource for CalendarReader {
    async fn list_events(&self, window: &EventWindow) -> Fetched<CalendarItem> {
        let result = async {
            let stdout = run(&self.spec(window), self.timeout).await?;
            parse_events(&stdout, &self.tz)
        }
        .await;

        match result {
            Ok(events) => {
                info!(source = "calendar", count = events.len(), "events listed");
                Fetched::ok(events)
            }
            Err(e) => {
                warn!(source = "calendar", error = %e, "calendar reader failed");
                Fetched::failed()
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EventsPayload {
    List(Vec<serde_json::Value>),
    Wrapped { events: Vec<serde_json::Value> },
}

#[derive(Deserialize)]
struct WireEvent {
    #[serde(default)]
    id: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    start: Option<WireTime>,
    #[serde(default)]
    end: Option<WireTime>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    creator: Option<WireCreator>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct WireTime {
    #[serde(default)]
    date_time: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

impl WireTime {
    /// `dateTime` wins; an unparsable one falls back to `date`.
    fn parse(&self) -> Option<EventTime> {
        self.date_time
            .as_deref()
            .and_then(EventTime::parse)
            .or_else(|| self.date.as_deref().and_then(EventTime::parse))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCreator {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

/// Decode calendar output into items sorted by start, undated items first.
pub fn parse_events(stdout: &[u8], tz: &Tz) -> Result<Vec<CalendarItem>> {
    let payload: EventsPayload =
        serde_json::from_slice(stdout).map_err(|e| SourceError::Malformed(e.to_string()))?;
    let values = match payload {
        EventsPayload::List(values) | EventsPayload::Wrapped { events: values } => values,
    };

    let mut items: Vec<CalendarItem> = values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<WireEvent>(value) {
            Ok(event) => Some(event.into_item()),
            Err(e) => {
                warn!(source = "calendar", error = %e, "skipping undecodable event");
                None
            }
        })
        .collect();

    items.sort_by_key(|item| item.effective_instant(tz));
    Ok(items)
}

impl WireEvent {
    fn into_item(self) -> CalendarItem {
        let start = self.start.as_ref().and_then(WireTime::parse);
        let is_all_day = match &start {
            Some(EventTime::At(_)) => false,
            Some(EventTime::AllDay(_)) => true,
            None => self.start.as_ref().map_or(true, |s| s.date_time.is_none()),
        };
        let creator = self
            .creator
            .and_then(|c| c.display_name.filter(|n| !n.is_empty()).or(c.email))
            .unwrap_or_default();

        CalendarItem {
            id: self.id,
            title: self
                .summary
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| UNTITLED.to_string()),
            description: self.description.unwrap_or_default(),
            start,
            end: self.end.as_ref().and_then(WireTime::parse),
            location: self.location.unwrap_or_default(),
            creator,
            is_all_day,
        }
    }
}
