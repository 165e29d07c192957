use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Result of one adapter call: the items it could read plus a success flag.
///
/// A failed source is `{ items: [], ok: false }`, never an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fetched<T> {
    pub items: Vec<T>,
    pub ok: bool,
}

impl<T> Fetched<T> {
    pub fn ok(items: Vec<T>) -> Self {
        Self { items, ok: true }
    }

    pub fn failed() -> Self {
        Self {
            items: Vec::new(),
            ok: false,
        }
    }
}

impl<T> Default for Fetched<T> {
    fn default() -> Self {
        Self::ok(Vec::new())
    }
}

/// How a recurring job is scheduled, as reported by its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobSchedule {
    /// Standard 5-field cron expression, optionally pinned to an IANA zone.
    Cron {
        expr: String,
        timezone: Option<String>,
    },
    /// Fixed period in milliseconds.
    Interval { interval_ms: i64 },
    /// A kind this dashboard cannot evaluate (e.g. one-shot `at` jobs).
    Unsupported { kind: String, expr: String },
}

impl JobSchedule {
    /// Kind label as shown in the schedule view.
    pub fn kind_name(&self) -> &str {
        match self {
            JobSchedule::Cron { .. } => "cron",
            JobSchedule::Interval { .. } => "interval",
            JobSchedule::Unsupported { kind, .. } => kind,
        }
    }

    /// Human-readable expression as shown in the schedule view.
    pub fn display_expr(&self) -> String {
        match self {
            JobSchedule::Cron { expr, .. } => expr.clone(),
            JobSchedule::Interval { interval_ms } => format!("{interval_ms}ms"),
            JobSchedule::Unsupported { expr, .. } => expr.clone(),
        }
    }
}

/// Read-only snapshot of a recurring job, fetched fresh per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawJobDescriptor {
    pub id: String,
    pub name: String,
    pub schedule: JobSchedule,
    pub enabled: bool,
    pub payload_summary: String,
}

/// Start or end of a calendar event: a zoned instant or an all-day date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTime {
    At(DateTime<FixedOffset>),
    AllDay(NaiveDate),
}

impl EventTime {
    /// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(EventTime::At(dt));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .map(EventTime::AllDay)
    }

    /// The absolute instant this time denotes. All-day dates resolve to local
    /// midnight in `tz`, which may not exist on a DST transition day.
    pub fn instant(&self, tz: &Tz) -> Option<DateTime<Utc>> {
        match self {
            EventTime::At(dt) => Some(dt.with_timezone(&Utc)),
            EventTime::AllDay(date) => tz
                .from_local_datetime(&date.and_hms_opt(0, 0, 0)?)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }

    /// Calendar date in `tz`. All-day dates are returned as-is.
    pub fn local_date(&self, tz: &Tz) -> NaiveDate {
        match self {
            EventTime::At(dt) => dt.with_timezone(tz).date_naive(),
            EventTime::AllDay(date) => *date,
        }
    }

    pub fn is_all_day(&self) -> bool {
        matches!(self, EventTime::AllDay(_))
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTime::At(dt) => write!(f, "{}", dt.to_rfc3339()),
            EventTime::AllDay(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

impl Serialize for EventTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EventTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        EventTime::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid event time: {raw}")))
    }
}

/// Read-only snapshot of a calendar event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub start: Option<EventTime>,
    pub end: Option<EventTime>,
    pub location: String,
    pub creator: String,
    pub is_all_day: bool,
}

impl CalendarItem {
    /// Instant used for ordering; `None` when the start is missing or unresolvable.
    pub fn effective_instant(&self, tz: &Tz) -> Option<DateTime<Utc>> {
        self.start.as_ref().and_then(|s| s.instant(tz))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn parses_rfc3339_and_dates() {
        let at = EventTime::parse("2026-10-20T09:30:00+02:00").unwrap();
        assert!(!at.is_all_day());
        assert_eq!(at.to_string(), "2026-10-20T09:30:00+02:00");

        let day = EventTime::parse("2026-10-20").unwrap();
        assert!(day.is_all_day());
        assert_eq!(day.to_string(), "2026-10-20");

        assert!(EventTime::parse("next tuesday").is_none());
    }

    #[test]
    fn all_day_date_is_bucketed_by_raw_date() {
        let day = EventTime::parse("2026-10-20").unwrap();
        let tz: Tz = "America/Los_Angeles".parse().unwrap();
        assert_eq!(
            day.local_date(&tz),
            NaiveDate::from_ymd_opt(2026, 10, 20).unwrap()
        );
        let instant = day.instant(&tz).unwrap();
        // Midnight in Los Angeles (PDT, UTC-7) is 07:00 UTC.
        assert_eq!(instant.hour(), 7);
    }

    #[test]
    fn zoned_time_converts_to_local_date() {
        let at = EventTime::parse("2026-10-20T23:30:00+00:00").unwrap();
        let tz: Tz = "Europe/Berlin".parse().unwrap();
        assert_eq!(
            at.local_date(&tz),
            NaiveDate::from_ymd_opt(2026, 10, 21).unwrap()
        );
    }

    #[test]
    fn event_time_serializes_as_string() {
        let item = CalendarItem {
            id: "e1".into(),
            title: "Standup".into(),
            description: String::new(),
            start: EventTime::parse("2026-10-20"),
            end: None,
            location: String::new(),
            creator: String::new(),
            is_all_day: true,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["start"], "2026-10-20");
        assert_eq!(json["isAllDay"], true);
        assert!(json["end"].is_null());
    }

    #[test]
    fn fetched_failed_is_empty() {
        let f: Fetched<u8> = Fetched::failed();
        assert!(!f.ok);
        assert!(f.items.is_empty());
    }
}
