//! Standard 5-field cron expressions.
//!
//! ```text
//! ┌──────── minute        0-59
//! │ ┌────── hour          0-23
//! │ │ ┌──── day of month  1-31
//! │ │ │ ┌── month         1-12 or JAN-DEC
//! │ │ │ │ ┌ day of week   0-7 or SUN-SAT (0 and 7 are Sunday)
//! * * * * *
//! ```
//!
//! Each field accepts `*`, single values, ranges (`1-5`), lists (`1,15`) and
//! steps (`*/15`, `8-18/2`, `5/10`). When both day fields are restricted a day
//! matches if *either* matches; otherwise both must.

use std::str::FromStr;

use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc,
};

use crate::error::{Result, SchedulerError};

/// How far ahead `next_after` looks before concluding the expression never fires.
/// 28 years is the full weekday/leap-year cycle of the Gregorian calendar.
const MAX_SEARCH_DAYS: i64 = 366 * 29;

/// Longest wall-clock gap a DST transition can open.
const MAX_GAP_MINUTES: i64 = 24 * 60;

const MONTH_NAMES: &[&str] = &[
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];
const WEEKDAY_NAMES: &[&str] = &["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

/// A parsed cron expression. Each field is a bitmask of the values it accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronExpr {
    minutes: u64,
    hours: u64,
    days_of_month: u64,
    months: u64,
    days_of_week: u64,
    dom_restricted: bool,
    dow_restricted: bool,
}

impl CronExpr {
    pub fn parse(expr: &str) -> Result<Self> {
        let fields: Vec<&str> = expr.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(SchedulerError::InvalidSchedule(format!(
                "expected 5 fields, got {} in `{expr}`",
                fields.len()
            )));
        }

        let minutes = parse_field(fields[0], 0, 59, &[], 0)?;
        let hours = parse_field(fields[1], 0, 23, &[], 0)?;
        let days_of_month = parse_field(fields[2], 1, 31, &[], 0)?;
        let months = parse_field(fields[3], 1, 12, MONTH_NAMES, 1)?;
        let mut days_of_week = parse_field(fields[4], 0, 7, WEEKDAY_NAMES, 0)?;
        // 7 is an alias for Sunday.
        if days_of_week & (1 << 7) != 0 {
            days_of_week = (days_of_week & !(1 << 7)) | 1;
        }

        Ok(Self {
            minutes,
            hours,
            days_of_month,
            months,
            days_of_week,
            dom_restricted: !fields[2].starts_with('*'),
            dow_restricted: !fields[4].starts_with('*'),
        })
    }

    /// Whether the expression fires on `date` (ignoring the time fields).
    pub fn matches_date(&self, date: NaiveDate) -> bool {
        if !has_bit(self.months, date.month()) {
            return false;
        }
        let dom = has_bit(self.days_of_month, date.day());
        let dow = has_bit(self.days_of_week, date.weekday().num_days_from_sunday());
        if self.dom_restricted && self.dow_restricted {
            dom || dow
        } else {
            dom && dow
        }
    }

    /// First instant strictly after `now` whose wall-clock time in `tz`
    /// satisfies every field.
    ///
    /// Wall-clock times skipped by a spring-forward transition fire at the
    /// first valid instant after the gap; times repeated by a fall-back
    /// transition fire once, at their earlier occurrence. Returns `None` when
    /// the expression can never fire (e.g. `0 0 30 2 *`).
    pub fn next_after<Z: TimeZone>(&self, now: DateTime<Utc>, tz: &Z) -> Option<DateTime<Utc>> {
        let local_now = now.with_timezone(tz).naive_local();
        let start = local_now.with_second(0)?.with_nanosecond(0)? + Duration::minutes(1);
        let first_day = start.date();
        let last_day = first_day + Duration::days(MAX_SEARCH_DAYS);

        let mut day = first_day;
        while day <= last_day {
            if self.matches_date(day) {
                for hour in set_bits(self.hours, 0, 23) {
                    if day == first_day && hour < start.hour() {
                        continue;
                    }
                    for minute in set_bits(self.minutes, 0, 59) {
                        if day == first_day && hour == start.hour() && minute < start.minute() {
                            continue;
                        }
                        let naive = day.and_hms_opt(hour, minute, 0)?;
                        if let Some(instant) = resolve_local(tz, naive) {
                            if instant > now {
                                return Some(instant);
                            }
                        }
                    }
                }
            }
            day = day.succ_opt()?;
        }
        None
    }
}

impl FromStr for CronExpr {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Map a wall-clock time in `tz` to an absolute instant.
fn resolve_local<Z: TimeZone>(tz: &Z, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => {
            // Inside a spring-forward gap: walk to the first minute that exists.
            let mut probe = naive;
            for _ in 0..MAX_GAP_MINUTES {
                probe += Duration::minutes(1);
                if let Some(dt) = tz.from_local_datetime(&probe).earliest() {
                    return Some(dt.with_timezone(&Utc));
                }
            }
            None
        }
    }
}

fn has_bit(mask: u64, value: u32) -> bool {
    value < 64 && mask & (1u64 << value) != 0
}

fn set_bits(mask: u64, min: u32, max: u32) -> impl Iterator<Item = u32> {
    (min..=max).filter(move |v| has_bit(mask, *v))
}

/// Parse one comma-separated field into a bitmask of accepted values.
fn parse_field(field: &str, min: u32, max: u32, names: &[&str], name_offset: u32) -> Result<u64> {
    let invalid = |why: &str| SchedulerError::InvalidSchedule(format!("`{field}`: {why}"));
    let mut mask = 0u64;

    for part in field.split(',') {
        if part.is_empty() {
            return Err(invalid("empty list element"));
        }
        let (range, step) = match part.split_once('/') {
            Some((range, step)) => {
                let step: u32 = step.parse().map_err(|_| invalid("step is not a number"))?;
                if step == 0 {
                    return Err(invalid("step must be positive"));
                }
                (range, Some(step))
            }
            None => (part, None),
        };

        let (lo, hi) = if range == "*" {
            (min, max)
        } else if let Some((a, b)) = range.split_once('-') {
            (
                parse_value(a, names, name_offset).ok_or_else(|| invalid("bad range start"))?,
                parse_value(b, names, name_offset).ok_or_else(|| invalid("bad range end"))?,
            )
        } else {
            let v = parse_value(range, names, name_offset).ok_or_else(|| invalid("bad value"))?;
            // `5/10` means "from 5 to the end, every 10".
            if step.is_some() {
                (v, max)
            } else {
                (v, v)
            }
        };

        if lo < min || hi > max {
            return Err(invalid(&format!("value out of range {min}-{max}")));
        }
        if lo > hi {
            return Err(invalid("range start is after range end"));
        }

        let step = step.unwrap_or(1);
        let mut v = lo;
        while v <= hi {
            mask |= 1u64 << v;
            match v.checked_add(step) {
                Some(next) => v = next,
                None => break,
            }
        }
    }
    Ok(mask)
}

fn parse_value(raw: &str, names: &[&str], name_offset: u32) -> Option<u32> {
    if let Ok(n) = raw.parse::<u32>() {
        return Some(n);
    }
    let upper = raw.to_ascii_uppercase();
    names
        .iter()
        .position(|n| *n == upper)
        .map(|i| i as u32 + name_offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use chrono_tz::Tz;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn local(tz: &Tz, y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        tz.with_ymd_and_hms(y, mo, d, h, mi, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert!(CronExpr::parse("* * * *").is_err());
        assert!(CronExpr::parse("0 0 * * * *").is_err());
        assert!(CronExpr::parse("").is_err());
    }

    #[test]
    fn rejects_out_of_range_and_garbage() {
        assert!(CronExpr::parse("60 * * * *").is_err());
        assert!(CronExpr::parse("* 24 * * *").is_err());
        assert!(CronExpr::parse("* * 0 * *").is_err());
        assert!(CronExpr::parse("* * * 13 *").is_err());
        assert!(CronExpr::parse("* * * * 8").is_err());
        assert!(CronExpr::parse("*/0 * * * *").is_err());
        assert!(CronExpr::parse("5-1 * * * *").is_err());
        assert!(CronExpr::parse("a * * * *").is_err());
        assert!(CronExpr::parse("1,,2 * * * *").is_err());
    }

    #[test]
    fn accepts_names_lists_ranges_and_steps() {
        let e: CronExpr = "*/15 8-18/2 1,15 JAN-mar mon-fri".parse().unwrap();
        assert_eq!(e.minutes, (1 << 0) | (1 << 15) | (1 << 30) | (1 << 45));
        assert!(has_bit(e.hours, 8) && has_bit(e.hours, 18) && !has_bit(e.hours, 9));
        assert!(has_bit(e.months, 1) && has_bit(e.months, 3) && !has_bit(e.months, 4));
        assert!(has_bit(e.days_of_week, 1) && has_bit(e.days_of_week, 5));
        assert!(!has_bit(e.days_of_week, 0));
    }

    #[test]
    fn huge_step_sets_only_the_start_value() {
        let e = CronExpr::parse("1/4294967295 * * * *").unwrap();
        assert_eq!(e.minutes, 1 << 1);
        let e = CronExpr::parse("* 4294967295/4294967295 * * *");
        assert!(e.is_err());
        let next = CronExpr::parse("1/4294967295 * * * *")
            .unwrap()
            .next_after(utc(2026, 10, 17, 12, 34), &chrono_tz::UTC);
        assert_eq!(next, Some(utc(2026, 10, 17, 13, 1)));
    }

    #[test]
    fn seven_is_sunday() {
        let e = CronExpr::parse("0 0 * * 7").unwrap();
        assert!(has_bit(e.days_of_week, 0));
        assert!(!has_bit(e.days_of_week, 7));
        let sunday = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(sunday.weekday(), Weekday::Sun);
        assert!(e.matches_date(sunday));
    }

    #[test]
    fn weekly_job_from_wednesday_lands_on_next_monday() {
        // 2026-10-14 is a Wednesday.
        let e = CronExpr::parse("0 9 * * 1").unwrap();
        let next = e.next_after(utc(2026, 10, 14, 10, 0), &Utc).unwrap();
        assert_eq!(next, utc(2026, 10, 19, 9, 0));
        assert_eq!(next.weekday(), Weekday::Mon);
    }

    #[test]
    fn weekly_job_honours_named_timezone() {
        let tz: Tz = "America/New_York".parse().unwrap();
        let e = CronExpr::parse("0 9 * * 1").unwrap();
        let now = local(&tz, 2026, 10, 14, 10, 0);
        let next = e.next_after(now, &tz).unwrap();
        assert_eq!(next, local(&tz, 2026, 10, 19, 9, 0));
    }

    #[test]
    fn exact_match_advances_to_following_occurrence() {
        let e = CronExpr::parse("0 10 * * *").unwrap();
        let now = utc(2026, 10, 14, 10, 0);
        assert_eq!(e.next_after(now, &Utc).unwrap(), utc(2026, 10, 15, 10, 0));
    }

    #[test]
    fn sub_minute_now_still_matches_current_minute_boundary() {
        let e = CronExpr::parse("0 10 * * *").unwrap();
        let now = utc(2026, 10, 14, 9, 59) + Duration::seconds(30);
        assert_eq!(e.next_after(now, &Utc).unwrap(), utc(2026, 10, 14, 10, 0));
    }

    #[test]
    fn thirty_first_skips_short_months() {
        let e = CronExpr::parse("0 0 31 * *").unwrap();
        let next = e.next_after(utc(2026, 4, 1, 0, 0), &Utc).unwrap();
        assert_eq!(next, utc(2026, 5, 31, 0, 0));
    }

    #[test]
    fn leap_day_waits_for_leap_year() {
        let e = CronExpr::parse("0 12 29 2 *").unwrap();
        let next = e.next_after(utc(2026, 3, 1, 0, 0), &Utc).unwrap();
        assert_eq!(next, utc(2028, 2, 29, 12, 0));
    }

    #[test]
    fn impossible_date_never_fires() {
        let e = CronExpr::parse("0 0 30 2 *").unwrap();
        assert!(e.next_after(utc(2026, 1, 1, 0, 0), &Utc).is_none());
    }

    #[test]
    fn restricted_dom_and_dow_match_either() {
        // 1st of the month OR any Friday.
        let e = CronExpr::parse("0 0 1 * 5").unwrap();
        // 2026-10-14 (Wed) → Friday 16th comes before Nov 1st.
        let next = e.next_after(utc(2026, 10, 14, 0, 0), &Utc).unwrap();
        assert_eq!(next, utc(2026, 10, 16, 0, 0));
        // Saturday 31st → Nov 1st (Sunday) comes before Friday 6th.
        let next = e.next_after(utc(2026, 10, 31, 0, 0), &Utc).unwrap();
        assert_eq!(next, utc(2026, 11, 1, 0, 0));
    }

    #[test]
    fn starred_dow_with_step_keeps_and_semantics() {
        // dom restricted, dow `*/1` starts with `*` so only the 13th matches.
        let e = CronExpr::parse("0 0 13 * */1").unwrap();
        let next = e.next_after(utc(2026, 10, 14, 0, 0), &Utc).unwrap();
        assert_eq!(next, utc(2026, 11, 13, 0, 0));
    }

    #[test]
    fn year_wraparound() {
        let e = CronExpr::parse("30 6 1 1 *").unwrap();
        let next = e.next_after(utc(2026, 6, 1, 0, 0), &Utc).unwrap();
        assert_eq!(next, utc(2027, 1, 1, 6, 30));
    }

    #[test]
    fn spring_forward_gap_fires_at_end_of_gap() {
        // Europe/London jumps from 01:00 GMT to 02:00 BST on 2026-03-29.
        let tz: Tz = "Europe/London".parse().unwrap();
        let e = CronExpr::parse("30 1 * * *").unwrap();
        let now = utc(2026, 3, 28, 12, 0);
        let next = e.next_after(now, &tz).unwrap();
        assert_eq!(next, utc(2026, 3, 29, 1, 0));
        // The following evaluation is the next day's 01:30 BST.
        let after = e.next_after(next, &tz).unwrap();
        assert_eq!(after, utc(2026, 3, 30, 0, 30));
    }

    #[test]
    fn fall_back_repeat_fires_once() {
        // Europe/London repeats 01:00-02:00 on 2026-10-25.
        let tz: Tz = "Europe/London".parse().unwrap();
        let e = CronExpr::parse("30 1 * * *").unwrap();
        let first = e.next_after(utc(2026, 10, 24, 12, 0), &tz).unwrap();
        // Earliest occurrence: 01:30 BST = 00:30 UTC.
        assert_eq!(first, utc(2026, 10, 25, 0, 30));
        let second = e.next_after(first, &tz).unwrap();
        assert_eq!(second, utc(2026, 10, 26, 1, 30));
    }

    #[test]
    fn every_minute_is_strictly_increasing_across_dst() {
        let tz: Tz = "Europe/London".parse().unwrap();
        let e = CronExpr::parse("*/20 * * * *").unwrap();
        let mut now = utc(2026, 3, 28, 23, 0);
        for _ in 0..20 {
            let next = e.next_after(now, &tz).unwrap();
            assert!(next > now);
            now = next;
        }
    }

    #[test]
    fn re_evaluation_yields_subsequent_occurrence() {
        let zones = ["UTC", "Asia/Kolkata", "America/Sao_Paulo", "Australia/Lord_Howe"];
        let exprs = ["0 9 * * 1", "*/7 3-5 * * *", "15 0 1,15 * *", "0 12 * JAN,JUL SUN"];
        for zone in zones {
            let tz: Tz = zone.parse().unwrap();
            for expr in exprs {
                let e = CronExpr::parse(expr).unwrap();
                let mut now = utc(2026, 1, 1, 0, 0);
                for _ in 0..10 {
                    let next = e.next_after(now, &tz).unwrap();
                    assert!(next > now, "{expr} in {zone}");
                    let again = e.next_after(next, &tz).unwrap();
                    assert!(again > next, "{expr} in {zone}");
                    now = next;
                }
            }
        }
    }
}
