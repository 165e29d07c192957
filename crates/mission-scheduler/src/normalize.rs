use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use mission_core::{JobSchedule, RawJobDescriptor};
use tracing::debug;

use crate::cron::CronExpr;
use crate::error::{Result, SchedulerError};
use crate::types::{EntryStatus, NormalizedScheduleEntry, SourceTag};

/// Compute the next execution time for `schedule` strictly after `from`.
///
/// Cron schedules without their own zone are evaluated in `default_tz`.
/// Returns `Ok(None)` for a valid cron expression that never fires and an
/// error for anything that cannot be evaluated.
pub fn compute_next_run(
    schedule: &JobSchedule,
    from: DateTime<Utc>,
    default_tz: &Tz,
) -> Result<Option<DateTime<Utc>>> {
    match schedule {
        JobSchedule::Interval { interval_ms } => {
            if *interval_ms <= 0 {
                return Err(SchedulerError::InvalidSchedule(format!(
                    "interval must be positive, got {interval_ms}ms"
                )));
            }
            Duration::try_milliseconds(*interval_ms)
                .and_then(|step| from.checked_add_signed(step))
                .map(Some)
                .ok_or_else(|| {
                    SchedulerError::InvalidSchedule(format!("interval out of range: {interval_ms}ms"))
                })
        }

        JobSchedule::Cron { expr, timezone } => {
            let cron = CronExpr::parse(expr)?;
            let tz = match timezone.as_deref() {
                Some(name) => name
                    .parse::<Tz>()
                    .map_err(|_| SchedulerError::InvalidSchedule(format!("unknown timezone: {name}")))?,
                None => *default_tz,
            };
            Ok(cron.next_after(from, &tz))
        }

        JobSchedule::Unsupported { kind, .. } => Err(SchedulerError::InvalidSchedule(format!(
            "unsupported schedule kind: {kind}"
        ))),
    }
}

/// Reduce a job descriptor to a [`NormalizedScheduleEntry`].
///
/// An unparsable schedule keeps the entry with `next_run_at = None`.
pub fn normalize(
    job: &RawJobDescriptor,
    source: SourceTag,
    now: DateTime<Utc>,
    default_tz: &Tz,
) -> NormalizedScheduleEntry {
    let next_run_at = match compute_next_run(&job.schedule, now, default_tz) {
        Ok(next) => next,
        Err(e) => {
            debug!(job_id = %job.id, %source, error = %e, "schedule not evaluable");
            None
        }
    };

    NormalizedScheduleEntry {
        id: job.id.clone(),
        name: job.name.clone(),
        kind: job.schedule.kind_name().to_string(),
        expr: job.schedule.display_expr(),
        next_run_at,
        status: if job.enabled {
            EntryStatus::Active
        } else {
            EntryStatus::Disabled
        },
        source,
    }
}

pub fn normalize_all(
    jobs: &[RawJobDescriptor],
    source: SourceTag,
    now: DateTime<Utc>,
    default_tz: &Tz,
) -> Vec<NormalizedScheduleEntry> {
    jobs.iter()
        .map(|job| normalize(job, source, now, default_tz))
        .collect()
}

/// Parse an interval written as milliseconds, with an optional `ms` suffix.
pub fn parse_interval_ms(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let digits = raw.strip_suffix("ms").unwrap_or(raw).trim();
    digits.parse::<i64>().ok().filter(|ms| *ms > 0)
}
