use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use mission_core::{JobSchedule, RawJobDescriptor};
use rusqlite::{params, Connection, Row};
use tracing::info;

use crate::{
    cron::CronExpr,
    db::init_db,
    error::{Result, SchedulerError},
    normalize::{compute_next_run, parse_interval_ms},
    types::{EntryStatus, LocalTask, NewLocalTask},
};

/// SQLite-backed store of locally persisted scheduled tasks.
///
/// Cloning shares the same connection.
#[derive(Clone)]
pub struct LocalTaskStore {
    conn: Arc<Mutex<Connection>>,
}

impl LocalTaskStore {
    /// Wrap `conn`, creating the schema if needed.
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Validate and persist a new task, storing its first computed run.
    pub fn add_task(&self, new: NewLocalTask, now: DateTime<Utc>, tz: &Tz) -> Result<LocalTask> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(SchedulerError::InvalidInput("task name is required".into()));
        }
        let schedule_type = new.schedule_type.trim().to_ascii_lowercase();
        let schedule_expr = new.schedule_expr.trim().to_string();
        let schedule = parse_schedule(&schedule_type, &schedule_expr)?;

        let next_run_at = compute_next_run(&schedule, now, tz)?.map(|dt| dt.to_rfc3339());
        let status = new.status.unwrap_or(EntryStatus::Active);
        let created_at = now.to_rfc3339();

        let conn = self.lock();
        conn.execute(
            "INSERT INTO scheduled_tasks
             (job_id, name, schedule_type, schedule_expr, next_run_at, last_run_at, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6, ?7)",
            params![
                new.job_id,
                name,
                schedule_type,
                schedule_expr,
                next_run_at,
                status.to_string(),
                created_at
            ],
        )?;
        let id = conn.last_insert_rowid();
        info!(task_id = id, %name, %schedule_type, "local task added");

        Ok(LocalTask {
            id,
            job_id: new.job_id,
            name: name.to_string(),
            schedule_type,
            schedule_expr,
            next_run_at,
            last_run_at: None,
            status,
            created_at,
        })
    }

    /// All tasks in creation order.
    pub fn list_tasks(&self) -> Result<Vec<LocalTask>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, job_id, name, schedule_type, schedule_expr, next_run_at,
                    last_run_at, status, created_at
             FROM scheduled_tasks ORDER BY created_at, id",
        )?;
        let tasks = stmt
            .query_map([], row_to_task)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    pub fn remove_task(&self, id: i64) -> Result<()> {
        let n = self
            .lock()
            .execute("DELETE FROM scheduled_tasks WHERE id = ?1", [id])?;
        if n == 0 {
            return Err(SchedulerError::TaskNotFound { id });
        }
        info!(task_id = id, "local task removed");
        Ok(())
    }
}

fn row_to_task(row: &Row<'_>) -> rusqlite::Result<LocalTask> {
    let status: String = row.get(7)?;
    Ok(LocalTask {
        id: row.get(0)?,
        job_id: row.get(1)?,
        name: row.get(2)?,
        schedule_type: row.get(3)?,
        schedule_expr: row.get(4)?,
        next_run_at: row.get(5)?,
        last_run_at: row.get(6)?,
        status: status.parse().unwrap_or(EntryStatus::Active),
        created_at: row.get(8)?,
    })
}

/// Strict parse used on the write path: anything unevaluable is rejected.
fn parse_schedule(schedule_type: &str, expr: &str) -> Result<JobSchedule> {
    match schedule_type {
        "cron" => {
            CronExpr::parse(expr)?;
            Ok(JobSchedule::Cron {
                expr: expr.to_string(),
                timezone: None,
            })
        }
        "every" | "interval" => parse_interval_ms(expr)
            .map(|interval_ms| JobSchedule::Interval { interval_ms })
            .ok_or_else(|| {
                SchedulerError::InvalidSchedule(format!(
                    "interval must be a positive number of milliseconds, got {expr:?}"
                ))
            }),
        "" => Err(SchedulerError::InvalidInput("schedule type is required".into())),
        other => Err(SchedulerError::InvalidSchedule(format!(
            "unsupported schedule type: {other}"
        ))),
    }
}

impl LocalTask {
    /// View this row as a job descriptor so it can share the normalizer.
    ///
    /// Rows that no longer parse keep their text and normalize to no next run.
    pub fn to_descriptor(&self) -> RawJobDescriptor {
        let schedule = match self.schedule_type.as_str() {
            "cron" => JobSchedule::Cron {
                expr: self.schedule_expr.clone(),
                timezone: None,
            },
            "every" | "interval" => JobSchedule::Interval {
                interval_ms: parse_interval_ms(&self.schedule_expr).unwrap_or(0),
            },
            other => JobSchedule::Unsupported {
                kind: other.to_string(),
                expr: self.schedule_expr.clone(),
            },
        };
        RawJobDescriptor {
            id: self.id.to_string(),
            name: self.name.clone(),
            schedule,
            enabled: self.status == EntryStatus::Active,
            payload_summary: self.job_id.clone().unwrap_or_default(),
        }
    }
}
