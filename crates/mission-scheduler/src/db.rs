use rusqlite::Connection;

use crate::error::Result;

/// Initialise the local task schema in `conn`. Idempotent.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS scheduled_tasks (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            job_id          TEXT,               -- external job this task mirrors, if any
            name            TEXT    NOT NULL,
            schedule_type   TEXT    NOT NULL,   -- cron | every | interval
            schedule_expr   TEXT    NOT NULL,
            next_run_at     TEXT,               -- RFC 3339 or NULL
            last_run_at     TEXT,
            status          TEXT    NOT NULL DEFAULT 'active',
            created_at      TEXT    NOT NULL
        );
        ",
    )?;
    Ok(())
}
