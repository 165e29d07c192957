use rusqlite::{Connection, Result};

/// Initialise the activity log table. Safe to call on every startup (idempotent).
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS activities (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            type        TEXT NOT NULL,
            title       TEXT NOT NULL,
            description TEXT,
            metadata    TEXT,               -- JSON or NULL
            created_at  TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_activities_created
            ON activities(created_at DESC);
        CREATE INDEX IF NOT EXISTS idx_activities_type
            ON activities(type);",
    )
}
