use std::sync::{Mutex, MutexGuard};

use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, Row};
use tracing::{debug, info};

use crate::db::init_db;
use crate::error::Result;
use crate::types::{Activity, NewActivity};

/// Append-only log of dashboard activities backed by SQLite.
pub struct ActivityLog {
    db: Mutex<Connection>,
}

impl ActivityLog {
    /// Wrap `conn`, creating the table if needed.
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.db.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Validate and store an activity. Returns the new row id.
    pub fn append(&self, new: &NewActivity) -> Result<i64> {
        new.validate()?;
        let metadata = new
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        let db = self.lock();
        db.execute(
            "INSERT INTO activities (type, title, description, metadata, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![new.kind, new.title, new.description, metadata, now],
        )?;
        let id = db.last_insert_rowid();
        info!(activity_id = id, kind = %new.kind, "activity logged");
        Ok(id)
    }

    /// Newest first, optionally restricted to one type.
    pub fn query(&self, filter_type: Option<&str>, limit: u32, offset: u32) -> Result<Vec<Activity>> {
        let db = self.lock();
        let mut stmt = db.prepare(
            "SELECT id, type, title, description, metadata, created_at
             FROM activities
             WHERE ?1 IS NULL OR type = ?1
             ORDER BY created_at DESC, id DESC
             LIMIT ?2 OFFSET ?3",
        )?;
        let rows = stmt
            .query_map(params![filter_type, limit, offset], row_to_activity)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Case-insensitive substring match over title and description, newest first.
    pub fn search_text(&self, needle: &str, limit: u32) -> Result<Vec<Activity>> {
        let pattern = format!("%{}%", escape_like(&needle.to_lowercase()));
        let db = self.lock();
        let mut stmt = db.prepare(
            "SELECT id, type, title, description, metadata, created_at
             FROM activities
             WHERE LOWER(title) LIKE ?1 ESCAPE '\\'
                OR LOWER(COALESCE(description, '')) LIKE ?1 ESCAPE '\\'
             ORDER BY created_at DESC, id DESC
             LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![pattern, limit], row_to_activity)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        debug!(hits = rows.len(), "activity text search");
        Ok(rows)
    }
}

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn row_to_activity(row: &Row<'_>) -> rusqlite::Result<Activity> {
    let metadata: Option<String> = row.get(4)?;
    Ok(Activity {
        id: row.get(0)?,
        kind: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        // Rows written by other tools may hold plain text.
        metadata: metadata.map(|m| {
            serde_json::from_str(&m).unwrap_or(serde_json::Value::String(m))
        }),
        created_at: row.get(5)?,
    })
}
