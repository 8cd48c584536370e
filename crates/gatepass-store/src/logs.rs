//! Append-only audit log.

use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use crate::collection::{conversion_error, millis_column, parse_column, Collection};
use crate::database::Database;
use crate::error::Result;
use crate::models::AuditLog;

const SELECT_LOG: &str = "SELECT id, action, timestamp, details, user_id, metadata FROM logs";

impl Collection for AuditLog {
    type Key = Uuid;
    const TABLE: &'static str = "logs";

    /// Plain insert: an existing id is an error, entries are never rewritten.
    fn put(db: &Database, log: &Self) -> Result<()> {
        let metadata = log.metadata.as_ref().map(serde_json::to_string).transpose()?;
        db.conn().execute(
            "INSERT INTO logs (id, action, timestamp, details, user_id, metadata)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                log.id.to_string(),
                log.action.as_str(),
                log.timestamp.timestamp_millis(),
                log.details,
                log.user_id,
                metadata,
            ],
        )?;
        Ok(())
    }

    fn get(db: &Database, id: &Uuid) -> Result<Option<Self>> {
        Ok(db
            .conn()
            .query_row(
                &format!("{SELECT_LOG} WHERE id = ?1"),
                params![id.to_string()],
                row_to_log,
            )
            .optional()?)
    }

    fn get_all(db: &Database) -> Result<Vec<Self>> {
        let mut stmt = db.conn().prepare(SELECT_LOG)?;
        let rows = stmt.query_map([], row_to_log)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }
}

impl Database {
    /// All entries, newest first.
    pub fn list_logs(&self) -> Result<Vec<AuditLog>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{SELECT_LOG} ORDER BY timestamp DESC"))?;
        let rows = stmt.query_map([], row_to_log)?;

        let mut logs = Vec::new();
        for row in rows {
            logs.push(row?);
        }
        Ok(logs)
    }
}

fn row_to_log(row: &rusqlite::Row<'_>) -> rusqlite::Result<AuditLog> {
    let metadata: Option<String> = row.get(5)?;
    let metadata = metadata
        .map(|json| serde_json::from_str(&json))
        .transpose()
        .map_err(|e| conversion_error(5, e))?;

    Ok(AuditLog {
        id: parse_column(row, 0)?,
        action: parse_column(row, 1)?,
        timestamp: millis_column(row, 2)?,
        details: row.get(3)?,
        user_id: row.get(4)?,
        metadata,
    })
}
