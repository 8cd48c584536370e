use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use crate::collection::{parse_column, Collection, Removable};
use crate::database::Database;
use crate::error::Result;
use crate::models::BlacklistEntry;

impl Collection for BlacklistEntry {
    type Key = Uuid;
    const TABLE: &'static str = "blacklist";

    fn put(db: &Database, entry: &Self) -> Result<()> {
        db.conn().execute(
            "INSERT OR REPLACE INTO blacklist (id, name, reason) VALUES (?1, ?2, ?3)",
            params![entry.id.to_string(), entry.name, entry.reason],
        )?;
        Ok(())
    }

    fn get(db: &Database, id: &Uuid) -> Result<Option<Self>> {
        Ok(db
            .conn()
            .query_row(
                "SELECT id, name, reason FROM blacklist WHERE id = ?1",
                params![id.to_string()],
                row_to_entry,
            )
            .optional()?)
    }

    fn get_all(db: &Database) -> Result<Vec<Self>> {
        let mut stmt = db.conn().prepare("SELECT id, name, reason FROM blacklist")?;
        let rows = stmt.query_map([], row_to_entry)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }
}

impl Removable for BlacklistEntry {
    fn delete(db: &Database, id: &Uuid) -> Result<bool> {
        let affected = db
            .conn()
            .execute("DELETE FROM blacklist WHERE id = ?1", params![id.to_string()])?;
        Ok(affected > 0)
    }
}

impl Database {
    /// Case-insensitive exact name match.
    pub fn is_blacklisted(&self, name: &str) -> Result<bool> {
        let needle = name.to_lowercase();
        Ok(self
            .get_all::<BlacklistEntry>()?
            .iter()
            .any(|entry| entry.name.to_lowercase() == needle))
    }
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<BlacklistEntry> {
    Ok(BlacklistEntry {
        id: parse_column(row, 0)?,
        name: row.get(1)?,
        reason: row.get(2)?,
    })
}
