//! Phone trust history.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use crate::collection::{millis_column, parse_column, Collection};
use crate::database::Database;
use crate::error::Result;
use crate::models::PhoneRecord;

const SELECT_PHONE: &str =
    "SELECT number, trust_level, visit_count, last_visitor_name, first_seen, last_seen FROM phones";

impl Collection for PhoneRecord {
    type Key = str;
    const TABLE: &'static str = "phones";

    fn put(db: &Database, record: &Self) -> Result<()> {
        db.conn().execute(
            "INSERT OR REPLACE INTO phones
                (number, trust_level, visit_count, last_visitor_name, first_seen, last_seen)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.number,
                record.trust_level.as_str(),
                record.visit_count,
                record.last_visitor_name,
                record.first_seen.timestamp_millis(),
                record.last_seen.timestamp_millis(),
            ],
        )?;
        Ok(())
    }

    fn get(db: &Database, number: &str) -> Result<Option<Self>> {
        Ok(db
            .conn()
            .query_row(
                &format!("{SELECT_PHONE} WHERE number = ?1"),
                params![number],
                row_to_phone,
            )
            .optional()?)
    }

    fn get_all(db: &Database) -> Result<Vec<Self>> {
        let mut stmt = db.conn().prepare(SELECT_PHONE)?;
        let rows = stmt.query_map([], row_to_phone)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }
}

impl Database {
    /// Count one more visit for `number` and re-derive its trust level.
    ///
    /// Read and write are two separate statements.
    pub fn update_phone_history(
        &self,
        number: &str,
        visitor_name: &str,
        now: DateTime<Utc>,
    ) -> Result<PhoneRecord> {
        let record = match self.get::<PhoneRecord>(number)? {
            Some(existing) => existing.with_visit(visitor_name, now),
            None => PhoneRecord::first_visit(number, visitor_name, now),
        };

        self.put(&record)?;

        tracing::debug!(
            visit_count = record.visit_count,
            trust_level = %record.trust_level,
            "phone history updated"
        );
        Ok(record)
    }
}

fn row_to_phone(row: &rusqlite::Row<'_>) -> rusqlite::Result<PhoneRecord> {
    Ok(PhoneRecord {
        number: row.get(0)?,
        trust_level: parse_column(row, 1)?,
        visit_count: row.get(2)?,
        last_visitor_name: row.get(3)?,
        first_seen: millis_column(row, 4)?,
        last_seen: millis_column(row, 5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatepass_shared::TrustLevel;

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    #[test]
    fn test_history_accumulates() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("test.db")).unwrap();

        let first = db.update_phone_history("9876501234", "Jane Doe", at(1_000)).unwrap();
        assert_eq!((first.visit_count, first.trust_level), (1, TrustLevel::New));

        db.update_phone_history("9876501234", "Jane Doe", at(2_000)).unwrap();
        let third = db.update_phone_history("9876501234", "John Doe", at(3_000)).unwrap();
        assert_eq!((third.visit_count, third.trust_level), (3, TrustLevel::Trusted));

        let stored = db.get::<PhoneRecord>("9876501234").unwrap().unwrap();
        assert_eq!(stored, third);
        assert_eq!(stored.first_seen, at(1_000));
        assert_eq!(db.get_all::<PhoneRecord>().unwrap().len(), 1);
    }

    #[test]
    fn test_flagged_number_stays_flagged() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("test.db")).unwrap();

        let mut record = PhoneRecord::first_visit("9000000001", "X", at(0));
        record.trust_level = TrustLevel::Flagged;
        db.put(&record).unwrap();

        for i in 1..=4 {
            db.update_phone_history("9000000001", "X", at(i)).unwrap();
        }
        let stored = db.get::<PhoneRecord>("9000000001").unwrap().unwrap();
        assert_eq!(stored.trust_level, TrustLevel::Flagged);
        assert_eq!(stored.visit_count, 5);
    }
}
