//! CRUD operations for [`Visitor`] records.

use chrono::{DateTime, Utc};
use gatepass_shared::VisitStatus;
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use crate::collection::{millis_column, optional_millis_column, parse_column, Collection};
use crate::database::Database;
use crate::error::Result;
use crate::models::Visitor;

const SELECT_VISITOR: &str = "SELECT id, pass_id, name, mobile, visitor_type, purpose, host_name,
        student_name, student_class, student_section, check_in_time, check_out_time,
        photo_base64, synced, status
     FROM visitors";

impl Collection for Visitor {
    type Key = Uuid;
    const TABLE: &'static str = "visitors";

    /// Whole-record upsert; there is no partial update.
    fn put(db: &Database, v: &Self) -> Result<()> {
        db.conn().execute(
            "INSERT OR REPLACE INTO visitors (
                id, pass_id, name, mobile, visitor_type, purpose, host_name,
                student_name, student_class, student_section, check_in_time, check_out_time,
                photo_base64, synced, status
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                v.id.to_string(),
                v.pass_id,
                v.name,
                v.mobile,
                v.visitor_type.as_str(),
                v.purpose,
                v.host_name,
                v.student_name,
                v.student_class,
                v.student_section,
                v.check_in_time.timestamp_millis(),
                v.check_out_time.map(|t| t.timestamp_millis()),
                v.photo_base64,
                v.synced as i32,
                v.status.as_str(),
            ],
        )?;
        Ok(())
    }

    fn get(db: &Database, id: &Uuid) -> Result<Option<Self>> {
        Ok(db
            .conn()
            .query_row(
                &format!("{SELECT_VISITOR} WHERE id = ?1"),
                params![id.to_string()],
                row_to_visitor,
            )
            .optional()?)
    }

    fn get_all(db: &Database) -> Result<Vec<Self>> {
        db.query_visitors(SELECT_VISITOR, [])
    }
}

impl Database {
    /// Visitors still on the premises, most recent check-in first.
    pub fn list_active_visitors(&self) -> Result<Vec<Visitor>> {
        self.query_visitors(
            &format!("{SELECT_VISITOR} WHERE status = ?1 ORDER BY check_in_time DESC"),
            params![VisitStatus::Active.as_str()],
        )
    }

    /// Visitors checked in at or after `since`, most recent first.
    pub fn list_visitors_since(&self, since: DateTime<Utc>) -> Result<Vec<Visitor>> {
        self.query_visitors(
            &format!("{SELECT_VISITOR} WHERE check_in_time >= ?1 ORDER BY check_in_time DESC"),
            params![since.timestamp_millis()],
        )
    }

    pub fn count_active_visitors(&self) -> Result<usize> {
        let n: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM visitors WHERE status = ?1",
            params![VisitStatus::Active.as_str()],
            |row| row.get(0),
        )?;
        Ok(n as usize)
    }

    /// Same filter as [`Database::list_visitors_since`], without loading rows.
    pub fn count_visitors_since(&self, since: DateTime<Utc>) -> Result<usize> {
        let n: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM visitors WHERE check_in_time >= ?1",
            params![since.timestamp_millis()],
            |row| row.get(0),
        )?;
        Ok(n as usize)
    }

    /// Visitors not yet pushed to a remote system.
    pub fn count_unsynced_visitors(&self) -> Result<usize> {
        let n: i64 =
            self.conn()
                .query_row("SELECT COUNT(*) FROM visitors WHERE synced = 0", [], |row| {
                    row.get(0)
                })?;
        Ok(n as usize)
    }

    fn query_visitors<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<Visitor>> {
        let mut stmt = self.conn().prepare(sql)?;
        let rows = stmt.query_map(params, row_to_visitor)?;

        let mut visitors = Vec::new();
        for row in rows {
            visitors.push(row?);
        }
        Ok(visitors)
    }
}

fn row_to_visitor(row: &rusqlite::Row<'_>) -> rusqlite::Result<Visitor> {
    let synced: i32 = row.get(13)?;
    Ok(Visitor {
        id: parse_column(row, 0)?,
        pass_id: row.get(1)?,
        name: row.get(2)?,
        mobile: row.get(3)?,
        visitor_type: parse_column(row, 4)?,
        purpose: row.get(5)?,
        host_name: row.get(6)?,
        student_name: row.get(7)?,
        student_class: row.get(8)?,
        student_section: row.get(9)?,
        check_in_time: millis_column(row, 10)?,
        check_out_time: optional_millis_column(row, 11)?,
        photo_base64: row.get(12)?,
        synced: synced != 0,
        status: parse_column(row, 14)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatepass_shared::VisitorType;

    fn open() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("test.db")).unwrap();
        (dir, db)
    }

    fn visitor(name: &str, check_in_ms: i64) -> Visitor {
        Visitor {
            id: Uuid::new_v4(),
            pass_id: "BPS-12345".into(),
            name: name.into(),
            mobile: "9876501234".into(),
            visitor_type: VisitorType::Parent,
            purpose: "Meeting".into(),
            host_name: "Class Teacher".into(),
            student_name: Some("Sam".into()),
            student_class: Some("5".into()),
            student_section: Some("B".into()),
            check_in_time: DateTime::from_timestamp_millis(check_in_ms).unwrap(),
            check_out_time: None,
            photo_base64: "data:image/jpeg;base64,AAAA".into(),
            synced: false,
            status: VisitStatus::Active,
        }
    }

    #[test]
    fn test_put_get_round_trip() {
        let (_dir, db) = open();
        let v = visitor("Jane Doe", 1_700_000_000_123);
        db.put(&v).unwrap();

        assert_eq!(db.get::<Visitor>(&v.id).unwrap(), Some(v));
        assert!(db.get::<Visitor>(&Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn test_put_overwrites_whole_record() {
        let (_dir, db) = open();
        let v = visitor("Jane Doe", 1_000);
        db.put(&v).unwrap();

        let out = v.checked_out(DateTime::from_timestamp_millis(2_000).unwrap());
        db.put(&out).unwrap();

        assert_eq!(db.count::<Visitor>().unwrap(), 1);
        assert_eq!(db.get::<Visitor>(&v.id).unwrap(), Some(out));
    }

    #[test]
    fn test_active_list_is_sorted_and_filtered() {
        let (_dir, db) = open();
        let early = visitor("Early", 1_000);
        let late = visitor("Late", 3_000);
        let gone = visitor("Gone", 2_000).checked_out(DateTime::from_timestamp_millis(2_500).unwrap());
        for v in [&early, &gone, &late] {
            db.put(v).unwrap();
        }

        let names: Vec<_> = db
            .list_active_visitors()
            .unwrap()
            .into_iter()
            .map(|v| v.name)
            .collect();
        assert_eq!(names, vec!["Late", "Early"]);
        assert_eq!(db.count_active_visitors().unwrap(), 2);
        assert_eq!(db.count_unsynced_visitors().unwrap(), 3);

        let since: Vec<_> = db
            .list_visitors_since(DateTime::from_timestamp_millis(2_000).unwrap())
            .unwrap()
            .into_iter()
            .map(|v| v.name)
            .collect();
        assert_eq!(since, vec!["Late", "Gone"]);
        assert_eq!(
            db.count_visitors_since(DateTime::from_timestamp_millis(2_000).unwrap())
                .unwrap(),
            2
        );
        assert_eq!(
            db.count_visitors_since(DateTime::from_timestamp_millis(10_000_000).unwrap())
                .unwrap(),
            0
        );
    }
}
