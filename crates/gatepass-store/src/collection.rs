//! Uniform keyed access to every table.
//!
//! Each record type maps to one table and one primary key. `put` is an
//! upsert, `get` returns `None` for a missing key and `get_all` makes no
//! ordering promise; callers that care sort explicitly or use the indexed
//! queries on [`Database`].

use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::database::Database;
use crate::error::Result;

pub trait Collection: Sized {
    /// Primary key type, borrowed form.
    type Key: ?Sized;

    /// Backing table name.
    const TABLE: &'static str;

    fn put(db: &Database, record: &Self) -> Result<()>;

    fn get(db: &Database, key: &Self::Key) -> Result<Option<Self>>;

    fn get_all(db: &Database) -> Result<Vec<Self>>;
}

/// Collections whose records may be deleted. Visitors, phone history and
/// audit logs are deliberately not removable.
pub trait Removable: Collection {
    fn delete(db: &Database, key: &Self::Key) -> Result<bool>;
}

impl Database {
    pub fn put<C: Collection>(&self, record: &C) -> Result<()> {
        C::put(self, record)
    }

    pub fn get<C: Collection>(&self, key: &C::Key) -> Result<Option<C>> {
        C::get(self, key)
    }

    pub fn get_all<C: Collection>(&self) -> Result<Vec<C>> {
        C::get_all(self)
    }

    /// Delete by primary key.  Returns `true` if a row was deleted.
    pub fn delete<C: Removable>(&self, key: &C::Key) -> Result<bool> {
        C::delete(self, key)
    }

    pub fn count<C: Collection>(&self) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", C::TABLE);
        let n: i64 = self.conn().query_row(&sql, [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

// ---------------------------------------------------------------------------
// Row helpers
// ---------------------------------------------------------------------------

pub(crate) fn conversion_error<E>(idx: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
}

/// Read a text column and parse it (UUIDs, stored enums).
pub(crate) fn parse_column<T>(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let text: String = row.get(idx)?;
    text.parse().map_err(|e| conversion_error(idx, e))
}

/// Read an epoch-millisecond integer column.
pub(crate) fn millis_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let ms: i64 = row.get(idx)?;
    DateTime::from_timestamp_millis(ms).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, ms))
}

pub(crate) fn optional_millis_column(
    row: &rusqlite::Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let ms: Option<i64> = row.get(idx)?;
    ms.map(|ms| {
        DateTime::from_timestamp_millis(ms).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, ms))
    })
    .transpose()
}
