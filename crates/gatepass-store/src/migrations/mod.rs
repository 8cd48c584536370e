//! Database migration runner.
//!
//! Migrations are executed in order on every [`Database::open_at`] call.
//! Each migration is guarded by the `user_version` pragma so it runs exactly
//! once.
//!
//! [`Database::open_at`]: crate::Database::open_at

pub mod v001_initial;
pub mod v002_reseed_users;

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version.  Bump this and add a new migration module whenever
/// the schema changes.
pub const CURRENT_VERSION: u32 = 2;

/// Run all pending migrations against the open connection.
///
/// The function reads `PRAGMA user_version` to determine which migrations have
/// already been applied, then executes any outstanding ones in order.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    tracing::info!(
        current_version = current,
        target_version = CURRENT_VERSION,
        "checking database migrations"
    );

    if current > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema v{current} is newer than supported v{CURRENT_VERSION}"
        )));
    }

    if current < 1 {
        tracing::info!("applying migration v001_initial");
        v001_initial::up(conn).map_err(|e| StoreError::Migration(e.to_string()))?;
        conn.pragma_update(None, "user_version", 1)?;
    }

    if current < 2 {
        // Only a database that already held accounts has anything to clear.
        if current >= 1 {
            tracing::warn!(
                from_version = current,
                "applying migration v002_reseed_users: clearing operator accounts for reseed"
            );
            v002_reseed_users::up(conn).map_err(|e| StoreError::Migration(e.to_string()))?;
        }
        conn.pragma_update(None, "user_version", 2)?;
    }

    Ok(())
}

/// Read the schema version currently recorded in the database.
pub fn schema_version(conn: &Connection) -> Result<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::models::{BlacklistEntry, User};

    #[test]
    fn fresh_database_reaches_current_version() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("test.db")).unwrap();
        assert_eq!(schema_version(db.conn()).unwrap(), CURRENT_VERSION);
    }

    #[test]
    fn v1_database_gets_users_reseeded_and_keeps_other_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let conn = Connection::open(&path).unwrap();
            v001_initial::up(&conn).unwrap();
            conn.execute_batch(
                "INSERT INTO users (id, name, pin, role, is_session_active)
                     VALUES ('2', 'Admin', '8888', 'ADMIN', 1);
                 INSERT INTO users (id, name, pin, role, is_session_active)
                     VALUES ('9', 'Old Guard', '4444', 'GUARD', 0);
                 INSERT INTO blacklist (id, name, reason)
                     VALUES ('7d0b4bb8-6a1f-4c55-9d1e-3c2b8f7a0e11', 'John Smith', 'Trespassing');",
            )
            .unwrap();
            conn.pragma_update(None, "user_version", 1).unwrap();
        }

        let db = Database::open_at(&path).unwrap();
        assert_eq!(schema_version(db.conn()).unwrap(), CURRENT_VERSION);

        let admin = db.get::<User>("2").unwrap().unwrap();
        assert_eq!(admin.name, "School Admin.");
        assert!(!admin.is_session_active);
        assert!(db.get::<User>("9").unwrap().is_none());
        assert_eq!(db.count::<User>().unwrap(), 3);
        assert_eq!(db.count::<BlacklistEntry>().unwrap(), 1);
    }

    #[test]
    fn newer_schema_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.pragma_update(None, "user_version", CURRENT_VERSION + 1).unwrap();
        }
        assert!(matches!(Database::open_at(&path), Err(StoreError::Migration(_))));
    }
}
