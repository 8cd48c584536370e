//! v002 -- Reseed operator accounts.
//!
//! The seeded display names changed, so existing accounts are dropped and
//! recreated by [`Database::seed_default_users`] once migrations finish. No
//! other table is touched.
//!
//! [`Database::seed_default_users`]: crate::Database::seed_default_users

use rusqlite::Connection;

const UP_SQL: &str = "DELETE FROM users;";

pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
