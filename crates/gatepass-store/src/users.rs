//! Operator accounts and login lookups.

use gatepass_shared::UserRole;
use rusqlite::{params, OptionalExtension};

use crate::collection::{parse_column, Collection};
use crate::database::Database;
use crate::error::Result;
use crate::models::User;

const SELECT_USER: &str = "SELECT id, name, pin, role, is_session_active FROM users";

impl Collection for User {
    type Key = str;
    const TABLE: &'static str = "users";

    /// Upsert by id.  A PIN already used by another account is rejected by the
    /// unique index instead of silently replacing that account.
    fn put(db: &Database, user: &Self) -> Result<()> {
        db.conn().execute(
            "INSERT INTO users (id, name, pin, role, is_session_active)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                pin = excluded.pin,
                role = excluded.role,
                is_session_active = excluded.is_session_active",
            params![
                user.id,
                user.name,
                user.pin,
                user.role.as_str(),
                user.is_session_active as i32,
            ],
        )?;
        Ok(())
    }

    fn get(db: &Database, id: &str) -> Result<Option<Self>> {
        Ok(db
            .conn()
            .query_row(
                &format!("{SELECT_USER} WHERE id = ?1"),
                params![id],
                row_to_user,
            )
            .optional()?)
    }

    fn get_all(db: &Database) -> Result<Vec<Self>> {
        let mut stmt = db.conn().prepare(SELECT_USER)?;
        let rows = stmt.query_map([], row_to_user)?;

        let mut users = Vec::new();
        for row in rows {
            users.push(row?);
        }
        Ok(users)
    }
}

impl Database {
    /// Insert the three stock accounts if there are none.
    ///
    /// Returns `true` when accounts were created.
    pub fn seed_default_users(&self) -> Result<bool> {
        if self.count::<User>()? > 0 {
            return Ok(false);
        }

        for user in default_users() {
            self.put(&user)?;
        }
        tracing::info!("seeded default operator accounts");
        Ok(true)
    }

    /// Find the account owning `pin`.
    ///
    /// Plain comparison, not constant time.
    pub fn find_user_by_pin(&self, pin: &str) -> Result<Option<User>> {
        Ok(self
            .conn()
            .query_row(
                &format!("{SELECT_USER} WHERE pin = ?1"),
                params![pin],
                row_to_user,
            )
            .optional()?)
    }

    /// Flip the session flag.  Returns `false` if no such user exists.
    pub fn set_user_session(&self, user_id: &str, active: bool) -> Result<bool> {
        let affected = self.conn().execute(
            "UPDATE users SET is_session_active = ?1 WHERE id = ?2",
            params![active as i32, user_id],
        )?;
        Ok(affected > 0)
    }
}

/// Accounts created on an empty database.
pub fn default_users() -> [User; 3] {
    let seed = |id: &str, name: &str, pin: &str, role| User {
        id: id.to_string(),
        name: name.to_string(),
        pin: pin.to_string(),
        role,
        is_session_active: false,
    };

    [
        seed("1", "Gate Officer", "1111", UserRole::Guard),
        seed("2", "School Admin.", "8888", UserRole::Admin),
        seed("3", "System Developer", "1234", UserRole::Developer),
    ]
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let active: i32 = row.get(4)?;
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        pin: row.get(2)?,
        role: parse_column(row, 3)?,
        is_session_active: active != 0,
    })
}
