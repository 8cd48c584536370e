//! Database connection management.
//!
//! The [`Database`] struct owns a [`rusqlite::Connection`] and guarantees that
//! migrations have run and the operator accounts exist before any other
//! operation.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use rusqlite::Connection;

use crate::error::{Result, StoreError};
use crate::migrations;

/// File name of the kiosk database inside the data directory.
pub const DB_FILE_NAME: &str = "gatepass.db";

/// Wrapper around a [`rusqlite::Connection`].
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the default kiosk database.
    ///
    /// The database file is placed in the platform-appropriate data directory:
    /// - Linux:   `~/.local/share/gatepass/gatepass.db`
    /// - macOS:   `~/Library/Application Support/edu.gatepass.gatepass/gatepass.db`
    /// - Windows: `{FOLDERID_RoamingAppData}\gatepass\gatepass\data\gatepass.db`
    pub fn new() -> Result<Self> {
        Self::open_at(&default_path()?)
    }

    /// Open (or create) a database at an explicit path.
    ///
    /// Runs pending migrations, then seeds the operator accounts if the users
    /// table is empty.
    pub fn open_at(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        tracing::info!(path = %path.display(), "opening database");

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        migrations::run_migrations(&conn)?;

        let db = Self { conn };
        db.seed_default_users()?;
        Ok(db)
    }

    /// Return a reference to the underlying `rusqlite::Connection`.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Return the filesystem path of the open database (if any).
    pub fn path(&self) -> Option<PathBuf> {
        self.conn.path().map(PathBuf::from)
    }
}

/// Platform data directory location of the kiosk database.
pub fn default_path() -> Result<PathBuf> {
    let project_dirs =
        ProjectDirs::from("edu", "gatepass", "gatepass").ok_or(StoreError::NoDataDir)?;
    Ok(project_dirs.data_dir().join(DB_FILE_NAME))
}
