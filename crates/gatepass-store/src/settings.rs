//! Singleton settings stored as JSON under fixed ids.
//!
//! Reading a setting that was never written yields its default. Writing
//! replaces the whole value; merging is up to the caller.

use rusqlite::{params, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::database::Database;
use crate::error::Result;
use crate::models::{DeveloperConfig, SecurityConfig};

pub const LOCKDOWN_KEY: &str = "lockdown";
pub const SECURITY_CONFIG_KEY: &str = "securityConfig";
pub const DEVELOPER_CONFIG_KEY: &str = "devConfig";

impl Database {
    pub fn get_setting<T: DeserializeOwned>(&self, id: &str) -> Result<Option<T>> {
        let json: Option<String> = self
            .conn()
            .query_row(
                "SELECT value FROM settings WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        Ok(json.map(|j| serde_json::from_str(&j)).transpose()?)
    }

    pub fn put_setting<T: Serialize>(&self, id: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.conn().execute(
            "INSERT OR REPLACE INTO settings (id, value) VALUES (?1, ?2)",
            params![id, json],
        )?;
        Ok(())
    }

    pub fn get_lockdown(&self) -> Result<bool> {
        Ok(self.get_setting(LOCKDOWN_KEY)?.unwrap_or(false))
    }

    pub fn set_lockdown(&self, active: bool) -> Result<()> {
        self.put_setting(LOCKDOWN_KEY, &active)
    }

    pub fn get_security_config(&self) -> Result<SecurityConfig> {
        Ok(self.get_setting(SECURITY_CONFIG_KEY)?.unwrap_or_default())
    }

    pub fn set_security_config(&self, config: &SecurityConfig) -> Result<()> {
        self.put_setting(SECURITY_CONFIG_KEY, config)
    }

    pub fn get_developer_config(&self) -> Result<DeveloperConfig> {
        Ok(self.get_setting(DEVELOPER_CONFIG_KEY)?.unwrap_or_default())
    }

    pub fn set_developer_config(&self, config: &DeveloperConfig) -> Result<()> {
        self.put_setting(DEVELOPER_CONFIG_KEY, config)
    }
}
