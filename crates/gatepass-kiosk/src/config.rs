//! Kiosk configuration loaded from environment variables.
//!
//! All settings have defaults so the kiosk starts with zero configuration.

use std::path::PathBuf;
use std::time::Duration;

use gatepass_shared::constants::DEFAULT_VERIFY_URL;

/// Kiosk configuration.
#[derive(Debug, Clone)]
pub struct KioskConfig {
    /// Database file.
    /// Env: `GATEPASS_DB_PATH`
    /// Default: `gatepass.db` in the platform data directory.
    pub db_path: Option<PathBuf>,

    /// Page the verification QR code points at.
    /// Env: `GATEPASS_VERIFY_URL`
    pub verify_url: String,

    /// How often dashboard statistics are re-read.
    /// Env: `GATEPASS_STATS_INTERVAL_SECS`
    /// Default: 10 seconds.
    pub stats_interval: Duration,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            verify_url: DEFAULT_VERIFY_URL.to_string(),
            stats_interval: Duration::from_secs(10),
        }
    }
}

impl KioskConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = var("GATEPASS_DB_PATH") {
            if !path.is_empty() {
                config.db_path = Some(PathBuf::from(path));
            }
        }

        if let Some(url) = var("GATEPASS_VERIFY_URL") {
            if url.starts_with("https://") || url.starts_with("http://") {
                config.verify_url = url;
            } else {
                tracing::warn!(value = %url, "Invalid GATEPASS_VERIFY_URL, using default");
            }
        }

        if let Some(val) = var("GATEPASS_STATS_INTERVAL_SECS") {
            match val.parse::<u64>() {
                Ok(secs) if secs > 0 => config.stats_interval = Duration::from_secs(secs),
                _ => {
                    tracing::warn!(
                        value = %val,
                        "Invalid GATEPASS_STATS_INTERVAL_SECS, using default"
                    );
                }
            }
        }

        config
    }
}
