//! Async data access for the kiosk screens.
//!
//! [`GateService`] owns the single [`Database`] handle behind a
//! `tokio::sync::Mutex`. It is built once at startup and cloned into every
//! caller; each call takes the lock, runs its statements and releases it.

use std::sync::Arc;

use chrono::{DateTime, Local, SubsecRound, Utc};
use gatepass_shared::photo::Photo;
use gatepass_shared::AuditAction;
use gatepass_store::{
    AuditLog, BlacklistEntry, Database, DeveloperConfig, PhoneRecord, SecurityConfig, User,
    Visitor,
};
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::checkin::CheckInForm;
use crate::config::KioskConfig;
use crate::error::Result;
use crate::report;
use crate::stats::{start_of_local_day, VisitorStats};

/// Current time at storage precision.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

#[derive(Clone)]
pub struct GateService {
    db: Arc<Mutex<Database>>,
}

impl GateService {
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    /// Open the configured database, or the platform default.
    pub fn open(config: &KioskConfig) -> Result<Self> {
        let db = match &config.db_path {
            Some(path) => Database::open_at(path)?,
            None => Database::new()?,
        };
        Ok(Self::new(db))
    }

    async fn with_db<T>(
        &self,
        op: &'static str,
        f: impl FnOnce(&Database) -> gatepass_store::Result<T>,
    ) -> Result<T> {
        let db = self.db.lock().await;
        f(&db).map_err(|e| {
            error!(op, error = %e, "Storage operation failed");
            e.into()
        })
    }

    // -----------------------------------------------------------------------
    // Operators
    // -----------------------------------------------------------------------

    /// Account owning `pin`, if any.
    pub async fn authenticate(&self, pin: &str) -> Result<Option<User>> {
        self.with_db("authenticate", |db| db.find_user_by_pin(pin))
            .await
    }

    pub async fn get_users(&self) -> Result<Vec<User>> {
        self.with_db("get_users", |db| db.get_all::<User>()).await
    }

    /// Unknown ids are ignored.
    pub async fn set_user_session(&self, user_id: &str, active: bool) -> Result<()> {
        let found = self
            .with_db("set_user_session", |db| db.set_user_session(user_id, active))
            .await?;
        if !found {
            debug!(user_id, "Session change for unknown user ignored");
        }
        Ok(())
    }

    /// Authenticate, open the operator's session and log the login.
    ///
    /// `photo` is the snapshot taken at the login screen, kept with the log
    /// entry.
    pub async fn login(&self, pin: &str, photo: Option<&Photo>) -> Result<Option<User>> {
        let Some(mut user) = self.authenticate(pin).await? else {
            info!("Login rejected");
            return Ok(None);
        };

        self.set_user_session(&user.id, true).await?;
        user.is_session_active = true;
        info!(user_id = %user.id, role = %user.role, "Operator logged in");

        let metadata = photo.map(|p| json!({ "photo": p.as_data_uri() }));
        self.audit(
            AuditAction::Login,
            &user.id,
            format!("{} logged in", user.name),
            metadata,
        )
        .await;
        Ok(Some(user))
    }

    pub async fn logout(&self, user_id: &str) -> Result<()> {
        self.set_user_session(user_id, false).await?;
        info!(user_id, "Operator logged out");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Visitors
    // -----------------------------------------------------------------------

    /// Store a new visitor and count the visit against its mobile number.
    ///
    /// These are two separate writes. If the second fails the visitor is
    /// kept and the phone history misses this visit.
    pub async fn add_visitor(&self, visitor: &Visitor) -> Result<PhoneRecord> {
        self.with_db("add_visitor", |db| db.put(visitor)).await?;
        let seen = now();
        self.with_db("update_phone_history", |db| {
            db.update_phone_history(&visitor.mobile, &visitor.name, seen)
        })
        .await
    }

    /// Overwrite the whole record.
    pub async fn update_visitor(&self, visitor: &Visitor) -> Result<()> {
        self.with_db("update_visitor", |db| db.put(visitor)).await
    }

    pub async fn get_visitor(&self, id: &Uuid) -> Result<Option<Visitor>> {
        self.with_db("get_visitor", |db| db.get::<Visitor>(id)).await
    }

    /// Visitors on the premises, latest check-in first.
    pub async fn get_active_visitors(&self) -> Result<Vec<Visitor>> {
        self.with_db("get_active_visitors", |db| db.list_active_visitors())
            .await
    }

    /// Every visitor ever recorded, in no particular order.
    pub async fn get_all_visitors(&self) -> Result<Vec<Visitor>> {
        self.with_db("get_all_visitors", |db| db.get_all::<Visitor>())
            .await
    }

    /// Active visitors whose name (any case) or pass id contains `query`.
    pub async fn search_active_visitors(&self, query: &str) -> Result<Vec<Visitor>> {
        let active = self.get_active_visitors().await?;
        let query = query.trim();
        if query.is_empty() {
            return Ok(active);
        }

        let needle = query.to_lowercase();
        Ok(active
            .into_iter()
            .filter(|v| v.name.to_lowercase().contains(&needle) || v.pass_id.contains(query))
            .collect())
    }

    /// Visitors checked in since local midnight, latest first.
    pub async fn todays_visitors(&self) -> Result<Vec<Visitor>> {
        let since = start_of_local_day(Local::now());
        self.with_db("todays_visitors", |db| db.list_visitors_since(since))
            .await
    }

    pub async fn get_phone_record(&self, number: &str) -> Result<Option<PhoneRecord>> {
        self.with_db("get_phone_record", |db| db.get::<PhoneRecord>(number))
            .await
    }

    pub async fn get_unsynced_count(&self) -> Result<usize> {
        self.with_db("get_unsynced_count", |db| db.count_unsynced_visitors())
            .await
    }

    // -----------------------------------------------------------------------
    // Check-in / check-out
    // -----------------------------------------------------------------------

    /// Validate the form, store the visitor and log the check-in.
    pub async fn check_in(
        &self,
        form: &CheckInForm,
        photo: Photo,
        user_id: &str,
    ) -> Result<Visitor> {
        form.validate()?;

        let visitor = form.to_visitor(photo, now());
        let phone = self.add_visitor(&visitor).await?;
        info!(
            pass_id = %visitor.pass_id,
            visitor_type = %visitor.visitor_type,
            trust = %phone.trust_level,
            "Visitor checked in"
        );

        self.audit(
            AuditAction::CheckIn,
            user_id,
            format!("Checked in {} ({})", visitor.name, visitor.pass_id),
            None,
        )
        .await;
        Ok(visitor)
    }

    /// Mark a visitor as gone.
    ///
    /// Returns `None` for an unknown id. A visitor already checked out is
    /// returned as stored.
    pub async fn check_out(&self, visitor_id: &Uuid, user_id: &str) -> Result<Option<Visitor>> {
        let Some(visitor) = self.get_visitor(visitor_id).await? else {
            return Ok(None);
        };
        if !visitor.is_active() {
            debug!(pass_id = %visitor.pass_id, "Visitor already checked out");
            return Ok(Some(visitor));
        }

        let visitor = visitor.checked_out(now());
        self.update_visitor(&visitor).await?;
        info!(pass_id = %visitor.pass_id, "Visitor checked out");

        self.audit(
            AuditAction::CheckOut,
            user_id,
            format!("Checked out {} ({})", visitor.name, visitor.pass_id),
            None,
        )
        .await;
        Ok(Some(visitor))
    }

    // -----------------------------------------------------------------------
    // Blacklist
    // -----------------------------------------------------------------------

    pub async fn check_blacklist(&self, name: &str) -> Result<bool> {
        self.with_db("check_blacklist", |db| db.is_blacklisted(name))
            .await
    }

    pub async fn add_to_blacklist(&self, entry: &BlacklistEntry) -> Result<()> {
        self.with_db("add_to_blacklist", |db| db.put(entry)).await
    }

    /// Returns `true` if an entry was removed.
    pub async fn remove_from_blacklist(&self, id: &Uuid) -> Result<bool> {
        self.with_db("remove_from_blacklist", |db| {
            db.delete::<BlacklistEntry>(id)
        })
        .await
    }

    pub async fn get_blacklist(&self) -> Result<Vec<BlacklistEntry>> {
        self.with_db("get_blacklist", |db| db.get_all::<BlacklistEntry>())
            .await
    }

    // -----------------------------------------------------------------------
    // Audit log
    // -----------------------------------------------------------------------

    pub async fn add_log(&self, log: &AuditLog) -> Result<()> {
        self.with_db("add_log", |db| db.put(log)).await
    }

    /// Newest first.
    pub async fn get_logs(&self) -> Result<Vec<AuditLog>> {
        self.with_db("get_logs", |db| db.list_logs()).await
    }

    /// Append a log entry stamped with a fresh id and the current time.
    pub async fn record(
        &self,
        action: AuditAction,
        user_id: &str,
        details: impl Into<String>,
        metadata: Option<serde_json::Value>,
    ) -> Result<AuditLog> {
        let log = AuditLog {
            id: Uuid::new_v4(),
            action,
            timestamp: now(),
            details: details.into(),
            user_id: user_id.to_string(),
            metadata,
        };
        self.add_log(&log).await?;
        Ok(log)
    }

    /// Log after the action already happened; a failed write is reported
    /// but does not undo the action.
    async fn audit(
        &self,
        action: AuditAction,
        user_id: &str,
        details: String,
        metadata: Option<serde_json::Value>,
    ) {
        if let Err(e) = self.record(action, user_id, details, metadata).await {
            warn!(%action, error = %e, "Audit entry not written");
        }
    }

    // -----------------------------------------------------------------------
    // Settings
    // -----------------------------------------------------------------------

    pub async fn get_lockdown(&self) -> Result<bool> {
        self.with_db("get_lockdown", |db| db.get_lockdown()).await
    }

    pub async fn set_lockdown(&self, active: bool) -> Result<()> {
        self.with_db("set_lockdown", |db| db.set_lockdown(active))
            .await
    }

    /// Flip the lockdown flag and log it. Returns the new value.
    pub async fn toggle_lockdown(&self, user_id: &str) -> Result<bool> {
        let active = !self.get_lockdown().await?;
        self.set_lockdown(active).await?;
        warn!(active, user_id, "Lockdown changed");

        self.audit(
            AuditAction::LockdownToggle,
            user_id,
            format!("Lockdown set to {active}"),
            None,
        )
        .await;
        Ok(active)
    }

    pub async fn get_security_config(&self) -> Result<SecurityConfig> {
        self.with_db("get_security_config", |db| db.get_security_config())
            .await
    }

    pub async fn set_security_config(&self, config: &SecurityConfig) -> Result<()> {
        self.with_db("set_security_config", |db| db.set_security_config(config))
            .await
    }

    /// Save from the admin screen and log the change.
    pub async fn update_security_config(&self, config: &SecurityConfig, user_id: &str) -> Result<()> {
        self.set_security_config(config).await?;
        self.audit(
            AuditAction::SettingsUpdate,
            user_id,
            "Security settings updated".to_string(),
            serde_json::to_value(config).ok(),
        )
        .await;
        Ok(())
    }

    pub async fn get_developer_config(&self) -> Result<DeveloperConfig> {
        self.with_db("get_developer_config", |db| db.get_developer_config())
            .await
    }

    pub async fn set_developer_config(&self, config: &DeveloperConfig) -> Result<()> {
        self.with_db("set_developer_config", |db| db.set_developer_config(config))
            .await
    }

    /// Save from the developer screen and log the change. The API key is
    /// left out of the log.
    pub async fn update_developer_config(
        &self,
        config: &DeveloperConfig,
        user_id: &str,
    ) -> Result<()> {
        self.set_developer_config(config).await?;
        let provider = serde_json::to_value(config.gateway.provider).ok();
        self.audit(
            AuditAction::DevConfigUpdate,
            user_id,
            "Gateway configuration updated".to_string(),
            provider.map(|provider| json!({ "provider": provider })),
        )
        .await;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Dashboard
    // -----------------------------------------------------------------------

    pub async fn stats(&self) -> Result<VisitorStats> {
        let since = start_of_local_day(Local::now());
        self.with_db("stats", |db| {
            Ok(VisitorStats {
                today: db.count_visitors_since(since)?,
                active: db.count_active_visitors()?,
                pending_sync: db.count_unsynced_visitors()?,
            })
        })
        .await
    }

    /// CSV of every visitor, or `None` when there is nothing to export.
    pub async fn export_all(&self, user_id: &str) -> Result<Option<String>> {
        let visitors = self.get_all_visitors().await?;
        self.export(visitors, "all visitors", user_id).await
    }

    /// CSV of today's visitors, or `None` when there were none.
    pub async fn export_today(&self, user_id: &str) -> Result<Option<String>> {
        let visitors = self.todays_visitors().await?;
        self.export(visitors, "today's visitors", user_id).await
    }

    async fn export(
        &self,
        mut visitors: Vec<Visitor>,
        scope: &str,
        user_id: &str,
    ) -> Result<Option<String>> {
        if visitors.is_empty() {
            return Ok(None);
        }

        visitors.sort_by(|a, b| b.check_in_time.cmp(&a.check_in_time));
        let csv = report::visitors_csv(&visitors)?;
        info!(rows = visitors.len(), scope, "Visitor report exported");

        self.audit(
            AuditAction::Export,
            user_id,
            format!("Exported {} records ({scope})", visitors.len()),
            None,
        )
        .await;
        Ok(Some(csv))
    }
}
