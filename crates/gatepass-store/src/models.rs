//! Domain model structs persisted in the local SQLite database.
//!
//! Every struct derives `Serialize` and `Deserialize` with camelCase field
//! names and millisecond timestamps, so records can be handed to the UI layer
//! unchanged.

use chrono::{DateTime, Utc};
use gatepass_shared::constants::TRUSTED_VISIT_THRESHOLD;
use gatepass_shared::{AuditAction, TrustLevel, UserRole, VisitStatus, VisitorType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A kiosk operator account.  Accounts are seeded, never created at runtime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    /// Four digit passcode, unique across users.
    pub pin: String,
    pub role: UserRole,
    pub is_session_active: bool,
}

// ---------------------------------------------------------------------------
// Visitor
// ---------------------------------------------------------------------------

/// One visit, from check-in to check-out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Visitor {
    pub id: Uuid,
    /// Printed on the pass, e.g. `BPS-48213`.
    pub pass_id: String,
    pub name: String,
    pub mobile: String,
    pub visitor_type: VisitorType,
    pub purpose: String,
    pub host_name: String,
    /// Student fields are only filled in for parents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_section: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub check_in_time: DateTime<Utc>,
    /// Absent until check-out.
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub check_out_time: Option<DateTime<Utc>>,
    /// Captured photo as a `data:` URI.
    pub photo_base64: String,
    /// Reserved for remote sync; nothing sets it yet.
    pub synced: bool,
    pub status: VisitStatus,
}

impl Visitor {
    pub fn is_active(&self) -> bool {
        self.status == VisitStatus::Active
    }

    /// The checked-out form of this record.
    ///
    /// The exit time never precedes the entry time, even if the device clock
    /// moved backwards in between.
    pub fn checked_out(&self, now: DateTime<Utc>) -> Visitor {
        Visitor {
            status: VisitStatus::CheckedOut,
            check_out_time: Some(now.max(self.check_in_time)),
            ..self.clone()
        }
    }
}

// ---------------------------------------------------------------------------
// Phone history
// ---------------------------------------------------------------------------

/// Visit history of one mobile number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PhoneRecord {
    pub number: String,
    pub trust_level: TrustLevel,
    pub visit_count: u32,
    pub last_visitor_name: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub first_seen: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_seen: DateTime<Utc>,
}

impl PhoneRecord {
    /// Record for a number seen for the first time.
    pub fn first_visit(number: &str, visitor_name: &str, now: DateTime<Utc>) -> Self {
        Self {
            number: number.to_string(),
            trust_level: TrustLevel::New,
            visit_count: 1,
            last_visitor_name: visitor_name.to_string(),
            first_seen: now,
            last_seen: now,
        }
    }

    /// Record after one more visit.
    ///
    /// NEW and UNVERIFIED numbers are promoted to TRUSTED from the third
    /// visit on. TRUSTED and FLAGGED never change here.
    pub fn with_visit(&self, visitor_name: &str, now: DateTime<Utc>) -> Self {
        let visit_count = self.visit_count.saturating_add(1);
        let trust_level = match self.trust_level {
            TrustLevel::New | TrustLevel::Unverified if visit_count >= TRUSTED_VISIT_THRESHOLD => {
                TrustLevel::Trusted
            }
            level => level,
        };

        Self {
            number: self.number.clone(),
            trust_level,
            visit_count,
            last_visitor_name: visitor_name.to_string(),
            first_seen: self.first_seen,
            last_seen: now,
        }
    }
}

// ---------------------------------------------------------------------------
// Audit log
// ---------------------------------------------------------------------------

/// An append-only record of an operator action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: Uuid,
    pub action: AuditAction,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub details: String,
    pub user_id: String,
    /// Free-form extra data, e.g. a captured photo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Blacklist
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlacklistEntry {
    pub id: Uuid,
    pub name: String,
    pub reason: String,
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Mobile number rules an administrator can toggle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SecurityConfig {
    /// e.g. 9999999999
    pub block_same_digits: bool,
    /// e.g. 1234567890
    pub block_sequential: bool,
    /// e.g. 9898989898
    pub block_repeated_blocks: bool,
    /// 4 or 6
    pub otp_length: u8,
    pub max_retries: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            block_same_digits: true,
            block_sequential: true,
            block_repeated_blocks: true,
            otp_length: 4,
            max_retries: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewayProvider {
    Twilio,
    Aws,
    Gupshup,
    Mock,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    pub provider: GatewayProvider,
    pub api_key: String,
    pub sender_id: String,
    pub failover_enabled: bool,
}

/// Pattern strings kept for the gateway side. They use look-ahead and
/// back-references, so they are stored verbatim rather than compiled here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRules {
    pub regex_same_digits: String,
    pub regex_sequential: String,
    pub regex_repeated: String,
    /// Comma separated, e.g. `"6,7,8,9"`.
    pub allowed_prefixes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FeatureFlags {
    pub enable_voice_otp: bool,
    pub auto_resend: bool,
    pub debug_mode: bool,
}

/// OTP gateway and rule configuration edited from the developer screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeveloperConfig {
    pub gateway: GatewayConfig,
    pub rules: ValidationRules,
    pub features: FeatureFlags,
}

impl Default for DeveloperConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig {
                provider: GatewayProvider::Mock,
                api_key: "sk_test_12345".into(),
                sender_id: "BPS_EDU".into(),
                failover_enabled: false,
            },
            rules: ValidationRules {
                regex_same_digits: r"(\d)\1{4,}".into(),
                regex_sequential:
                    r"(?:0(?=1)|1(?=2)|2(?=3)|3(?=4)|4(?=5)|5(?=6)|6(?=7)|7(?=8)|8(?=9)|9(?=0)){4,}\d"
                        .into(),
                regex_repeated: r"(\d{2})\1{2,}".into(),
                allowed_prefixes: "6,7,8,9".into(),
            },
            features: FeatureFlags {
                enable_voice_otp: false,
                auto_resend: true,
                debug_mode: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    #[test]
    fn test_third_visit_promotes_new_number() {
        let first = PhoneRecord::first_visit("9876501234", "Jane Doe", at(1_000));
        assert_eq!(first.trust_level, TrustLevel::New);
        assert_eq!(first.visit_count, 1);
        assert_eq!(first.first_seen, first.last_seen);

        let second = first.with_visit("Jane Doe", at(2_000));
        assert_eq!(second.trust_level, TrustLevel::New);

        let third = second.with_visit("John Doe", at(3_000));
        assert_eq!(third.visit_count, 3);
        assert_eq!(third.trust_level, TrustLevel::Trusted);
        assert_eq!(third.last_visitor_name, "John Doe");
        assert_eq!(third.first_seen, at(1_000));
        assert_eq!(third.last_seen, at(3_000));
    }

    #[test]
    fn test_unverified_promotes_but_flagged_sticks() {
        let mut unverified = PhoneRecord::first_visit("9876501234", "A", at(0));
        unverified.trust_level = TrustLevel::Unverified;
        unverified.visit_count = 2;
        assert_eq!(unverified.with_visit("A", at(1)).trust_level, TrustLevel::Trusted);

        let mut flagged = unverified.clone();
        flagged.trust_level = TrustLevel::Flagged;
        let next = flagged.with_visit("A", at(1)).with_visit("A", at(2));
        assert_eq!(next.trust_level, TrustLevel::Flagged);
        assert_eq!(next.visit_count, 4);
    }

    #[test]
    fn test_check_out_never_precedes_check_in() {
        let visitor = Visitor {
            id: Uuid::new_v4(),
            pass_id: "BPS-12345".into(),
            name: "Jane Doe".into(),
            mobile: "9876501234".into(),
            visitor_type: VisitorType::Guest,
            purpose: "Meeting".into(),
            host_name: "Admin Office".into(),
            student_name: None,
            student_class: None,
            student_section: None,
            check_in_time: at(5_000),
            check_out_time: None,
            photo_base64: String::new(),
            synced: false,
            status: VisitStatus::Active,
        };

        let out = visitor.checked_out(at(4_000));
        assert_eq!(out.status, VisitStatus::CheckedOut);
        assert_eq!(out.check_out_time, Some(at(5_000)));

        let out = visitor.checked_out(at(9_000));
        assert_eq!(out.check_out_time, Some(at(9_000)));
    }

    #[test]
    fn test_active_visitor_json_omits_unset_fields() {
        let json = r#"{
            "id": "6f1c2b4e-8a57-4c1e-9d0a-3b7e5f2a9c10",
            "passId": "BPS-48213",
            "name": "Jane Doe",
            "mobile": "9876501234",
            "visitorType": "Guest",
            "purpose": "Meeting",
            "hostName": "Admin Office",
            "checkInTime": 1700000000000,
            "photoBase64": "data:image/jpeg;base64,/9j/",
            "synced": false,
            "status": "ACTIVE"
        }"#;

        let visitor: Visitor = serde_json::from_str(json).unwrap();
        assert!(visitor.is_active());
        assert_eq!(visitor.check_in_time, at(1_700_000_000_000));
        assert!(visitor.check_out_time.is_none());
        assert!(visitor.student_name.is_none());

        let value = serde_json::to_value(&visitor).unwrap();
        assert!(value.get("checkOutTime").is_none());
        assert!(value.get("studentName").is_none());
        assert_eq!(serde_json::from_value::<Visitor>(value).unwrap(), visitor);

        let out = visitor.checked_out(at(1_700_000_060_000));
        let value = serde_json::to_value(&out).unwrap();
        assert_eq!(value["checkOutTime"], 1_700_000_060_000_i64);
        assert_eq!(value["status"], "CHECKED_OUT");
        assert_eq!(serde_json::from_value::<Visitor>(value).unwrap(), out);
    }

    #[test]
    fn test_settings_json_uses_camel_case() {
        let json = serde_json::to_value(SecurityConfig::default()).unwrap();
        assert_eq!(json["blockSameDigits"], true);
        assert_eq!(json["otpLength"], 4);

        let json = serde_json::to_value(DeveloperConfig::default()).unwrap();
        assert_eq!(json["gateway"]["provider"], "MOCK");
        assert_eq!(json["gateway"]["senderId"], "BPS_EDU");
        assert_eq!(json["rules"]["allowedPrefixes"], "6,7,8,9");
        assert_eq!(json["rules"]["regexSameDigits"], r"(\d)\1{4,}");
        assert_eq!(json["rules"]["regexRepeated"], r"(\d{2})\1{2,}");
        assert_eq!(
            json["rules"]["regexSequential"],
            r"(?:0(?=1)|1(?=2)|2(?=3)|3(?=4)|4(?=5)|5(?=6)|6(?=7)|7(?=8)|8(?=9)|9(?=0)){4,}\d"
        );
        assert_eq!(json["features"]["autoResend"], true);
    }
}
