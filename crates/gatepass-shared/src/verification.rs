//! Mobile verification for visitors who are not parents.
//!
//! Each check-in attempt owns one [`Verification`]. Sending an OTP or showing
//! the QR fallback always issues a brand new [`OtpSession`]; the previous code
//! and session id are discarded. The QR code only carries the session id, the
//! code itself has to reach the visitor through a separate channel that
//! resolves the id.
//!
//! Every transition takes `now` explicitly. Expiry is checked lazily when a
//! code is submitted, nothing is scheduled.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::constants::{MOBILE_LEN, OTP_MAX, OTP_MIN, OTP_TTL_SECS};
use crate::error::VerificationError;
use crate::types::VisitorType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    Idle,
    Sending,
    Sent,
    Verified,
}

/// A one-time code bound to a fresh session id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpSession {
    pub code: String,
    pub session_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl OtpSession {
    /// Issue a session with a random code in `[1000, 9999]`.
    pub fn issue(now: DateTime<Utc>) -> Self {
        Self::issue_with(&mut rand::thread_rng(), now)
    }

    pub fn issue_with<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> Self {
        let code = rng.gen_range(OTP_MIN..=OTP_MAX);
        Self::new(code.to_string(), Uuid::new_v4(), now)
    }

    /// Build a session around a known code, expiring two minutes after `now`.
    pub fn new(code: impl Into<String>, session_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            code: code.into(),
            session_id,
            expires_at: now + Duration::seconds(OTP_TTL_SECS),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    fn matches(&self, submitted: &str) -> bool {
        let expected = self.code.as_bytes();
        let submitted = submitted.as_bytes();
        expected.len() == submitted.len() && expected.ct_eq(submitted).unwrap_u8() == 1
    }
}

/// Scannable fallback: a verification URL holding only the session id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrChallenge {
    pub session_id: Uuid,
    pub url: String,
}

impl QrChallenge {
    pub fn for_session(base_url: &str, session: &OtpSession) -> Self {
        let sep = if base_url.contains('?') { '&' } else { '?' };
        Self {
            session_id: session.session_id,
            url: format!("{base_url}{sep}session_token={}", session.session_id),
        }
    }
}

/// Verification state of a single check-in attempt.
#[derive(Debug, Clone)]
pub struct Verification {
    visitor_type: VisitorType,
    status: VerificationStatus,
    session: Option<OtpSession>,
    qr: Option<QrChallenge>,
}

impl Verification {
    /// Parents start (and stay) verified; everyone else starts idle.
    pub fn for_visitor_type(visitor_type: VisitorType) -> Self {
        let status = if visitor_type.requires_verification() {
            VerificationStatus::Idle
        } else {
            VerificationStatus::Verified
        };
        Self {
            visitor_type,
            status,
            session: None,
            qr: None,
        }
    }

    /// Switching visitor type starts a new attempt, even between two
    /// non-parent types.
    pub fn set_visitor_type(&mut self, visitor_type: VisitorType) {
        *self = Self::for_visitor_type(visitor_type);
    }

    pub fn visitor_type(&self) -> VisitorType {
        self.visitor_type
    }

    pub fn status(&self) -> VerificationStatus {
        self.status
    }

    pub fn is_verified(&self) -> bool {
        self.status == VerificationStatus::Verified
    }

    pub fn session(&self) -> Option<&OtpSession> {
        self.session.as_ref()
    }

    pub fn qr(&self) -> Option<&QrChallenge> {
        self.qr.as_ref()
    }

    /// Start sending a fresh OTP to `mobile`.
    pub fn begin_send(
        &mut self,
        mobile: &str,
        now: DateTime<Utc>,
    ) -> Result<&OtpSession, VerificationError> {
        self.begin_send_with(mobile, OtpSession::issue(now))
    }

    /// Same as [`Verification::begin_send`] with a caller-provided session.
    pub fn begin_send_with(
        &mut self,
        mobile: &str,
        session: OtpSession,
    ) -> Result<&OtpSession, VerificationError> {
        self.ensure_pending()?;
        if mobile.len() != MOBILE_LEN || !mobile.chars().all(|c| c.is_ascii_digit()) {
            return Err(VerificationError::MobileTooShort);
        }
        self.status = VerificationStatus::Sending;
        self.qr = None;
        Ok(self.session.insert(session))
    }

    /// The gateway accepted the message.
    pub fn mark_sent(&mut self) {
        if self.status == VerificationStatus::Sending {
            self.status = VerificationStatus::Sent;
        }
    }

    /// [`begin_send`](Self::begin_send) followed by [`mark_sent`](Self::mark_sent).
    pub fn send(
        &mut self,
        mobile: &str,
        now: DateTime<Utc>,
    ) -> Result<OtpSession, VerificationError> {
        let session = self.begin_send(mobile, now)?.clone();
        self.mark_sent();
        Ok(session)
    }

    /// Rotate the session and produce the QR fallback for it.
    pub fn generate_qr(
        &mut self,
        base_url: &str,
        now: DateTime<Utc>,
    ) -> Result<&QrChallenge, VerificationError> {
        self.generate_qr_with(base_url, OtpSession::issue(now))
    }

    pub fn generate_qr_with(
        &mut self,
        base_url: &str,
        session: OtpSession,
    ) -> Result<&QrChallenge, VerificationError> {
        self.ensure_pending()?;
        let challenge = QrChallenge::for_session(base_url, &session);
        self.session = Some(session);
        // a code can be entered as soon as a session exists
        self.status = VerificationStatus::Sent;
        Ok(self.qr.insert(challenge))
    }

    pub fn hide_qr(&mut self) {
        self.qr = None;
    }

    /// Check a submitted code.
    ///
    /// A mismatch leaves the session untouched so the operator can retry. An
    /// expired session is dropped and a new one must be requested.
    pub fn verify(&mut self, code: &str, now: DateTime<Utc>) -> Result<(), VerificationError> {
        if self.is_verified() {
            return Ok(());
        }

        let Some(session) = self.session.as_ref() else {
            return Err(VerificationError::NoActiveSession);
        };

        if session.is_expired(now) {
            self.session = None;
            self.qr = None;
            return Err(VerificationError::Expired);
        }

        if !session.matches(code) {
            return Err(VerificationError::InvalidCode);
        }

        self.status = VerificationStatus::Verified;
        self.session = None;
        self.qr = None;
        Ok(())
    }

    fn ensure_pending(&self) -> Result<(), VerificationError> {
        if !self.visitor_type.requires_verification() {
            return Err(VerificationError::NotRequired);
        }
        if self.is_verified() {
            return Err(VerificationError::AlreadyVerified);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_VERIFY_URL;

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_700_000_000_000).unwrap()
    }

    #[test]
    fn test_parent_bypasses_verification() {
        let mut v = Verification::for_visitor_type(VisitorType::Parent);
        assert!(v.is_verified());
        assert_eq!(
            v.begin_send("9876501234", t0()).unwrap_err(),
            VerificationError::NotRequired
        );
    }

    #[test]
    fn test_send_requires_ten_digits() {
        let mut v = Verification::for_visitor_type(VisitorType::Vendor);
        assert_eq!(
            v.send("98765", t0()).unwrap_err(),
            VerificationError::MobileTooShort
        );
        assert_eq!(v.status(), VerificationStatus::Idle);
        assert!(v.session().is_none());
    }

    #[test]
    fn test_send_walks_sending_then_sent() {
        let mut v = Verification::for_visitor_type(VisitorType::Guest);
        let session = v.begin_send("9876501234", t0()).unwrap().clone();
        assert_eq!(v.status(), VerificationStatus::Sending);
        v.mark_sent();
        assert_eq!(v.status(), VerificationStatus::Sent);

        let code: u16 = session.code.parse().unwrap();
        assert!((OTP_MIN..=OTP_MAX).contains(&code));
        assert_eq!(session.expires_at, t0() + Duration::minutes(2));
    }

    #[test]
    fn test_jane_doe_scenario() {
        let mut v = Verification::for_visitor_type(VisitorType::Guest);
        v.begin_send_with("9876501234", OtpSession::new("4821", Uuid::new_v4(), t0()))
            .unwrap();
        v.mark_sent();
        let before = v.session().cloned();

        let later = t0() + Duration::seconds(30);
        assert_eq!(v.verify("1234", later), Err(VerificationError::InvalidCode));
        assert_eq!(v.session().cloned(), before);
        assert_eq!(v.status(), VerificationStatus::Sent);

        assert_eq!(v.verify("1234", later), Err(VerificationError::InvalidCode));
        assert_eq!(v.verify(" 4821", later), Err(VerificationError::InvalidCode));
        assert_eq!(v.verify("4821 ", later), Err(VerificationError::InvalidCode));
        assert_eq!(v.verify("4821", later), Ok(()));
        assert!(v.is_verified());
        assert!(v.session().is_none());
    }

    #[test]
    fn test_expired_code_fails_even_when_matching() {
        let mut v = Verification::for_visitor_type(VisitorType::Official);
        v.begin_send_with("9876501234", OtpSession::new("4821", Uuid::new_v4(), t0()))
            .unwrap();
        v.mark_sent();

        let at_expiry = t0() + Duration::minutes(2);
        let after = at_expiry + Duration::milliseconds(1);
        assert_eq!(v.verify("4821", after), Err(VerificationError::Expired));
        assert!(v.session().is_none());
        assert_eq!(v.verify("4821", after), Err(VerificationError::NoActiveSession));
    }

    #[test]
    fn test_code_accepted_at_exact_expiry() {
        let mut v = Verification::for_visitor_type(VisitorType::Other);
        v.begin_send_with("9876501234", OtpSession::new("7777", Uuid::new_v4(), t0()))
            .unwrap();
        assert_eq!(v.verify("7777", t0() + Duration::minutes(2)), Ok(()));
    }

    #[test]
    fn test_verify_without_session() {
        let mut v = Verification::for_visitor_type(VisitorType::Guest);
        assert_eq!(v.verify("4821", t0()), Err(VerificationError::NoActiveSession));
    }

    #[test]
    fn test_resend_and_qr_rotate_session() {
        let mut v = Verification::for_visitor_type(VisitorType::Guest);
        let first = v.send("9876501234", t0()).unwrap();
        let second = v.send("9876501234", t0()).unwrap();
        assert_ne!(first.session_id, second.session_id);

        let qr = v.generate_qr(DEFAULT_VERIFY_URL, t0()).unwrap().clone();
        assert_ne!(qr.session_id, second.session_id);
        assert_eq!(v.session().unwrap().session_id, qr.session_id);

        let again = v.generate_qr(DEFAULT_VERIFY_URL, t0()).unwrap().clone();
        assert_ne!(again.session_id, qr.session_id);
    }

    #[test]
    fn test_old_code_dies_with_rotation() {
        let mut v = Verification::for_visitor_type(VisitorType::Guest);
        v.begin_send_with("9876501234", OtpSession::new("1111", Uuid::new_v4(), t0()))
            .unwrap();
        v.mark_sent();
        v.generate_qr_with(
            DEFAULT_VERIFY_URL,
            OtpSession::new("2222", Uuid::new_v4(), t0()),
        )
        .unwrap();
        assert_eq!(v.verify("1111", t0()), Err(VerificationError::InvalidCode));
        assert_eq!(v.verify("2222", t0()), Ok(()));
    }

    #[test]
    fn test_qr_url_carries_session_not_code() {
        let mut v = Verification::for_visitor_type(VisitorType::Vendor);
        let session = OtpSession::new("4821", Uuid::new_v4(), t0());
        let id = session.session_id;
        let qr = v.generate_qr_with(DEFAULT_VERIFY_URL, session).unwrap();

        assert_eq!(
            qr.url,
            format!("{DEFAULT_VERIFY_URL}?session_token={id}")
        );
        assert!(!qr.url.contains("4821"));
        assert_eq!(v.status(), VerificationStatus::Sent);
    }

    #[test]
    fn test_qr_url_appends_to_existing_query() {
        let session = OtpSession::new("4821", Uuid::nil(), t0());
        let qr = QrChallenge::for_session("https://gate.example/verify?lang=en", &session);
        assert_eq!(
            qr.url,
            format!("https://gate.example/verify?lang=en&session_token={}", Uuid::nil())
        );
    }

    #[test]
    fn test_type_switch_resets_to_idle() {
        let mut v = Verification::for_visitor_type(VisitorType::Guest);
        v.send("9876501234", t0()).unwrap();
        v.generate_qr(DEFAULT_VERIFY_URL, t0()).unwrap();

        v.set_visitor_type(VisitorType::Vendor);
        assert_eq!(v.status(), VerificationStatus::Idle);
        assert!(v.session().is_none());
        assert!(v.qr().is_none());

        v.send("9876501234", t0()).unwrap();
        v.set_visitor_type(VisitorType::Parent);
        assert!(v.session().is_none());
        assert!(v.is_verified());

        v.set_visitor_type(VisitorType::Official);
        assert_eq!(v.status(), VerificationStatus::Idle);
    }

    #[test]
    fn test_verified_attempt_is_terminal() {
        let mut v = Verification::for_visitor_type(VisitorType::Guest);
        v.begin_send_with("9876501234", OtpSession::new("4821", Uuid::new_v4(), t0()))
            .unwrap();
        v.verify("4821", t0()).unwrap();
        assert_eq!(
            v.send("9876501234", t0()).unwrap_err(),
            VerificationError::AlreadyVerified
        );
        assert_eq!(v.verify("0000", t0()), Ok(()));
    }
}
