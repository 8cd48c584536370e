//! The check-in form and its mobile verification.
//!
//! A [`CheckInForm`] is one check-in attempt. It owns the attempt's
//! [`Verification`], so changing the visitor type (or the number being
//! verified) always starts verification over.

use chrono::{DateTime, Utc};
use gatepass_shared::constants::{DEFAULT_PURPOSE, SPECIFIC_TEACHER};
use gatepass_shared::pass::generate_pass_id;
use gatepass_shared::photo::Photo;
use gatepass_shared::verification::{OtpSession, QrChallenge, Verification};
use gatepass_shared::{mobile, ValidationError, VerificationError, VisitStatus, VisitorType};
use gatepass_store::Visitor;
use uuid::Uuid;

/// Host recorded for visitors of type `Other`, who are not asked for one.
const OTHER_VISITOR_HOST: &str = "Others";

#[derive(Debug, Clone)]
pub struct CheckInForm {
    pub name: String,
    mobile: String,
    visitor_type: VisitorType,
    pub student_name: String,
    pub student_class: String,
    pub student_section: String,
    pub host_name: String,
    pub specific_teacher_name: String,
    pub purpose: String,
    verification: Verification,
}

impl Default for CheckInForm {
    fn default() -> Self {
        Self::new(VisitorType::Parent)
    }
}

impl CheckInForm {
    pub fn new(visitor_type: VisitorType) -> Self {
        Self {
            name: String::new(),
            mobile: String::new(),
            visitor_type,
            student_name: String::new(),
            student_class: String::new(),
            student_section: String::new(),
            host_name: String::new(),
            specific_teacher_name: String::new(),
            purpose: DEFAULT_PURPOSE.to_string(),
            verification: Verification::for_visitor_type(visitor_type),
        }
    }

    pub fn mobile(&self) -> &str {
        &self.mobile
    }

    /// Keypad input: digits only, at most ten.
    ///
    /// A different number invalidates any verification in progress.
    pub fn set_mobile(&mut self, input: &str) {
        let sanitized = mobile::sanitize(input);
        if sanitized != self.mobile {
            self.mobile = sanitized;
            self.verification.set_visitor_type(self.visitor_type);
        }
    }

    pub fn visitor_type(&self) -> VisitorType {
        self.visitor_type
    }

    /// Switch visitor type; clears the host choice and restarts verification.
    /// Re-selecting the current type changes nothing.
    pub fn set_visitor_type(&mut self, visitor_type: VisitorType) {
        if visitor_type == self.visitor_type {
            return;
        }
        self.visitor_type = visitor_type;
        self.host_name.clear();
        self.specific_teacher_name.clear();
        self.verification.set_visitor_type(visitor_type);
    }

    pub fn verification(&self) -> &Verification {
        &self.verification
    }

    /// Issue a new OTP for the entered number.  The returned session is what
    /// the SMS gateway (or the offline fallback) delivers.
    pub fn send_otp(&mut self, now: DateTime<Utc>) -> Result<OtpSession, VerificationError> {
        self.verification.send(&self.mobile, now)
    }

    /// Issue a new session and the QR fallback pointing at `verify_url`.
    pub fn show_qr(
        &mut self,
        verify_url: &str,
        now: DateTime<Utc>,
    ) -> Result<QrChallenge, VerificationError> {
        self.verification.generate_qr(verify_url, now).cloned()
    }

    pub fn verify_otp(&mut self, code: &str, now: DateTime<Utc>) -> Result<(), VerificationError> {
        self.verification.verify(code, now)
    }

    /// Whether a dummy number is currently entered (for live input feedback).
    pub fn has_dummy_mobile(&self) -> bool {
        mobile::is_dummy(&self.mobile)
    }

    /// Host as stored on the visitor record.
    pub fn resolved_host(&self) -> String {
        let teacher = self.specific_teacher_name.trim();
        if self.host_name == SPECIFIC_TEACHER && !teacher.is_empty() {
            return format!("Teacher: {teacher}");
        }
        if self.visitor_type == VisitorType::Other && self.host_name.trim().is_empty() {
            return OTHER_VISITOR_HOST.to_string();
        }
        self.host_name.clone()
    }

    /// First reason the form cannot proceed to photo capture, if any.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        mobile::validate(&self.mobile)?;
        if !self.verification.is_verified() {
            return Err(ValidationError::VerificationPending);
        }

        match self.visitor_type {
            VisitorType::Parent => {
                require(&self.student_name, "student name")?;
                require(&self.student_class, "student class")?;
                require(&self.student_section, "student section")?;
                require(&self.host_name, "host")?;
                if self.host_name == SPECIFIC_TEACHER {
                    require(&self.specific_teacher_name, "teacher name")?;
                }
            }
            VisitorType::Other => {}
            _ => require(&self.host_name, "host")?,
        }

        Ok(())
    }

    /// Build the ACTIVE visitor record for a validated form.
    pub fn to_visitor(&self, photo: Photo, now: DateTime<Utc>) -> Visitor {
        let parent_field = |value: &str| {
            (self.visitor_type == VisitorType::Parent).then(|| value.trim().to_string())
        };

        Visitor {
            id: Uuid::new_v4(),
            pass_id: generate_pass_id(),
            name: self.name.trim().to_string(),
            mobile: self.mobile.clone(),
            visitor_type: self.visitor_type,
            purpose: self.purpose.clone(),
            host_name: self.resolved_host(),
            student_name: parent_field(&self.student_name),
            student_class: parent_field(&self.student_class),
            student_section: parent_field(&self.student_section),
            check_in_time: now,
            check_out_time: None,
            photo_base64: photo.into_data_uri(),
            synced: false,
            status: VisitStatus::Active,
        }
    }
}

fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}
