use thiserror::Error;

/// Input rejected at the form boundary. Never persisted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Mobile number must have exactly 10 digits")]
    MobileLength,

    #[error("Mobile number looks like a dummy number")]
    DummyMobile,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Mobile number has not been verified")]
    VerificationPending,
}

/// Failure of an OTP / QR verification step. Always retryable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Enter a 10-digit mobile number first")]
    MobileTooShort,

    #[error("no OTP session active")]
    NoActiveSession,

    #[error("OTP has expired")]
    Expired,

    #[error("invalid code")]
    InvalidCode,

    #[error("Verification is not required for this visitor type")]
    NotRequired,

    #[error("Mobile number is already verified")]
    AlreadyVerified,
}

/// A stored enum value that does not name any known variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown {kind} value: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}
