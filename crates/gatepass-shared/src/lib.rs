//! # gatepass-shared
//!
//! Domain vocabulary shared by the store and the kiosk service: record enums,
//! mobile number rules, pass identifiers, captured photo encoding and the
//! OTP / QR verification state machine.

pub mod constants;
pub mod error;
pub mod mobile;
pub mod pass;
pub mod photo;
pub mod types;
pub mod verification;

pub use error::{ParseEnumError, ValidationError, VerificationError};
pub use types::*;
