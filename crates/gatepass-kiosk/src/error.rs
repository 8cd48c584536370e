use gatepass_shared::{ValidationError, VerificationError};
use gatepass_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KioskError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Verification failed: {0}")]
    Verification(#[from] VerificationError),

    #[error("Report error: {0}")]
    Report(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, KioskError>;
