//! Mobile number input rules.
//!
//! Numbers are typed on a kiosk keypad, so anything that is not a digit is
//! dropped as it arrives and the value never grows past ten digits.

use crate::constants::{DUMMY_SEQUENCES, MOBILE_LEN};
use crate::error::ValidationError;

/// Strip non-digit characters and truncate to ten digits.
pub fn sanitize(input: &str) -> String {
    input
        .chars()
        .filter(char::is_ascii_digit)
        .take(MOBILE_LEN)
        .collect()
}

/// Whether a complete ten-digit number is an obvious placeholder.
///
/// Shorter input is never reported as dummy; it is simply incomplete.
pub fn is_dummy(mobile: &str) -> bool {
    if mobile.len() != MOBILE_LEN {
        return false;
    }

    let mut chars = mobile.chars();
    if let Some(first) = chars.next() {
        if chars.all(|c| c == first) {
            return true;
        }
    }

    DUMMY_SEQUENCES.contains(&mobile)
}

/// Accept only exactly ten ASCII digits that are not a dummy number.
pub fn validate(mobile: &str) -> Result<(), ValidationError> {
    if mobile.len() != MOBILE_LEN || !mobile.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::MobileLength);
    }
    if is_dummy(mobile) {
        return Err(ValidationError::DummyMobile);
    }
    Ok(())
}
