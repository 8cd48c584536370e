/// Application name
pub const APP_NAME: &str = "Gatepass";

/// Prefix of every generated pass identifier
pub const PASS_PREFIX: &str = "BPS-";

/// Inclusive range of the numeric pass suffix
pub const PASS_NUMBER_MIN: u32 = 10_000;
pub const PASS_NUMBER_MAX: u32 = 99_999;

/// Number of digits in a mobile number
pub const MOBILE_LEN: usize = 10;

/// Sequences rejected as dummy mobile numbers
pub const DUMMY_SEQUENCES: [&str; 3] = ["1234567890", "0123456789", "9876543210"];

/// Inclusive range an OTP code is drawn from (always 4 digits)
pub const OTP_MIN: u16 = 1000;
pub const OTP_MAX: u16 = 9999;

/// OTP session lifetime in seconds (2 minutes)
pub const OTP_TTL_SECS: i64 = 120;

/// Landing page encoded into verification QR codes
pub const DEFAULT_VERIFY_URL: &str = "https://boscogate-pass.web.app/auth/verify";

/// Visit count at which a NEW / UNVERIFIED number becomes TRUSTED
pub const TRUSTED_VISIT_THRESHOLD: u32 = 3;

/// Host options offered to parents
pub const PARENT_HOST_OPTIONS: [&str; 6] = [
    "Front Desk",
    "Admin Office",
    "Accounts Dept",
    "Admissions",
    "Class Teacher",
    SPECIFIC_TEACHER,
];

/// Host options offered to every other visitor type
pub const OTHER_HOST_OPTIONS: [&str; 4] = ["Admin Office", "Accounts Dept", "Admissions", "Others"];

/// Host option that requires a named teacher
pub const SPECIFIC_TEACHER: &str = "Specific Teacher";

/// Class options for a parent's student
pub const CLASS_OPTIONS: [&str; 14] = [
    "Nursery", "KG", "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12",
];

/// Purpose recorded when the operator does not change it
pub const DEFAULT_PURPOSE: &str = "Meeting";
