use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseEnumError;

/// Declares a closed string enum whose wire form is also its storage form.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(ParseEnumError {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

string_enum! {
    /// Role of a kiosk operator account.
    UserRole, "role" {
        Guard => "GUARD",
        Admin => "ADMIN",
        Developer => "DEVELOPER",
    }
}

string_enum! {
    /// Category a visitor signs in under.
    VisitorType, "visitor type" {
        Parent => "Parent",
        Vendor => "Vendor",
        Guest => "Guest",
        Official => "Official",
        Other => "Other",
    }
}

impl VisitorType {
    /// Parents are trusted through the school relationship and skip OTP.
    pub fn requires_verification(&self) -> bool {
        !matches!(self, VisitorType::Parent)
    }
}

string_enum! {
    /// Classification of a mobile number by its visit history.
    TrustLevel, "trust level" {
        New => "NEW",
        Unverified => "UNVERIFIED",
        Trusted => "TRUSTED",
        Flagged => "FLAGGED",
    }
}

string_enum! {
    /// Whether a visitor is still on the premises.
    VisitStatus, "visit status" {
        Active => "ACTIVE",
        CheckedOut => "CHECKED_OUT",
    }
}

string_enum! {
    /// Kinds of entries in the append-only audit log.
    AuditAction, "audit action" {
        Login => "LOGIN",
        CheckIn => "CHECK_IN",
        CheckOut => "CHECK_OUT",
        LockdownToggle => "LOCKDOWN_TOGGLE",
        Sync => "SYNC",
        Export => "EXPORT",
        SettingsUpdate => "SETTINGS_UPDATE",
        DevConfigUpdate => "DEV_CONFIG_UPDATE",
    }
}
