//! ULID-backed identifiers.
//!
//! Identifiers never reach the persisted history; they exist so that log lines
//! from one widget, and from one question/answer cycle, can be correlated.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Error returned when an identifier string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// Which identifier type was being parsed.
    pub id_type: &'static str,
    /// Why parsing failed.
    pub reason: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {}: {}", self.id_type, self.reason)
    }
}

impl std::error::Error for ParseIdError {}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Ulid);

        impl $name {
            /// Allocates a fresh identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Ulid::new())
            }

            /// The underlying ULID.
            #[must_use]
            pub const fn as_ulid(&self) -> Ulid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}_{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s.strip_prefix(concat!($prefix, "_")).unwrap_or(s);
                Ulid::from_str(raw).map(Self).map_err(|e| ParseIdError {
                    id_type: stringify!($name),
                    reason: e.to_string(),
                })
            }
        }
    };
}

define_id!(
    /// Identifies one embedded widget instance.
    WidgetId,
    "wgt"
);

define_id!(
    /// Identifies one question/answer cycle, from submission to resolution.
    CycleId,
    "cyc"
);
