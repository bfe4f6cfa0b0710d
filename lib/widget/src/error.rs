//! Error types for the widget crate.

use std::fmt;

/// Errors from building the widget configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A source could not be read or a value could not be converted.
    LoadFailed { reason: String },
    /// A value parsed but is out of range.
    InvalidValue { field: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoadFailed { reason } => write!(f, "failed to load widget configuration: {reason}"),
            Self::InvalidValue { field, reason } => {
                write!(f, "invalid value for '{field}': {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        Self::LoadFailed {
            reason: err.to_string(),
        }
    }
}
