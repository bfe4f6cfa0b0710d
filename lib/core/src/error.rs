//! Error handling foundation for qa-chat.
//!
//! Only the `Result` alias lives here. Each crate owns its domain error enums
//! and surfaces them as `rootcause::Report<E>` from fallible operations.

use rootcause::Report;

/// A Result type alias using rootcause's Report for error handling.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;
