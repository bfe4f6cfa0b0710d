//! Shared building blocks for the qa-chat widget.
//!
//! Holds the identifier types that tie log lines to a widget instance and to a
//! single question/answer cycle, plus the rootcause-backed `Result` alias that
//! the other crates build their error types on.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{CycleId, ParseIdError, WidgetId};
