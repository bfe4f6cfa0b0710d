//! The presentation port.
//!
//! The controller drives the view exclusively through this trait. The view never
//! mutates conversation state; it is a projection of the calls made to it.

use crate::entry::Entry;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Renders conversation entries and transient request state.
pub trait PresentationPort: Send + Sync {
    /// Appends a persisted entry to the message surface.
    fn render_entry(&self, entry: &Entry);

    /// Shows the "waiting for an answer" indicator.
    fn show_loading(&self, text: &str, at: DateTime<Utc>);

    /// Removes the loading indicator, if shown.
    fn hide_loading(&self);

    /// Shows a transient error bubble. Error bubbles are never persisted.
    fn show_error(&self, text: &str, at: DateTime<Utc>);

    /// Enables or disables the input surface around an in-flight question.
    fn set_input_enabled(&self, enabled: bool);

    /// Removes everything from the message surface.
    fn reset(&self);

    /// Shows the welcome entry after `delay`. The entry is transient.
    fn show_welcome(&self, entry: &Entry, delay: Duration);

    /// Reflects the open/closed state of the chat panel.
    fn set_open(&self, _open: bool) {}

    /// Replaces the widget stylesheet after a theme change.
    fn apply_stylesheet(&self, _css: &str) {}
}
