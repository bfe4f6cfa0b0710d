//! Terminal rendering of the conversation.

use chrono::{DateTime, Local, Utc};
use qa_chat_conversation::{Entry, EntryKind, PresentationPort};
use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

type Output = Arc<Mutex<Box<dyn Write + Send>>>;

/// Prints entries and transient states, to stdout unless told otherwise.
#[derive(Clone)]
pub struct TerminalView {
    header: String,
    show_timestamp: bool,
    out: Output,
}

impl fmt::Debug for TerminalView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerminalView")
            .field("header", &self.header)
            .field("show_timestamp", &self.show_timestamp)
            .finish_non_exhaustive()
    }
}

impl TerminalView {
    pub fn new(header: impl Into<String>, show_timestamp: bool) -> Self {
        Self::with_writer(header, show_timestamp, io::stdout())
    }

    pub fn with_writer(
        header: impl Into<String>,
        show_timestamp: bool,
        out: impl Write + Send + 'static,
    ) -> Self {
        Self {
            header: header.into(),
            show_timestamp,
            out: Arc::new(Mutex::new(Box::new(out))),
        }
    }

    fn line(&self, label: &str, text: &str, at: DateTime<Utc>) -> String {
        format_line(label, text, self.show_timestamp.then_some(at))
    }

    fn print(&self, line: &str) {
        print_to(&self.out, line);
    }
}

fn print_to(out: &Output, line: &str) {
    let mut out = out.lock().unwrap_or_else(PoisonError::into_inner);
    if let Err(e) = writeln!(out, "{line}").and_then(|()| out.flush()) {
        tracing::warn!(error = %e, "failed to write to terminal");
    }
}

fn format_line(label: &str, text: &str, at: Option<DateTime<Utc>>) -> String {
    match at {
        Some(at) => format!(
            "[{}] {label}> {text}",
            at.with_timezone(&Local).format("%H:%M")
        ),
        None => format!("{label}> {text}"),
    }
}

fn label(kind: EntryKind) -> &'static str {
    match kind {
        EntryKind::User => "you",
        EntryKind::Bot => "bot",
    }
}

impl PresentationPort for TerminalView {
    fn render_entry(&self, entry: &Entry) {
        self.print(&self.line(label(entry.kind), &entry.text, entry.timestamp));
    }

    fn show_loading(&self, text: &str, _at: DateTime<Utc>) {
        self.print(&format!("  {text}"));
    }

    fn hide_loading(&self) {}

    fn show_error(&self, text: &str, at: DateTime<Utc>) {
        self.print(&self.line("error", text, at));
    }

    fn set_input_enabled(&self, _enabled: bool) {}

    fn reset(&self) {
        self.print(&format!("--- {} ---", self.header));
    }

    fn show_welcome(&self, entry: &Entry, delay: Duration) {
        let line = self.line(label(entry.kind), &entry.text, entry.timestamp);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let out = Arc::clone(&self.out);
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    print_to(&out, &line);
                });
            }
            Err(_) => self.print(&line),
        }
    }

    fn set_open(&self, open: bool) {
        let state = if open { "opened" } else { "closed" };
        self.print(&format!("({} {state})", self.header));
    }
}
