//! Conversation entries.
//!
//! An entry is exactly what gets persisted: `{text, type, timestamp}`. Loading
//! indicators and error bubbles are not entries; they only exist as render calls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// A question typed (or sent programmatically) by the end user.
    User,
    /// An answer returned by the remote endpoint, or the welcome message.
    Bot,
}

impl EntryKind {
    /// The wire name used in the persisted history.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable item of the conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Message content, verbatim.
    pub text: String,
    /// Sender.
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
}

impl Entry {
    /// Creates an entry stamped with the given instant.
    #[must_use]
    pub fn new(kind: EntryKind, text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            kind,
            timestamp,
        }
    }

    /// Creates a user entry.
    #[must_use]
    pub fn user(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::new(EntryKind::User, text, timestamp)
    }

    /// Creates a bot entry.
    #[must_use]
    pub fn bot(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::new(EntryKind::Bot, text, timestamp)
    }

    #[must_use]
    pub fn is_user(&self) -> bool {
        self.kind == EntryKind::User
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn serializes_with_type_field() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let entry = Entry::user("What is X?", at);

        let json = serde_json::to_value(&entry).expect("serialize");

        assert_eq!(json["type"], "user");
        assert_eq!(json["text"], "What is X?");
        assert_eq!(json["timestamp"], "2024-05-01T12:30:00Z");
    }

    #[test]
    fn parses_browser_iso_timestamps() {
        let raw = r#"{"text":"hola","type":"bot","timestamp":"2024-05-01T12:30:00.123Z"}"#;
        let entry: Entry = serde_json::from_str(raw).expect("deserialize");

        assert_eq!(entry.kind, EntryKind::Bot);
        assert_eq!(entry.timestamp.timestamp_subsec_millis(), 123);
    }

    #[test]
    fn rejects_transient_kinds() {
        let raw = r#"{"text":"Pensando...","type":"loading","timestamp":"2024-05-01T12:30:00Z"}"#;
        assert!(serde_json::from_str::<Entry>(raw).is_err());
    }
}
