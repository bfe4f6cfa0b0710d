//! Best-effort durability of the conversation history.
//!
//! The history lives in a single key-value slot as a JSON array of
//! `{text, type, timestamp}` records, oldest first. Durability is an
//! optimization: a missing, corrupt or unwritable slot degrades to "no
//! history" and never interrupts the conversation.

use crate::entry::Entry;
use crate::error::PersistenceError;
use crate::storage::KeyValueStore;
use qa_chat_core::Result;
use std::sync::Arc;
use tracing::{debug, warn};

/// Slot name shared by every widget on a page.
pub const DEFAULT_HISTORY_KEY: &str = "qa-chatbot-history";

/// What happened to a write request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    /// The slot now reflects the requested state.
    Saved,
    /// Persistence is disabled; the store was not touched.
    Skipped,
    /// The write failed and was logged.
    Failed,
}

/// Reads and writes the history slot of a [`KeyValueStore`].
#[derive(Clone)]
pub struct HistoryPersistence {
    store: Arc<dyn KeyValueStore>,
    key: String,
    max_history: usize,
    enabled: bool,
}

impl std::fmt::Debug for HistoryPersistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryPersistence")
            .field("key", &self.key)
            .field("max_history", &self.max_history)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl HistoryPersistence {
    /// Creates an enabled adapter over the default slot.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, max_history: usize) -> Self {
        Self {
            store,
            key: DEFAULT_HISTORY_KEY.to_string(),
            max_history: max_history.max(1),
            enabled: true,
        }
    }

    /// Uses a different slot name.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Turns persistence on or off. A disabled adapter never touches the store.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Loads the persisted history, truncated to the newest `max_history` entries.
    ///
    /// Absent, unreadable or malformed data all yield an empty history.
    #[must_use]
    pub fn restore(&self) -> Vec<Entry> {
        if !self.enabled {
            return Vec::new();
        }
        match self.try_restore() {
            Ok(entries) => {
                debug!(key = %self.key, restored = entries.len(), "restored chat history");
                entries
            }
            Err(report) => {
                warn!(key = %self.key, error = %report, "discarding unreadable chat history");
                Vec::new()
            }
        }
    }

    /// Writes `history` to the slot. Failures are logged, never propagated.
    pub fn persist<'a>(&self, history: impl IntoIterator<Item = &'a Entry>) -> PersistOutcome {
        if !self.enabled {
            return PersistOutcome::Skipped;
        }
        let history: Vec<&Entry> = history.into_iter().collect();
        match self.try_persist(&history) {
            Ok(()) => PersistOutcome::Saved,
            Err(report) => {
                warn!(key = %self.key, error = %report, "failed to save chat history");
                PersistOutcome::Failed
            }
        }
    }

    /// Removes the slot. Failures are logged, never propagated.
    pub fn clear(&self) -> PersistOutcome {
        if !self.enabled {
            return PersistOutcome::Skipped;
        }
        match self.store.remove(&self.key) {
            Ok(()) => PersistOutcome::Saved,
            Err(e) => {
                warn!(key = %self.key, error = %e, "failed to clear chat history");
                PersistOutcome::Failed
            }
        }
    }

    fn try_restore(&self) -> Result<Vec<Entry>, PersistenceError> {
        let Some(raw) = self.store.load(&self.key).map_err(PersistenceError::from)? else {
            return Ok(Vec::new());
        };
        let mut entries: Vec<Entry> =
            serde_json::from_str(&raw).map_err(|e| PersistenceError::Decode {
                reason: e.to_string(),
            })?;
        if entries.len() > self.max_history {
            let excess = entries.len() - self.max_history;
            entries.drain(..excess);
        }
        Ok(entries)
    }

    fn try_persist(&self, history: &[&Entry]) -> Result<(), PersistenceError> {
        let raw = serde_json::to_string(history).map_err(|e| PersistenceError::Encode {
            reason: e.to_string(),
        })?;
        self.store
            .save(&self.key, &raw)
            .map_err(PersistenceError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::testing::FlakyStore;
    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;

    fn history(n: usize) -> Vec<Entry> {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        (0..n)
            .map(|i| {
                let at = base + Duration::milliseconds(i as i64 * 1_500);
                if i % 2 == 0 {
                    Entry::user(format!("q{i}"), at)
                } else {
                    Entry::bot(format!("a{i}"), at)
                }
            })
            .collect()
    }

    fn memory() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new())
    }

    #[test]
    fn persist_then_restore_roundtrips() {
        let persistence = HistoryPersistence::new(memory(), 10);
        let h = history(4);

        assert_eq!(persistence.persist(&h), PersistOutcome::Saved);
        assert_eq!(persistence.restore(), h);
    }

    #[test]
    fn missing_slot_restores_empty() {
        let persistence = HistoryPersistence::new(memory(), 10);
        assert!(persistence.restore().is_empty());
    }

    #[test]
    fn corrupt_values_restore_empty() {
        let store = memory();
        let persistence = HistoryPersistence::new(store.clone(), 10);

        for raw in [
            r#"[{"text":"hi","type":"user","timest"#,
            r#"{"text":"hi"}"#,
            r#"[{"text":"hi","type":"error","timestamp":"2024-01-01T00:00:00Z"}]"#,
            r#"[{"text":1,"type":"user","timestamp":"2024-01-01T00:00:00Z"}]"#,
            r#"[{"text":"hi","type":"user","timestamp":"yesterday"}]"#,
            "null",
            "",
        ] {
            store.save(DEFAULT_HISTORY_KEY, raw).expect("seed");
            assert!(persistence.restore().is_empty(), "should reject {raw:?}");
        }
    }

    #[test]
    fn restore_truncates_to_newest_entries() {
        let store = memory();
        let h = history(6);
        HistoryPersistence::new(store.clone(), 10).persist(&h);

        let restored = HistoryPersistence::new(store, 4).restore();

        assert_eq!(restored, h[2..].to_vec());
    }

    #[test]
    fn restore_survives_read_failures() {
        let persistence = HistoryPersistence::new(Arc::new(FlakyStore::failing_reads()), 10);
        assert!(persistence.restore().is_empty());
    }

    #[test]
    fn persist_reports_write_failures() {
        let persistence = HistoryPersistence::new(Arc::new(FlakyStore::failing_writes()), 10);
        assert_eq!(persistence.persist(&history(2)), PersistOutcome::Failed);
        assert_eq!(persistence.clear(), PersistOutcome::Failed);
    }

    #[test]
    fn disabled_adapter_never_touches_store() {
        let store = memory();
        store
            .save(DEFAULT_HISTORY_KEY, &serde_json::to_string(&history(2)).unwrap())
            .unwrap();
        let persistence = HistoryPersistence::new(store.clone(), 10).enabled(false);

        assert!(persistence.restore().is_empty());
        assert_eq!(persistence.persist(&history(3)), PersistOutcome::Skipped);
        assert_eq!(persistence.clear(), PersistOutcome::Skipped);

        let raw = store.load(DEFAULT_HISTORY_KEY).unwrap().expect("untouched");
        let kept: Vec<Entry> = serde_json::from_str(&raw).unwrap();
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn clear_removes_slot() {
        let store = memory();
        let persistence = HistoryPersistence::new(store.clone(), 10).with_key("custom");
        persistence.persist(&history(2));

        assert_eq!(persistence.clear(), PersistOutcome::Saved);
        assert_eq!(store.load("custom").unwrap(), None);
    }

    proptest! {
        #[test]
        fn roundtrip_holds_for_any_bounded_history(
            texts in proptest::collection::vec(("[a-zA-Z0-9 ?¿áé<>]{0,24}", any::<bool>()), 0..12),
            offset_ms in 0i64..10_000_000,
        ) {
            let base = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap()
                + Duration::milliseconds(offset_ms);
            let h: Vec<Entry> = texts
                .into_iter()
                .enumerate()
                .map(|(i, (text, user))| {
                    let at = base + Duration::seconds(i as i64);
                    if user { Entry::user(text, at) } else { Entry::bot(text, at) }
                })
                .collect();
            let persistence = HistoryPersistence::new(memory(), 12);

            prop_assert_eq!(persistence.persist(&h), PersistOutcome::Saved);
            prop_assert_eq!(persistence.restore(), h);
        }
    }
}
