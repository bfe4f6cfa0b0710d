//! Test doubles for the controller's collaborators.

use crate::ask::AskEndpoint;
use crate::entry::Entry;
use crate::error::{AskError, StorageError};
use crate::presentation::PresentationPort;
use crate::storage::{KeyValueStore, MemoryStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// A store whose reads or writes always fail.
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_reads: bool,
    fail_writes: bool,
}

impl FlakyStore {
    pub fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }
}

impl KeyValueStore for FlakyStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads {
            return Err(StorageError::ReadFailed {
                key: key.to_string(),
                reason: "storage disabled".to_string(),
            });
        }
        self.inner.load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::WriteFailed {
                key: key.to_string(),
                reason: "quota exceeded".to_string(),
            });
        }
        self.inner.save(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::WriteFailed {
                key: key.to_string(),
                reason: "quota exceeded".to_string(),
            });
        }
        self.inner.remove(key)
    }
}

/// One call made to the presentation port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Entry(Entry),
    Loading(String),
    LoadingHidden,
    Error(String),
    InputEnabled(bool),
    Reset,
    Welcome(String, Duration),
}

/// Presentation port that records every call in order.
#[derive(Debug, Default)]
pub struct RecordingView {
    calls: Mutex<Vec<Rendered>>,
}

impl RecordingView {
    pub fn calls(&self) -> Vec<Rendered> {
        self.calls.lock().unwrap().clone()
    }

    fn push(&self, call: Rendered) {
        self.calls.lock().unwrap().push(call);
    }
}

impl PresentationPort for RecordingView {
    fn render_entry(&self, entry: &Entry) {
        self.push(Rendered::Entry(entry.clone()));
    }

    fn show_loading(&self, text: &str, _at: DateTime<Utc>) {
        self.push(Rendered::Loading(text.to_string()));
    }

    fn hide_loading(&self) {
        self.push(Rendered::LoadingHidden);
    }

    fn show_error(&self, text: &str, _at: DateTime<Utc>) {
        self.push(Rendered::Error(text.to_string()));
    }

    fn set_input_enabled(&self, enabled: bool) {
        self.push(Rendered::InputEnabled(enabled));
    }

    fn reset(&self) {
        self.push(Rendered::Reset);
    }

    fn show_welcome(&self, entry: &Entry, delay: Duration) {
        self.push(Rendered::Welcome(entry.text.clone(), delay));
    }
}

/// Endpoint that replays scripted outcomes and counts calls.
#[derive(Debug, Default)]
pub struct ScriptedAsk {
    outcomes: Mutex<VecDeque<Result<String, AskError>>>,
    calls: AtomicUsize,
}

impl ScriptedAsk {
    pub fn new(outcomes: impl IntoIterator<Item = Result<String, AskError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AskEndpoint for ScriptedAsk {
    async fn ask(&self, _question: &str) -> Result<String, AskError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(AskError::Transport {
                    reason: "no scripted outcome".to_string(),
                })
            })
    }
}
