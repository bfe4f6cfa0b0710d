//! Conversation lifecycle for the qa-chat widget.
//!
//! This crate provides:
//!
//! - **Message Store**: bounded, insertion-ordered conversation history
//! - **Persistence Adapter**: best-effort durability of that history in a key-value slot
//! - **Request state machine**: a pure transition function over submit/resolve/clear events
//! - **Conversation Controller**: executes transition effects against the store,
//!   the persistence adapter and the presentation port
//!
//! The remote question-answering endpoint and the presentation layer are traits;
//! hosts plug in their own implementations.

pub mod ask;
pub mod config;
pub mod controller;
pub mod entry;
pub mod error;
pub mod persistence;
pub mod presentation;
pub mod state;
pub mod storage;
pub mod store;
pub mod transition;

#[cfg(test)]
pub(crate) mod testing;

pub use ask::AskEndpoint;
pub use config::{CycleTexts, SessionConfig};
pub use controller::{ConversationController, PendingAsk, SubmitOutcome};
pub use entry::{Entry, EntryKind};
pub use error::{AskError, PersistenceError, StorageError, TransitionError};
pub use persistence::{DEFAULT_HISTORY_KEY, HistoryPersistence, PersistOutcome};
pub use presentation::PresentationPort;
pub use state::{Effect, Event, RequestState};
pub use storage::{KeyValueStore, MemoryStore};
pub use store::MessageStore;
pub use transition::{TransitionResult, transition};
