//! Error types for the conversation crate.
//!
//! - `StorageError`: failures of the underlying key-value store
//! - `PersistenceError`: encoding/decoding the history slot, wrapped in rootcause reports
//! - `AskError`: failures of the remote question-answering endpoint
//! - `TransitionError`: events the state machine refuses in its current state
//!
//! None of these are fatal to a conversation. Storage and persistence errors are
//! logged and swallowed; ask errors become a transient error bubble; transition
//! errors are reported back to the caller as a rejected submission.

use qa_chat_core::CycleId;
use std::fmt;

/// Errors from the durable key-value store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The store cannot be used at all (disabled, poisoned, missing directory).
    Unavailable { reason: String },
    /// Reading a slot failed.
    ReadFailed { key: String, reason: String },
    /// Writing or removing a slot failed.
    WriteFailed { key: String, reason: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { reason } => write!(f, "storage unavailable: {reason}"),
            Self::ReadFailed { key, reason } => {
                write!(f, "failed to read '{key}': {reason}")
            }
            Self::WriteFailed { key, reason } => {
                write!(f, "failed to write '{key}': {reason}")
            }
        }
    }
}

impl std::error::Error for StorageError {}

/// Errors from persisting or restoring the conversation history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// The key-value store rejected the operation.
    Storage { reason: String },
    /// The history could not be serialized.
    Encode { reason: String },
    /// The stored value is not a valid history.
    Decode { reason: String },
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage { reason } => write!(f, "history storage failed: {reason}"),
            Self::Encode { reason } => write!(f, "failed to encode history: {reason}"),
            Self::Decode { reason } => write!(f, "stored history is invalid: {reason}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<StorageError> for PersistenceError {
    fn from(err: StorageError) -> Self {
        Self::Storage {
            reason: err.to_string(),
        }
    }
}

/// Errors from the remote question-answering endpoint.
///
/// The `Display` output is what ends up in parentheses after the configured
/// error text, so it stays short and free of prefixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskError {
    /// The endpoint answered with a non-2xx status.
    Status { status: u16, body: String },
    /// The endpoint answered 2xx but the body was not `{"answer": string}`.
    MalformedResponse { reason: String },
    /// The request never produced a response.
    Transport { reason: String },
}

impl fmt::Display for AskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { status, body } => write!(f, "{status}: {body}"),
            Self::MalformedResponse { reason } => write!(f, "invalid response: {reason}"),
            Self::Transport { reason } => write!(f, "{reason}"),
        }
    }
}

impl std::error::Error for AskError {}

/// Events the request state machine refuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// A question is already in flight.
    Busy { cycle: CycleId },
    /// A resolution arrived for a cycle that is no longer current.
    StaleResolution { cycle: CycleId },
    /// The event makes no sense in the current state.
    InvalidTransition { from: String, event: String },
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy { cycle } => {
                write!(f, "question {cycle} is still awaiting an answer")
            }
            Self::StaleResolution { cycle } => {
                write!(f, "resolution for {cycle} arrived after the cycle ended")
            }
            Self::InvalidTransition { from, event } => {
                write!(f, "invalid transition from {from} on {event}")
            }
        }
    }
}

impl std::error::Error for TransitionError {}
