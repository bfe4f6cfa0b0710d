//! Request state, the events that move it, and the effects it asks for.

use crate::entry::Entry;
use chrono::{DateTime, Utc};
use qa_chat_core::CycleId;
use std::fmt;
use std::time::Duration;

/// Where the controller is in a question/answer cycle.
///
/// `Succeeded` and `Failed` are resolution states: the controller settles them
/// back to `Idle` as soon as the resolution's effects have been applied, and
/// they accept new submissions exactly like `Idle`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestState {
    /// Waiting for the user.
    #[default]
    Idle,
    /// A question is in flight.
    Sending { cycle: CycleId, question: String },
    /// The last cycle produced an answer.
    Succeeded { cycle: CycleId, answer: String },
    /// The last cycle failed.
    Failed { cycle: CycleId, reason: String },
}

impl RequestState {
    /// Returns true while a question is in flight.
    #[must_use]
    pub fn is_sending(&self) -> bool {
        matches!(self, Self::Sending { .. })
    }

    /// The cycle this state belongs to, if any.
    #[must_use]
    pub fn cycle(&self) -> Option<CycleId> {
        match self {
            Self::Idle => None,
            Self::Sending { cycle, .. }
            | Self::Succeeded { cycle, .. }
            | Self::Failed { cycle, .. } => Some(*cycle),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Sending { .. } => "sending",
            Self::Succeeded { .. } => "succeeded",
            Self::Failed { .. } => "failed",
        }
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Inputs to the state machine. Every event carries its own timestamp so the
/// transition function stays deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The user (or the host page) submitted text.
    Submit {
        cycle: CycleId,
        text: String,
        at: DateTime<Utc>,
    },
    /// The endpoint answered.
    AskSucceeded {
        cycle: CycleId,
        answer: String,
        at: DateTime<Utc>,
    },
    /// The endpoint failed; `reason` is the failure detail.
    AskFailed {
        cycle: CycleId,
        reason: String,
        at: DateTime<Utc>,
    },
    /// Return from a resolution state to `Idle`.
    Settle,
    /// Wipe history and start over.
    Clear { at: DateTime<Utc> },
}

impl Event {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Submit { .. } => "submit",
            Self::AskSucceeded { .. } => "ask_succeeded",
            Self::AskFailed { .. } => "ask_failed",
            Self::Settle => "settle",
            Self::Clear { .. } => "clear",
        }
    }
}

/// Side effects a transition asks the controller to perform, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append to the message store.
    AppendEntry(Entry),
    /// Write the whole store to durable storage.
    PersistHistory,
    /// Empty the message store.
    ClearStore,
    /// Remove the durable history slot.
    ClearPersisted,
    /// Render a stored entry.
    RenderEntry(Entry),
    /// Show the loading indicator.
    ShowLoading { text: String, at: DateTime<Utc> },
    /// Remove the loading indicator.
    HideLoading,
    /// Show a transient error bubble.
    ShowError { text: String, at: DateTime<Utc> },
    /// Enable or disable the input surface.
    SetInputEnabled(bool),
    /// Clear the message surface.
    ResetView,
    /// Show the transient welcome entry after a delay.
    ShowWelcome { entry: Entry, delay: Duration },
    /// Send the question to the endpoint.
    Ask { cycle: CycleId, question: String },
}
