//! The conversation controller.
//!
//! Owns the history and the request state, feeds events through [`transition`],
//! and applies the resulting effects to the store, the persistence adapter and
//! the presentation port. The network call is the only suspension point; it is
//! split out as [`ConversationController::begin_submit`] and
//! [`ConversationController::resolve`] so hosts can release their lock while
//! the question is in flight.

use crate::ask::AskEndpoint;
use crate::config::{CycleTexts, SessionConfig};
use crate::entry::Entry;
use crate::error::{AskError, TransitionError};
use crate::persistence::HistoryPersistence;
use crate::presentation::PresentationPort;
use crate::state::{Effect, Event, RequestState};
use crate::store::MessageStore;
use crate::transition::transition;
use chrono::Utc;
use qa_chat_core::CycleId;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// A question that has been accepted and must now be sent to the endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAsk {
    pub cycle: CycleId,
    pub question: String,
}

/// How a submission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank text; nothing happened.
    Ignored,
    /// Another question was in flight; nothing happened.
    Busy,
    /// The endpoint answered and the answer was recorded.
    Answered,
    /// The endpoint failed and an error bubble was shown.
    Failed,
    /// The cycle was abandoned (history cleared) before the endpoint replied.
    Discarded,
}

/// Drives one conversation.
pub struct ConversationController {
    state: RequestState,
    store: MessageStore,
    persistence: HistoryPersistence,
    view: Arc<dyn PresentationPort>,
    texts: CycleTexts,
}

impl std::fmt::Debug for ConversationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationController")
            .field("state", &self.state)
            .field("history_len", &self.store.len())
            .field("persistence", &self.persistence)
            .finish_non_exhaustive()
    }
}

impl ConversationController {
    /// Creates a controller with an empty history. Call [`Self::start`] to
    /// restore persisted history and greet the user.
    #[must_use]
    pub fn new(
        config: &SessionConfig,
        texts: CycleTexts,
        persistence: HistoryPersistence,
        view: Arc<dyn PresentationPort>,
    ) -> Self {
        // Either side can turn persistence off.
        let enabled = persistence.is_enabled() && config.persistence_enabled;
        Self {
            state: RequestState::Idle,
            store: MessageStore::new(config.max_history),
            persistence: persistence.enabled(enabled),
            view,
            texts,
        }
    }

    /// Restores persisted history and renders it, or schedules the welcome
    /// entry when there is nothing to restore.
    #[instrument(skip(self))]
    pub fn start(&mut self) {
        let restored = self.persistence.restore();
        if restored.is_empty() {
            let welcome = Entry::bot(self.texts.welcome_message.clone(), Utc::now());
            self.view.show_welcome(&welcome, self.texts.welcome_delay);
            return;
        }

        self.store = MessageStore::from_entries(self.store.capacity(), restored);
        for entry in self.store.iter() {
            self.view.render_entry(entry);
        }
        info!(entries = self.store.len(), "restored conversation");
    }

    /// Validates and records a submission.
    ///
    /// Returns the question to send when a new cycle started, or `None` for
    /// blank text.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::Busy`] while another question is in flight.
    pub fn begin_submit(&mut self, text: &str) -> Result<Option<PendingAsk>, TransitionError> {
        let event = Event::Submit {
            cycle: CycleId::new(),
            text: text.to_string(),
            at: Utc::now(),
        };
        let pending = self.dispatch(event)?;
        if let Some(pending) = &pending {
            debug!(cycle = %pending.cycle, "question accepted");
        }
        Ok(pending)
    }

    /// Applies the endpoint's outcome for `cycle` and settles back to idle.
    pub fn resolve(&mut self, cycle: CycleId, outcome: Result<String, AskError>) -> SubmitOutcome {
        let at = Utc::now();
        let (event, answered) = match outcome {
            Ok(answer) => (Event::AskSucceeded { cycle, answer, at }, true),
            Err(e) => {
                warn!(cycle = %cycle, error = %e, "question failed");
                (
                    Event::AskFailed {
                        cycle,
                        reason: e.to_string(),
                        at,
                    },
                    false,
                )
            }
        };

        match self.dispatch(event) {
            Ok(_) => {}
            Err(TransitionError::StaleResolution { cycle }) => {
                debug!(cycle = %cycle, "dropping resolution for abandoned question");
                return SubmitOutcome::Discarded;
            }
            Err(e) => {
                warn!(cycle = %cycle, error = %e, "unexpected resolution");
                return SubmitOutcome::Discarded;
            }
        }

        if let Err(e) = self.dispatch(Event::Settle) {
            warn!(cycle = %cycle, error = %e, "failed to settle after resolution");
        }

        if answered {
            SubmitOutcome::Answered
        } else {
            SubmitOutcome::Failed
        }
    }

    /// Runs one full question/answer cycle against `endpoint`.
    ///
    /// Holding `&mut self` across the await means callers that share the
    /// controller should use `begin_submit`/`resolve` instead.
    pub async fn submit(&mut self, endpoint: &dyn AskEndpoint, text: &str) -> SubmitOutcome {
        let pending = match self.begin_submit(text) {
            Ok(Some(pending)) => pending,
            Ok(None) => return SubmitOutcome::Ignored,
            Err(e) => {
                debug!(error = %e, "submission rejected");
                return SubmitOutcome::Busy;
            }
        };
        let outcome = endpoint.ask(&pending.question).await;
        self.resolve(pending.cycle, outcome)
    }

    /// Forgets the conversation, wipes persisted history and greets again.
    #[instrument(skip(self))]
    pub fn clear_history(&mut self) {
        if let Err(e) = self.dispatch(Event::Clear { at: Utc::now() }) {
            // Clear is accepted from every state.
            warn!(error = %e, "clear rejected");
        }
        info!("conversation cleared");
    }

    /// Snapshot of the history, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<Entry> {
        self.store.all()
    }

    #[must_use]
    pub fn state(&self) -> &RequestState {
        &self.state
    }

    #[must_use]
    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    fn dispatch(&mut self, event: Event) -> Result<Option<PendingAsk>, TransitionError> {
        let event_name = event.name();
        let result = transition(&self.state, &self.texts, event)?;
        if self.state != result.new_state {
            debug!(from = %self.state, to = %result.new_state, event = event_name, "request state changed");
        }
        self.state = result.new_state;

        let mut pending = None;
        for effect in result.effects {
            if let Some(ask) = self.apply(effect) {
                pending = Some(ask);
            }
        }
        Ok(pending)
    }

    fn apply(&mut self, effect: Effect) -> Option<PendingAsk> {
        match effect {
            Effect::AppendEntry(entry) => self.store.append(entry),
            Effect::PersistHistory => {
                self.persistence.persist(self.store.iter());
            }
            Effect::ClearStore => self.store.clear(),
            Effect::ClearPersisted => {
                self.persistence.clear();
            }
            Effect::RenderEntry(entry) => self.view.render_entry(&entry),
            Effect::ShowLoading { text, at } => self.view.show_loading(&text, at),
            Effect::HideLoading => self.view.hide_loading(),
            Effect::ShowError { text, at } => self.view.show_error(&text, at),
            Effect::SetInputEnabled(enabled) => self.view.set_input_enabled(enabled),
            Effect::ResetView => self.view.reset(),
            Effect::ShowWelcome { entry, delay } => self.view.show_welcome(&entry, delay),
            Effect::Ask { cycle, question } => return Some(PendingAsk { cycle, question }),
        }
        None
    }
}
