//! Pure state transition function.
//!
//! Given the same state, texts and event, `transition` always returns the same
//! result and performs no I/O. The controller applies the returned effects.

use crate::config::CycleTexts;
use crate::entry::Entry;
use crate::error::TransitionError;
use crate::state::{Effect, Event, RequestState};

/// Result of a state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    pub new_state: RequestState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    #[must_use]
    pub fn new(state: RequestState) -> Self {
        Self {
            new_state: state,
            effects: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    #[must_use]
    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Computes the next state and the effects needed to get there.
///
/// # Errors
///
/// - [`TransitionError::Busy`] when non-empty text is submitted while a question is in flight.
/// - [`TransitionError::StaleResolution`] when a resolution does not belong to the in-flight cycle.
/// - [`TransitionError::InvalidTransition`] when settling while a question is in flight.
pub fn transition(
    state: &RequestState,
    texts: &CycleTexts,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // Whitespace-only submissions never change anything.
        (_, Event::Submit { text, .. }) if text.trim().is_empty() => {
            Ok(TransitionResult::new(state.clone()))
        }

        (RequestState::Sending { cycle, .. }, Event::Submit { .. }) => {
            Err(TransitionError::Busy { cycle: *cycle })
        }

        (_, Event::Submit { cycle, text, at }) => {
            let question = text.trim().to_string();
            let entry = Entry::user(question.clone(), at);
            Ok(TransitionResult::new(RequestState::Sending {
                cycle,
                question: question.clone(),
            })
            .with_effects([
                Effect::AppendEntry(entry.clone()),
                Effect::PersistHistory,
                Effect::RenderEntry(entry),
                Effect::SetInputEnabled(false),
                Effect::ShowLoading {
                    text: texts.loading_text.clone(),
                    at,
                },
                Effect::Ask { cycle, question },
            ]))
        }

        (
            RequestState::Sending { cycle: current, .. },
            Event::AskSucceeded { cycle, answer, at },
        ) if *current == cycle => {
            let entry = Entry::bot(answer.clone(), at);
            Ok(
                TransitionResult::new(RequestState::Succeeded { cycle, answer }).with_effects([
                    Effect::HideLoading,
                    Effect::SetInputEnabled(true),
                    Effect::AppendEntry(entry.clone()),
                    Effect::PersistHistory,
                    Effect::RenderEntry(entry),
                ]),
            )
        }

        (
            RequestState::Sending { cycle: current, .. },
            Event::AskFailed { cycle, reason, at },
        ) if *current == cycle => {
            let text = texts.error_message(&reason);
            Ok(
                TransitionResult::new(RequestState::Failed { cycle, reason }).with_effects([
                    Effect::HideLoading,
                    Effect::SetInputEnabled(true),
                    Effect::ShowError { text, at },
                ]),
            )
        }

        (_, Event::AskSucceeded { cycle, .. } | Event::AskFailed { cycle, .. }) => {
            Err(TransitionError::StaleResolution { cycle })
        }

        (RequestState::Sending { .. }, Event::Settle) => Err(TransitionError::InvalidTransition {
            from: state.to_string(),
            event: Event::Settle.name().to_string(),
        }),

        (_, Event::Settle) => Ok(TransitionResult::new(RequestState::Idle)),

        (_, Event::Clear { at }) => {
            let mut result = TransitionResult::new(RequestState::Idle).with_effects([
                Effect::ClearStore,
                Effect::ClearPersisted,
                Effect::ResetView,
            ]);
            if state.is_sending() {
                result = result.with_effect(Effect::SetInputEnabled(true));
            }
            Ok(result.with_effect(Effect::ShowWelcome {
                entry: Entry::bot(texts.welcome_message.clone(), at),
                delay: texts.welcome_delay,
            }))
        }
    }
}
