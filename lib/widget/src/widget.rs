//! The widget control handle.
//!
//! [`ChatWidget`] is what a host page holds on to: it owns the conversation
//! controller, the panel's open/closed state and the current color scheme, and
//! exposes the programmatic API (`open`, `close`, `toggle`, `clear_history`,
//! `send_message`). Cloning the handle is cheap; clones share one widget.

use crate::config::WidgetConfig;
use crate::http::HttpAskClient;
use crate::theme::{ColorScheme, derive_palette, render_stylesheet};
use qa_chat_conversation::{
    AskEndpoint, AskError, ConversationController, Entry, HistoryPersistence, KeyValueStore,
    PresentationPort, RequestState, SubmitOutcome,
};
use qa_chat_core::{Result, WidgetId};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, instrument};

/// Whether the chat panel is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelState {
    #[default]
    Closed,
    Open,
}

impl PanelState {
    #[must_use]
    pub fn is_open(&self) -> bool {
        *self == Self::Open
    }
}

/// Handle to one embedded chat widget.
#[derive(Clone)]
pub struct ChatWidget {
    inner: Arc<Inner>,
}

struct Inner {
    id: WidgetId,
    config: WidgetConfig,
    controller: Mutex<ConversationController>,
    endpoint: Arc<dyn AskEndpoint>,
    view: Arc<dyn PresentationPort>,
    panel: Mutex<PanelState>,
    scheme: Mutex<ColorScheme>,
}

impl std::fmt::Debug for ChatWidget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatWidget")
            .field("id", &self.inner.id)
            .field("panel", &*lock(&self.inner.panel))
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ChatWidget {
    /// Assembles a widget from its collaborators. Call [`Self::start`] to
    /// render it.
    #[must_use]
    pub fn new(
        config: WidgetConfig,
        store: Arc<dyn KeyValueStore>,
        endpoint: Arc<dyn AskEndpoint>,
        view: Arc<dyn PresentationPort>,
    ) -> Self {
        let persistence =
            HistoryPersistence::new(store, config.max_history).with_key(config.history_key.clone());
        let controller = ConversationController::new(
            &config.session_config(),
            config.cycle_texts(),
            persistence,
            view.clone(),
        );
        Self {
            inner: Arc::new(Inner {
                id: WidgetId::new(),
                config,
                controller: Mutex::new(controller),
                endpoint,
                view,
                panel: Mutex::new(PanelState::Closed),
                scheme: Mutex::new(ColorScheme::default()),
            }),
        }
    }

    /// Builds a widget that talks to `config.api_url` over HTTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_http(
        config: WidgetConfig,
        store: Arc<dyn KeyValueStore>,
        view: Arc<dyn PresentationPort>,
    ) -> Result<Self, AskError> {
        let endpoint = HttpAskClient::new(config.api_url.clone(), config.request_timeout())?;
        Ok(Self::new(config, store, Arc::new(endpoint), view))
    }

    /// Applies the stylesheet, restores history (or greets), and schedules
    /// auto-open when configured.
    ///
    /// Auto-open needs a Tokio runtime; without one it is skipped.
    #[instrument(skip(self), fields(widget = %self.inner.id))]
    pub fn start(&self) {
        self.inner.view.apply_stylesheet(&self.stylesheet());
        self.inner.view.set_open(false);
        lock(&self.inner.controller).start();

        if self.inner.config.auto_open {
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    let widget = self.clone();
                    handle.spawn(async move {
                        widget.auto_open().await;
                    });
                }
                Err(_) => debug!("no async runtime, skipping auto-open"),
            }
        }
        info!("widget started");
    }

    /// Waits for the configured delay and opens the panel.
    ///
    /// Returns `false` without waiting when auto-open is disabled.
    pub async fn auto_open(&self) -> bool {
        let Some(delay) = self.inner.config.auto_open_delay() else {
            return false;
        };
        tokio::time::sleep(delay).await;
        self.open();
        true
    }

    #[must_use]
    pub fn id(&self) -> WidgetId {
        self.inner.id
    }

    #[must_use]
    pub fn config(&self) -> &WidgetConfig {
        &self.inner.config
    }

    pub fn open(&self) {
        self.set_panel(PanelState::Open);
    }

    pub fn close(&self) {
        self.set_panel(PanelState::Closed);
    }

    pub fn toggle(&self) {
        let next = match *lock(&self.inner.panel) {
            PanelState::Open => PanelState::Closed,
            PanelState::Closed => PanelState::Open,
        };
        self.set_panel(next);
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        lock(&self.inner.panel).is_open()
    }

    fn set_panel(&self, state: PanelState) {
        let previous = std::mem::replace(&mut *lock(&self.inner.panel), state);
        if previous != state {
            debug!(widget = %self.inner.id, ?state, "panel state changed");
        }
        // The lock is released; the view may query the handle.
        self.inner.view.set_open(state.is_open());
    }

    /// Forgets the conversation. A question still in flight is abandoned; its
    /// answer is dropped when it arrives.
    pub fn clear_history(&self) {
        lock(&self.inner.controller).clear_history();
    }

    /// Submits `text` as if the user had typed it.
    ///
    /// Returns `false` only for empty text. Whitespace-only text and
    /// submissions made while another question is in flight are accepted but
    /// change nothing.
    #[instrument(skip(self, text), fields(widget = %self.inner.id, len = text.len()))]
    pub async fn send_message(&self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }

        let begun = lock(&self.inner.controller).begin_submit(text);
        let pending = match begun {
            Ok(Some(pending)) => pending,
            Ok(None) => return true,
            Err(e) => {
                debug!(error = %e, "submission rejected");
                return true;
            }
        };

        let outcome = self.inner.endpoint.ask(&pending.question).await;
        let result = lock(&self.inner.controller).resolve(pending.cycle, outcome);
        if result == SubmitOutcome::Discarded {
            debug!(cycle = %pending.cycle, "answer arrived after history was cleared");
        }
        true
    }

    /// Snapshot of the history, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<Entry> {
        lock(&self.inner.controller).history()
    }

    #[must_use]
    pub fn request_state(&self) -> RequestState {
        lock(&self.inner.controller).state().clone()
    }

    /// Reacts to a change of the host's light/dark preference.
    ///
    /// Only the `auto` theme follows the preference; fixed themes ignore it.
    pub fn apply_color_scheme(&self, scheme: ColorScheme) {
        *lock(&self.inner.scheme) = scheme;
        if self.inner.config.theme == crate::config::Theme::Auto {
            debug!(widget = %self.inner.id, ?scheme, "re-rendering stylesheet");
            self.inner.view.apply_stylesheet(&self.stylesheet());
        }
    }

    /// The stylesheet for the current theme and color scheme.
    #[must_use]
    pub fn stylesheet(&self) -> String {
        let config = &self.inner.config;
        let scheme = *lock(&self.inner.scheme);
        let palette = derive_palette(&config.accent_color, config.theme, scheme);
        render_stylesheet(config, &palette)
    }
}
