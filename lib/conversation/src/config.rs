//! Read-only session configuration consumed by the controller.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default bound on the conversation history.
pub const DEFAULT_MAX_HISTORY: usize = 50;

/// Default delay before the welcome entry appears.
pub const DEFAULT_WELCOME_DELAY: Duration = Duration::from_millis(500);

/// Settings that shape the conversation lifecycle.
///
/// Built once when the widget is initialized and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Where questions are posted.
    pub endpoint: String,
    /// Maximum number of entries kept in history.
    pub max_history: usize,
    /// Whether history is written to durable storage.
    pub persistence_enabled: bool,
}

impl SessionConfig {
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            max_history: DEFAULT_MAX_HISTORY,
            persistence_enabled: true,
        }
    }

    #[must_use]
    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    #[must_use]
    pub fn with_persistence(mut self, enabled: bool) -> Self {
        self.persistence_enabled = enabled;
        self
    }
}

/// User-facing strings the state machine emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleTexts {
    /// Greeting shown when there is no history.
    pub welcome_message: String,
    /// Label of the loading indicator.
    pub loading_text: String,
    /// Prefix of every error bubble.
    pub error_text: String,
    /// How long the view waits before showing the welcome entry.
    #[serde(with = "millis")]
    pub welcome_delay: Duration,
}

impl Default for CycleTexts {
    fn default() -> Self {
        Self {
            welcome_message: "¡Hola! Soy un asistente de IA. ¿En qué puedo ayudarte?".to_string(),
            loading_text: "Pensando...".to_string(),
            error_text: "No pude obtener una respuesta. Inténtalo de nuevo.".to_string(),
            welcome_delay: DEFAULT_WELCOME_DELAY,
        }
    }
}

impl CycleTexts {
    /// Builds the error bubble text for a failure detail.
    #[must_use]
    pub fn error_message(&self, detail: &str) -> String {
        if detail.is_empty() {
            self.error_text.clone()
        } else {
            format!("{} ({detail})", self.error_text)
        }
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_config_defaults() {
        let config = SessionConfig::new("http://localhost:8000/qa");
        assert_eq!(config.max_history, 50);
        assert!(config.persistence_enabled);
    }

    #[test]
    fn error_message_appends_detail() {
        let texts = CycleTexts {
            error_text: "Something went wrong.".to_string(),
            ..CycleTexts::default()
        };
        assert_eq!(
            texts.error_message("500: server error"),
            "Something went wrong. (500: server error)"
        );
        assert_eq!(texts.error_message(""), "Something went wrong.");
    }

    #[test]
    fn cycle_texts_serde_uses_millis() {
        let json = serde_json::to_value(CycleTexts::default()).expect("serialize");
        assert_eq!(json["welcome_delay"], 500);
    }
}
