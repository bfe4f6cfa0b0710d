//! Widget configuration.
//!
//! Every option is independent and optional. Options come either from
//! environment variables (`QA_CHAT_API_URL`, `QA_CHAT_MAX_HISTORY`, ...) with an
//! optional file underneath, or from the `data-*` attributes of the drop-in
//! script tag. Only `max_history` and `persist_history` affect the conversation
//! lifecycle; everything else is presentation.

use crate::error::ConfigError;
use config::builder::{ConfigBuilder, DefaultState};
use qa_chat_conversation::config::DEFAULT_WELCOME_DELAY;
use qa_chat_conversation::{CycleTexts, DEFAULT_HISTORY_KEY, SessionConfig};
use qa_chat_core::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Visual theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    /// Follow the host's light/dark preference.
    Auto,
}

impl Theme {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::Auto => "auto",
        }
    }
}

impl From<String> for Theme {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "dark" => Self::Dark,
            "auto" => Self::Auto,
            _ => Self::Light,
        }
    }
}

impl From<Theme> for String {
    fn from(theme: Theme) -> Self {
        theme.as_str().to_string()
    }
}

/// Shape of the launcher button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ButtonShape {
    #[default]
    Circle,
    Pill,
}

impl ButtonShape {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Pill => "pill",
        }
    }
}

impl From<String> for ButtonShape {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "pill" => Self::Pill,
            _ => Self::Circle,
        }
    }
}

impl From<ButtonShape> for String {
    fn from(shape: ButtonShape) -> Self {
        shape.as_str().to_string()
    }
}

/// Screen corner the widget is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Position {
    #[default]
    BottomRight,
    BottomLeft,
    TopRight,
    TopLeft,
}

impl Position {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BottomRight => "bottom-right",
            Self::BottomLeft => "bottom-left",
            Self::TopRight => "top-right",
            Self::TopLeft => "top-left",
        }
    }

    #[must_use]
    pub fn is_top(&self) -> bool {
        matches!(self, Self::TopRight | Self::TopLeft)
    }

    #[must_use]
    pub fn is_left(&self) -> bool {
        matches!(self, Self::BottomLeft | Self::TopLeft)
    }
}

impl From<String> for Position {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "bottom-left" => Self::BottomLeft,
            "top-right" => Self::TopRight,
            "top-left" => Self::TopLeft,
            _ => Self::BottomRight,
        }
    }
}

impl From<Position> for String {
    fn from(position: Position) -> Self {
        position.as_str().to_string()
    }
}

/// Every recognised widget option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Question-answering endpoint.
    pub api_url: String,

    pub header_text: String,
    pub placeholder_text: String,
    pub welcome_message: String,
    pub loading_text: String,
    pub error_text: String,
    pub send_button_text: String,

    pub theme: Theme,
    /// Hex accent color (`#rgb` or `#rrggbb`).
    pub accent_color: String,
    pub font_family: String,
    /// CSS length used for the panel corners.
    pub border_radius: String,
    pub button_shape: ButtonShape,
    pub position: Position,

    /// Open the panel automatically after `auto_open_delay_ms`.
    pub auto_open: bool,
    pub auto_open_delay_ms: u64,
    pub show_avatar: bool,
    pub show_timestamp: bool,

    /// Keep history in durable storage across page loads.
    pub persist_history: bool,
    /// Maximum number of entries kept in history.
    pub max_history: usize,
    /// Storage slot holding the history.
    pub history_key: String,

    /// Give up on the endpoint after this many seconds. No timeout when unset.
    pub request_timeout_secs: Option<u64>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        let texts = CycleTexts::default();
        Self {
            api_url: "http://0.0.0.0:8000/qa".to_string(),
            header_text: "Asistente IA".to_string(),
            placeholder_text: "¿Qué quieres saber?".to_string(),
            welcome_message: texts.welcome_message,
            loading_text: texts.loading_text,
            error_text: texts.error_text,
            send_button_text: "Enviar".to_string(),
            theme: Theme::default(),
            accent_color: "#4a6cf7".to_string(),
            font_family: "-apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, Cantarell, 'Open Sans', 'Helvetica Neue', sans-serif".to_string(),
            border_radius: "10px".to_string(),
            button_shape: ButtonShape::default(),
            position: Position::default(),
            auto_open: false,
            auto_open_delay_ms: 3000,
            show_avatar: true,
            show_timestamp: true,
            persist_history: true,
            max_history: 50,
            history_key: DEFAULT_HISTORY_KEY.to_string(),
            request_timeout_secs: None,
        }
    }
}

impl WidgetConfig {
    /// Loads configuration from `QA_CHAT_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be converted or a value is out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Loads configuration from an optional file, overridden by environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unreadable, a value cannot be converted,
    /// or a value is out of range.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(file, environment())
    }

    fn load_with_env(
        file: Option<&Path>,
        env: config::Environment,
    ) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(file) = file {
            builder = builder.add_source(config::File::from(file));
        }
        Self::finish(builder.add_source(env))
    }

    /// Builds configuration from `data-*` attributes of the embedding script tag.
    ///
    /// Unknown attributes are ignored. The `data-` prefix is optional.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be converted (e.g. a non-numeric
    /// `data-max-history`) or is out of range.
    pub fn from_attributes<'a>(
        attributes: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        for (name, value) in attributes {
            let Some(field) = attribute_field(name) else {
                debug!(attribute = name, "ignoring unknown widget attribute");
                continue;
            };
            builder = builder
                .set_override(field, value.trim())
                .map_err(ConfigError::from)?;
        }
        Self::finish(builder)
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: Self = builder
            .build()
            .map_err(ConfigError::from)?
            .try_deserialize()
            .map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.max_history == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_history".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api_url".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// The subset of options the conversation controller consumes.
    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new(self.api_url.clone())
            .with_max_history(self.max_history)
            .with_persistence(self.persist_history)
    }

    /// Strings the state machine emits.
    #[must_use]
    pub fn cycle_texts(&self) -> CycleTexts {
        CycleTexts {
            welcome_message: self.welcome_message.clone(),
            loading_text: self.loading_text.clone(),
            error_text: self.error_text.clone(),
            welcome_delay: DEFAULT_WELCOME_DELAY,
        }
    }

    /// Delay before auto-opening, when auto-open is enabled.
    #[must_use]
    pub fn auto_open_delay(&self) -> Option<Duration> {
        self.auto_open
            .then(|| Duration::from_millis(self.auto_open_delay_ms))
    }

    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// `QA_CHAT_API_URL`, `QA_CHAT_MAX_HISTORY`, ...
fn environment() -> config::Environment {
    config::Environment::with_prefix("QA_CHAT")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Maps a script-tag attribute to its configuration key.
fn attribute_field(name: &str) -> Option<&'static str> {
    let name = name.strip_prefix("data-").unwrap_or(name);
    let field = match name {
        "api-url" => "api_url",
        "header-text" => "header_text",
        "placeholder" => "placeholder_text",
        "welcome-message" => "welcome_message",
        "loading-text" => "loading_text",
        "error-text" => "error_text",
        "send-button-text" => "send_button_text",
        "theme" => "theme",
        "accent-color" => "accent_color",
        "font-family" => "font_family",
        "border-radius" => "border_radius",
        "button-shape" => "button_shape",
        "position" => "position",
        "auto-open" => "auto_open",
        "auto-open-delay" => "auto_open_delay_ms",
        "show-avatar" => "show_avatar",
        "show-timestamp" => "show_timestamp",
        "persist-history" => "persist_history",
        "max-history" => "max_history",
        "history-key" => "history_key",
        "request-timeout" => "request_timeout_secs",
        _ => return None,
    };
    Some(field)
}
