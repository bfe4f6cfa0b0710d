//! The embeddable qa-chat widget.
//!
//! Wires the conversation controller to its real collaborators:
//!
//! - **Configuration**: every `data-*` option of the drop-in script, with defaults
//! - **Theme Renderer**: accent-derived palette and the widget stylesheet
//! - **HTTP endpoint**: `POST {"question"}` / `{"answer"}` over reqwest
//! - **File store**: a directory-backed key-value store for native hosts
//! - **Control handle**: `open`/`close`/`toggle`/`clear_history`/`send_message`

pub mod config;
pub mod error;
pub mod file_store;
pub mod http;
pub mod theme;
pub mod widget;

pub use config::{ButtonShape, Position, Theme, WidgetConfig};
pub use error::ConfigError;
pub use file_store::FileStore;
pub use http::HttpAskClient;
pub use theme::{ColorScheme, Palette, derive_palette, render_stylesheet};
pub use widget::{ChatWidget, PanelState};
