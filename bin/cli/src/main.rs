//! `qa-chat`: the widget in a terminal.
//!
//! Configuration comes from `QA_CHAT_*` environment variables (and the file
//! named by `QA_CHAT_CONFIG_FILE`, if any). History is kept under
//! `QA_CHAT_DATA_DIR`, defaulting to `./.qa-chat`.

mod view;

use qa_chat_widget::{ChatWidget, FileStore, WidgetConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use view::TerminalView;

/// One line of input.
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Clear,
    Open,
    Close,
    Toggle,
    Quit,
    Ask(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        match line.trim() {
            "/clear" => Self::Clear,
            "/open" => Self::Open,
            "/close" => Self::Close,
            "/toggle" => Self::Toggle,
            "/quit" | "/exit" => Self::Quit,
            _ => Self::Ask(line),
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_file = std::env::var_os("QA_CHAT_CONFIG_FILE").map(PathBuf::from);
    let config = match WidgetConfig::load(config_file.as_deref()) {
        Ok(config) => config,
        Err(report) => {
            tracing::error!(error = %report, "failed to load configuration");
            std::process::exit(1);
        }
    };
    tracing::info!(api_url = %config.api_url, "loaded configuration");

    let data_dir = std::env::var_os("QA_CHAT_DATA_DIR")
        .map_or_else(|| PathBuf::from(".qa-chat"), PathBuf::from);
    let store = Arc::new(FileStore::new(data_dir));
    let view = Arc::new(TerminalView::new(
        config.header_text.clone(),
        config.show_timestamp,
    ));

    let widget = match ChatWidget::with_http(config, store, view) {
        Ok(widget) => widget,
        Err(report) => {
            tracing::error!(error = %report, "failed to build HTTP client");
            std::process::exit(1);
        }
    };
    widget.start();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = tokio::signal::ctrl_c() => break,
        };
        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "failed to read input");
                break;
            }
        };

        match Command::parse(&line) {
            Command::Clear => widget.clear_history(),
            Command::Open => widget.open(),
            Command::Close => widget.close(),
            Command::Toggle => widget.toggle(),
            Command::Quit => break,
            Command::Ask(text) => {
                widget.send_message(text).await;
            }
        }
    }

    tracing::debug!(entries = widget.history().len(), "exiting");
}
