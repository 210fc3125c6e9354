//! Tracing setup: stderr always, plus an append-only log file while monitoring.
//!
//! A monitor started at login has no terminal, so the file beside the config
//! is its only diagnostic channel.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "linkwatch=info,linkwatch_lib=info";

/// Install the global subscriber. `log_file`, when given, receives the same
/// events as stderr without ANSI colours.
pub fn init(log_file: Option<&Path>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    let mut open_error = None;
    let file_layer = match log_file.map(open_log_file) {
        Some(Ok(file)) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        ),
        Some(Err(e)) => {
            open_error = Some(e);
            None
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    if let Some(e) = open_error {
        tracing::warn!("Logging to stderr only: {e:#}");
    } else if let Some(path) = log_file {
        tracing::debug!("Logging to {}", path.display());
    }
}

pub fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}
