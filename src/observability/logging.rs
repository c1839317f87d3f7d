//! Structured logging.
//!
//! Initialized after the configuration cascade so `[logging]` applies:
//! `RUST_LOG` wins over `log_level`, and `log_root` adds a plain-text
//! `info.log` next to the stdout output.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::cascade::expand_user;
use crate::config::LoggingSettings;

pub const LOG_FILE: &str = "info.log";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("cannot open log file {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("subscriber already installed: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// The log directory from `[logging] log_root`, with `~` expanded.
pub fn log_root(settings: &LoggingSettings) -> Option<PathBuf> {
    settings
        .log_root
        .as_deref()
        .filter(|root| !root.trim().is_empty())
        .map(expand_user)
}

pub fn init(settings: &LoggingSettings) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("geoapp={0},tower_http={0}", settings.log_level)));

    let file_layer = match log_root(settings) {
        Some(dir) => {
            let path = dir.join(LOG_FILE);
            let file = fs::create_dir_all(&dir)
                .and_then(|_| OpenOptions::new().create(true).append(true).open(&path))
                .map_err(|source| LoggingError::File { path, source })?;
            Some(fmt::layer().with_ansi(false).with_writer(Arc::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init()?;
    Ok(())
}
