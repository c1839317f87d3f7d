//! Configuration schema definitions.
//!
//! The merged configuration stays an untyped table: sections such as
//! `resources` or the dataset categories carry arbitrary keys. Sections the
//! server itself interprets are read through typed views with defaults.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use toml::Table;

use crate::config::loader::ConfigError;

/// Section name to key/value mapping, after the cascade.
pub type EffectiveConfig = Table;

/// Deserialize a section into a typed view, using its defaults when absent.
pub fn section<T>(config: &EffectiveConfig, name: &str) -> Result<T, ConfigError>
where
    T: DeserializeOwned + Default,
{
    match config.get(name) {
        Some(value) => value.clone().try_into().map_err(|source| ConfigError::Section {
            section: name.to_string(),
            source,
        }),
        None => Ok(T::default()),
    }
}

/// `[server]` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind address (e.g., "0.0.0.0:8001").
    pub bind_address: String,

    /// Per-request timeout in seconds; requests are not timed out when unset.
    pub request_timeout_secs: Option<u64>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8001".to_string(),
            request_timeout_secs: None,
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Directory for log files; `~` is expanded.
    pub log_root: Option<String>,

    /// Default filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            log_root: None,
            log_level: "info".to_string(),
        }
    }
}
