//! Configuration loading from disk.
//!
//! The framework host owns a base loader. [`CascadingLoader`] wraps it so
//! every load also folds in the application's own cascade of files, and is
//! passed explicitly wherever the host would otherwise call its own loader.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use toml::Table;

use crate::config::cascade::ConfigCascade;
use crate::config::schema::EffectiveConfig;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid [{section}] section: {source}")]
    Section {
        section: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Parse one configuration file into a table.
pub fn load_file(path: &Path) -> Result<Table, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    content.parse::<Table>().map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Anything able to produce the effective configuration.
pub trait ConfigLoader: Send + Sync + fmt::Debug {
    fn load(&self) -> Result<EffectiveConfig, ConfigError>;

    /// True when this loader already applies the application cascade.
    fn cascades(&self) -> bool {
        false
    }
}

/// Base loader returning a fixed table, used by hosts that ship built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct FixedLoader {
    table: Table,
}

impl FixedLoader {
    pub fn new(table: Table) -> Self {
        Self { table }
    }
}

impl ConfigLoader for FixedLoader {
    fn load(&self) -> Result<EffectiveConfig, ConfigError> {
        Ok(self.table.clone())
    }
}

/// Runs the host's base loader, then merges the cascade on top.
#[derive(Debug)]
pub struct CascadingLoader {
    base: Arc<dyn ConfigLoader>,
    cascade: ConfigCascade,
}

impl CascadingLoader {
    /// Wrap `base` with the cascade.
    ///
    /// Wrapping is idempotent: a loader that already cascades is returned
    /// unchanged, so the cascade never runs twice per load.
    pub fn wrap(base: Arc<dyn ConfigLoader>, cascade: ConfigCascade) -> Arc<dyn ConfigLoader> {
        if base.cascades() {
            tracing::debug!("Config loader already cascades; not wrapping again");
            return base;
        }
        Arc::new(Self { base, cascade })
    }

    pub fn cascade(&self) -> &ConfigCascade {
        &self.cascade
    }
}

impl ConfigLoader for CascadingLoader {
    fn load(&self) -> Result<EffectiveConfig, ConfigError> {
        let mut config = self.base.load()?;
        let merged = self.cascade.apply(&mut config)?;
        tracing::debug!(sources = merged, "Config cascade applied");
        Ok(config)
    }

    fn cascades(&self) -> bool {
        true
    }
}
