//! Ordered list of configuration sources.
//!
//! Lowest to highest precedence:
//! 1. `<root>/conf/geoapp.dist.cfg`
//! 2. `<root>/conf/geoapp.local.cfg`
//! 3. `/etc/geoapp.cfg`
//! 4. `~/.geoapp/geoapp.cfg`
//! 5. `$GEOAPP_CONFIG`
//!
//! Sources that do not exist are skipped.

use std::env;
use std::path::{Path, PathBuf};

use crate::config::loader::{load_file, ConfigError};
use crate::config::merge::deep_merge;
use crate::config::schema::EffectiveConfig;

pub const APP_NAME: &str = "geoapp";

/// Environment variable naming an extra, highest-precedence config file.
pub const CONFIG_ENV_VAR: &str = "GEOAPP_CONFIG";

/// A candidate configuration file. Existence is checked when the cascade runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    path: PathBuf,
}

impl ConfigSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigCascade {
    sources: Vec<ConfigSource>,
}

impl ConfigCascade {
    pub fn new(sources: Vec<ConfigSource>) -> Self {
        Self { sources }
    }

    /// Build the standard five-source cascade.
    pub fn standard(root: &Path, home: Option<&Path>, env_path: Option<PathBuf>) -> Self {
        let conf_dir = root.join("conf");
        let mut sources = vec![
            ConfigSource::new(conf_dir.join(format!("{APP_NAME}.dist.cfg"))),
            ConfigSource::new(conf_dir.join(format!("{APP_NAME}.local.cfg"))),
            ConfigSource::new(Path::new("/etc").join(format!("{APP_NAME}.cfg"))),
        ];
        if let Some(home) = home {
            sources.push(ConfigSource::new(
                home.join(format!(".{APP_NAME}")).join(format!("{APP_NAME}.cfg")),
            ));
        }
        if let Some(path) = env_path {
            sources.push(ConfigSource::new(path));
        }
        Self { sources }
    }

    /// Standard cascade using the current user's home directory and `$GEOAPP_CONFIG`.
    pub fn from_env(root: &Path) -> Self {
        let home = dirs::home_dir();
        let env_path = env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
        Self::standard(root, home.as_deref(), env_path)
    }

    pub fn sources(&self) -> &[ConfigSource] {
        &self.sources
    }

    /// Merge every existing source into `config`, in order.
    ///
    /// Returns how many sources were merged. A parse failure aborts the whole
    /// cascade; `config` must then be discarded.
    pub fn apply(&self, config: &mut EffectiveConfig) -> Result<usize, ConfigError> {
        let mut merged = 0;
        for source in &self.sources {
            if !source.exists() {
                tracing::trace!(path = %source.path().display(), "Config source absent");
                continue;
            }
            let overlay = load_file(source.path())?;
            deep_merge(config, overlay);
            merged += 1;
            tracing::info!(path = %source.path().display(), "Merged config source");
        }
        Ok(merged)
    }
}

/// Expand a leading `~` to the current user's home directory.
pub fn expand_user(path: &str) -> PathBuf {
    expand_user_in(path, dirs::home_dir())
}

fn expand_user_in(path: &str, home: Option<PathBuf>) -> PathBuf {
    match (path.strip_prefix('~'), home) {
        (Some(""), Some(home)) => home,
        (Some(rest), Some(home)) if rest.starts_with('/') => home.join(&rest[1..]),
        _ => PathBuf::from(path),
    }
}
