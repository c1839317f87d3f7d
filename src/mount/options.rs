//! Per-path serving options.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use toml::{Table, Value};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PathOptions {
    /// Serve files under this path from the directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<PathBuf>,

    /// Redirect `<path>/` to `<path>` when enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailing_slash: Option<bool>,
}

impl PathOptions {
    pub fn static_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            static_dir: Some(dir.into()),
            trailing_slash: None,
        }
    }
}

/// Mount path to serving options, as used by the serving engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    paths: BTreeMap<String, PathOptions>,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&PathOptions> {
        self.paths.get(path)
    }

    pub fn entry(&mut self, path: &str) -> &mut PathOptions {
        self.paths.entry(path.to_string()).or_default()
    }

    pub fn insert(&mut self, path: impl Into<String>, options: PathOptions) -> Option<PathOptions> {
        self.paths.insert(path.into(), options)
    }

    /// Add `other`'s entries; an entry at an existing path replaces it whole.
    pub fn update(&mut self, other: AppConfig) {
        self.paths.extend(other.paths);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PathOptions)> {
        self.paths.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// `(path, directory)` for every static rule.
    pub fn static_rules(&self) -> Vec<(String, PathBuf)> {
        self.paths
            .iter()
            .filter_map(|(path, opts)| opts.static_dir.clone().map(|dir| (path.clone(), dir)))
            .collect()
    }

    /// Paths with trailing-slash redirects enabled.
    pub fn trailing_slash_paths(&self) -> Vec<&str> {
        self.paths
            .iter()
            .filter(|(_, opts)| opts.trailing_slash == Some(true))
            .map(|(path, _)| path.as_str())
            .collect()
    }

    /// Entries as configuration sections keyed by path.
    pub fn to_table(&self) -> Table {
        self.paths
            .iter()
            .filter_map(|(path, opts)| Value::try_from(opts).ok().map(|v| (path.clone(), v)))
            .collect()
    }
}
