//! Framework host contract.
//!
//! The host owns the base configuration loader, builds its own route tree
//! (with a nested API subtree) and loads plugins against the finished mount
//! context. [`builtin::BuiltinHost`] is the host bundled with this server.

pub mod builtin;
pub mod plugins;

use std::sync::Arc;

use thiserror::Error;

use crate::config::{ConfigError, ConfigLoader};
use crate::mount::{AppConfig, MountContext, RouteNode};

pub use builtin::BuiltinHost;
pub use plugins::DatasetsPlugin;

#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("plugin `{name}` failed to load: {message}")]
    Plugin { name: String, message: String },
}

impl HostError {
    pub fn plugin(name: &str, message: impl ToString) -> Self {
        HostError::Plugin {
            name: name.to_string(),
            message: message.to_string(),
        }
    }
}

/// A plugin notified once the mount layout is complete.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    /// May change the root tree, the path options and the API subtree.
    fn load(&self, ctx: &mut MountContext) -> Result<(), HostError>;
}

pub trait FrameworkHost: Send + Sync {
    fn name(&self) -> &str;

    /// The host's own configuration loader, before any application cascade.
    fn base_loader(&self) -> Arc<dyn ConfigLoader>;

    /// Build the host's route tree and per-path options, loading
    /// configuration through `loader`.
    fn configure(&self, loader: &dyn ConfigLoader) -> Result<(RouteNode, AppConfig), HostError>;

    /// Notify every plugin of the finished mount context.
    fn load_plugins(&self, ctx: &mut MountContext) -> Result<(), HostError>;
}
