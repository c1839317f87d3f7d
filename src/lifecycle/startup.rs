//! Startup orchestration.
//!
//! Order: cascade → logging → host configure → mount and relocate →
//! plugins → server. Any error is fatal and nothing is served.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::config::schema::section;
use crate::config::{CascadingLoader, ConfigCascade, ConfigError, ConfigLoader, EffectiveConfig, LoggingSettings};
use crate::host::FrameworkHost;
use crate::http::HttpServer;
use crate::mount::{MountError, MountLayout, MountOrchestrator, RouteNode};
use crate::observability::logging::LoggingError;
use crate::page::{DatasetCategories, PageCache};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("logging: {0}")]
    Logging(#[from] LoggingError),

    #[error("mount: {0}")]
    Mount(#[from] MountError),

    #[error("page template {0} not found")]
    MissingTemplate(PathBuf),

    #[error("listener: {0}")]
    Io(#[from] std::io::Error),
}

/// Installation root holding `conf/` and `built/`.
///
/// Searched upward from the executable's directory; a binary run from the
/// build tree falls back to the crate directory.
pub fn install_root() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().and_then(find_root))
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")))
}

/// Nearest ancestor of `start` (inclusive) with both `conf/` and `built/`.
pub fn find_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join("conf").is_dir() && dir.join("built").is_dir())
        .map(Path::to_path_buf)
}

/// Paths and loader shared by the startup steps.
#[derive(Debug)]
pub struct Bootstrap {
    root: PathBuf,
    loader: Arc<dyn ConfigLoader>,
}

impl Bootstrap {
    /// Wrap the host's base loader with the standard cascade.
    pub fn new(root: &Path, host: &dyn FrameworkHost) -> Self {
        Self::with_cascade(root, host, ConfigCascade::from_env(root))
    }

    pub fn with_cascade(root: &Path, host: &dyn FrameworkHost, cascade: ConfigCascade) -> Self {
        Self {
            root: root.to_path_buf(),
            loader: CascadingLoader::wrap(host.base_loader(), cascade),
        }
    }

    pub fn loader(&self) -> &dyn ConfigLoader {
        self.loader.as_ref()
    }

    pub fn built_dir(&self) -> PathBuf {
        self.root.join("built")
    }

    /// Load the effective configuration and its logging settings.
    pub fn load_config(&self) -> Result<(EffectiveConfig, LoggingSettings), StartupError> {
        let config = self.loader.load()?;
        let logging = section(&config, "logging")?;
        Ok((config, logging))
    }

    /// Mount the host, notify plugins and build the server.
    ///
    /// The page template is only checked for here; it is read and rendered
    /// on the first request.
    pub fn build_server(
        &self,
        host: &dyn FrameworkHost,
        config: EffectiveConfig,
    ) -> Result<HttpServer, StartupError> {
        let template = self.built_dir().join("index.html");
        if !template.is_file() {
            return Err(StartupError::MissingTemplate(template));
        }

        let orchestrator = MountOrchestrator::new(MountLayout::new(self.built_dir()));
        let ctx = orchestrator.mount(host, self.loader(), config, RouteNode::new())?;
        let page = PageCache::new(template, DatasetCategories::default());
        Ok(HttpServer::new(ctx, page)?)
    }
}
