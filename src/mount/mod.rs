//! Mounting subsystem.
//!
//! # Data Flow
//! ```text
//! FrameworkHost::configure(loader)
//!     → (host tree, host AppConfig)
//!     → orchestrator.rs (graft under root, merge static rules)
//!     → tree.rs relocate (host/api → api, rewrite relative refs)
//!     → FrameworkHost::load_plugins(&mut MountContext)
//!     → MountContext::into_router (tree + redirects + statics.rs fallback)
//! ```
//!
//! # Design Decisions
//! - The tree is a value; relocation consumes it and returns the new layout
//! - Nothing is served until the whole layout is built
//! - Static rules match by longest path prefix

pub mod options;
pub mod orchestrator;
pub mod paths;
pub mod statics;
pub mod tree;

use thiserror::Error;

use crate::host::HostError;

pub use options::{AppConfig, PathOptions};
pub use orchestrator::{MountContext, MountLayout, MountOrchestrator};
pub use tree::{HtmlVars, IndexHandler, RouteEntry, RouteNode};

#[derive(Debug, Error)]
pub enum MountError {
    #[error("no subtree at `{0}`")]
    MissingSubtree(String),

    #[error("`{0}` is a leaf, not a subtree")]
    NotASubtree(String),

    #[error("`{0}` is already mounted")]
    Occupied(String),

    #[error("invalid mount name `{0}`")]
    InvalidName(String),

    #[error("host config has no static rule at `{0}`")]
    MissingHostStatic(String),

    #[error(transparent)]
    Host(#[from] HostError),
}
