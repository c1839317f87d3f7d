//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! host base loader (built-in defaults)
//!     → CascadingLoader (wraps it exactly once)
//!     → cascade.rs (dist, local, /etc, ~/.geoapp, $GEOAPP_CONFIG)
//!     → merge.rs (deep merge, later sources win)
//!     → EffectiveConfig (immutable after startup)
//! ```
//!
//! # Design Decisions
//! - Missing sources are skipped, malformed ones abort startup
//! - Tables merge recursively, arrays and scalars are replaced
//! - Typed views (`[server]`, `[logging]`) default every field

pub mod cascade;
pub mod loader;
pub mod merge;
pub mod schema;

pub use cascade::{ConfigCascade, ConfigSource, CONFIG_ENV_VAR};
pub use loader::{CascadingLoader, ConfigError, ConfigLoader, FixedLoader};
pub use schema::{EffectiveConfig, LoggingSettings, ServerSettings};
