//! Landing page subsystem.
//!
//! # Data Flow
//! ```text
//! EffectiveConfig + DatasetCategories
//!     → variables.rs (defaults, [application], iniSettings)
//!     → datasets.rs (active categories, filtered + sorted descriptors)
//!     → escape.rs (two escaping rules)
//!     → template.rs (${name} substitution)
//!     → cache.rs (rendered once, served forever)
//! ```

pub mod cache;
pub mod datasets;
pub mod escape;
pub mod template;
pub mod variables;

use std::path::PathBuf;

use thiserror::Error;

pub use cache::PageCache;
pub use datasets::{DatasetCatalog, DatasetCategories, DatasetDescriptor};
pub use variables::{assemble, PageVariables};

#[derive(Debug, Error)]
pub enum PageError {
    #[error("failed to read page template {path}: {source}")]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("undefined page variable `{0}`")]
    UndefinedVariable(String),

    #[error("unterminated placeholder at byte {0}")]
    Unterminated(usize),
}
