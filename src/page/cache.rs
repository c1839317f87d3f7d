//! Memoized landing page.

use std::path::{Path, PathBuf};

use tokio::sync::OnceCell;

use crate::config::EffectiveConfig;
use crate::page::datasets::DatasetCategories;
use crate::page::template::render;
use crate::page::variables::assemble;
use crate::page::PageError;

/// Renders the page once and serves the stored markup for the process lifetime.
///
/// Later configuration changes are not observed; there is no invalidation.
#[derive(Debug)]
pub struct PageCache {
    template_path: PathBuf,
    categories: DatasetCategories,
    page: OnceCell<String>,
}

impl PageCache {
    pub fn new(template_path: impl Into<PathBuf>, categories: DatasetCategories) -> Self {
        Self {
            template_path: template_path.into(),
            categories,
            page: OnceCell::new(),
        }
    }

    pub fn template_path(&self) -> &Path {
        &self.template_path
    }

    pub fn is_rendered(&self) -> bool {
        self.page.initialized()
    }

    /// Return the page, rendering it from `config` on first use.
    ///
    /// Concurrent first callers wait for a single render. A failed render is
    /// not stored, so the next call retries.
    pub async fn get_page(&self, config: &EffectiveConfig) -> Result<&str, PageError> {
        let page = self
            .page
            .get_or_try_init(|| async {
                let template = tokio::fs::read_to_string(&self.template_path)
                    .await
                    .map_err(|source| PageError::Template {
                        path: self.template_path.clone(),
                        source,
                    })?;
                let vars = assemble(config, &self.categories);
                let page = render(&template, &vars)?;
                tracing::info!(
                    template = %self.template_path.display(),
                    bytes = page.len(),
                    "Landing page rendered"
                );
                Ok::<_, PageError>(page)
            })
            .await?;
        Ok(page.as_str())
    }
}
