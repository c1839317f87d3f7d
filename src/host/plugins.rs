//! Plugins bundled with the application.

use axum::routing::get;
use axum::Json;
use serde_json::json;

use crate::host::{HostError, Plugin};
use crate::mount::{MountContext, RouteEntry};
use crate::page::{DatasetCatalog, DatasetCategories};

/// Publishes the dataset catalog at `<apiRoot>/datasets`.
#[derive(Debug, Clone, Default)]
pub struct DatasetsPlugin {
    categories: DatasetCategories,
}

impl DatasetsPlugin {
    pub fn new(categories: DatasetCategories) -> Self {
        Self { categories }
    }
}

impl Plugin for DatasetsPlugin {
    fn name(&self) -> &str {
        "datasets"
    }

    fn load(&self, ctx: &mut MountContext) -> Result<(), HostError> {
        let catalog = DatasetCatalog::collect(&ctx.effective, &self.categories);
        let body = json!(catalog
            .categories
            .iter()
            .map(|(category, datasets)| json!({ "category": category, "datasets": datasets }))
            .collect::<Vec<_>>());

        let api = ctx
            .api_root_mut()
            .ok_or_else(|| HostError::plugin(self.name(), "API root is not mounted"))?;
        api.attach(
            "datasets",
            RouteEntry::Leaf(get(move || {
                let body = body.clone();
                async move { Json(body) }
            })),
        )
        .map_err(|e| HostError::plugin(self.name(), e))?;

        tracing::debug!(categories = catalog.categories.len(), "Dataset catalog published");
        Ok(())
    }
}
