//! Grafts the framework host's route tree under the application root.

use std::path::PathBuf;

use axum::extract::Request;
use axum::response::Redirect;
use axum::routing::get;
use axum::Router;

use crate::config::merge::deep_merge;
use crate::config::{ConfigLoader, EffectiveConfig};
use crate::host::FrameworkHost;
use crate::mount::options::{AppConfig, PathOptions};
use crate::mount::statics::StaticRules;
use crate::mount::tree::{graft, relocate, RouteNode};
use crate::mount::MountError;

/// Where things go in the mounted tree.
#[derive(Debug, Clone)]
pub struct MountLayout {
    /// Child of the root holding the host's tree.
    pub host_name: String,
    /// The host's API subtree, moved from `<host_name>/<api_name>` to `<api_name>`.
    pub api_name: String,
    /// Versioned API node inside the API subtree, exposed to plugins.
    pub api_version: String,
    /// The application's built assets.
    pub built_dir: PathBuf,
}

impl MountLayout {
    pub fn new(built_dir: impl Into<PathBuf>) -> Self {
        Self {
            host_name: "girder".to_string(),
            api_name: "api".to_string(),
            api_version: "v1".to_string(),
            built_dir: built_dir.into(),
        }
    }

    pub fn api_root(&self) -> String {
        format!("{}/{}", self.api_name, self.api_version)
    }
}

/// Everything a plugin may change before serving starts.
#[derive(Debug)]
pub struct MountContext {
    pub config: AppConfig,
    pub server_root: RouteNode,
    /// Path of the API root node within `server_root`.
    pub api_root: String,
    /// The live configuration, including merged path rules.
    pub effective: EffectiveConfig,
}

impl MountContext {
    pub fn api_root(&self) -> Option<&RouteNode> {
        self.server_root.node(&self.api_root)
    }

    pub fn api_root_mut(&mut self) -> Option<&mut RouteNode> {
        self.server_root.node_mut(&self.api_root)
    }

    /// Turn the finished layout into a router: the tree, trailing-slash
    /// redirects and the static rules as fallback.
    pub fn into_router(self) -> Router {
        let statics = StaticRules::new(self.config.static_rules());
        let redirects: Vec<String> = self
            .config
            .trailing_slash_paths()
            .into_iter()
            .map(|p| p.trim_end_matches('/').to_string())
            .filter(|p| !p.is_empty())
            .collect();

        let mut router = self.server_root.into_router();
        for path in redirects {
            let target = path.clone();
            router = router.route(
                &format!("{path}/"),
                get(move || {
                    let target = target.clone();
                    async move { Redirect::permanent(&target) }
                }),
            );
        }
        router.fallback(move |request: Request| {
            let statics = statics.clone();
            async move { statics.serve(request).await }
        })
    }
}

#[derive(Debug, Clone)]
pub struct MountOrchestrator {
    layout: MountLayout,
}

impl MountOrchestrator {
    pub fn new(layout: MountLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &MountLayout {
        &self.layout
    }

    /// Configure the host, graft its tree under `root`, move its API
    /// subtree up one level and notify its plugins.
    ///
    /// Any failure leaves nothing mounted.
    pub fn mount(
        &self,
        host: &dyn FrameworkHost,
        loader: &dyn ConfigLoader,
        mut effective: EffectiveConfig,
        root: RouteNode,
    ) -> Result<MountContext, MountError> {
        let layout = &self.layout;
        let (host_tree, mut app_config) = host.configure(loader)?;
        let root = graft(root, &layout.host_name, host_tree)?;

        let local = self.static_rules(&app_config)?;
        app_config.update(local.clone());
        app_config.entry("/").trailing_slash = Some(false);
        deep_merge(&mut effective, local.to_table());

        tracing::info!(
            host = %layout.host_name,
            static_rules = app_config.static_rules().len(),
            "Host tree mounted at /"
        );

        let from = format!("{}/{}", layout.host_name, layout.api_name);
        let root = relocate(root, &from, &layout.api_name)?;
        let api_root = layout.api_root();
        if root.node(&api_root).is_none() {
            return Err(MountError::MissingSubtree(api_root));
        }
        tracing::info!(from = %from, to = %layout.api_name, "API subtree relocated");

        let mut ctx = MountContext {
            config: app_config,
            server_root: root,
            api_root,
            effective,
        };
        host.load_plugins(&mut ctx)?;
        Ok(ctx)
    }

    /// Rules for the application's assets and the host's static files under
    /// the host's mount path.
    fn static_rules(&self, host_config: &AppConfig) -> Result<AppConfig, MountError> {
        let layout = &self.layout;
        let host_static = host_config
            .get("/static")
            .cloned()
            .ok_or_else(|| MountError::MissingHostStatic("/static".to_string()))?;

        let mut local = AppConfig::new();
        local.insert("/built", PathOptions::static_dir(layout.built_dir.clone()));
        local.insert(format!("/{}/static", layout.host_name), host_static);
        local.insert(
            format!("/{}/static/lib/bootstrap/fonts", layout.host_name),
            PathOptions::static_dir(layout.built_dir.join("lib/bootstrap/fonts")),
        );
        Ok(local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CascadingLoader, ConfigCascade, FixedLoader};
    use crate::host::{HostError, Plugin};
    use crate::mount::{IndexHandler, RouteEntry};
    use axum::routing::get;
    use std::sync::{Arc, Mutex};

    /// Host with a girder-shaped tree that records what plugins saw.
    struct TestHost {
        with_static: bool,
        seen: Mutex<Vec<String>>,
        plugins: Vec<Box<dyn Plugin>>,
    }

    impl TestHost {
        fn new() -> Self {
            Self {
                with_static: true,
                seen: Mutex::new(Vec::new()),
                plugins: Vec::new(),
            }
        }
    }

    impl FrameworkHost for TestHost {
        fn name(&self) -> &str {
            "test"
        }

        fn base_loader(&self) -> Arc<dyn ConfigLoader> {
            Arc::new(FixedLoader::default())
        }

        fn configure(&self, loader: &dyn ConfigLoader) -> Result<(RouteNode, AppConfig), HostError> {
            loader.load()?;
            let v1 = RouteNode::new()
                .with_html_var("staticRoot", "../../static")
                .with_child("item", RouteEntry::Leaf(get(|| async { "item" })));
            let tree = RouteNode::new()
                .with_index(IndexHandler::fixed(get(|| async { "host" })))
                .with_html_var("staticRoot", "static")
                .with_html_var("apiRoot", "api/v1")
                .with_child("api", RouteEntry::Node(RouteNode::new().with_child("v1", RouteEntry::Node(v1))));
            let mut app = AppConfig::new();
            app.entry("/").trailing_slash = Some(true);
            if self.with_static {
                app.insert("/static", PathOptions::static_dir("/srv/host/static"));
            }
            Ok((tree, app))
        }

        fn load_plugins(&self, ctx: &mut MountContext) -> Result<(), HostError> {
            let api = ctx.api_root().map(|n| n.html_var("staticRoot").unwrap_or("").to_string());
            self.seen.lock().unwrap().push(format!("{}:{}", ctx.api_root, api.unwrap_or_default()));
            for plugin in &self.plugins {
                plugin.load(ctx)?;
            }
            Ok(())
        }
    }

    struct AddLeaf;

    impl Plugin for AddLeaf {
        fn name(&self) -> &str {
            "add-leaf"
        }

        fn load(&self, ctx: &mut MountContext) -> Result<(), HostError> {
            let api = ctx.api_root_mut().ok_or_else(|| HostError::plugin(self.name(), "no api"))?;
            api.attach("extra", RouteEntry::Leaf(get(|| async { "extra" })))
                .map_err(|e| HostError::plugin(self.name(), e))
        }
    }

    fn loader(host: &dyn FrameworkHost) -> Arc<dyn ConfigLoader> {
        CascadingLoader::wrap(host.base_loader(), ConfigCascade::default())
    }

    fn orchestrator() -> MountOrchestrator {
        MountOrchestrator::new(MountLayout::new("/srv/app/built"))
    }

    #[test]
    fn test_mount_relocates_api() {
        let host = TestHost::new();
        let ctx = orchestrator()
            .mount(&host, loader(&host).as_ref(), EffectiveConfig::new(), RouteNode::new())
            .unwrap();

        assert!(ctx.server_root.lookup("api/v1/item").unwrap().is_leaf());
        assert!(ctx.server_root.lookup("girder/api").is_none());
        assert!(ctx.server_root.node("girder").unwrap().has_index());
        assert_eq!(ctx.api_root, "api/v1");
        let girder = ctx.server_root.node("girder").unwrap();
        assert_eq!(girder.html_var("apiRoot"), Some("api/v1"));
        assert_eq!(girder.html_var("staticRoot"), Some("girder/static"));
        assert_eq!(host.seen.lock().unwrap().as_slice(), ["api/v1:../girder/static"]);
    }

    #[test]
    fn test_static_rules_merged() {
        let host = TestHost::new();
        let mut effective = EffectiveConfig::new();
        effective.insert("/built".into(), toml::Value::Table("static_dir = \"/old\"\nkeep = 1".parse().unwrap()));

        let ctx = orchestrator()
            .mount(&host, loader(&host).as_ref(), effective, RouteNode::new())
            .unwrap();

        let rules = ctx.config.static_rules();
        assert!(rules.contains(&("/built".into(), "/srv/app/built".into())));
        assert!(rules.contains(&("/girder/static".into(), "/srv/host/static".into())));
        assert!(rules.contains(&(
            "/girder/static/lib/bootstrap/fonts".into(),
            "/srv/app/built/lib/bootstrap/fonts".into()
        )));
        assert_eq!(ctx.config.get("/").unwrap().trailing_slash, Some(false));

        let built = ctx.effective["/built"].as_table().unwrap();
        assert_eq!(built["static_dir"].as_str(), Some("/srv/app/built"));
        assert_eq!(built["keep"].as_integer(), Some(1));
    }

    #[test]
    fn test_missing_host_static_is_fatal() {
        let mut host = TestHost::new();
        host.with_static = false;
        let err = orchestrator()
            .mount(&host, loader(&host).as_ref(), EffectiveConfig::new(), RouteNode::new())
            .unwrap_err();
        assert!(matches!(err, MountError::MissingHostStatic(_)));
        assert!(host.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_root_already_has_host_child() {
        let host = TestHost::new();
        let root = RouteNode::new().with_child("girder", RouteEntry::Node(RouteNode::new()));
        let err = orchestrator()
            .mount(&host, loader(&host).as_ref(), EffectiveConfig::new(), root)
            .unwrap_err();
        assert!(matches!(err, MountError::Occupied(_)));
    }

    #[test]
    fn test_plugins_mutate_api_root() {
        let mut host = TestHost::new();
        host.plugins.push(Box::new(AddLeaf));
        let ctx = orchestrator()
            .mount(&host, loader(&host).as_ref(), EffectiveConfig::new(), RouteNode::new())
            .unwrap();
        assert!(ctx.server_root.lookup("api/v1/extra").unwrap().is_leaf());
    }
}
