//! The bundled framework host.
//!
//! Serves its own index page, a versioned API under `api/v1` and its static
//! files from `/static`.

use std::path::PathBuf;
use std::sync::Arc;

use axum::response::Html;
use axum::routing::{get, MethodRouter};
use axum::Json;
use toml::Table;

use crate::config::schema::{section, LoggingSettings, ServerSettings};
use crate::config::{ConfigLoader, FixedLoader};
use crate::host::{FrameworkHost, HostError, Plugin};
use crate::mount::{AppConfig, HtmlVars, IndexHandler, MountContext, PathOptions, RouteEntry, RouteNode};
use crate::page::escape::escape_markup;

pub const API_VERSION: &str = "1.0";

const BASE_CONFIG: &str = r#"
[server]
bind_address = "0.0.0.0:8080"

[logging]
log_level = "info"
"#;

pub struct BuiltinHost {
    static_dir: PathBuf,
    plugins: Vec<Box<dyn Plugin>>,
}

impl BuiltinHost {
    pub fn new(static_dir: impl Into<PathBuf>) -> Self {
        Self {
            static_dir: static_dir.into(),
            plugins: Vec::new(),
        }
    }

    pub fn with_plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    fn base_config() -> Table {
        BASE_CONFIG.parse().unwrap_or_default()
    }

    fn tree(&self) -> RouteNode {
        let system = RouteNode::new().with_child("version", RouteEntry::Leaf(get(version)));
        let v1 = RouteNode::new()
            .with_index(IndexHandler::new(api_docs_page))
            .with_html_var("staticRoot", "../../static")
            .with_child("system", RouteEntry::Node(system));
        let api = RouteNode::new().with_child("v1", RouteEntry::Node(v1));

        RouteNode::new()
            .with_index(IndexHandler::new(host_page))
            .with_html_var("staticRoot", "static")
            .with_html_var("apiRoot", "api/v1")
            .with_child("api", RouteEntry::Node(api))
    }
}

impl FrameworkHost for BuiltinHost {
    fn name(&self) -> &str {
        "girder"
    }

    fn base_loader(&self) -> Arc<dyn ConfigLoader> {
        Arc::new(FixedLoader::new(Self::base_config()))
    }

    fn configure(&self, loader: &dyn ConfigLoader) -> Result<(RouteNode, AppConfig), HostError> {
        let config = loader.load()?;
        let server: ServerSettings = section(&config, "server")?;
        let _: LoggingSettings = section(&config, "logging")?;

        let mut app_config = AppConfig::new();
        app_config.entry("/").trailing_slash = Some(true);
        app_config.insert("/static", PathOptions::static_dir(self.static_dir.clone()));

        tracing::debug!(
            bind_address = %server.bind_address,
            static_dir = %self.static_dir.display(),
            "Host configured"
        );
        Ok((self.tree(), app_config))
    }

    fn load_plugins(&self, ctx: &mut MountContext) -> Result<(), HostError> {
        for plugin in &self.plugins {
            tracing::info!(plugin = plugin.name(), "Loading plugin");
            plugin.load(ctx)?;
        }
        Ok(())
    }
}

async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "apiVersion": API_VERSION,
        "serverVersion": env!("CARGO_PKG_VERSION"),
    }))
}

fn var<'a>(vars: &'a HtmlVars, name: &str, default: &'a str) -> String {
    escape_markup(vars.get(name).map(String::as_str).unwrap_or(default))
}

fn html_route(page: String) -> MethodRouter {
    get(move || {
        let page = page.clone();
        async move { Html(page) }
    })
}

fn host_page(vars: &HtmlVars) -> MethodRouter {
    let static_root = var(vars, "staticRoot", "static");
    let api_root = var(vars, "apiRoot", "api/v1");
    html_route(format!(
        "<!DOCTYPE html>\n<html lang=\"en\"><head><title>Girder</title>\
         <link rel=\"stylesheet\" href=\"{static_root}/built/app.min.css\"></head>\
         <body><div id=\"g-global-info-apiroot\" class=\"hide\">{api_root}</div>\
         <div id=\"g-global-info-staticroot\" class=\"hide\">{static_root}</div>\
         <script src=\"{static_root}/built/app.min.js\"></script></body></html>\n"
    ))
}

fn api_docs_page(vars: &HtmlVars) -> MethodRouter {
    let static_root = var(vars, "staticRoot", "../../static");
    html_route(format!(
        "<!DOCTYPE html>\n<html lang=\"en\"><head><title>Girder - REST API Documentation</title>\
         <link rel=\"stylesheet\" href=\"{static_root}/lib/swagger/css/screen.css\"></head>\
         <body><div id=\"swagger-ui-container\"></div>\
         <script src=\"{static_root}/built/swagger.min.js\"></script></body></html>\n"
    ))
}
