//! Shared fixtures for integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use geoapp::config::ConfigCascade;
use geoapp::host::{BuiltinHost, DatasetsPlugin};
use geoapp::lifecycle::Bootstrap;
use geoapp::HttpServer;
use tempfile::TempDir;
use tower::ServiceExt;

pub const INDEX_TEMPLATE: &str = "<!DOCTYPE html><html><head><title>${appTitle}</title>\
<link rel=\"icon\" href=\"${staticRoot}/${appIcon}\"></head>\
<body ${iniSettings}data-api=\"${apiRoot}\" data-girder=\"${girderRoot}\">${data}</body></html>";

/// A throwaway installation: `conf/`, `built/`, `girder/static/`, a home
/// directory and a path for the environment-named config file.
pub struct Install {
    _dir: TempDir,
    pub root: PathBuf,
    pub home: PathBuf,
    pub env_file: PathBuf,
}

#[allow(dead_code)]
impl Install {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("install");
        let home = dir.path().join("home");
        for sub in ["conf", "built/lib/bootstrap/fonts", "girder/static/built"] {
            fs::create_dir_all(root.join(sub)).unwrap();
        }
        fs::create_dir_all(home.join(".geoapp")).unwrap();
        fs::write(root.join("built/index.html"), INDEX_TEMPLATE).unwrap();
        fs::write(root.join("built/app.min.js"), "var geoapp = {};").unwrap();
        fs::write(root.join("built/lib/bootstrap/fonts/glyph.woff"), "font").unwrap();
        fs::write(root.join("girder/static/built/app.min.js"), "var girder = {};").unwrap();
        let env_file = dir.path().join("env.cfg");
        Self { _dir: dir, root, home, env_file }
    }

    pub fn write(&self, path: &Path, content: &str) {
        fs::write(path, content).unwrap();
    }

    pub fn dist(&self) -> PathBuf {
        self.root.join("conf/geoapp.dist.cfg")
    }

    pub fn local(&self) -> PathBuf {
        self.root.join("conf/geoapp.local.cfg")
    }

    pub fn user(&self) -> PathBuf {
        self.home.join(".geoapp/geoapp.cfg")
    }

    pub fn cascade(&self) -> ConfigCascade {
        ConfigCascade::standard(&self.root, Some(&self.home), Some(self.env_file.clone()))
    }

    pub fn host(&self) -> BuiltinHost {
        BuiltinHost::new(self.root.join("girder/static")).with_plugin(DatasetsPlugin::default())
    }

    pub fn server(&self) -> HttpServer {
        let host = self.host();
        let bootstrap = Bootstrap::with_cascade(&self.root, &host, self.cascade());
        let (config, _) = bootstrap.load_config().unwrap();
        bootstrap.build_server(&host, config).unwrap()
    }
}

/// Issue a GET against the router in-process.
#[allow(dead_code)]
pub async fn get(router: &Router, uri: &str) -> (StatusCode, String) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8_lossy(&body).into_owned())
}
