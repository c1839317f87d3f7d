//! Geoapp server.
//!
//! # Architecture Overview
//!
//! ```text
//!   conf/geoapp.dist.cfg ─┐
//!   conf/geoapp.local.cfg ┤
//!   /etc/geoapp.cfg ──────┼─▶ CascadingLoader ─▶ EffectiveConfig
//!   ~/.geoapp/geoapp.cfg ─┤        (wraps host base loader)   │
//!   $GEOAPP_CONFIG ───────┘                                    │
//!                       ┌──────────────────────────────────────┤
//!                       ▼                                      ▼
//!                 page (variables,                 mount (host tree at /girder,
//!                 datasets, cache) ─▶ /            API moved to /api, statics)
//! ```
//!
//! Runs until SIGINT or SIGTERM.

use geoapp::host::{BuiltinHost, DatasetsPlugin};
use geoapp::lifecycle::{install_root, signals, Bootstrap, Shutdown};
use geoapp::observability::logging;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let root = install_root();
    let host = BuiltinHost::new(root.join("girder").join("static")).with_plugin(DatasetsPlugin::default());

    let bootstrap = Bootstrap::new(&root, &host);
    let (config, logging_settings) = bootstrap.load_config()?;
    logging::init(&logging_settings)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), root = %root.display(), "geoapp starting");

    let server = bootstrap.build_server(&host, config)?;
    let bind_address = server.settings().bind_address.clone();
    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_listener(shutdown.clone());
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
