//! Geoapp server library.
//!
//! Bootstraps the application on top of a pluggable framework host: merges
//! the configuration cascade, renders the landing page from it, and grafts
//! the host's route tree (moving its API one level up) under `/`.

pub mod config;
pub mod host;
pub mod http;
pub mod lifecycle;
pub mod mount;
pub mod observability;
pub mod page;

pub use config::EffectiveConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
