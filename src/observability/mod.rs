//! Observability subsystem.
//!
//! Structured logging via `tracing`; every request carries a span with its
//! method, path and request ID (see `http::server`).

pub mod logging;
