//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → request.rs (x-request-id)
//!     → server.rs (trace span, timeout, body limit)
//!     → mounted router (landing page, host tree, API, static fallback)
//! ```

pub mod request;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
