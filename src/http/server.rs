//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Install the landing page at `/` unless a plugin claimed it
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Serve the mounted router until shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::schema::section;
use crate::config::{ConfigError, EffectiveConfig, ServerSettings};
use crate::http::request::{UuidRequestId, X_REQUEST_ID};
use crate::mount::{IndexHandler, MountContext};
use crate::page::PageCache;

/// State behind the landing page handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EffectiveConfig>,
    pub page: Arc<PageCache>,
}

pub struct HttpServer {
    router: Router,
    settings: ServerSettings,
}

impl HttpServer {
    /// Build the server from a finished mount context.
    pub fn new(mut ctx: MountContext, page: PageCache) -> Result<Self, ConfigError> {
        let settings: ServerSettings = section(&ctx.effective, "server")?;
        let state = AppState {
            config: Arc::new(ctx.effective.clone()),
            page: Arc::new(page),
        };

        if ctx.server_root.has_index() {
            tracing::info!("Root index provided by a plugin; landing page not installed");
        } else {
            ctx.server_root
                .set_index(IndexHandler::fixed(get(landing_page).with_state(state)));
        }

        let router = Self::build_router(&settings, ctx.into_router());
        Ok(Self { router, settings })
    }

    /// Apply the middleware stack to the mounted routes.
    #[allow(deprecated)]
    fn build_router(settings: &ServerSettings, app: Router) -> Router {
        let mut app = app.layer(RequestBodyLimitLayer::new(settings.max_body_bytes));
        if let Some(secs) = settings.request_timeout_secs {
            app = app.layer(TimeoutLayer::new(Duration::from_secs(secs)));
        }
        app.layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get(X_REQUEST_ID)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id,
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn settings(&self) -> &ServerSettings {
        &self.settings
    }

    /// Serve until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn landing_page(State(state): State<AppState>) -> Response {
    match state.page.get_page(&state.config).await {
        Ok(page) => Html(page.to_owned()).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render landing page");
            (StatusCode::INTERNAL_SERVER_ERROR, "Landing page unavailable").into_response()
        }
    }
}
