//! Static directory serving by longest matching path prefix.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::OriginalUri;
use axum::http::{Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::ServeDir;

#[derive(Debug, Clone, Default)]
pub struct StaticRules {
    rules: Arc<Vec<(String, PathBuf)>>,
}

impl StaticRules {
    pub fn new(rules: Vec<(String, PathBuf)>) -> Self {
        let mut rules: Vec<(String, PathBuf)> = rules
            .into_iter()
            .map(|(prefix, dir)| (format!("/{}", prefix.trim_matches('/')), dir))
            .collect();
        rules.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        Self { rules: Arc::new(rules) }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The directory and remaining path for `path`, using the longest prefix.
    pub fn matching(&self, path: &str) -> Option<(&PathBuf, String)> {
        self.rules.iter().find_map(|(prefix, dir)| {
            let rest = if prefix == "/" {
                Some(path)
            } else {
                path.strip_prefix(prefix.as_str())
                    .filter(|rest| rest.is_empty() || rest.starts_with('/'))
            }?;
            let rest = if rest.is_empty() { "/" } else { rest };
            Some((dir, rest.to_string()))
        })
    }

    /// Serve `request` from the matching directory.
    ///
    /// Matches on the original URI so requests reaching this as the fallback
    /// of a nested router still see their full path.
    pub async fn serve(&self, request: Request<Body>) -> Response {
        let uri = request
            .extensions()
            .get::<OriginalUri>()
            .map(|original| original.0.clone())
            .unwrap_or_else(|| request.uri().clone());
        let Some((dir, rest)) = self.matching(uri.path()) else {
            return StatusCode::NOT_FOUND.into_response();
        };
        let dir = dir.clone();

        let (mut parts, body) = request.into_parts();
        let rewritten = match uri.query() {
            Some(query) => format!("{rest}?{query}"),
            None => rest,
        };
        parts.uri = match rewritten.parse::<Uri>() {
            Ok(uri) => uri,
            Err(_) => return StatusCode::BAD_REQUEST.into_response(),
        };

        match ServeDir::new(dir).oneshot(Request::from_parts(parts, body)).await {
            Ok(response) => response.into_response(),
            Err(never) => match never {},
        }
    }
}
