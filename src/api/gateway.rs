//! Gateway: a stateless forwarder. A request whose path starts with a
//! registered prefix is sent to `<base_url><rest of path>[?query]` with its
//! method, body and content type unchanged, and the upstream status and body
//! are relayed as they are. No retries and no timeout.

use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderValue, Method, Uri, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::{debug, warn};

use super::routes::health;
use crate::config::GatewayConfig;
use crate::error::ApiError;

/// One registered prefix and the upstream it maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upstream {
    pub prefix: String,
    pub base_url: String,
}

impl Upstream {
    pub fn new(prefix: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// The path left after the prefix, or `None` if `path` is not under it.
    /// `/products` and `/products/1` match `/products`; `/productsx` does not.
    fn strip<'a>(&self, path: &'a str) -> Option<&'a str> {
        let rest = path.strip_prefix(self.prefix.as_str())?;
        (rest.is_empty() || rest.starts_with('/')).then_some(rest)
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpstreamTable {
    upstreams: Vec<Upstream>,
}

impl UpstreamTable {
    pub fn new(upstreams: Vec<Upstream>) -> Self {
        Self { upstreams }
    }

    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(vec![
            Upstream::new("/products", &config.product_service_url),
            Upstream::new("/auth", &config.user_service_url),
            Upstream::new("/orders", &config.order_service_url),
        ])
    }

    /// Upstream URL for an inbound request, keeping the query string.
    pub fn resolve(&self, uri: &Uri) -> Option<String> {
        let path = uri.path();
        self.upstreams.iter().find_map(|upstream| {
            let rest = upstream.strip(path)?;
            Some(match uri.query() {
                Some(query) => format!("{}{rest}?{query}", upstream.base_url),
                None => format!("{}{rest}", upstream.base_url),
            })
        })
    }
}

#[derive(Clone)]
pub struct GatewayState {
    client: reqwest::Client,
    table: Arc<UpstreamTable>,
}

impl GatewayState {
    pub fn new(table: UpstreamTable) -> Self {
        Self {
            client: reqwest::Client::new(),
            table: Arc::new(table),
        }
    }
}

pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(health))
        .fallback(forward)
        .with_state(state)
}

async fn forward(
    State(state): State<GatewayState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let Some(target) = state.table.resolve(&uri) else {
        return Err(ApiError::not_found("Route not found"));
    };
    debug!(%method, %uri, %target, "forwarding request");

    let mut request = state.client.request(method, &target);
    if let Some(content_type) = headers.get(CONTENT_TYPE) {
        request = request.header(CONTENT_TYPE, content_type.clone());
    }
    if !body.is_empty() {
        request = request.body(body);
    }

    let upstream = request.send().await.map_err(|e| {
        warn!(%target, error = %e, "upstream unreachable");
        ApiError::internal("Upstream request failed", e)
    })?;

    let status = upstream.status();
    let content_type: Option<HeaderValue> = upstream.headers().get(CONTENT_TYPE).cloned();
    let bytes = upstream
        .bytes()
        .await
        .map_err(|e| ApiError::internal("Upstream response could not be read", e))?;

    let mut response = (status, bytes).into_response();
    match content_type {
        Some(content_type) => response.headers_mut().insert(CONTENT_TYPE, content_type),
        None => response.headers_mut().remove(CONTENT_TYPE),
    };
    Ok(response)
}
