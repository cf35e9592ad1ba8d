//! Browser-facing `/api/*` relay to the backend origin.
//!
//! Requests are forwarded once, without caching or retries. Whatever the
//! origin answers (status, headers, body bytes) is handed back unchanged;
//! only transport failures are turned into a local 500.

use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderMap, HeaderName, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use ot2net_types::EdgeConfig;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Largest inbound body the edge accepts.
pub const MAX_BODY_BYTES: usize = 100 * 1024 * 1024;

const CONNECTION_ERROR: &str = "Backend Connection Error";

/// Connection-scoped headers that must not cross the relay.
const HOP_BY_HOP: [&str; 7] = [
    "connection",
    "transfer-encoding",
    "upgrade",
    "te",
    "trailer",
    "proxy-authorization",
    "keep-alive",
];

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let hop: Vec<HeaderName> = headers.keys().filter(|name| is_hop_by_hop(name)).cloned().collect();
    for name in hop {
        headers.remove(name);
    }
}

/// A request as it will be sent to the origin.
#[derive(Debug, Clone)]
pub struct ProxyRequestContext {
    pub method: Method,
    /// Inbound path, starting with `/api`
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl ProxyRequestContext {
    /// Strip `host`, `content-length` and hop-by-hop headers; drop the body for GET/HEAD.
    pub fn from_parts(method: Method, uri: &Uri, mut headers: HeaderMap, body: Bytes) -> Self {
        headers.remove(header::HOST);
        headers.remove(header::CONTENT_LENGTH);
        strip_hop_by_hop(&mut headers);

        let body = if method == Method::GET || method == Method::HEAD { None } else { Some(body) };

        Self {
            method,
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            headers,
            body,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EdgeProxy {
    client: reqwest::Client,
    upstream_origin: String,
}

impl EdgeProxy {
    pub fn new(client: reqwest::Client, upstream_origin: &str) -> Self {
        Self { client, upstream_origin: upstream_origin.trim_end_matches('/').to_string() }
    }

    pub fn from_config(config: &EdgeConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self::new(client, &config.upstream_origin))
    }

    /// `<origin><path>` plus `?<query>` when the inbound request had one.
    pub fn target_url(&self, path: &str, query: Option<&str>) -> String {
        match query {
            Some(qs) => format!("{}{}?{}", self.upstream_origin, path, qs),
            None => format!("{}{}", self.upstream_origin, path),
        }
    }

    pub async fn forward(&self, ctx: ProxyRequestContext) -> Response {
        let url = self.target_url(&ctx.path, ctx.query.as_deref());
        info!(method = %ctx.method, url = %url, "Forwarding request to backend");

        let mut request = self.client.request(ctx.method, &url).headers(ctx.headers);
        if let Some(body) = ctx.body {
            request = request.body(body);
        }

        let upstream = match request.send().await {
            Ok(resp) => resp,
            Err(e) => return connection_error(&url, &e),
        };

        let status = upstream.status();
        let mut headers = upstream.headers().clone();
        let bytes = match upstream.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return connection_error(&url, &e),
        };

        if !status.is_success() {
            error!(
                status = status.as_u16(),
                url = %url,
                body = %String::from_utf8_lossy(&bytes),
                "Backend returned error"
            );
        }

        strip_hop_by_hop(&mut headers);

        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}

fn connection_error(url: &str, err: &reqwest::Error) -> Response {
    error!(url = %url, error = %err, "Critical error connecting to backend");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": CONNECTION_ERROR, "details": err.to_string() })),
    )
        .into_response()
}

async fn edge_handler(
    State(proxy): State<EdgeProxy>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    proxy.forward(ProxyRequestContext::from_parts(method, &uri, headers, body)).await
}

/// Router relaying `/api` and everything below it.
pub fn build_edge_router(proxy: EdgeProxy) -> Router {
    Router::new()
        .route("/api", any(edge_handler))
        .route("/api/*path", any(edge_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(proxy)
}
