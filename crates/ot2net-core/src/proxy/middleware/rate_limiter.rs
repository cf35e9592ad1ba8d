//! Fixed-window admission control keyed by client address.
//!
//! The counting map is owned by [`FixedWindowLimiter`] and injected into the
//! router as middleware state, so every server instance (and every test) gets
//! its own store. Increments on one key are atomic per map shard, but the
//! sweep and the check are separate passes: counts are best-effort and only
//! meaningful within a single process.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use ot2net_types::RateLimitConfig;
use std::net::SocketAddr;
use std::sync::Arc;

/// Key shared by every client whose address cannot be determined.
pub const UNKNOWN_CLIENT_KEY: &str = "unknown";

pub const HEADER_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const HEADER_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub const HEADER_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Per-key counter for the active window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    pub count: u32,
    pub window_reset_at: DateTime<Utc>,
}

/// Backing map of the limiter.
pub type RateLimitStore = DashMap<String, RateLimitEntry>;

/// Outcome of one admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed { limit: u32, remaining: u32, reset_at: DateTime<Utc> },
    Limited { limit: u32, reset_at: DateTime<Utc>, retry_after_secs: u64 },
}

impl RateLimitDecision {
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

#[derive(Clone)]
pub struct FixedWindowLimiter {
    config: RateLimitConfig,
    store: Arc<RateLimitStore>,
}

impl FixedWindowLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_store(config, Arc::new(DashMap::new()))
    }

    /// Build a limiter over an externally owned store.
    pub fn with_store(config: RateLimitConfig, store: Arc<RateLimitStore>) -> Self {
        Self { config, store }
    }

    pub const fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Number of keys with an active window.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Current entry for `key`, if any.
    pub fn entry(&self, key: &str) -> Option<RateLimitEntry> {
        self.store.get(key).map(|e| *e)
    }

    /// Drop every counter, returning how many keys were tracked.
    pub fn clear(&self) -> usize {
        let tracked = self.store.len();
        self.store.clear();
        tracked
    }

    pub fn check(&self, key: &str) -> RateLimitDecision {
        self.check_at(key, Utc::now())
    }

    /// Admission check against an explicit clock reading.
    pub fn check_at(&self, key: &str, now: DateTime<Utc>) -> RateLimitDecision {
        self.sweep(now);

        let limit = self.config.max_requests;
        let fresh_reset = self.window_end(now);

        match self.store.entry(key.to_string()) {
            Entry::Vacant(vacant) => {
                vacant.insert(RateLimitEntry { count: 1, window_reset_at: fresh_reset });
                RateLimitDecision::Allowed {
                    limit,
                    remaining: limit.saturating_sub(1),
                    reset_at: fresh_reset,
                }
            },
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();

                // Another request may have inserted between the sweep and here.
                if entry.window_reset_at <= now {
                    *entry = RateLimitEntry { count: 1, window_reset_at: fresh_reset };
                    return RateLimitDecision::Allowed {
                        limit,
                        remaining: limit.saturating_sub(1),
                        reset_at: fresh_reset,
                    };
                }

                entry.count = entry.count.saturating_add(1);

                if entry.count > limit {
                    RateLimitDecision::Limited {
                        limit,
                        reset_at: entry.window_reset_at,
                        retry_after_secs: retry_after_secs(entry.window_reset_at, now),
                    }
                } else {
                    RateLimitDecision::Allowed {
                        limit,
                        remaining: limit - entry.count,
                        reset_at: entry.window_reset_at,
                    }
                }
            },
        }
    }

    /// Remove every entry whose window has ended.
    fn sweep(&self, now: DateTime<Utc>) {
        self.store.retain(|_, entry| entry.window_reset_at > now);
    }

    fn window_end(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let window_ms = i64::try_from(self.config.window_ms).unwrap_or(i64::MAX);
        TimeDelta::try_milliseconds(window_ms)
            .and_then(|window| now.checked_add_signed(window))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Whole seconds until `reset_at`, rounded up.
fn retry_after_secs(reset_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = reset_at.signed_duration_since(now).num_milliseconds().max(0) as u64;
    millis.div_ceil(1000)
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
pub fn format_reset(reset_at: DateTime<Utc>) -> String {
    reset_at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Limiter key for a request: the peer IP as seen by the server.
pub fn client_key(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT_KEY.to_string())
}

pub async fn rate_limit_middleware(
    State(limiter): State<FixedWindowLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_key(&request);

    match limiter.check(&key) {
        RateLimitDecision::Limited { limit, reset_at, retry_after_secs } => {
            tracing::warn!(
                key = %key,
                method = %request.method(),
                path = %request.uri().path(),
                retry_after_secs,
                "Rate limit exceeded"
            );
            limited_response(limit, reset_at, retry_after_secs)
        },
        RateLimitDecision::Allowed { limit, remaining, reset_at } => {
            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            headers.insert(HEADER_LIMIT, HeaderValue::from(limit));
            headers.insert(HEADER_REMAINING, HeaderValue::from(remaining));
            if let Ok(value) = HeaderValue::from_str(&format_reset(reset_at)) {
                headers.insert(HEADER_RESET, value);
            }
            response
        },
    }
}

fn limited_response(limit: u32, reset_at: DateTime<Utc>, retry_after_secs: u64) -> Response {
    let body = serde_json::json!({
        "error": "Muitas requisições",
        "message": format!(
            "Limite de {} requisições excedido. Tente novamente após {}",
            limit,
            format_reset(reset_at)
        ),
        "retryAfter": retry_after_secs,
    });
    (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, routing::get, Router};
    use chrono::TimeZone;
    use tower::ServiceExt;

    fn limiter(window_ms: u64, max_requests: u32) -> FixedWindowLimiter {
        FixedWindowLimiter::new(RateLimitConfig { window_ms, max_requests })
    }

    fn at(ms: i64) -> DateTime<Utc> {
        match Utc.timestamp_millis_opt(1_700_000_000_000 + ms) {
            chrono::LocalResult::Single(t) => t,
            _ => panic!("invalid test timestamp"),
        }
    }

    #[test]
    fn test_first_request_is_admitted_with_count_one() {
        let limiter = limiter(60_000, 5);
        let decision = limiter.check_at("10.0.0.1", at(0));

        assert_eq!(
            decision,
            RateLimitDecision::Allowed { limit: 5, remaining: 4, reset_at: at(60_000) }
        );
        assert_eq!(limiter.entry("10.0.0.1").map(|e| e.count), Some(1));
    }

    #[test]
    fn test_window_scenario_rollover() {
        let limiter = limiter(1000, 2);

        assert!(limiter.check_at("A", at(0)).is_allowed());
        assert!(limiter.check_at("A", at(0)).is_allowed());
        assert_eq!(
            limiter.check_at("A", at(0)),
            RateLimitDecision::Limited { limit: 2, reset_at: at(1000), retry_after_secs: 1 }
        );

        let decision = limiter.check_at("A", at(1001));
        assert!(decision.is_allowed());
        assert_eq!(limiter.entry("A").map(|e| e.count), Some(1));
    }

    #[test]
    fn test_max_requests_admitted_then_rejected() {
        let limiter = limiter(60_000, 10);
        for i in 0..10 {
            assert!(limiter.check_at("k", at(i)).is_allowed(), "request {} rejected", i + 1);
        }
        assert!(!limiter.check_at("k", at(10)).is_allowed());
    }

    #[test]
    fn test_retry_after_rounds_up() {
        let limiter = limiter(10_000, 1);
        limiter.check_at("k", at(0));
        match limiter.check_at("k", at(2_500)) {
            RateLimitDecision::Limited { retry_after_secs, .. } => assert_eq!(retry_after_secs, 8),
            other => panic!("expected Limited, got {:?}", other),
        }
    }

    #[test]
    fn test_sweep_purges_expired_keys() {
        let limiter = limiter(1000, 5);
        limiter.check_at("a", at(0));
        limiter.check_at("b", at(500));
        assert_eq!(limiter.len(), 2);

        limiter.check_at("c", at(1200));
        assert!(limiter.entry("a").is_none());
        assert!(limiter.entry("b").is_some());
        assert!(limiter.entry("c").is_some());
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = limiter(60_000, 1);
        assert!(limiter.check_at("a", at(0)).is_allowed());
        assert!(!limiter.check_at("a", at(1)).is_allowed());
        assert!(limiter.check_at("b", at(2)).is_allowed());
    }

    #[test]
    fn test_shared_store_is_visible_to_both_limiters() {
        let store = Arc::new(RateLimitStore::new());
        let config = RateLimitConfig { window_ms: 60_000, max_requests: 1 };
        let first = FixedWindowLimiter::with_store(config, store.clone());
        let second = FixedWindowLimiter::with_store(config, store);

        assert!(first.check_at("k", at(0)).is_allowed());
        assert!(!second.check_at("k", at(1)).is_allowed());
    }

    #[test]
    fn test_format_reset_is_iso_millis() {
        assert_eq!(format_reset(at(0)), "2023-11-14T22:13:20.000Z");
    }

    fn app(limiter: FixedWindowLimiter) -> Router {
        Router::new()
            .route("/api/ping", get(|| async { "pong" }))
            .layer(axum::middleware::from_fn_with_state(limiter, rate_limit_middleware))
    }

    fn request_from(addr: &str) -> Request {
        let mut request = axum::http::Request::builder()
            .uri("/api/ping")
            .body(Body::empty())
            .unwrap_or_else(|e| panic!("request build failed: {}", e));
        if let Ok(addr) = addr.parse::<SocketAddr>() {
            request.extensions_mut().insert(ConnectInfo(addr));
        }
        request
    }

    #[tokio::test]
    async fn test_middleware_sets_headers_on_admitted_requests() {
        let app = app(limiter(60_000, 3));

        let response = app
            .oneshot(request_from("192.168.1.10:5000"))
            .await
            .unwrap_or_else(|e| panic!("request failed: {}", e));

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[HEADER_LIMIT], "3");
        assert_eq!(response.headers()[HEADER_REMAINING], "2");
        assert!(response.headers().contains_key(HEADER_RESET));
    }

    #[tokio::test]
    async fn test_middleware_rejects_with_429_body() {
        let limiter = limiter(60_000, 1);
        let app = app(limiter.clone());

        let first = app.clone().oneshot(request_from("192.168.1.10:5000")).await;
        assert_eq!(first.map(|r| r.status()).ok(), Some(StatusCode::OK));

        let response = app
            .oneshot(request_from("192.168.1.10:6000"))
            .await
            .unwrap_or_else(|e| panic!("request failed: {}", e));
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(!response.headers().contains_key(HEADER_LIMIT));

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_else(|e| panic!("body read failed: {}", e));
        let body: serde_json::Value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|e| panic!("body is not JSON: {}", e));
        assert_eq!(body["error"], "Muitas requisições");
        assert_eq!(body["retryAfter"], 60);
        let message = body["message"].as_str().unwrap_or_default();
        assert!(message.starts_with("Limite de 1 requisições excedido. Tente novamente após "));
        assert!(message.ends_with('Z'));
    }

    #[tokio::test]
    async fn test_middleware_falls_back_to_shared_unknown_key() {
        let limiter = limiter(60_000, 1);
        let app = app(limiter.clone());

        let request = axum::http::Request::builder()
            .uri("/api/ping")
            .body(Body::empty())
            .unwrap_or_else(|e| panic!("request build failed: {}", e));
        let _ = app.oneshot(request).await;

        assert_eq!(limiter.entry(UNKNOWN_CLIENT_KEY).map(|e| e.count), Some(1));
    }
}
