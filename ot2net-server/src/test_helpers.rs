//! Test helpers for ot2net-server unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;

use ot2net_core::modules::audit_db::SqliteAuditLog;
use ot2net_core::proxy::upstream::{AiCallService, CallDefaults, MessagesBackend};
use ot2net_core::proxy::{FixedWindowLimiter, RetryPolicy};
use ot2net_types::{
    ContentBlock, GatewayConfig, MessageRequest, MessageResponse, RateLimitConfig, TokenUsage,
    UpstreamError,
};

use crate::state::AppState;

/// Backend answering every request with the same outcome.
pub struct StubBackend {
    outcome: Result<MessageResponse, UpstreamError>,
    calls: AtomicUsize,
}

impl StubBackend {
    pub fn ok(text: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(MessageResponse {
                id: "msg_stub".to_string(),
                model: "claude-3-5-sonnet-20241022".to_string(),
                content: vec![ContentBlock::text(text)],
                stop_reason: Some("end_turn".to_string()),
                usage: TokenUsage { input_tokens: 1000, output_tokens: 1000 },
            }),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(error: UpstreamError) -> Arc<Self> {
        Arc::new(Self { outcome: Err(error), calls: AtomicUsize::new(0) })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessagesBackend for StubBackend {
    async fn create_message(
        &self,
        _request: &MessageRequest,
    ) -> Result<MessageResponse, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

/// Create an `AppState` backed by `backend` and a temp SQLite audit log.
///
/// Returns `(AppState, TempDir)`; keep `TempDir` alive for the test duration.
pub fn test_app_state_with(
    backend: Arc<StubBackend>,
    rate_limit: RateLimitConfig,
) -> (AppState, TempDir) {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let audit = SqliteAuditLog::open(&temp_dir.path().join("ai_calls.db"))
        .expect("failed to open audit log");

    let config = GatewayConfig { rate_limit, ..GatewayConfig::default() };
    let ai = AiCallService::new(
        backend,
        Arc::new(audit.clone()),
        RetryPolicy::new(3, 0),
        CallDefaults::from(&config.anthropic),
    );
    let limiter = FixedWindowLimiter::new(rate_limit);

    (AppState::new_with_components(config, ai, audit, limiter), temp_dir)
}

pub fn test_app_state(backend: Arc<StubBackend>) -> (AppState, TempDir) {
    test_app_state_with(backend, RateLimitConfig::default())
}
