//! Application State
//!
//! Shared handles for the backend API: configuration, AI call wrapper,
//! audit log and the rate limiter store.

use anyhow::{Context, Result};
use std::sync::Arc;

use ot2net_core::modules::audit_db::{default_db_path, SqliteAuditLog};
use ot2net_core::proxy::upstream::{AiCallService, AnthropicClient, CallDefaults};
use ot2net_core::proxy::{FixedWindowLimiter, RetryPolicy};
use ot2net_types::GatewayConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

pub struct AppStateInner {
    pub config: GatewayConfig,
    pub ai: AiCallService,
    pub audit: SqliteAuditLog,
    pub limiter: FixedWindowLimiter,
}

impl AppState {
    /// Wire up production components from configuration.
    pub fn from_config(config: GatewayConfig) -> Result<Self> {
        let db_path = match config.audit.db_path.clone() {
            Some(path) => path,
            None => default_db_path().map_err(|e| anyhow::anyhow!(e))?,
        };
        let audit = SqliteAuditLog::open(&db_path)
            .with_context(|| format!("opening audit log at {}", db_path.display()))?;

        let client = AnthropicClient::from_config(&config.anthropic)
            .context("building Anthropic HTTP client")?;
        let ai = AiCallService::new(
            Arc::new(client),
            Arc::new(audit.clone()),
            RetryPolicy::from(config.retry),
            CallDefaults::from(&config.anthropic),
        );
        let limiter = FixedWindowLimiter::new(config.rate_limit);

        Ok(Self::new_with_components(config, ai, audit, limiter))
    }

    pub fn new_with_components(
        config: GatewayConfig,
        ai: AiCallService,
        audit: SqliteAuditLog,
        limiter: FixedWindowLimiter,
    ) -> Self {
        Self { inner: Arc::new(AppStateInner { config, ai, audit, limiter }) }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.inner.config
    }

    pub fn ai(&self) -> &AiCallService {
        &self.inner.ai
    }

    pub fn audit(&self) -> &SqliteAuditLog {
        &self.inner.audit
    }

    pub fn limiter(&self) -> &FixedWindowLimiter {
        &self.inner.limiter
    }
}
