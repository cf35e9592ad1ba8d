//! Audited, retried AI calls for business handlers.

use std::sync::Arc;
use std::time::Instant;

use ot2net_types::{
    AiCompletion, AnthropicConfig, ChatMessage, MessageRequest, UpstreamCallRecord, UpstreamError,
};
use tracing::{error, info};

use super::client::MessagesBackend;
use super::pricing::ModelPricing;
use crate::error::{AppError, AppResult};
use crate::modules::audit_db::AuditLog;
use crate::proxy::retry::{retry_with_backoff, RetryPolicy};

/// Display name used in caller-facing failures.
pub const VENDOR_NAME: &str = "Claude";

/// Per-call overrides. `None` falls back to the service defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageOptions {
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub system: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallDefaults {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl From<&AnthropicConfig> for CallDefaults {
    fn from(config: &AnthropicConfig) -> Self {
        Self {
            model: config.default_model.clone(),
            max_tokens: config.default_max_tokens,
            temperature: config.default_temperature,
        }
    }
}

impl Default for CallDefaults {
    fn default() -> Self {
        Self::from(&AnthropicConfig::default())
    }
}

/// Wraps a [`MessagesBackend`] with retry, cost accounting and auditing.
///
/// Every call to [`send_message`](Self::send_message) writes exactly one
/// audit record, whatever the number of attempts.
#[derive(Clone)]
pub struct AiCallService {
    backend: Arc<dyn MessagesBackend>,
    audit: Arc<dyn AuditLog>,
    retry_policy: RetryPolicy,
    defaults: CallDefaults,
}

impl AiCallService {
    pub fn new(
        backend: Arc<dyn MessagesBackend>,
        audit: Arc<dyn AuditLog>,
        retry_policy: RetryPolicy,
        defaults: CallDefaults,
    ) -> Self {
        Self { backend, audit, retry_policy, defaults }
    }

    pub fn build_request(&self, messages: Vec<ChatMessage>, options: MessageOptions) -> MessageRequest {
        MessageRequest {
            model: options.model.unwrap_or_else(|| self.defaults.model.clone()),
            max_tokens: options.max_tokens.unwrap_or(self.defaults.max_tokens),
            temperature: options.temperature.unwrap_or(self.defaults.temperature),
            system: options.system,
            messages,
        }
    }

    /// Send one logical request, retrying transient failures.
    pub async fn send_message(
        &self,
        feature: &str,
        messages: Vec<ChatMessage>,
        options: MessageOptions,
    ) -> AppResult<AiCompletion> {
        let request = self.build_request(messages, options);
        let started = Instant::now();
        let backend = self.backend.as_ref();

        let outcome =
            retry_with_backoff(&self.retry_policy, feature, || backend.create_message(&request))
                .await;

        match outcome {
            Ok(response) => {
                let usage = response.usage;
                let cost = ModelPricing::for_model(&request.model)
                    .cost(usage.input_tokens, usage.output_tokens);

                self.record_best_effort(UpstreamCallRecord::success(feature, usage, cost)).await;

                info!(
                    feature,
                    model = %request.model,
                    input_tokens = usage.input_tokens,
                    output_tokens = usage.output_tokens,
                    cost,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Claude API call completed"
                );

                Ok(AiCompletion { content: response.content, usage, cost })
            },
            Err(err) => {
                self.record_failure(feature, &err).await;
                Err(AppError::upstream(VENDOR_NAME, &err))
            },
        }
    }

    async fn record_failure(&self, feature: &str, err: &UpstreamError) {
        self.record_best_effort(UpstreamCallRecord::failure(feature, err.message.clone())).await;
        error!(
            feature,
            kind = ?err.kind,
            error = %err,
            "Claude API call failed"
        );
    }

    /// Audit writes never change the outcome of a call.
    async fn record_best_effort(&self, record: UpstreamCallRecord) {
        if let Err(e) = self.audit.record(&record).await {
            error!(feature = %record.feature, error = %e, "Failed to record AI call");
        }
    }
}

impl std::fmt::Debug for AiCallService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiCallService")
            .field("retry_policy", &self.retry_policy)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}
