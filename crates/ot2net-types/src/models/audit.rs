//! AI call audit models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::messages::TokenUsage;

/// One persisted outcome of a logical AI call (retries are not recorded separately).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpstreamCallRecord {
    pub id: String,
    /// Business feature that issued the call (e.g. `processamento-ia`)
    pub feature: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    /// Estimated cost in USD
    pub cost: f64,
    pub succeeded: bool,
    pub error_message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl UpstreamCallRecord {
    /// Record for a call that returned a response.
    pub fn success(feature: impl Into<String>, usage: TokenUsage, cost: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            feature: feature.into(),
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            cost,
            succeeded: true,
            error_message: None,
            timestamp: Utc::now(),
        }
    }

    /// Record for a call that ended in an error. Tokens and cost are zero.
    pub fn failure(feature: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            feature: feature.into(),
            input_tokens: 0,
            output_tokens: 0,
            cost: 0.0,
            succeeded: false,
            error_message: Some(error_message.into()),
            timestamp: Utc::now(),
        }
    }
}

/// Aggregate over audit records.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UsageSummary {
    pub total_calls: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_cost: f64,
    /// Lower bound of the aggregation window, if any
    pub since: Option<DateTime<Utc>>,
}

impl UsageSummary {
    /// Share of calls that succeeded, in percent.
    pub fn success_rate(&self) -> f64 {
        if self.total_calls == 0 {
            return 0.0;
        }
        #[allow(
            clippy::cast_precision_loss,
            clippy::as_conversions,
            reason = "intentional precision loss for percentage calculation"
        )]
        let rate = (self.succeeded as f64 / self.total_calls as f64) * 100.0;
        rate
    }
}
