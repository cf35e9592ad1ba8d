//! Admission control and retry settings.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Fixed-window rate limit applied per client address.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct RateLimitConfig {
    /// Window length in milliseconds
    #[validate(range(min = 1_u64))]
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
    /// Requests admitted per key within one window
    #[validate(range(min = 1_u32))]
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
}

const fn default_window_ms() -> u64 {
    15 * 60 * 1000
}

const fn default_max_requests() -> u32 {
    100
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { window_ms: default_window_ms(), max_requests: default_max_requests() }
    }
}

/// Exponential backoff for AI vendor calls.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct RetryConfig {
    /// Total attempts per logical call (first try included)
    #[validate(range(min = 1_u32, max = 10_u32))]
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Delay before the second attempt; doubles afterwards
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_base_delay_ms() -> u64 {
    1000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_retries: default_max_retries(), base_delay_ms: default_base_delay_ms() }
    }
}
