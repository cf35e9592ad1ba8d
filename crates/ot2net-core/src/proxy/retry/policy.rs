use ot2net_types::RetryConfig;
use std::time::Duration;

/// Bounded exponential backoff without jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay_ms: u64,
}

impl RetryPolicy {
    /// `max_retries` counts attempts, first try included; zero is treated as one.
    pub const fn new(max_retries: u32, base_delay_ms: u64) -> Self {
        let max_retries = if max_retries == 0 { 1 } else { max_retries };
        Self { max_retries, base_delay_ms }
    }

    pub const fn max_attempts(&self) -> u32 {
        self.max_retries
    }

    pub const fn base_delay_ms(&self) -> u64 {
        self.base_delay_ms
    }

    /// Delay slept after the failed attempt `attempt` (0-indexed): `base * 2^attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.base_delay_ms.saturating_mul(2_u64.saturating_pow(attempt)))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(RetryConfig::default())
    }
}

impl From<RetryConfig> for RetryPolicy {
    fn from(config: RetryConfig) -> Self {
        Self::new(config.max_retries, config.base_delay_ms)
    }
}
