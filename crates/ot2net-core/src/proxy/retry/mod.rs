//! Retry engine for AI vendor calls.
//!
//! Client errors (4xx) end the loop immediately. Transient and connection
//! errors are retried with `base * 2^n` backoff until the attempt budget is
//! spent, then the last error is returned. The sleep is a suspension point:
//! other requests keep running, and an abandoned caller is not observed.

mod policy;

pub use policy::RetryPolicy;

use ot2net_types::UpstreamError;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Delay before the attempt following the failed attempt `attempt` (0-indexed).
pub fn backoff_delay(policy: &RetryPolicy, attempt: u32) -> Duration {
    policy.delay_for(attempt)
}

/// Run `op` until it succeeds, fails with a client error, or runs out of attempts.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut op: F,
) -> Result<T, UpstreamError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, UpstreamError>>,
{
    let max_attempts = policy.max_attempts();
    let mut attempt: u32 = 0;

    loop {
        match op().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!(label, attempt = attempt + 1, "Upstream call succeeded after retry");
                }
                return Ok(value);
            },
            Err(err) if !err.is_retryable() => {
                debug!(label, status = ?err.status(), "Non-retryable upstream error, stopping");
                return Err(err);
            },
            Err(err) => {
                if attempt.saturating_add(1) >= max_attempts {
                    warn!(label, attempts = max_attempts, error = %err, "Retry budget exhausted");
                    return Err(err);
                }

                let delay = backoff_delay(policy, attempt);
                warn!(
                    label,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Retrying upstream call"
                );
                sleep(delay).await;
                attempt += 1;
            },
        }
    }
}
