//! Gateway configuration models.

mod anthropic;
mod gateway;
mod limits;

pub use anthropic::{AnthropicConfig, AuditConfig};
pub use gateway::{EdgeConfig, GatewayConfig};
pub use limits::{RateLimitConfig, RetryConfig};
