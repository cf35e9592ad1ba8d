//! Request-path components: edge relay, admission middleware, retries and AI calls.

pub mod edge;
pub mod middleware;
pub mod retry;
pub mod upstream;

pub use edge::{build_edge_router, EdgeProxy, ProxyRequestContext};
pub use middleware::{cors_layer, rate_limit_middleware, FixedWindowLimiter, RateLimitDecision};
pub use retry::{retry_with_backoff, RetryPolicy};
pub use upstream::{AiCallService, AnthropicClient, MessageOptions, MessagesBackend, ModelPricing};
