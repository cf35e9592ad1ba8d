//! Core domain models for the ot2net gateway.

mod audit;
mod config;
mod messages;

// Re-export all models
pub use audit::{UpstreamCallRecord, UsageSummary};
pub use config::{
    AnthropicConfig, AuditConfig, EdgeConfig, GatewayConfig, RateLimitConfig, RetryConfig,
};
pub use messages::{
    AiCompletion, ChatMessage, ChatRole, ContentBlock, MessageRequest, MessageResponse,
    TokenUsage,
};
