//! # ot2net Types
//!
//! Core types, models, and error definitions for the ot2net gateway.
//!
//! - **`error`** - Typed error hierarchy for upstream calls, configuration and auditing
//! - **`models`** - Domain models (gateway config, AI messages, audit records)
//!
//! ## Architecture Role
//!
//! `ot2net-types` sits at the bottom of the dependency graph:
//!
//! ```text
//!     ot2net-types (this crate)
//!             │
//!             ▼
//!       ot2net-core
//!             │
//!             ▼
//!      ot2net-server
//! ```
//!
//! Nothing in here performs I/O.

pub mod error;
pub mod models;

// Re-export error types for convenience
pub use error::{AuditError, ConfigError, UpstreamError, UpstreamErrorKind};

// Re-export core model types
pub use models::{
    AiCompletion, AnthropicConfig, AuditConfig, ChatMessage, ChatRole, ContentBlock, EdgeConfig,
    GatewayConfig, MessageRequest, MessageResponse, RateLimitConfig, RetryConfig, TokenUsage,
    UpstreamCallRecord, UsageSummary,
};
