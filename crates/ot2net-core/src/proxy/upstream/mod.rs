//! AI vendor access: HTTP client, pricing and the audited call wrapper.

pub mod client;
pub mod pricing;
pub mod service;

#[cfg(test)]
mod service_tests;

pub use client::{AnthropicClient, MessagesBackend};
pub use pricing::ModelPricing;
pub use service::{AiCallService, CallDefaults, MessageOptions, VENDOR_NAME};
