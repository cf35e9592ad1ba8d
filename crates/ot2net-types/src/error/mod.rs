//! Typed error definitions for the ot2net gateway.
//!
//! Each domain gets its own enum so callers can match on the failure
//! instead of parsing messages. All of them serialize for API responses.

mod audit;
mod config;
mod upstream;

pub use audit::AuditError;
pub use config::ConfigError;
pub use upstream::{UpstreamError, UpstreamErrorKind};
