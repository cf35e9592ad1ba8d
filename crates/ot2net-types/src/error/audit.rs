//! Audit log errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while persisting or reading AI call audit records.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum AuditError {
    /// Backing store could not be opened or initialised
    #[error("Audit store unavailable: {message}")]
    Unavailable {
        /// Description of the failure
        message: String,
    },

    /// A write was rejected by the store
    #[error("Audit write failed: {message}")]
    WriteFailed {
        /// Description of the failure
        message: String,
    },

    /// A read/aggregation query failed
    #[error("Audit query failed: {message}")]
    QueryFailed {
        /// Description of the failure
        message: String,
    },
}
