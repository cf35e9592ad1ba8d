//! Upstream (AI vendor) call errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed classification of an upstream failure.
///
/// Set once, where the vendor error is first observed. Retry decisions branch
/// on this instead of probing status codes again.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UpstreamErrorKind {
    /// 4xx from the vendor. Never retried.
    Client {
        /// HTTP status returned by the vendor
        status: u16,
    },
    /// 5xx or an otherwise unusable response. Retried.
    Transient {
        /// HTTP status when one was received
        status: Option<u16>,
    },
    /// The request never produced a response (DNS, connect, timeout).
    Connection,
}

/// Error produced by a single upstream call attempt.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[error("{message}")]
pub struct UpstreamError {
    /// Classification driving the retry policy
    pub kind: UpstreamErrorKind,
    /// Human-readable detail, safe to surface to callers
    pub message: String,
}

impl UpstreamError {
    /// Client error (4xx).
    pub fn client(status: u16, message: impl Into<String>) -> Self {
        Self { kind: UpstreamErrorKind::Client { status }, message: message.into() }
    }

    /// Transient error (5xx, undecodable response).
    pub fn transient(status: Option<u16>, message: impl Into<String>) -> Self {
        Self { kind: UpstreamErrorKind::Transient { status }, message: message.into() }
    }

    /// Connection-level failure.
    pub fn connection(message: impl Into<String>) -> Self {
        Self { kind: UpstreamErrorKind::Connection, message: message.into() }
    }

    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        if (400..500).contains(&status) {
            Self::client(status, message)
        } else {
            Self::transient(Some(status), message)
        }
    }

    /// HTTP status carried by this error, if any.
    pub const fn status(&self) -> Option<u16> {
        match self.kind {
            UpstreamErrorKind::Client { status } => Some(status),
            UpstreamErrorKind::Transient { status } => status,
            UpstreamErrorKind::Connection => None,
        }
    }

    /// Check if another attempt may succeed.
    pub const fn is_retryable(&self) -> bool {
        !matches!(self.kind, UpstreamErrorKind::Client { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_classification() {
        assert_eq!(
            UpstreamError::from_status(404, "x").kind,
            UpstreamErrorKind::Client { status: 404 }
        );
        assert_eq!(
            UpstreamError::from_status(400, "x").kind,
            UpstreamErrorKind::Client { status: 400 }
        );
        assert_eq!(
            UpstreamError::from_status(503, "x").kind,
            UpstreamErrorKind::Transient { status: Some(503) }
        );
        assert_eq!(
            UpstreamError::from_status(500, "x").kind,
            UpstreamErrorKind::Transient { status: Some(500) }
        );
    }

    #[test]
    fn test_is_retryable() {
        assert!(!UpstreamError::client(429, "slow down").is_retryable());
        assert!(UpstreamError::transient(Some(529), "overloaded").is_retryable());
        assert!(UpstreamError::connection("dns failure").is_retryable());
    }

    #[test]
    fn test_status_accessor() {
        assert_eq!(UpstreamError::client(401, "x").status(), Some(401));
        assert_eq!(UpstreamError::transient(None, "x").status(), None);
        assert_eq!(UpstreamError::connection("x").status(), None);
    }
}
