//! Top-level gateway configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::anthropic::{AnthropicConfig, AuditConfig};
use super::limits::{RateLimitConfig, RetryConfig};

/// Full gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct GatewayConfig {
    /// Port the backend API listens on
    #[validate(range(min = 1_u16))]
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allow LAN access (bind to 0.0.0.0)
    #[serde(default)]
    pub allow_lan_access: bool,
    /// Browser origin of the dashboard, trusted for CORS
    #[serde(default)]
    pub frontend_url: Option<String>,
    /// Edge proxy settings
    #[serde(default)]
    #[validate(nested)]
    pub edge: EdgeConfig,
    /// Admission control for the backend API
    #[serde(default)]
    #[validate(nested)]
    pub rate_limit: RateLimitConfig,
    /// Retry policy for AI vendor calls
    #[serde(default)]
    #[validate(nested)]
    pub retry: RetryConfig,
    /// AI vendor settings
    #[serde(default)]
    #[validate(nested)]
    pub anthropic: AnthropicConfig,
    /// Audit log storage
    #[serde(default)]
    pub audit: AuditConfig,
}

const fn default_port() -> u16 {
    3001
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            allow_lan_access: false,
            frontend_url: None,
            edge: EdgeConfig::default(),
            rate_limit: RateLimitConfig::default(),
            retry: RetryConfig::default(),
            anthropic: AnthropicConfig::default(),
            audit: AuditConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Address the listeners bind to.
    pub fn get_bind_address(&self) -> &str {
        if self.allow_lan_access {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        }
    }
}

/// Edge proxy configuration (browser-facing `/api/*` relay).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct EdgeConfig {
    /// Port the edge proxy listens on
    #[validate(range(min = 1_u16))]
    #[serde(default = "default_edge_port")]
    pub port: u16,
    /// Backend origin every `/api/*` request is forwarded to
    #[validate(url)]
    #[serde(default = "default_upstream_origin")]
    pub upstream_origin: String,
    /// Timeout enforced by the forwarding HTTP client, in seconds
    #[validate(range(min = 1_u64, max = 3600_u64))]
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

const fn default_edge_port() -> u16 {
    3000
}

fn default_upstream_origin() -> String {
    "http://127.0.0.1:3001".to_string()
}

const fn default_request_timeout() -> u64 {
    120
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            port: default_edge_port(),
            upstream_origin: default_upstream_origin(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}
