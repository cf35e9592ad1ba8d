//! AI vendor and audit storage settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

/// Anthropic Messages API configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct AnthropicConfig {
    /// API key; read from the environment, never written back to disk
    #[serde(default, skip_serializing)]
    pub api_key: String,
    /// API origin
    #[validate(url)]
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Value of the `anthropic-version` header
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Model used when a caller does not pick one
    #[validate(length(min = 1_u64))]
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Output token cap used when a caller does not pick one
    #[validate(range(min = 1_u32))]
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,
    /// Sampling temperature used when a caller does not pick one
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default = "default_temperature")]
    pub default_temperature: f64,
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

fn default_model() -> String {
    "claude-3-5-sonnet-20241022".to_string()
}

const fn default_max_tokens() -> u32 {
    4096
}

const fn default_temperature() -> f64 {
    0.7
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            api_version: default_api_version(),
            default_model: default_model(),
            default_max_tokens: default_max_tokens(),
            default_temperature: default_temperature(),
        }
    }
}

impl AnthropicConfig {
    /// Whether an API key has been supplied.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// Where AI call audit records are stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditConfig {
    /// SQLite database path; defaults to `<data_dir>/ai_calls.db`
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_is_not_serialized() {
        let config = AnthropicConfig { api_key: "sk-ant-secret".to_string(), ..Default::default() };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("sk-ant-secret"));
        assert!(config.has_api_key());
    }

    #[test]
    fn test_temperature_range() {
        let config = AnthropicConfig { default_temperature: 1.5, ..Default::default() };
        assert!(config.validate().is_err());
    }
}
