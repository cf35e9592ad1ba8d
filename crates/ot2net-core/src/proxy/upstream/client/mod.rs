mod request_executor;


use async_trait::async_trait;
use ot2net_types::{AnthropicConfig, MessageRequest, MessageResponse, UpstreamError};
use reqwest::Client;
use std::time::Duration;

pub use request_executor::{build_headers, build_url, vendor_error_message};

const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// A provider of Messages-API style completions.
///
/// Implementations classify every failure into [`UpstreamErrorKind`]
/// before returning it; callers never inspect raw status codes.
///
/// [`UpstreamErrorKind`]: ot2net_types::UpstreamErrorKind
#[async_trait]
pub trait MessagesBackend: Send + Sync {
    async fn create_message(
        &self,
        request: &MessageRequest,
    ) -> Result<MessageResponse, UpstreamError>;
}

/// HTTP client for the Anthropic Messages API.
#[derive(Clone)]
pub struct AnthropicClient {
    http_client: Client,
    endpoint: String,
    api_key: String,
    api_version: String,
}

impl AnthropicClient {
    /// Create a client around a pre-built `reqwest::Client`.
    pub fn new(http_client: Client, config: &AnthropicConfig) -> Self {
        Self {
            http_client,
            endpoint: build_url(&config.base_url),
            api_key: config.api_key.clone(),
            api_version: config.api_version.clone(),
        }
    }

    /// Build a client with its own connection pool and request timeout.
    pub fn from_config(config: &AnthropicConfig) -> Result<Self, reqwest::Error> {
        let http_client =
            Client::builder().timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS)).build()?;
        Ok(Self::new(http_client, config))
    }
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("endpoint", &self.endpoint)
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl MessagesBackend for AnthropicClient {
    async fn create_message(
        &self,
        request: &MessageRequest,
    ) -> Result<MessageResponse, UpstreamError> {
        let headers = build_headers(&self.api_key, &self.api_version)?;
        request_executor::execute(&self.http_client, &self.endpoint, headers, request).await
    }
}
