use ot2net_types::{MessageRequest, MessageResponse, UpstreamError};
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;

const MESSAGES_PATH: &str = "/v1/messages";

/// Standard vendor error body: `{"type":"error","error":{"type":..,"message":..}}`.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

pub fn build_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), MESSAGES_PATH)
}

pub fn build_headers(api_key: &str, api_version: &str) -> Result<header::HeaderMap, UpstreamError> {
    let mut headers = header::HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, header::HeaderValue::from_static("application/json"));
    headers.insert(
        "x-api-key",
        header::HeaderValue::from_str(api_key)
            .map_err(|_| UpstreamError::client(401, "API key contains invalid header characters"))?,
    );
    headers.insert(
        "anthropic-version",
        header::HeaderValue::from_str(api_version).map_err(|_| {
            UpstreamError::client(400, "API version contains invalid header characters")
        })?,
    );
    Ok(headers)
}

/// Best human-readable message for a failed response body.
pub fn vendor_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        return envelope.error.message;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return status.canonical_reason().unwrap_or("Unknown error").to_string();
    }
    trimmed.to_string()
}

pub(super) async fn execute(
    http_client: &Client,
    url: &str,
    headers: header::HeaderMap,
    request: &MessageRequest,
) -> Result<MessageResponse, UpstreamError> {
    tracing::debug!(model = %request.model, max_tokens = request.max_tokens, "Sending messages request");

    let response = http_client
        .post(url)
        .headers(headers)
        .json(request)
        .send()
        .await
        .map_err(|e| UpstreamError::connection(format!("Request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = vendor_error_message(status, &body);
        tracing::debug!(status = status.as_u16(), %message, "Upstream returned error status");
        return Err(UpstreamError::from_status(status.as_u16(), message));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| UpstreamError::connection(format!("Failed to read response body: {}", e)))?;

    serde_json::from_slice::<MessageResponse>(&bytes)
        .map_err(|e| UpstreamError::transient(None, format!("Invalid response body: {}", e)))
}
