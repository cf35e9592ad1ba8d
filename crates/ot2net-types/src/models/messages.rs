//! Anthropic Messages API request/response models.

use serde::{Deserialize, Serialize};

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }
}

/// Body of `POST /v1/messages`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageRequest {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub messages: Vec<ChatMessage>,
}

/// A block of model output, kept exactly as the vendor sent it.
///
/// Only text blocks are interpreted; tool use, thinking and any future block
/// types pass through to callers untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ContentBlock(serde_json::Value);

impl ContentBlock {
    /// A `{"type": "text"}` block.
    pub fn text(text: impl Into<String>) -> Self {
        Self(serde_json::json!({ "type": "text", "text": text.into() }))
    }

    /// Value of the block's `type` field.
    pub fn block_type(&self) -> Option<&str> {
        self.0.get("type").and_then(serde_json::Value::as_str)
    }

    /// Text of a text block, `None` for every other block type.
    pub fn as_text(&self) -> Option<&str> {
        match self.block_type() {
            Some("text") => self.0.get("text").and_then(serde_json::Value::as_str),
            _ => None,
        }
    }

    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }
}

/// Token counts reported by the vendor for one call.
///
/// Accepts the vendor's snake_case field names and serializes in camelCase
/// for the backend's own API.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    #[serde(alias = "input_tokens", default)]
    pub input_tokens: u64,
    #[serde(alias = "output_tokens", default)]
    pub output_tokens: u64,
}

/// Successful `POST /v1/messages` response (fields this gateway reads).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    pub usage: TokenUsage,
}

impl MessageResponse {
    /// Concatenated text of all text blocks.
    pub fn text(&self) -> String {
        self.content.iter().filter_map(ContentBlock::as_text).collect()
    }
}

/// Result handed back to business handlers after a successful AI call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AiCompletion {
    pub content: Vec<ContentBlock>,
    pub usage: TokenUsage,
    pub cost: f64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vendor_response() {
        let body = r#"{
            "id": "msg_01",
            "type": "message",
            "role": "assistant",
            "model": "claude-3-5-sonnet-20241022",
            "content": [
                {"type": "text", "text": "Olá, "},
                {"type": "tool_use", "id": "t1", "name": "x", "input": {}},
                {"type": "text", "text": "mundo"}
            ],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 12, "output_tokens": 7}
        }"#;

        let response: MessageResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.usage, TokenUsage { input_tokens: 12, output_tokens: 7 });
        assert_eq!(response.content.len(), 3);
        assert_eq!(response.content[1].block_type(), Some("tool_use"));
        assert_eq!(response.content[1].as_text(), None);
        assert_eq!(response.text(), "Olá, mundo");
    }

    #[test]
    fn test_non_text_blocks_are_relayed_unchanged() {
        let tool_use = serde_json::json!({
            "type": "tool_use",
            "id": "toolu_01",
            "name": "buscar_ot",
            "input": {"numero": 4512, "filtros": ["aberta"]}
        });
        let body = serde_json::json!({
            "content": [{"type": "text", "text": "Consultando"}, tool_use.clone()],
            "usage": {"input_tokens": 3, "output_tokens": 4}
        });

        let response: MessageResponse = serde_json::from_value(body).unwrap();
        let completion = AiCompletion {
            content: response.content,
            usage: response.usage,
            cost: 0.0,
        };
        let json = serde_json::to_value(&completion).unwrap();

        assert_eq!(json["content"][1], tool_use);
        assert_eq!(json["content"][0], serde_json::json!({"type": "text", "text": "Consultando"}));
    }

    #[test]
    fn test_text_block_with_extra_fields_keeps_them() {
        let block: ContentBlock = serde_json::from_str(
            r#"{"type": "text", "text": "ok", "citations": [{"cited_text": "x"}]}"#,
        )
        .unwrap();
        assert_eq!(block.as_text(), Some("ok"));
        assert_eq!(block.as_json()["citations"][0]["cited_text"], "x");
    }

    #[test]
    fn test_usage_serializes_camel_case() {
        let usage = TokenUsage { input_tokens: 1, output_tokens: 2 };
        let json = serde_json::to_value(usage).unwrap();
        assert_eq!(json, serde_json::json!({"inputTokens": 1, "outputTokens": 2}));
    }

    #[test]
    fn test_request_omits_missing_system() {
        let request = MessageRequest {
            model: "m".to_string(),
            max_tokens: 10,
            temperature: 0.7,
            system: None,
            messages: vec![ChatMessage::user("hi")],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("system").is_none());
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
