//! AI call endpoints

use axum::extract::{Query, State};
use axum::response::Json;
use chrono::{TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use ot2net_core::proxy::upstream::MessageOptions;
use ot2net_core::{AppError, AppResult};
use ot2net_types::{AiCompletion, ChatMessage, UpstreamCallRecord, UsageSummary};

use crate::state::AppState;

const MAX_RECENT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct CreateMessageBody {
    pub feature: String,
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub system: Option<String>,
}

pub async fn create_message(
    State(state): State<AppState>,
    Json(body): Json<CreateMessageBody>,
) -> AppResult<Json<AiCompletion>> {
    let feature = body.feature.trim();
    if feature.is_empty() {
        return Err(AppError::InvalidRequest("feature is required".to_string()));
    }
    if body.messages.is_empty() {
        return Err(AppError::InvalidRequest("messages must not be empty".to_string()));
    }

    let options = MessageOptions {
        model: body.model,
        max_tokens: body.max_tokens,
        temperature: body.temperature,
        system: body.system,
    };
    let completion = state.ai().send_message(feature, body.messages, options).await?;
    Ok(Json(completion))
}

#[derive(Debug, Default, Deserialize)]
pub struct UsageQuery {
    /// Only include calls from the last N hours
    pub hours: Option<u32>,
    /// Number of recent calls to return (default 10, max 100)
    pub recent: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct UsageResponse {
    pub summary: UsageSummary,
    pub recent: Vec<UpstreamCallRecord>,
}

pub async fn get_usage(
    State(state): State<AppState>,
    Query(query): Query<UsageQuery>,
) -> AppResult<Json<UsageResponse>> {
    let since = query.hours.map(|h| Utc::now() - TimeDelta::hours(i64::from(h)));
    let limit = query.recent.unwrap_or(10).min(MAX_RECENT);

    let summary = state.audit().usage_summary(since).await?;
    let recent = state.audit().recent(limit).await?;

    Ok(Json(UsageResponse { summary, recent }))
}
