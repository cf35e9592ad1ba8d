use axum::extract::State;
use axum::response::Json;
use serde::Serialize;
use tracing::info;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ClearRateLimitsResponse {
    pub cleared: usize,
}

/// Reset every rate limit counter.
pub async fn clear_rate_limits(State(state): State<AppState>) -> Json<ClearRateLimitsResponse> {
    let cleared = state.limiter().clear();
    info!(cleared, "Rate limit counters cleared");
    Json(ClearRateLimitsResponse { cleared })
}
