//! API Routes
//!
//! Backend endpoints mounted under `/api`.

mod admin;
mod ai;


use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post},
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        // AI
        .route("/ai/messages", post(ai::create_message))
        .route("/ai/usage", get(ai::get_usage))
        // Admin
        .route("/admin/rate-limits", delete(admin::clear_rate_limits))
        .fallback(api_not_found)
}

async fn api_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": { "message": "Not found", "statusCode": StatusCode::NOT_FOUND.as_u16() }
        })),
    )
}
