use axum::{http::StatusCode, middleware, response::IntoResponse, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::api;
use crate::state::AppState;
use ot2net_core::proxy::{build_edge_router, cors_layer, rate_limit_middleware, EdgeProxy};

/// Backend API: health probes outside admission control, `/api` behind it.
pub fn build_backend_router(state: AppState) -> Router {
    let limiter = state.limiter().clone();
    let frontend_url = state.config().frontend_url.clone();

    let limited_api = Router::<AppState>::new()
        .nest("/api", api::router())
        .layer(middleware::from_fn_with_state(limiter, rate_limit_middleware));

    let public_routes = Router::<AppState>::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
        .route("/version", get(version_info));

    limited_api
        .merge(public_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(frontend_url.as_deref()))
}

/// Edge proxy plus its own health probe.
pub fn build_edge_app(proxy: EdgeProxy) -> Router {
    build_edge_router(proxy).route("/health", get(health_check))
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, axum::Json(serde_json::json!({"status": "ok"})))
}

async fn version_info() -> impl IntoResponse {
    (
        StatusCode::OK,
        axum::Json(serde_json::json!({
            "version": option_env!("GIT_VERSION").unwrap_or("dev"),
            "build_time": option_env!("BUILD_TIME").unwrap_or("unknown"),
            "cargo_version": env!("CARGO_PKG_VERSION"),
        })),
    )
}
