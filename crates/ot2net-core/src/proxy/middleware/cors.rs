// CORS middleware
use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

/// Production dashboard origin, always trusted.
const PRODUCTION_ORIGIN: &str = "https://ot2net.ness.com.br";
/// Dashboard dev server, trusted when no frontend URL is configured.
const DEV_ORIGIN: &str = "http://localhost:3000";

/// Origins allowed to call the backend from a browser.
pub fn allowed_origins(frontend_url: Option<&str>) -> Vec<String> {
    let first = frontend_url.map(str::trim).filter(|u| !u.is_empty()).unwrap_or(DEV_ORIGIN);
    vec![first.trim_end_matches('/').to_string(), PRODUCTION_ORIGIN.to_string()]
}

/// create CORS layer
pub fn cors_layer(frontend_url: Option<&str>) -> CorsLayer {
    let origins: Vec<HeaderValue> =
        allowed_origins(frontend_url).iter().filter_map(|o| o.parse().ok()).collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::HEAD,
            Method::OPTIONS,
            Method::PATCH,
        ])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
