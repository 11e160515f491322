mod health;
mod metrics;
mod generate;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderName, Method},
    routing::{MethodRouter, get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub use health::health_handler;
pub use metrics::metrics_handler;
pub use generate::{
    RATE_LIMIT_LIMIT, RATE_LIMIT_REMAINING, generate_handler, method_not_allowed, preflight_handler,
};

/// Largest generate body accepted; bigger ones get a JSON 413.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

// Request headers the browser client may send
const ALLOWED_HEADERS: [&str; 10] = [
    "x-csrf-token",
    "x-requested-with",
    "accept",
    "accept-version",
    "content-length",
    "content-md5",
    "content-type",
    "date",
    "x-api-version",
    "x-session-id",
];

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::OPTIONS,
            Method::PATCH,
            Method::DELETE,
            Method::POST,
            Method::PUT,
        ])
        .allow_headers(ALLOWED_HEADERS.map(HeaderName::from_static))
        .expose_headers([
            HeaderName::from_static(RATE_LIMIT_LIMIT),
            HeaderName::from_static(RATE_LIMIT_REMAINING),
        ])
}

/// Full HTTP surface: the generate endpoint under both paths plus health and metrics.
pub fn router(state: Arc<AppState>) -> Router {
    let generate: MethodRouter<Arc<AppState>> = post(generate_handler)
        .options(preflight_handler)
        .fallback(method_not_allowed);

    Router::new()
        .route("/generate", generate.clone())
        .route("/api/generate", generate)
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
