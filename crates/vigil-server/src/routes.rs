//! Route configuration for the webhook API.

use crate::{
    handlers, middleware::rate_limit::{RateLimitConfig, RateLimitLayer}, state::AppState,
};
use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the application router.
///
/// The rate limiter wraps every route; its bypass list (the health
/// endpoint, plus any configured trusted-caller token) is honored inside
/// the middleware, so bypassed requests never touch the window store.
pub fn create_router(state: AppState, rate_limit: RateLimitConfig) -> Router {
    Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health))
        .route("/integrationspec", get(handlers::health::integration_spec))
        .route("/webhook", post(handlers::webhook::handle))
        .fallback(fallback_handler)
        .layer(RateLimitLayer::new(rate_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn fallback_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        axum::Json(serde_json::json!({
            "error": "not_found",
            "message": "The requested resource was not found"
        })),
    )
}
