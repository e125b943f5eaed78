//! Service endpoints: root, health, and the integration spec document.

use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;
use std::sync::OnceLock;

/// Bundled integration spec, served verbatim on `/integrationspec`.
const INTEGRATION_SPEC: &str = include_str!("../integration.json");

/// `GET /` — service banner.
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "message": "Vigil Auth Monitor Service"
    }))
}

/// `GET /health` — liveness, uptime, and the current time. Always bypasses
/// rate limiting.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "uptime": state.started_at.elapsed().as_secs(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// `GET /integrationspec` — the static integration document.
pub async fn integration_spec() -> impl IntoResponse {
    static SPEC: OnceLock<serde_json::Value> = OnceLock::new();
    let spec = SPEC.get_or_init(|| {
        serde_json::from_str(INTEGRATION_SPEC).expect("bundled integration spec is valid JSON")
    });
    Json(spec.clone())
}
