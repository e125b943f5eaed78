//! Webhook orchestration.
//!
//! One request walks the whole pipeline: field presence, settings
//! validation, monitored-event filter, payload decoding, persistence,
//! classification, and conditional dispatch. Persistence happens before
//! dispatch and is never rolled back: a failed alert leaves the record
//! in place.

use crate::{error::ApiError, state::AppState};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use tracing::{debug, info};
use vigil_alerting::AlertMessage;
use vigil_types::{EventKind, SecurityEvent, Settings};

/// Inbound webhook envelope. Fields are optional here so absence is
/// reported as a validation error rather than a decoder failure.
#[derive(Debug, Deserialize)]
pub struct WebhookRequest {
    /// Declared event type.
    pub event_type: Option<String>,
    /// Raw event payload.
    pub payload: Option<Value>,
    /// Caller-supplied monitoring settings.
    pub settings: Option<Value>,
}

/// Success body: always exactly `processed` or `skipped`.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    status: &'static str,
}

impl WebhookResponse {
    fn processed() -> Self {
        Self { status: "processed" }
    }

    fn skipped() -> Self {
        Self { status: "skipped" }
    }
}

/// `POST /webhook` — receive one authentication event.
pub async fn handle(
    State(state): State<AppState>,
    Json(request): Json<WebhookRequest>,
) -> Result<Json<WebhookResponse>, ApiError> {
    let mut missing = Vec::new();
    if request.event_type.is_none() {
        missing.push("event_type");
    }
    if request.payload.is_none() {
        missing.push("payload");
    }
    if request.settings.is_none() {
        missing.push("settings");
    }
    if !missing.is_empty() {
        return Err(ApiError::MissingFields { fields: missing });
    }

    let event_type = request.event_type.unwrap_or_default();
    let payload = request.payload.unwrap_or_default();
    let settings_value = request.settings.unwrap_or_default();

    let settings = Settings::from_value(&settings_value)?;

    let kind = EventKind::from_str(&event_type)
        .map_err(|_| ApiError::UnknownEventType(event_type.clone()))?;

    info!(event_type = %event_type, "Received webhook event");

    // Valid no-op: the caller did not ask us to act on this type.
    if !settings.monitors(&event_type) {
        debug!(event_type = %event_type, "Event type not monitored, skipping");
        return Ok(Json(WebhookResponse::skipped()));
    }

    let event: SecurityEvent =
        serde_json::from_value(payload).map_err(|e| ApiError::InvalidPayload {
            event_type: event_type.clone(),
            reason: e.to_string(),
        })?;
    if event.kind() != kind {
        return Err(ApiError::InvalidPayload {
            event_type,
            reason: format!(
                "payload eventType {} does not match declared event_type",
                event.kind().as_str()
            ),
        });
    }

    let record_id = state.store.persist(&event).await?;
    debug!(id = %record_id, "Event persisted");

    if let Some(rule) = state.classifier.classify(&event, &settings) {
        let sink_url = state
            .sink_url
            .as_deref()
            .ok_or(ApiError::SinkNotConfigured)?;

        let message = AlertMessage::build(&event, &settings, rule);
        state.dispatcher.dispatch(sink_url, &message, &event).await?;
        info!(rule = rule.id(), user = %event.user_id, "Alert dispatched");
    }

    Ok(Json(WebhookResponse::processed()))
}
