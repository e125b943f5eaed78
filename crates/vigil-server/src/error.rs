//! API error types and their HTTP mapping.
//!
//! Every failure is handled at the request boundary: each variant maps to
//! exactly one status code and a JSON body whose `error` field is a
//! stable, human-readable string. Nothing here crashes the process, and
//! nothing retries.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};
use vigil_alerting::DispatchError;
use vigil_store::PersistError;
use vigil_types::SettingsError;

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// API error enum covering all failure cases of the webhook pipeline.
#[derive(Debug, Error)]
pub enum ApiError {
    // 400 Bad Request
    /// Required top-level request fields are absent.
    #[error("Missing required fields: {}", fields.join(", "))]
    MissingFields {
        /// The absent fields.
        fields: Vec<&'static str>,
    },

    /// The settings object failed validation.
    #[error("Invalid settings configuration")]
    InvalidSettings {
        /// One message per offending field.
        problems: Vec<String>,
    },

    /// The declared event type is not in the taxonomy.
    #[error("Unknown event type: {0}")]
    UnknownEventType(String),

    /// The payload does not match its declared event type's shape.
    #[error("Invalid payload for event type {event_type}")]
    InvalidPayload {
        /// The declared event type.
        event_type: String,
        /// Decoder message.
        reason: String,
    },

    // 429 Too Many Requests
    /// The client exceeded its request window.
    #[error("Too many requests")]
    RateLimited {
        /// Seconds until the window resets.
        retry_after: u64,
    },

    // 500 Internal Server Error
    /// No notification sink URL is configured.
    #[error("Webhook URL not configured")]
    SinkNotConfigured,

    /// The event store rejected the write.
    #[error("Failed to persist event")]
    Persistence(#[source] PersistError),

    /// The notification sink rejected the alert or timed out.
    #[error("Failed to dispatch alert")]
    Dispatch(#[source] DispatchError),
}

impl ApiError {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingFields { .. }
            | Self::InvalidSettings { .. }
            | Self::UnknownEventType(_)
            | Self::InvalidPayload { .. } => StatusCode::BAD_REQUEST,

            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,

            Self::SinkNotConfigured | Self::Persistence(_) | Self::Dispatch(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get error code for client handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingFields { .. } => "missing_fields",
            Self::InvalidSettings { .. } => "invalid_settings",
            Self::UnknownEventType(_) => "unknown_event_type",
            Self::InvalidPayload { .. } => "invalid_payload",
            Self::RateLimited { .. } => "rate_limited",
            Self::SinkNotConfigured => "sink_not_configured",
            Self::Persistence(_) => "persistence_error",
            Self::Dispatch(_) => "dispatch_error",
        }
    }

    /// Check if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl From<SettingsError> for ApiError {
    fn from(err: SettingsError) -> Self {
        match err {
            SettingsError::NotAnObject => Self::InvalidSettings {
                problems: vec!["settings must be an object".to_string()],
            },
            SettingsError::Invalid { problems } => Self::InvalidSettings { problems },
        }
    }
}

impl From<PersistError> for ApiError {
    fn from(err: PersistError) -> Self {
        Self::Persistence(err)
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        Self::Dispatch(err)
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    setup_required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after: Option<u64>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            error!(error = %self, code = self.error_code(), "Server error occurred");
        } else {
            warn!(error = %self, code = self.error_code(), "Request rejected");
        }

        let status = self.status_code();
        let code = self.error_code();

        let (details, setup_required, retry_after) = match &self {
            Self::InvalidSettings { problems } => (Some(problems.clone()), None, None),
            Self::InvalidPayload { reason, .. } => (Some(vec![reason.clone()]), None, None),
            Self::SinkNotConfigured => (None, Some(true), None),
            Self::RateLimited { retry_after } => (None, None, Some(*retry_after)),
            _ => (None, None, None),
        };

        let body = ErrorBody {
            error: self.to_string(),
            code,
            details,
            setup_required,
            retry_after,
        };

        let mut response = (status, Json(body)).into_response();

        if let Self::RateLimited { retry_after } = self {
            if let Ok(value) = retry_after.to_string().parse() {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}
