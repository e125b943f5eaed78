//! Outbound alert dispatch.

use crate::AlertMessage;
use reqwest::{Client, ClientBuilder};
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use vigil_types::SecurityEvent;

/// Bound on the whole dispatch call. A sink that hangs past this surfaces
/// as a failure to the in-flight request; there is no retry queue.
const DISPATCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Dispatch failure. Propagates to the caller as a failed webhook
/// response; the persisted event record is not rolled back.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The HTTP client could not be constructed.
    #[error("failed to build alert client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// The sink did not answer within the dispatch timeout.
    #[error("alert dispatch timed out")]
    Timeout,

    /// The request could not be sent.
    #[error("alert request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The sink answered with a non-2xx status.
    #[error("notification sink rejected alert: {status}")]
    Rejected {
        /// HTTP status the sink returned.
        status: u16,
        /// Response body, for the logs.
        body: String,
    },
}

impl From<reqwest::Error> for DispatchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            DispatchError::Timeout
        } else {
            DispatchError::Request(e)
        }
    }
}

/// Wire payload the notification sink accepts.
#[derive(Debug, Serialize)]
struct SinkPayload<'a> {
    event_name: &'a str,
    message: &'a str,
    status: &'a str,
    username: &'a str,
    metadata: serde_json::Value,
}

/// Sends formatted alerts to the notification sink.
pub struct AlertDispatcher {
    client: Client,
    username: String,
}

impl AlertDispatcher {
    /// Build a dispatcher with the bounded-timeout client.
    pub fn new() -> Result<Self, DispatchError> {
        let client = ClientBuilder::new()
            .connect_timeout(DISPATCH_TIMEOUT)
            .timeout(DISPATCH_TIMEOUT)
            .user_agent(format!("vigil/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(DispatchError::ClientBuild)?;

        Ok(Self {
            client,
            username: "Security Monitor".to_string(),
        })
    }

    /// POST one alert to the sink. Success is a 2xx answer; anything else
    /// is an error for the caller to surface.
    pub async fn dispatch(
        &self,
        sink_url: &str,
        message: &AlertMessage,
        event: &SecurityEvent,
    ) -> Result<(), DispatchError> {
        let payload = SinkPayload {
            event_name: &message.title,
            message: &message.body,
            status: message.channel_status,
            username: &self.username,
            metadata: json!({
                "attempts": event.attempts,
                "eventType": event.kind().as_str(),
                "ipAddress": event.ip_address,
                "timestamp": event.timestamp_millis(),
                "recipients": message.recipients,
            }),
        };

        tracing::debug!(sink = %sink_url, status = payload.status, "Dispatching alert");

        let response = self
            .client
            .post(sink_url)
            .json(&payload)
            .send()
            .await
            .map_err(DispatchError::from)?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(status = status.as_u16(), "Alert accepted by sink");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(DispatchError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
