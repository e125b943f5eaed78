//! Event store contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vigil_types::SecurityEvent;

/// Store-assigned record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub i64);

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted event record: the normalized event plus the intake stamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEvent {
    /// Record identifier.
    pub id: EventId,
    /// When this service received the event.
    pub received_at: DateTime<Utc>,
    /// The event as submitted.
    #[serde(flatten)]
    pub event: SecurityEvent,
}

/// Persistence failure. Fatal to the request that carried the event:
/// security telemetry is never silently dropped.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The store could not be reached.
    #[error("event store unavailable: {0}")]
    Unavailable(String),
    /// The store rejected or could not complete the write.
    #[error("event write failed: {0}")]
    Write(#[source] sqlx::Error),
    /// The event could not be encoded for storage.
    #[error("event encoding failed: {0}")]
    Encode(#[source] serde_json::Error),
}

/// An opaque durable sink for security events.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Write one event atomically, stamping `received_at`, and return the
    /// record id. No dedup is performed.
    async fn persist(&self, event: &SecurityEvent) -> Result<EventId, PersistError>;
}
