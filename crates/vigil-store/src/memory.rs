//! In-memory event store, for tests and local runs without a database.

use crate::store::{EventId, EventStore, PersistError, StoredEvent};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;
use vigil_types::SecurityEvent;

/// Append-only in-memory store. Same at-least-once contract as the real
/// backend: no dedup, every persist appends a record.
#[derive(Default)]
pub struct InMemoryEventStore {
    records: Mutex<Vec<StoredEvent>>,
}

impl InMemoryEventStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all persisted records, in insertion order.
    pub fn records(&self) -> Vec<StoredEvent> {
        self.records.lock().expect("store lock poisoned").clone()
    }

    /// Number of persisted records.
    pub fn len(&self) -> usize {
        self.records.lock().expect("store lock poisoned").len()
    }

    /// Whether nothing has been persisted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn persist(&self, event: &SecurityEvent) -> Result<EventId, PersistError> {
        let mut records = self.records.lock().expect("store lock poisoned");
        let id = EventId(records.len() as i64 + 1);
        records.push(StoredEvent {
            id,
            received_at: Utc::now(),
            event: event.clone(),
        });
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lockout_event() -> SecurityEvent {
        serde_json::from_value(json!({
            "userId": "u1",
            "timestamp": 1722945600000_i64,
            "ipAddress": "1.2.3.4",
            "eventType": "account_lockout",
            "success": true,
            "attempts": 3,
            "lockoutDuration": "30 minutes",
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn persists_and_assigns_sequential_ids() {
        let store = InMemoryEventStore::new();
        let event = lockout_event();

        let first = store.persist(&event).await.unwrap();
        let second = store.persist(&event).await.unwrap();

        assert_eq!(first, EventId(1));
        assert_eq!(second, EventId(2));
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn duplicates_are_kept_as_distinct_records() {
        let store = InMemoryEventStore::new();
        let event = lockout_event();

        store.persist(&event).await.unwrap();
        store.persist(&event).await.unwrap();

        let records = store.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].event.user_id, records[1].event.user_id);
        assert_ne!(records[0].id, records[1].id);
    }

    #[tokio::test]
    async fn stamps_received_at() {
        let store = InMemoryEventStore::new();
        store.persist(&lockout_event()).await.unwrap();

        let record = &store.records()[0];
        assert!(record.received_at > record.event.timestamp);
    }
}
