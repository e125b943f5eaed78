//! Shared application state.

use crate::config::ServerConfig;
use std::sync::Arc;
use std::time::Instant;
use vigil_alerting::{AlertDispatcher, Classifier};
use vigil_store::{EventStore, PgEventStore, PgStoreConfig};

/// State shared across request handlers.
///
/// The classifier's per-user attempt map and the rate limiter's window map
/// are the only mutable state in the process; both live behind their own
/// key-level locks, so `AppState` itself is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Durable event store.
    pub store: Arc<dyn EventStore>,
    /// Suspicious-activity classifier.
    pub classifier: Arc<Classifier>,
    /// Outbound alert dispatcher.
    pub dispatcher: Arc<AlertDispatcher>,
    /// Notification sink URL, when configured.
    pub sink_url: Option<Arc<str>>,
    /// Process start, for the health endpoint's uptime.
    pub started_at: Instant,
}

impl AppState {
    /// Production state: connect to the configured Postgres store.
    pub async fn connect(config: &ServerConfig) -> Result<Self, anyhow::Error> {
        let store = PgEventStore::connect(&PgStoreConfig::new(&config.database_url)).await?;
        Ok(Self::new(Arc::new(store), config.sink_url.clone())?)
    }

    /// Assemble state around any store implementation.
    pub fn new(
        store: Arc<dyn EventStore>,
        sink_url: Option<String>,
    ) -> Result<Self, vigil_alerting::DispatchError> {
        Ok(Self {
            store,
            classifier: Arc::new(Classifier::new()),
            dispatcher: Arc::new(AlertDispatcher::new()?),
            sink_url: sink_url.map(Into::into),
            started_at: Instant::now(),
        })
    }
}
