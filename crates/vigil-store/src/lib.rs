//! Durable event store adapter for Vigil.
//!
//! Every monitored event is persisted regardless of whether it triggers an
//! alert. Persistence is at-least-once: duplicate submissions create
//! duplicate records, trading dedup complexity for completeness.

mod memory;
mod postgres;
mod store;

pub use memory::InMemoryEventStore;
pub use postgres::{PgEventStore, PgStoreConfig};
pub use store::{EventId, EventStore, PersistError, StoredEvent};
