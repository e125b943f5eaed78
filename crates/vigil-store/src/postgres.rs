//! Postgres-backed event store.

use crate::store::{EventId, EventStore, PersistError};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;
use vigil_types::SecurityEvent;

/// Connection pool configuration.
#[derive(Debug, Clone)]
pub struct PgStoreConfig {
    /// Database URL.
    pub url: String,
    /// Maximum connections in the pool.
    pub max_connections: u32,
    /// Pool acquire timeout.
    pub acquire_timeout: Duration,
}

impl PgStoreConfig {
    /// Config with pool defaults for the given URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            acquire_timeout: Duration::from_secs(10),
        }
    }
}

/// Event store writing to a Postgres `auth_events` table.
#[derive(Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    /// Connect, verify the connection, and run pending migrations.
    pub async fn connect(config: &PgStoreConfig) -> Result<Self, sqlx::Error> {
        info!("Connecting to event store...");

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.url)
            .await?;

        sqlx::query("SELECT 1").fetch_one(&pool).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;

        info!(
            max_connections = config.max_connections,
            "Event store pool ready"
        );

        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn persist(&self, event: &SecurityEvent) -> Result<EventId, PersistError> {
        let details = serde_json::to_value(&event.details).map_err(PersistError::Encode)?;
        let received_at = Utc::now();

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO auth_events
                (event_type, user_id, occurred_at, received_at, ip_address, success, attempts, details)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(event.kind().as_str())
        .bind(&event.user_id)
        .bind(event.timestamp)
        .bind(received_at)
        .bind(&event.ip_address)
        .bind(event.success)
        .bind(event.attempts.map(|a| a as i32))
        .bind(details)
        .fetch_one(&self.pool)
        .await
        .map_err(PersistError::Write)?;

        Ok(EventId(id))
    }
}
