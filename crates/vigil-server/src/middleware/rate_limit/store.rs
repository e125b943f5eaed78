//! Rate limit storage backends.

use super::types::{RateLimitConfig, WindowState};
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::Duration;

/// Trait for rate limit storage.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Count a request against a key and report whether it is allowed.
    async fn check_and_consume(&self, key: &str, config: &RateLimitConfig) -> RateLimitResult;
}

/// Result of a rate limit check.
pub struct RateLimitResult {
    /// Whether the request is within the limit.
    pub allowed: bool,
    /// The configured maximum.
    pub limit: u32,
    /// Accepted requests still available in this window.
    pub remaining: u32,
    /// Time until the window resets, when rejected.
    pub retry_after: Option<Duration>,
}

/// In-memory rate limit store. Windows are created lazily per key and
/// updated under the map's key-level lock, so two concurrent requests
/// cannot both slip under the limit at exactly `max`.
pub struct InMemoryStore {
    windows: DashMap<String, WindowState>,
}

impl InMemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self {
            windows: DashMap::new(),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryStore {
    async fn check_and_consume(&self, key: &str, config: &RateLimitConfig) -> RateLimitResult {
        let mut entry = self
            .windows
            .entry(key.to_string())
            .or_insert_with(WindowState::new);

        let state = entry.value_mut();
        let allowed = state.try_increment(config);

        RateLimitResult {
            allowed,
            limit: config.max_requests,
            remaining: state.remaining(config),
            retry_after: if allowed {
                None
            } else {
                Some(state.retry_after(config))
            },
        }
    }
}
