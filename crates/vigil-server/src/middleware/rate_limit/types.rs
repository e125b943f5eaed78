//! Rate limiting types.

use std::time::{Duration, Instant};

/// Rate limit configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum accepted requests per window. Inclusive: the request that
    /// pushes the count past this is itself rejected.
    pub max_requests: u32,
    /// Duration of one counting period.
    pub window: Duration,
    /// Key extraction strategy.
    pub key_strategy: KeyStrategy,
    /// Paths that skip the limiter entirely.
    pub bypass_paths: Vec<String>,
    /// `x-vigil-bypass` header value that skips the limiter, for trusted
    /// test callers.
    pub bypass_token: Option<String>,
}

impl RateLimitConfig {
    /// Limit to `max_requests` per `window`, keyed by client IP.
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            key_strategy: KeyStrategy::Ip,
            bypass_paths: Vec::new(),
            bypass_token: None,
        }
    }

    /// Set the key strategy.
    pub fn with_key_strategy(mut self, strategy: KeyStrategy) -> Self {
        self.key_strategy = strategy;
        self
    }

    /// Add a path that skips the limiter.
    pub fn with_bypass_path(mut self, path: impl Into<String>) -> Self {
        self.bypass_paths.push(path.into());
        self
    }

    /// Set the trusted-caller bypass token.
    pub fn with_bypass_token(mut self, token: impl Into<String>) -> Self {
        self.bypass_token = Some(token.into());
        self
    }
}

/// Strategy for extracting the rate limit key.
#[derive(Debug, Clone, Copy)]
pub enum KeyStrategy {
    /// Limit per client IP address.
    Ip,
    /// One shared window for all clients.
    Global,
}

/// Fixed-window counter state for one key.
#[derive(Debug, Clone)]
pub struct WindowState {
    /// Requests counted in the current window, accepted and rejected.
    pub count: u32,
    /// When the current window opened.
    pub window_start: Instant,
}

impl WindowState {
    /// Fresh window starting now.
    pub fn new() -> Self {
        Self {
            count: 0,
            window_start: Instant::now(),
        }
    }

    /// Count one request: reset the window if it has expired, increment,
    /// and return whether the request is within the limit.
    pub fn try_increment(&mut self, config: &RateLimitConfig) -> bool {
        if self.window_start.elapsed() >= config.window {
            self.count = 0;
            self.window_start = Instant::now();
        }
        self.count = self.count.saturating_add(1);
        self.count <= config.max_requests
    }

    /// Accepted requests still available in this window.
    pub fn remaining(&self, config: &RateLimitConfig) -> u32 {
        config.max_requests.saturating_sub(self.count)
    }

    /// Time until the current window resets.
    pub fn retry_after(&self, config: &RateLimitConfig) -> Duration {
        config.window.saturating_sub(self.window_start.elapsed())
    }
}

impl Default for WindowState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_request_is_itself_rejected() {
        let config = RateLimitConfig::new(5, Duration::from_secs(60));
        let mut state = WindowState::new();

        for i in 1..=5 {
            assert!(state.try_increment(&config), "request {i} within limit");
        }
        assert!(!state.try_increment(&config), "6th request rejected");
    }

    #[test]
    fn window_expiry_resets_the_counter() {
        let config = RateLimitConfig::new(1, Duration::from_millis(30));
        let mut state = WindowState::new();

        assert!(state.try_increment(&config));
        assert!(!state.try_increment(&config));

        std::thread::sleep(Duration::from_millis(40));
        assert!(state.try_increment(&config));
    }

    #[test]
    fn retry_after_is_bounded_by_the_window() {
        let config = RateLimitConfig::new(1, Duration::from_secs(60));
        let state = WindowState::new();
        assert!(state.retry_after(&config) <= Duration::from_secs(60));
    }
}
