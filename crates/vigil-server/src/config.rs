//! Server configuration, loaded from the environment.

use crate::middleware::rate_limit::{KeyStrategy, RateLimitConfig};
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::time::Duration;

/// Main server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
    /// Event store connection string.
    pub database_url: String,
    /// Notification sink URL. Optional at startup: its absence fails
    /// dispatch-capable webhook calls, not the boot.
    pub sink_url: Option<String>,
    /// Per-deployment auth key; must be present at startup.
    pub auth_key: String,
    /// Rate limiting configuration.
    pub rate_limit: RateLimitSettings,
}

/// Rate limiter knobs.
#[derive(Debug, Clone)]
pub struct RateLimitSettings {
    /// Max accepted requests per window, inclusive.
    pub max_requests: u32,
    /// Duration of one counting period.
    pub window: Duration,
    /// Header value that lets trusted test callers skip the limiter.
    pub bypass_token: Option<String>,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(15 * 60),
            bypass_token: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from `VIGIL_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let host = env_or("VIGIL_HOST", "0.0.0.0");
        let port = env_parse("VIGIL_PORT", 3000u16)?;

        let database_url = std::env::var("VIGIL_DATABASE_URL")
            .context("VIGIL_DATABASE_URL must be set")?;
        let auth_key =
            std::env::var("VIGIL_AUTH_KEY").context("VIGIL_AUTH_KEY must be set")?;
        let sink_url = std::env::var("VIGIL_SINK_URL")
            .ok()
            .filter(|url| !url.is_empty());

        let rate_limit = RateLimitSettings {
            max_requests: env_parse("VIGIL_RATE_LIMIT_MAX", 100u32)?,
            window: Duration::from_secs(env_parse("VIGIL_RATE_LIMIT_WINDOW_SECS", 900u64)?),
            bypass_token: std::env::var("VIGIL_RATE_LIMIT_BYPASS_TOKEN").ok(),
        };

        Ok(Self {
            host,
            port,
            database_url,
            sink_url,
            auth_key,
            rate_limit,
        })
    }

    /// The address to bind.
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("Invalid socket address")
    }

    /// Middleware configuration derived from the rate-limit settings.
    /// The health endpoint always bypasses the limiter.
    pub fn rate_limit_config(&self) -> RateLimitConfig {
        let mut config = RateLimitConfig::new(self.rate_limit.max_requests, self.rate_limit.window)
            .with_key_strategy(KeyStrategy::Ip)
            .with_bypass_path("/health");
        if let Some(token) = &self.rate_limit.bypass_token {
            config = config.with_bypass_token(token.clone());
        }
        config
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{name} is not a valid value")),
        Err(_) => Ok(default),
    }
}
