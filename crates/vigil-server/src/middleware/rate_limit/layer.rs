//! Rate limit middleware layer.

use super::{
    store::{InMemoryStore, RateLimitStore},
    types::{KeyStrategy, RateLimitConfig},
};
use crate::error::ApiError;
use axum::{
    body::Body,
    extract::{ConnectInfo, Request},
    http::{header, Response},
    response::IntoResponse,
};
use futures::future::BoxFuture;
use std::{
    net::SocketAddr,
    sync::Arc,
    task::{Context, Poll},
};
use tower::{Layer, Service};

/// Header trusted test callers use to skip the limiter.
const BYPASS_HEADER: &str = "x-vigil-bypass";

/// Rate limit layer.
#[derive(Clone)]
pub struct RateLimitLayer {
    store: Arc<dyn RateLimitStore>,
    config: RateLimitConfig,
}

impl RateLimitLayer {
    /// Layer backed by an in-memory store.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            store: Arc::new(InMemoryStore::new()),
            config,
        }
    }

    /// Swap in a different store backend.
    pub fn with_store(mut self, store: Arc<dyn RateLimitStore>) -> Self {
        self.store = store;
        self
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimitMiddleware {
            inner,
            store: self.store.clone(),
            config: self.config.clone(),
        }
    }
}

/// The middleware service produced by [`RateLimitLayer`].
#[derive(Clone)]
pub struct RateLimitMiddleware<S> {
    inner: S,
    store: Arc<dyn RateLimitStore>,
    config: RateLimitConfig,
}

impl<S> Service<Request> for RateLimitMiddleware<S>
where
    S: Service<Request, Response = Response<Body>, Error = std::convert::Infallible>
        + Clone
        + Send
        + 'static,
    S::Future: Send + 'static,
{
    type Response = Response<Body>;
    type Error = std::convert::Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let store = self.store.clone();
        let config = self.config.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            // Bypass requests never touch the window store.
            if bypasses(&req, &config) {
                return inner.call(req).await;
            }

            let key = extract_key(&req, &config.key_strategy);
            let result = store.check_and_consume(&key, &config).await;

            if !result.allowed {
                let retry_after = result.retry_after.map(|d| d.as_secs()).unwrap_or(1);
                let error = ApiError::RateLimited { retry_after };
                let mut response = error.into_response();
                add_rate_limit_headers(response.headers_mut(), &result);
                return Ok(response);
            }

            let mut response = inner.call(req).await?;
            add_rate_limit_headers(response.headers_mut(), &result);
            Ok(response)
        })
    }
}

fn bypasses(req: &Request, config: &RateLimitConfig) -> bool {
    if config
        .bypass_paths
        .iter()
        .any(|path| req.uri().path() == path)
    {
        return true;
    }

    if let Some(token) = &config.bypass_token {
        let presented = req
            .headers()
            .get(BYPASS_HEADER)
            .and_then(|v| v.to_str().ok());
        if presented == Some(token.as_str()) {
            return true;
        }
    }

    false
}

fn add_rate_limit_headers(
    headers: &mut axum::http::HeaderMap,
    result: &super::store::RateLimitResult,
) {
    if let Ok(value) = result.limit.to_string().parse() {
        headers.insert(header::HeaderName::from_static("x-ratelimit-limit"), value);
    }

    if let Ok(value) = result.remaining.to_string().parse() {
        headers.insert(
            header::HeaderName::from_static("x-ratelimit-remaining"),
            value,
        );
    }

    if let Some(retry_after) = result.retry_after {
        if let Ok(value) = retry_after.as_secs().to_string().parse() {
            headers.insert(header::RETRY_AFTER, value);
        }
    }
}

fn extract_key(req: &Request, strategy: &KeyStrategy) -> String {
    match strategy {
        KeyStrategy::Ip => {
            // Try X-Forwarded-For, then X-Real-IP, then the socket address.
            req.headers()
                .get("x-forwarded-for")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.split(',').next().unwrap_or("").trim().to_string())
                .or_else(|| {
                    req.headers()
                        .get("x-real-ip")
                        .and_then(|v| v.to_str().ok())
                        .map(String::from)
                })
                .or_else(|| {
                    req.extensions()
                        .get::<ConnectInfo<SocketAddr>>()
                        .map(|info| info.0.ip().to_string())
                })
                .unwrap_or_else(|| "unknown".to_string())
        }
        KeyStrategy::Global => "global".to_string(),
    }
}
