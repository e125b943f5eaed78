//! Rate limiting middleware.
//!
//! Fixed-window counting per client key. Bypass paths and the bypass
//! header skip the limiter entirely, not merely the counting.

pub mod layer;
pub mod store;
pub mod types;

pub use layer::{RateLimitLayer, RateLimitMiddleware};
pub use store::{InMemoryStore, RateLimitResult, RateLimitStore};
pub use types::{KeyStrategy, RateLimitConfig, WindowState};
