//! Request rate limiting behind an injected store.
//!
//! The store trait is the seam for a horizontally-shareable backend (an
//! external cache keyed the same way); the bundled token-bucket
//! implementation is process-local and suits a single instance.

use async_trait::async_trait;
use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

/// Pluggable rate-limit state store
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Consume one token for `key`, returning false when the caller is
    /// over its budget
    async fn try_acquire(&self, key: &str) -> bool;
}

struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(capacity: u32) -> Self {
        Self {
            tokens: f64::from(capacity),
            last_refill: Instant::now(),
        }
    }

    fn take(&mut self, capacity: u32, refill_per_sec: f64) -> bool {
        let elapsed = self.last_refill.elapsed().as_secs_f64();
        self.tokens = (self.tokens + elapsed * refill_per_sec).min(f64::from(capacity));
        self.last_refill = Instant::now();

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// In-memory token-bucket store, one bucket per key
pub struct InMemoryRateLimiter {
    buckets: Mutex<HashMap<String, TokenBucket>>,
    capacity: u32,
    refill_per_sec: f64,
}

impl InMemoryRateLimiter {
    pub fn new(capacity: u32, refill_per_sec: f64) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            capacity,
            refill_per_sec,
        }
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimiter {
    async fn try_acquire(&self, key: &str) -> bool {
        let mut buckets = self.buckets.lock().await;
        let bucket = buckets
            .entry(key.to_string())
            .or_insert_with(|| TokenBucket::new(self.capacity));
        bucket.take(self.capacity, self.refill_per_sec)
    }
}

/// Key requests by caller identity: the bearer token when present,
/// otherwise the forwarded client address
fn client_key(headers: &HeaderMap) -> String {
    if let Some(auth) = headers.get("Authorization").and_then(|h| h.to_str().ok()) {
        return auth.to_string();
    }
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("anonymous")
        .to_string()
}

/// Rate-limit middleware over the injected store
pub async fn rate_limit_middleware(
    State(store): State<Arc<dyn RateLimitStore>>,
    request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    let key = client_key(request.headers());
    if !store.try_acquire(&key).await {
        return Err(RateLimitError::Exceeded);
    }
    Ok(next.run(request).await)
}

/// Rate-limit middleware errors
#[derive(Debug)]
pub enum RateLimitError {
    Exceeded,
}

impl IntoResponse for RateLimitError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": "rate/limit-exceeded",
            "message": "Too many requests, please try again later",
        }));
        (StatusCode::TOO_MANY_REQUESTS, body).into_response()
    }
}
