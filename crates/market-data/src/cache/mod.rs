//! In-memory response cache with per-entry TTL using moka
//!
//! Entries are stored as JSON values keyed by `operation:params`, so one
//! process-wide cache serves every operation regardless of its result type.
//! Concurrent misses on the same key may both run their producer.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::future::Cache;
use moka::Expiry;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Default maximum number of cached responses
pub const DEFAULT_CAPACITY: u64 = 10_000;

#[derive(Clone)]
struct CachedResponse {
    body: Arc<Value>,
    ttl: Duration,
}

/// Expires every entry after the TTL it was stored with.
struct PerEntryTtl;

impl Expiry<String, CachedResponse> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedResponse,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedResponse,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Shared expiring key-value store for computed responses
pub struct ResponseCache {
    inner: Cache<String, CachedResponse>,
}

impl ResponseCache {
    /// Create a cache holding at most `max_capacity` responses
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .expire_after(PerEntryTtl)
                .build(),
        }
    }

    /// Get a response from cache, if present, unexpired and decodable as `T`
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entry = self.inner.get(key).await?;
        match T::deserialize(entry.body.as_ref()) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Discarding cached {} of unexpected shape: {}", key, e);
                self.inner.invalidate(key).await;
                None
            }
        }
    }

    /// Store a response for `ttl`
    pub async fn insert<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        match serde_json::to_value(value) {
            Ok(body) => {
                let entry = CachedResponse {
                    body: Arc::new(body),
                    ttl,
                };
                self.inner.insert(key.to_string(), entry).await;
            }
            Err(e) => log::warn!("Not caching {}: {}", key, e),
        }
    }

    /// Return the cached response for `key`, or run `producer` and cache its
    /// successful result for `ttl`. Errors are returned and never cached.
    pub async fn cached<T, E, F, Fut>(&self, key: &str, ttl: Duration, producer: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get(key).await {
            log::debug!("Cache hit for {}", key);
            return Ok(hit);
        }

        log::debug!("Cache miss for {}", key);
        let value = producer().await?;
        self.insert(key, &value, ttl).await;
        Ok(value)
    }

}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Thread-safe handle to a ResponseCache
pub type SharedResponseCache = Arc<ResponseCache>;
