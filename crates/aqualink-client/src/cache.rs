//! Time-bounded response cache.
//!
//! Successful responses are stored as JSON together with their write time.
//! Reads past the expiry behave as a miss and delete the entry. Writes and
//! deletes are best-effort: a failing store is logged and otherwise ignored,
//! so the cache can never fail an API call.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use aqualink_store::Store;

/// Default lifetime of a cached response.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// A cached response body and the time it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The decoded response body.
    pub data: Value,
    /// When the entry was written.
    pub timestamp: DateTime<Utc>,
}

impl CacheEntry {
    /// Create an entry stamped with the current time.
    #[must_use]
    pub fn new(data: Value) -> Self {
        Self {
            data,
            timestamp: Utc::now(),
        }
    }

    /// Whether the entry is older than `ttl` at `now`.
    #[must_use]
    pub fn is_expired(&self, ttl: chrono::Duration, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.timestamp) > ttl
    }
}

/// Response cache over a [`Store`].
#[derive(Clone)]
pub struct ResponseCache {
    store: Arc<dyn Store>,
    ttl: chrono::Duration,
}

impl ResponseCache {
    /// Create a cache whose entries expire after `ttl`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::TimeDelta::MAX);
        Self { store, ttl }
    }

    /// Read a fresh entry. Expired or unreadable entries are removed.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        let bytes = match self.store.get(key) {
            Ok(bytes) => bytes?,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read cache entry");
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_slice(&bytes) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding unreadable cache entry");
                self.remove(key);
                return None;
            }
        };

        if entry.is_expired(self.ttl, Utc::now()) {
            tracing::debug!(key, written = %entry.timestamp, "Cache entry expired");
            self.remove(key);
            return None;
        }

        Some(entry.data)
    }

    /// Write `data` under `key`, stamped with the current time.
    pub fn put(&self, key: &str, data: &Value) {
        self.put_entry(
            key,
            &CacheEntry {
                data: data.clone(),
                timestamp: Utc::now(),
            },
        );
    }

    /// Write a prepared entry.
    pub fn put_entry(&self, key: &str, entry: &CacheEntry) {
        let bytes = match serde_json::to_vec(entry) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to encode cache entry");
                return;
            }
        };

        if let Err(e) = self.store.set(key, &bytes) {
            tracing::warn!(key, error = %e, "Failed to write cache entry");
        }
    }

    /// Delete the entry under `key`.
    pub fn remove(&self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            tracing::warn!(key, error = %e, "Failed to remove cache entry");
        }
    }
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
