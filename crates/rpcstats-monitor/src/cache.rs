//! Key-value cache holding encoded trace records.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Prefix shared by every key this crate writes.
pub const KEY_PREFIX: &str = "__rpcstats__:";

/// Key under which the full record for a request is stored.
pub fn full_key(request_id: &str) -> String {
    format!("{KEY_PREFIX}{request_id}:full")
}

/// Errors from cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Lock error")]
    Lock,
}

/// Ephemeral byte store. A missing or expired key is `Ok(None)`, not an error.
pub trait KvCache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;
    fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError>;
    /// Drops expired entries, returning how many were removed.
    fn purge_expired(&self) -> Result<usize, CacheError>;
}

/// In-process cache.
///
/// Expired entries are dropped when read or by [`KvCache::purge_expired`].
/// A TTL too large to represent never expires.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (Vec<u8>, Option<Instant>)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut entries = self.entries.lock().map_err(|_| CacheError::Lock)?;
        let Some((value, expires_at)) = entries.get(key) else {
            return Ok(None);
        };
        if is_expired(*expires_at, Instant::now()) {
            entries.remove(key);
            return Ok(None);
        }
        Ok(Some(value.clone()))
    }

    fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().map_err(|_| CacheError::Lock)?;
        let expires_at = Instant::now().checked_add(ttl);
        entries.insert(key.to_string(), (value.to_vec(), expires_at));
        Ok(())
    }

    fn purge_expired(&self) -> Result<usize, CacheError> {
        let mut entries = self.entries.lock().map_err(|_| CacheError::Lock)?;
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, (_, expires_at)| !is_expired(*expires_at, now));
        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!(removed, "Purged expired cache entries");
        }
        Ok(removed)
    }
}

fn is_expired(expires_at: Option<Instant>, now: Instant) -> bool {
    expires_at.is_some_and(|at| at <= now)
}
