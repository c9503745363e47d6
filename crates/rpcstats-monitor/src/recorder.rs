//! Capture side: collects calls for one request and stores the record.

use crate::cache::{full_key, CacheError, KvCache};
use crate::codec::{self, EncodeError};
use crate::trace::{CallEvent, TraceRecord};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

/// How long saved records stay readable by default.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Errors from saving a record.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}

/// Collects the calls made while serving one request.
///
/// Calls may be recorded from several tasks; their order in the saved
/// record is the order in which `record` was invoked.
pub struct CallRecorder {
    cache: Arc<dyn KvCache>,
    request_id: String,
    ttl: Duration,
    header: Mutex<BTreeMap<String, String>>,
    calls: Mutex<Vec<CallEvent>>,
}

impl CallRecorder {
    /// Creates a recorder with a freshly generated request ID.
    pub fn new(cache: Arc<dyn KvCache>) -> Self {
        Self::with_request_id(cache, uuid::Uuid::new_v4().to_string())
    }

    pub fn with_request_id(cache: Arc<dyn KvCache>, request_id: impl Into<String>) -> Self {
        Self {
            cache,
            request_id: request_id.into(),
            ttl: DEFAULT_TTL,
            header: Mutex::new(BTreeMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Returns the request ID the record will be saved under.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Records a request header. Only the first value seen for a name is kept.
    pub fn header(&self, name: impl Into<String>, value: impl Into<String>) {
        let Ok(mut header) = self.header.lock() else {
            tracing::warn!("Failed to acquire header lock");
            return;
        };
        header.entry(name.into()).or_insert_with(|| value.into());
    }

    /// Records a completed call.
    pub fn record(&self, call: CallEvent) {
        let Ok(mut calls) = self.calls.lock() else {
            tracing::warn!("Failed to acquire calls lock");
            return;
        };
        tracing::trace!(
            request_id = %self.request_id,
            name = %call.name,
            cost = call.cost,
            duration_us = call.duration.as_micros() as u64,
            "Recorded call"
        );
        calls.push(call);
    }

    /// Returns the record as collected so far.
    pub fn snapshot(&self) -> TraceRecord {
        let header = self.header.lock().map(|h| h.clone()).unwrap_or_default();
        let calls = self.calls.lock().map(|c| c.clone()).unwrap_or_default();
        TraceRecord { header, calls }
    }

    /// Encodes the record and writes it to the cache.
    pub fn save(&self) -> Result<(), RecordError> {
        let record = self.snapshot();
        let bytes = codec::encode(&record)?;
        self.cache
            .set(&full_key(&self.request_id), &bytes, self.ttl)?;

        tracing::debug!(
            request_id = %self.request_id,
            calls = record.calls.len(),
            bytes = bytes.len(),
            "Saved trace record"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::TraceAccessor;
    use crate::cache::MemoryCache;

    #[test]
    fn test_recorder_saves_readable_record() {
        let cache = Arc::new(MemoryCache::new());
        let recorder = CallRecorder::new(cache.clone());

        recorder.header("Host", "example.com");
        recorder.header("Host", "ignored.example.com");
        recorder.record(CallEvent::new("datastore_v3.Get", 1.0, Duration::from_millis(12)));
        recorder.record(CallEvent::new("memcache.Get", 0.0, Duration::from_millis(1)));
        recorder.save().unwrap();

        let record = TraceAccessor::new(cache).fetch(recorder.request_id()).unwrap();
        assert_eq!(record.header["Host"], "example.com");
        assert_eq!(record.calls.len(), 2);
        assert_eq!(record.calls[0].name, "datastore_v3.Get");
        assert_eq!(record.calls[1].name, "memcache.Get");
    }

    #[test]
    fn test_generated_request_ids_are_unique() {
        let cache: Arc<dyn KvCache> = Arc::new(MemoryCache::new());
        let a = CallRecorder::new(cache.clone());
        let b = CallRecorder::new(cache);
        assert_ne!(a.request_id(), b.request_id());
    }

    #[test]
    fn test_expired_record_is_absent() {
        let cache = Arc::new(MemoryCache::new());
        let recorder = CallRecorder::with_request_id(cache.clone(), "rid-1").with_ttl(Duration::ZERO);
        recorder.record(CallEvent::new("a", 1.0, Duration::from_millis(1)));
        recorder.save().unwrap();

        assert_eq!(TraceAccessor::new(cache).fetch("rid-1"), None);
    }

    #[test]
    fn test_save_with_unbounded_ttl() {
        let cache = Arc::new(MemoryCache::new());
        let recorder = CallRecorder::with_request_id(cache.clone(), "rid-1").with_ttl(Duration::MAX);
        recorder.record(CallEvent::new("a", 1.0, Duration::from_millis(1)));
        recorder.save().unwrap();

        assert!(TraceAccessor::new(cache).fetch("rid-1").is_some());
    }

    struct LockedCache;

    impl KvCache for LockedCache {
        fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
            Err(CacheError::Lock)
        }

        fn set(&self, _key: &str, _value: &[u8], _ttl: Duration) -> Result<(), CacheError> {
            Err(CacheError::Lock)
        }

        fn purge_expired(&self) -> Result<usize, CacheError> {
            Err(CacheError::Lock)
        }
    }

    #[test]
    fn test_save_reports_cache_failure() {
        let recorder = CallRecorder::with_request_id(Arc::new(LockedCache), "rid-1");
        assert!(matches!(recorder.save(), Err(RecordError::Cache(CacheError::Lock))));
    }
}
