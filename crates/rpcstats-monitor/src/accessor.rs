//! Looks up and decodes the trace record for a request.

use crate::cache::{full_key, KvCache};
use crate::codec;
use crate::trace::TraceRecord;
use std::sync::Arc;

/// Read-only access to recorded traces.
///
/// Every failure mode (miss, cache error, undecodable payload) yields `None`.
/// Entries may have been written by an incompatible build, so a bad payload
/// is treated the same as an expired one.
#[derive(Clone)]
pub struct TraceAccessor {
    cache: Arc<dyn KvCache>,
}

impl TraceAccessor {
    pub fn new(cache: Arc<dyn KvCache>) -> Self {
        Self { cache }
    }

    /// Fetches the record for `request_id`, if one is available.
    pub fn fetch(&self, request_id: &str) -> Option<TraceRecord> {
        let key = full_key(request_id);

        let bytes = match self.cache.get(&key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                tracing::debug!(%key, "No trace cached");
                return None;
            }
            Err(e) => {
                tracing::warn!(%key, "Failed to read trace from cache: {}", e);
                return None;
            }
        };

        match codec::decode(&bytes) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(%key, len = bytes.len(), "Failed to decode trace: {}", e);
                None
            }
        }
    }
}
