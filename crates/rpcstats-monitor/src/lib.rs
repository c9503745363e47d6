//! Per-request remote call statistics.
//!
//! A capturing process records the calls made while serving a request with
//! [`CallRecorder`], which stores an encoded [`TraceRecord`] in a [`KvCache`].
//! The viewer side reads it back:
//!
//! - [`TraceAccessor`] fetches and decodes a record, yielding `None` for
//!   expired or unreadable entries
//! - [`aggregate()`] ranks calls by name
//! - [`view::build`] assembles the details [`ViewModel`]
//! - [`source::load`] indexes a source file for call-site context
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use rpcstats_monitor::{view, CallEvent, CallRecorder, EnvMetadata, MemoryCache, TraceAccessor};
//!
//! let cache = Arc::new(MemoryCache::new());
//! let recorder = CallRecorder::new(cache.clone());
//! recorder.record(CallEvent::new("datastore_v3.Get", 1.0, Duration::from_millis(12)));
//! recorder.save().unwrap();
//!
//! let record = TraceAccessor::new(cache).fetch(recorder.request_id());
//! let view = view::build(EnvMetadata::new("my-app"), record);
//! assert_eq!(view.rows[0].count, 1);
//! ```

mod accessor;
mod aggregate;
mod cache;
pub mod codec;
mod recorder;
pub mod source;
mod store;
mod trace;
pub mod view;

pub use accessor::TraceAccessor;
pub use aggregate::{aggregate, Aggregation};
pub use cache::{full_key, CacheError, KvCache, MemoryCache, KEY_PREFIX};
pub use codec::{DecodeError, EncodeError};
pub use recorder::{CallRecorder, RecordError, DEFAULT_TTL};
pub use source::SourceError;
pub use store::SqliteCache;
pub use trace::{AggregateRow, CallEvent, EnvMetadata, SourceSnippet, TraceRecord, ViewModel};
