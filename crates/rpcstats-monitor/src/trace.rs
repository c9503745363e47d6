//! Trace record and view types.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// A single remote call made while serving a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallEvent {
    /// Symbolic call name, e.g. `datastore_v3.Get`.
    pub name: String,
    /// Resource cost charged for the call.
    pub cost: f64,
    /// Time spent waiting on the call.
    #[serde(serialize_with = "duration_nanos")]
    pub duration: Duration,
}

impl CallEvent {
    pub fn new(name: impl Into<String>, cost: f64, duration: Duration) -> Self {
        Self {
            name: name.into(),
            cost,
            duration,
        }
    }
}

/// Everything captured for one completed request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TraceRecord {
    /// Request headers, one value per name.
    pub header: BTreeMap<String, String>,
    /// Calls in the order they were issued.
    pub calls: Vec<CallEvent>,
}

/// Per-name summary of the calls in a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub name: String,
    pub count: usize,
    pub total_cost: f64,
    #[serde(serialize_with = "duration_nanos")]
    pub total_duration: Duration,
}

/// Environment details shown on every page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvMetadata {
    pub application_id: String,
}

impl EnvMetadata {
    pub fn new(application_id: impl Into<String>) -> Self {
        Self {
            application_id: application_id.into(),
        }
    }
}

/// Data for the request details page.
///
/// When `record` is `None` the rows are empty and the duration is zero;
/// this is the normal outcome for an expired cache entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModel {
    pub env: EnvMetadata,
    pub record: Option<TraceRecord>,
    pub rows: Vec<AggregateRow>,
    /// Sum of all call durations. Overlapping calls are counted twice.
    #[serde(serialize_with = "duration_nanos")]
    pub approx_total_duration: Duration,
}

/// A source file indexed by 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSnippet {
    pub path: PathBuf,
    /// Line to highlight. Not checked against the file length.
    pub highlight_line: i64,
    pub lines: BTreeMap<usize, String>,
}

impl SourceSnippet {
    /// Returns the highlighted line, if the file has one at that index.
    pub fn highlighted(&self) -> Option<&str> {
        let line = usize::try_from(self.highlight_line).ok()?;
        self.lines.get(&line).map(String::as_str)
    }
}

fn duration_nanos<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
}
