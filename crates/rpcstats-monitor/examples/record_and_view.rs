//! Records a few calls, then reads them back the way the viewer does.
//!
//! Run with: cargo run -p rpcstats-monitor --example record_and_view

use std::sync::Arc;
use std::time::Duration;

use rpcstats_monitor::{view, CallEvent, CallRecorder, EnvMetadata, SqliteCache, TraceAccessor};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cache = Arc::new(SqliteCache::in_memory()?);

    // Capturing side
    let recorder = CallRecorder::new(cache.clone());
    recorder.header("User-Agent", "record_and_view");
    recorder.record(CallEvent::new("datastore_v3.Get", 1.0, Duration::from_millis(10)));
    recorder.record(CallEvent::new("datastore_v3.Get", 1.5, Duration::from_millis(20)));
    recorder.record(CallEvent::new("urlfetch.Fetch", 2.0, Duration::from_millis(50)));
    recorder.save()?;

    // Viewer side
    let record = TraceAccessor::new(cache).fetch(recorder.request_id());
    let view = view::build(EnvMetadata::new("demo"), record);

    println!("request {}", recorder.request_id());
    for row in &view.rows {
        println!(
            "{:<20} count={:<3} cost={:<6.2} time={:?}",
            row.name, row.count, row.total_cost, row.total_duration
        );
    }
    println!("approx total: {:?}", view.approx_total_duration);

    Ok(())
}
