//! Assembles the request details view.

use crate::aggregate::{aggregate, Aggregation};
use crate::trace::{EnvMetadata, TraceRecord, ViewModel};
use std::time::Duration;

/// Builds the details view. A missing record yields an empty view.
pub fn build(env: EnvMetadata, record: Option<TraceRecord>) -> ViewModel {
    let Some(record) = record else {
        return ViewModel {
            env,
            record: None,
            rows: Vec::new(),
            approx_total_duration: Duration::ZERO,
        };
    };

    let Aggregation {
        rows,
        approx_total_duration,
    } = aggregate(&record);

    ViewModel {
        env,
        record: Some(record),
        rows,
        approx_total_duration,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::CallEvent;
    use std::collections::BTreeMap;

    #[test]
    fn test_build_without_record() {
        let view = build(EnvMetadata::new("my-app"), None);

        assert_eq!(view.env.application_id, "my-app");
        assert!(view.record.is_none());
        assert!(view.rows.is_empty());
        assert_eq!(view.approx_total_duration, Duration::ZERO);
    }

    #[test]
    fn test_build_with_record() {
        let record = TraceRecord {
            header: BTreeMap::from([("Host".to_string(), "example.com".to_string())]),
            calls: vec![
                CallEvent::new("svcA.Get", 1.0, Duration::from_millis(10)),
                CallEvent::new("svcA.Get", 1.5, Duration::from_millis(20)),
                CallEvent::new("svcB.Fetch", 2.0, Duration::from_millis(50)),
            ],
        };
        let view = build(EnvMetadata::new("my-app"), Some(record.clone()));

        assert_eq!(view.record.as_ref(), Some(&record));
        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.rows[0].name, "svcA.Get");
        assert_eq!(view.approx_total_duration, Duration::from_millis(80));

        let counted: usize = view.rows.iter().map(|r| r.count).sum();
        assert_eq!(counted, record.calls.len());
    }

    #[test]
    fn test_view_serializes_for_rendering() {
        let view = build(EnvMetadata::new("my-app"), None);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["env"]["application_id"], "my-app");
        assert!(json["record"].is_null());
        assert_eq!(json["rows"], serde_json::json!([]));
        assert_eq!(json["approx_total_duration"], 0);
    }
}
