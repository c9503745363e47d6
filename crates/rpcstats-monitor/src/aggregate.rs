//! Per-name call statistics.

use crate::trace::{AggregateRow, TraceRecord};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::time::Duration;

/// Summary of all calls in one record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    /// One row per distinct call name, most expensive first.
    pub rows: Vec<AggregateRow>,
    /// Sum of every call's duration.
    ///
    /// This is not wall-clock time: calls that overlapped are counted once
    /// each, so concurrent calls inflate the total.
    pub approx_total_duration: Duration,
}

/// Groups calls by exact name and ranks the groups.
///
/// Rows are ordered by total cost descending, then count descending, then
/// name ascending.
pub fn aggregate(record: &TraceRecord) -> Aggregation {
    let mut by_name: HashMap<&str, AggregateRow> = HashMap::new();
    let mut approx_total_duration = Duration::ZERO;

    for call in &record.calls {
        let row = by_name
            .entry(call.name.as_str())
            .or_insert_with(|| AggregateRow {
                name: call.name.clone(),
                count: 0,
                total_cost: 0.0,
                total_duration: Duration::ZERO,
            });
        row.count += 1;
        row.total_cost += call.cost;
        row.total_duration = row.total_duration.saturating_add(call.duration);
        approx_total_duration = approx_total_duration.saturating_add(call.duration);
    }

    let mut rows: Vec<AggregateRow> = by_name.into_values().collect();
    rows.sort_by(rank);

    tracing::trace!(
        calls = record.calls.len(),
        names = rows.len(),
        "Aggregated trace calls"
    );

    Aggregation {
        rows,
        approx_total_duration,
    }
}

fn rank(a: &AggregateRow, b: &AggregateRow) -> Ordering {
    b.total_cost
        .total_cmp(&a.total_cost)
        .then_with(|| b.count.cmp(&a.count))
        .then_with(|| a.name.cmp(&b.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::CallEvent;

    fn record(calls: &[(&str, f64, u64)]) -> TraceRecord {
        TraceRecord {
            calls: calls
                .iter()
                .map(|&(name, cost, ms)| CallEvent::new(name, cost, Duration::from_millis(ms)))
                .collect(),
            ..Default::default()
        }
    }

    fn names(agg: &Aggregation) -> Vec<&str> {
        agg.rows.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_groups_and_ranks_by_cost() {
        let agg = aggregate(&record(&[
            ("svcA.Get", 1.0, 10),
            ("svcA.Get", 1.5, 20),
            ("svcB.Fetch", 2.0, 50),
        ]));

        assert_eq!(
            agg.rows,
            vec![
                AggregateRow {
                    name: "svcA.Get".to_string(),
                    count: 2,
                    total_cost: 2.5,
                    total_duration: Duration::from_millis(30),
                },
                AggregateRow {
                    name: "svcB.Fetch".to_string(),
                    count: 1,
                    total_cost: 2.0,
                    total_duration: Duration::from_millis(50),
                },
            ]
        );
        assert_eq!(agg.approx_total_duration, Duration::from_millis(80));
    }

    #[test]
    fn test_equal_cost_ranks_higher_count_first() {
        let agg = aggregate(&record(&[
            ("single", 4.0, 1),
            ("double", 2.0, 1),
            ("double", 2.0, 1),
        ]));
        assert_eq!(names(&agg), vec!["double", "single"]);
    }

    #[test]
    fn test_full_tie_ranks_by_name() {
        let calls = [
            ("beta", 2.0, 1),
            ("alpha", 1.0, 1),
            ("beta", 2.0, 1),
            ("alpha", 2.0, 1),
            ("beta", 1.0, 1),
            ("alpha", 2.0, 1),
        ];
        let agg = aggregate(&record(&calls));
        assert_eq!(names(&agg), vec!["alpha", "beta"]);
        assert_eq!(agg.rows[0].total_cost, 5.0);
        assert_eq!(agg.rows[0].count, 3);

        let mut reversed = calls;
        reversed.reverse();
        assert_eq!(aggregate(&record(&reversed)).rows, agg.rows);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let agg = aggregate(&record(&[("Memcache.Get", 1.0, 1), ("memcache.Get", 1.0, 1)]));
        assert_eq!(names(&agg), vec!["Memcache.Get", "memcache.Get"]);
    }

    #[test]
    fn test_counts_and_costs_are_conserved() {
        let rec = record(&[
            ("a", 0.1, 3),
            ("b", 0.2, 5),
            ("a", 0.3, 7),
            ("c", 0.0, 0),
            ("b", 0.4, 11),
            ("a", 0.5, 13),
        ]);
        let agg = aggregate(&rec);

        let count: usize = agg.rows.iter().map(|r| r.count).sum();
        assert_eq!(count, rec.calls.len());

        let row_cost: f64 = agg.rows.iter().map(|r| r.total_cost).sum();
        let call_cost: f64 = rec.calls.iter().map(|c| c.cost).sum();
        assert!((row_cost - call_cost).abs() < 1e-9);

        let row_duration: Duration = agg.rows.iter().map(|r| r.total_duration).sum();
        assert_eq!(row_duration, agg.approx_total_duration);
    }

    #[test]
    fn test_overlapping_calls_are_double_counted() {
        // Two 100ms calls that ran concurrently still report 200ms.
        let agg = aggregate(&record(&[("a", 1.0, 100), ("b", 1.0, 100)]));
        assert_eq!(agg.approx_total_duration, Duration::from_millis(200));
    }

    #[test]
    fn test_empty_record() {
        let agg = aggregate(&TraceRecord::default());
        assert!(agg.rows.is_empty());
        assert_eq!(agg.approx_total_duration, Duration::ZERO);
    }
}
