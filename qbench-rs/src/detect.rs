//! Recover which value the harness held fixed for each experiment shape.
//!
//! The harness runs thread sweeps at one payload and payload sweeps at one
//! producer count without recording which values were fixed. Both are recovered
//! by majority coverage: the fixed value is the one under which the other
//! variable was swept most widely.

use crate::record::RunRecord;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Fixed axis values detected from a record set. `None` means no data for that shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FixedAxes {
    /// Payload (us) at which thread counts were swept
    pub payload_us: Option<u32>,
    /// Producer count at which payloads were swept
    pub threads: Option<u32>,
}

impl FixedAxes {
    pub fn detect(records: &[RunRecord]) -> Self {
        Self {
            payload_us: detect_scaling_payload(records),
            threads: detect_sensitivity_threads(records),
        }
    }
}

/// Payload whose records cover the most distinct producer counts (ties -> smaller payload).
pub fn detect_scaling_payload(records: &[RunRecord]) -> Option<u32> {
    widest_sweep(records, |r| r.payload_us, |r| r.producers)
}

/// Producer count whose records cover the most distinct payloads (ties -> smaller count).
pub fn detect_sensitivity_threads(records: &[RunRecord]) -> Option<u32> {
    widest_sweep(records, |r| r.producers, |r| r.payload_us)
}

/// Group by `fixed`, count distinct `swept` values per group, return the group
/// with the largest count. Groups are visited in ascending order and only a
/// strictly larger count replaces the current best, so ties keep the smaller
/// value and the result does not depend on record order.
fn widest_sweep<F, S>(records: &[RunRecord], fixed: F, swept: S) -> Option<u32>
where
    F: Fn(&RunRecord) -> u32,
    S: Fn(&RunRecord) -> u32,
{
    let mut coverage: BTreeMap<u32, BTreeSet<u32>> = BTreeMap::new();
    for record in records {
        coverage.entry(fixed(record)).or_default().insert(swept(record));
    }

    let mut best: Option<(u32, usize)> = None;
    for (value, swept_values) in &coverage {
        let count = swept_values.len();
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((*value, count));
        }
    }
    best.map(|(value, _)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(producers: u32, payload_us: u32) -> RunRecord {
        RunRecord::new("EBR", producers, producers, payload_us, 1000.0)
    }

    #[test]
    fn test_empty_records_detect_nothing() {
        assert_eq!(FixedAxes::detect(&[]), FixedAxes::default());
    }

    #[test]
    fn test_tie_break_prefers_smaller_payload() {
        let records: Vec<_> = [100, 50]
            .into_iter()
            .flat_map(|payload| (1..=3).map(move |p| rec(p, payload)))
            .collect();
        assert_eq!(detect_scaling_payload(&records), Some(50));
    }

    #[test]
    fn test_tie_break_prefers_smaller_thread_count() {
        let records = vec![rec(4, 10), rec(4, 20), rec(2, 10), rec(2, 20)];
        assert_eq!(detect_sensitivity_threads(&records), Some(2));
    }

    #[test]
    fn test_widest_sweep_wins() {
        let mut records: Vec<_> = (1..=4).map(|p| rec(p, 100)).collect();
        records.extend([50, 100, 200].into_iter().map(|payload| rec(2, payload)));

        let axes = FixedAxes::detect(&records);
        assert_eq!(axes.payload_us, Some(100));
        assert_eq!(axes.threads, Some(2));
    }

    #[test]
    fn test_duplicates_do_not_inflate_coverage() {
        // payload 10 has three rows but only one distinct P
        let records = vec![rec(1, 10), rec(1, 10), rec(1, 10), rec(1, 20), rec(2, 20)];
        assert_eq!(detect_scaling_payload(&records), Some(20));
    }

    #[test]
    fn test_detection_is_order_independent() {
        let mut records: Vec<_> = (1..=4).map(|p| rec(p, 100)).collect();
        records.extend([50, 100, 200, 400].into_iter().map(|payload| rec(2, payload)));
        records.extend([1, 2, 3, 4].into_iter().map(|p| rec(p, 50)));
        let expected = FixedAxes::detect(&records);

        // every rotation and the reversal
        for shift in 0..records.len() {
            let mut permuted = records.clone();
            permuted.rotate_left(shift);
            assert_eq!(FixedAxes::detect(&permuted), expected);
            permuted.reverse();
            assert_eq!(FixedAxes::detect(&permuted), expected);
        }
        assert_eq!(expected.payload_us, Some(50));
        assert_eq!(expected.threads, Some(2));
    }

    #[test]
    fn test_detection_is_idempotent() {
        let records: Vec<_> = (1..=3).map(|p| rec(p, 100)).collect();
        assert_eq!(FixedAxes::detect(&records), FixedAxes::detect(&records));
    }
}
