use crate::record::{AllocMode, RunRecord};
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use std::hash::Hash;

/// Collapse records that describe the same configuration.
///
/// Records are visited in ingestion order (sorted file names, then row order); a
/// later record replaces an earlier one with the same key. The survivor takes
/// the slot of the first record with that key, so output order is stable.
pub fn dedup_by<K, F>(records: &[RunRecord], key: F) -> Vec<RunRecord>
where
    K: Eq + Hash,
    F: Fn(&RunRecord) -> K,
{
    let mut slots: FxHashMap<K, usize> = FxHashMap::default();
    let mut kept: Vec<RunRecord> = Vec::with_capacity(records.len());

    for record in records {
        match slots.entry(key(record)) {
            Entry::Occupied(slot) => kept[*slot.get()] = record.clone(),
            Entry::Vacant(slot) => {
                slot.insert(kept.len());
                kept.push(record.clone());
            }
        }
    }

    kept
}

/// Key for charts that hold everything but the series identity fixed.
pub fn series_key(record: &RunRecord) -> (String, AllocMode) {
    (record.implementation.clone(), record.mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(implementation: &str, producers: u32, throughput: f64, source: &str) -> RunRecord {
        RunRecord::new(implementation, producers, producers, 100, throughput).with_source(source)
    }

    fn sample() -> Vec<RunRecord> {
        vec![
            rec("EBR", 1, 10.0, "a.csv"),
            rec("EBR", 2, 20.0, "a.csv"),
            rec("hp", 1, 30.0, "a.csv"),
            rec("EBR", 1, 11.0, "b.csv"),
            rec("hp", 1, 31.0, "b.csv"),
            rec("EBR", 2, 21.0, "c.csv").with_mode(AllocMode::Pooled),
        ]
    }

    #[test]
    fn test_last_write_wins() {
        let records = vec![rec("EBR", 2, 100.0, "a.csv"), rec("EBR", 2, 200.0, "b.csv")];
        let kept = dedup_by(&records, series_key);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].source, "b.csv");
        assert_eq!(kept[0].throughput, 200.0);
    }

    #[test]
    fn test_survivor_keeps_first_position() {
        let kept = dedup_by(&sample(), |r| (r.implementation.clone(), r.mode, r.producers));
        let summary: Vec<_> = kept
            .iter()
            .map(|r| (r.implementation.as_str(), r.producers, r.source.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("EBR", 1, "b.csv"),
                ("EBR", 2, "a.csv"),
                ("hp", 1, "b.csv"),
                ("EBR", 2, "c.csv"),
            ]
        );
    }

    #[test]
    fn test_dedup_is_idempotent_for_any_key() {
        let records = sample();

        let by_series = dedup_by(&records, series_key);
        assert_eq!(dedup_by(&by_series, series_key), by_series);

        let by_threads = |r: &RunRecord| (r.implementation.clone(), r.producers);
        let once = dedup_by(&records, by_threads);
        assert_eq!(dedup_by(&once, by_threads), once);

        let constant = |_: &RunRecord| ();
        let once = dedup_by(&records, constant);
        assert_eq!(once.len(), 1);
        assert_eq!(once[0].source, "c.csv");
        assert_eq!(dedup_by(&once, constant), once);
    }

    #[test]
    fn test_empty_input() {
        assert!(dedup_by(&[], series_key).is_empty());
    }
}
