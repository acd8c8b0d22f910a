//! Per-implementation performance summary.

use crate::axis::ThreadAxis;
use crate::record::RunRecord;
use itertools::{Itertools, MinMaxResult};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl Stats {
    /// `None` for an empty input.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let values: Vec<f64> = values.into_iter().collect();
        let (min, max) = match values.iter().copied().minmax_by(f64::total_cmp) {
            MinMaxResult::NoElements => return None,
            MinMaxResult::OneElement(v) => (v, v),
            MinMaxResult::MinMax(min, max) => (min, max),
        };
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        Some(Self { mean, min, max })
    }
}

/// Mean throughput at the smallest and largest thread counts of the fixed-payload sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThreadScaling {
    pub from_threads: u64,
    pub from_throughput: f64,
    pub to_threads: u64,
    pub to_throughput: f64,
    pub speedup: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImplementationSummary {
    pub implementation: String,
    pub runs: usize,
    pub throughput: Stats,
    pub max_depth: Option<Stats>,
    pub p99_latency_us: Option<Stats>,
    pub scaling: Option<ThreadScaling>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub implementations: Vec<ImplementationSummary>,
}

impl Summary {
    /// Summarize every record, one entry per implementation in name order.
    pub fn build(records: &[RunRecord], fixed_payload: Option<u32>, thread_axis: ThreadAxis) -> Self {
        let mut by_implementation: BTreeMap<&str, Vec<&RunRecord>> = BTreeMap::new();
        for record in records {
            by_implementation
                .entry(record.implementation.as_str())
                .or_default()
                .push(record);
        }

        let implementations = by_implementation
            .into_iter()
            .filter_map(|(implementation, runs)| {
                let throughput = Stats::from_values(runs.iter().map(|r| r.throughput))?;
                Some(ImplementationSummary {
                    implementation: implementation.to_string(),
                    runs: runs.len(),
                    throughput,
                    max_depth: Stats::from_values(runs.iter().filter_map(|r| r.max_depth.map(|d| d as f64))),
                    p99_latency_us: Stats::from_values(runs.iter().filter_map(|r| r.latency.p99)),
                    scaling: fixed_payload.and_then(|payload| thread_scaling(&runs, payload, thread_axis)),
                })
            })
            .collect();

        Self { implementations }
    }

    pub fn is_empty(&self) -> bool {
        self.implementations.is_empty()
    }
}

fn thread_scaling(runs: &[&RunRecord], payload: u32, thread_axis: ThreadAxis) -> Option<ThreadScaling> {
    let mut by_threads: BTreeMap<u64, Vec<f64>> = BTreeMap::new();
    for run in runs.iter().filter(|r| r.payload_us == payload) {
        by_threads
            .entry(thread_axis.value(run))
            .or_default()
            .push(run.throughput);
    }
    if by_threads.len() < 2 {
        return None;
    }

    let mean = |values: &Vec<f64>| values.iter().sum::<f64>() / values.len() as f64;
    let (&from_threads, first) = by_threads.first_key_value()?;
    let (&to_threads, last) = by_threads.last_key_value()?;
    let from_throughput = mean(first);
    let to_throughput = mean(last);
    if from_throughput <= 0.0 {
        return None;
    }

    Some(ThreadScaling {
        from_threads,
        from_throughput,
        to_threads,
        to_throughput,
        speedup: to_throughput / from_throughput,
    })
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "=".repeat(72))?;
        writeln!(f, "PERFORMANCE SUMMARY")?;
        write!(f, "{}", "=".repeat(72))?;
        for entry in &self.implementations {
            writeln!(f)?;
            write!(f, "{}", entry)?;
        }
        Ok(())
    }
}

impl fmt::Display for ImplementationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n[{}] {} runs", self.implementation.to_uppercase(), self.runs)?;
        let t = &self.throughput;
        write!(
            f,
            "  Avg Throughput: {:.0} ops/s (min: {:.0}, max: {:.0})",
            t.mean, t.min, t.max
        )?;
        if let Some(d) = &self.max_depth {
            write!(f, "\n  Avg Max Depth:  {:.1} (min: {:.0}, max: {:.0})", d.mean, d.min, d.max)?;
        }
        if let Some(l) = &self.p99_latency_us {
            write!(f, "\n  Avg p99:        {:.2} μs (min: {:.2}, max: {:.2})", l.mean, l.min, l.max)?;
        }
        if let Some(s) = &self.scaling {
            write!(
                f,
                "\n  Thread Scaling: {}T={:.0} ops/s -> {}T={:.0} ops/s (speedup: {:.2}x)",
                s.from_threads, s.from_throughput, s.to_threads, s.to_throughput, s.speedup
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rec(implementation: &str, producers: u32, payload_us: u32, throughput: f64) -> RunRecord {
        RunRecord::new(implementation, producers, producers, payload_us, throughput)
    }

    #[test]
    fn test_stats() {
        assert_eq!(Stats::from_values(vec![]), None);
        let s = Stats::from_values(vec![3.0, 1.0, 2.0]).unwrap();
        assert_relative_eq!(s.mean, 2.0);
        assert_eq!((s.min, s.max), (1.0, 3.0));
        let one = Stats::from_values(vec![4.0]).unwrap();
        assert_eq!((one.min, one.mean, one.max), (4.0, 4.0, 4.0));
    }

    #[test]
    fn test_summary_per_implementation() {
        let records = vec![
            rec("hp", 1, 100, 100.0).with_max_depth(4),
            rec("EBR", 1, 100, 1000.0),
            rec("EBR", 4, 100, 3000.0),
            rec("EBR", 4, 100, 5000.0),
            rec("EBR", 2, 50, 10.0),
        ];
        let summary = Summary::build(&records, Some(100), ThreadAxis::Producers);
        assert_eq!(summary.implementations.len(), 2);

        let ebr = &summary.implementations[0];
        assert_eq!(ebr.implementation, "EBR");
        assert_eq!(ebr.runs, 4);
        assert_eq!(ebr.max_depth, None);
        let scaling = ebr.scaling.unwrap();
        assert_eq!((scaling.from_threads, scaling.to_threads), (1, 4));
        assert_relative_eq!(scaling.to_throughput, 4000.0);
        assert_relative_eq!(scaling.speedup, 4.0);

        let hp = &summary.implementations[1];
        assert_eq!(hp.max_depth.unwrap().max, 4.0);
        assert_eq!(hp.scaling, None);
    }

    #[test]
    fn test_scaling_absent_for_zero_baseline_or_no_payload() {
        let records = vec![rec("EBR", 1, 100, 0.0), rec("EBR", 2, 100, 10.0)];
        let summary = Summary::build(&records, Some(100), ThreadAxis::Producers);
        assert_eq!(summary.implementations[0].scaling, None);

        let summary = Summary::build(&records, None, ThreadAxis::Producers);
        assert_eq!(summary.implementations[0].scaling, None);
    }

    #[test]
    fn test_display_mentions_every_implementation() {
        let records = vec![rec("EBR", 1, 100, 1000.0), rec("EBR", 2, 100, 1800.0), rec("hp", 1, 100, 5.0)];
        let text = Summary::build(&records, Some(100), ThreadAxis::Producers).to_string();
        assert!(text.contains("[EBR] 2 runs"));
        assert!(text.contains("[HP] 1 runs"));
        assert!(text.contains("speedup: 1.80x"));
    }
}
