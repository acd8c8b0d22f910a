//! Selectors for the independent variable and the plotted metric.

use crate::record::{Percentile, RunRecord};
use serde::Serialize;
use strum_macros::{Display, EnumString};

/// Which thread count a scaling chart plots.
///
/// Harness versions disagree on whether "threads" means producers, consumers
/// or both, so all three are offered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum ThreadAxis {
    #[default]
    #[strum(to_string = "producers", serialize = "p")]
    Producers,
    #[strum(to_string = "consumers", serialize = "c")]
    Consumers,
    #[strum(to_string = "total", serialize = "p+c")]
    Total,
}

impl ThreadAxis {
    pub fn value(self, record: &RunRecord) -> u64 {
        match self {
            ThreadAxis::Producers => u64::from(record.producers),
            ThreadAxis::Consumers => u64::from(record.consumers),
            ThreadAxis::Total => record.total_threads(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum XAxis {
    Threads(ThreadAxis),
    Payload,
}

impl XAxis {
    /// Integral axis value, used for dedup keys and sorting.
    pub fn raw(self, record: &RunRecord) -> u64 {
        match self {
            XAxis::Threads(axis) => axis.value(record),
            XAxis::Payload => u64::from(record.payload_us),
        }
    }

    pub fn value(self, record: &RunRecord) -> f64 {
        self.raw(record) as f64
    }

    /// Axis label for the given view; producer axes read "P=C" when every record is symmetric.
    pub fn label(self, records: &[RunRecord]) -> String {
        match self {
            XAxis::Payload => "Payload (μs)".to_string(),
            XAxis::Threads(ThreadAxis::Producers) => {
                if !records.is_empty() && records.iter().all(|r| r.producers == r.consumers) {
                    "Threads (P=C)".to_string()
                } else {
                    "Threads (P)".to_string()
                }
            }
            XAxis::Threads(ThreadAxis::Consumers) => "Threads (C)".to_string(),
            XAxis::Threads(ThreadAxis::Total) => "Threads (P+C)".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Metric {
    Throughput,
    Latency(Percentile),
    PeakMemory,
    MaxDepth,
    /// Measured throughput as a percentage of what the consumers could reach
    /// if the payload were the only cost
    Efficiency,
}

impl Metric {
    pub fn value(self, record: &RunRecord) -> Option<f64> {
        match self {
            Metric::Throughput => Some(record.throughput),
            Metric::Latency(p) => record.latency.get(p),
            Metric::PeakMemory => record.peak_mem_mb,
            Metric::MaxDepth => record.max_depth.map(|d| d as f64),
            Metric::Efficiency => efficiency(record),
        }
    }

    pub fn label(self) -> String {
        match self {
            Metric::Throughput => "Throughput (ops/s)".to_string(),
            Metric::Latency(p) => format!("{} latency (μs)", p),
            Metric::PeakMemory => "Peak memory (MB)".to_string(),
            Metric::MaxDepth => "Max queue depth".to_string(),
            Metric::Efficiency => "Efficiency (% of ideal)".to_string(),
        }
    }

    /// Short name for panel titles.
    pub fn title(self) -> String {
        match self {
            Metric::Throughput => "Throughput".to_string(),
            Metric::Latency(p) => format!("{} Latency", p),
            Metric::PeakMemory => "Memory Peak".to_string(),
            Metric::MaxDepth => "Max Depth".to_string(),
            Metric::Efficiency => "Efficiency".to_string(),
        }
    }
}

/// `throughput / (consumers * 1e6 / payload_us) * 100`.
///
/// `None` for a zero payload, where the ideal rate is unbounded.
pub fn efficiency(record: &RunRecord) -> Option<f64> {
    if record.payload_us == 0 {
        return None;
    }
    let ideal = record.consumers as f64 * (1_000_000.0 / record.payload_us as f64);
    Some(record.throughput / ideal * 100.0)
}
