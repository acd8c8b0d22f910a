use serde::Serialize;
use strum_macros::{Display, EnumIter, IntoStaticStr};

/// How the benchmarked queue obtained node memory.
///
/// `Heap` sorts before `Pooled` so series keys order the same way on every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Display)]
pub enum AllocMode {
    #[strum(serialize = "heap")]
    Heap,
    #[strum(serialize = "pooled")]
    Pooled,
}

impl AllocMode {
    /// Parse an explicit mode cell (`pool`, `pooled`, `heap`, ...), case-insensitive.
    pub fn from_cell(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pool" | "pooled" | "pool_alloc" => Some(AllocMode::Pooled),
            "heap" | "malloc" | "new" | "default" => Some(AllocMode::Heap),
            _ => None,
        }
    }

    /// Infer the mode from a result file name: the marker anywhere in the name means pooled.
    pub fn from_file_name(file_name: &str, pooled_marker: &str) -> Self {
        if !pooled_marker.is_empty()
            && file_name
                .to_ascii_lowercase()
                .contains(&pooled_marker.to_ascii_lowercase())
        {
            AllocMode::Pooled
        } else {
            AllocMode::Heap
        }
    }
}

/// Latency percentiles reported by newer harness versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Display, EnumIter, IntoStaticStr)]
pub enum Percentile {
    #[strum(serialize = "avg")]
    Avg,
    #[strum(serialize = "p50")]
    P50,
    #[strum(serialize = "p95")]
    P95,
    #[strum(serialize = "p99")]
    P99,
    #[strum(serialize = "p99.9")]
    P999,
    #[strum(serialize = "max")]
    Max,
}

/// Per-operation latency in microseconds. Every field is optional because
/// older result files carry none of them and newer ones only some.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LatencyProfile {
    pub avg: Option<f64>,
    pub p50: Option<f64>,
    pub p95: Option<f64>,
    pub p99: Option<f64>,
    pub p999: Option<f64>,
    pub max: Option<f64>,
}

impl LatencyProfile {
    pub fn get(&self, percentile: Percentile) -> Option<f64> {
        match percentile {
            Percentile::Avg => self.avg,
            Percentile::P50 => self.p50,
            Percentile::P95 => self.p95,
            Percentile::P99 => self.p99,
            Percentile::P999 => self.p999,
            Percentile::Max => self.max,
        }
    }

    pub(crate) fn set(&mut self, percentile: Percentile, value: f64) {
        let slot = match percentile {
            Percentile::Avg => &mut self.avg,
            Percentile::P50 => &mut self.p50,
            Percentile::P95 => &mut self.p95,
            Percentile::P99 => &mut self.p99,
            Percentile::P999 => &mut self.p999,
            Percentile::Max => &mut self.max,
        };
        *slot = Some(value);
    }

    pub fn is_empty(&self) -> bool {
        *self == LatencyProfile::default()
    }
}

/// One benchmark execution, normalized to in-memory units (us, MB).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunRecord {
    pub implementation: String,
    pub mode: AllocMode,
    pub producers: u32,
    pub consumers: u32,
    pub payload_us: u32,
    pub duration_s: Option<u32>,
    /// Completed consumer-side operations per second
    pub throughput: f64,
    pub latency: LatencyProfile,
    pub peak_mem_mb: Option<f64>,
    pub max_depth: Option<u64>,
    /// Name of the result file this row was read from
    pub source: String,
}

impl RunRecord {
    /// Minimal record with only the mandatory fields set.
    pub fn new(
        implementation: impl Into<String>,
        producers: u32,
        consumers: u32,
        payload_us: u32,
        throughput: f64,
    ) -> Self {
        Self {
            implementation: implementation.into(),
            mode: AllocMode::Heap,
            producers,
            consumers,
            payload_us,
            duration_s: None,
            throughput,
            latency: LatencyProfile::default(),
            peak_mem_mb: None,
            max_depth: None,
            source: String::new(),
        }
    }

    pub fn with_mode(mut self, mode: AllocMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_max_depth(mut self, depth: u64) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_latency(mut self, latency: LatencyProfile) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_peak_mem_mb(mut self, megabytes: f64) -> Self {
        self.peak_mem_mb = Some(megabytes);
        self
    }

    pub fn total_threads(&self) -> u64 {
        u64::from(self.producers) + u64::from(self.consumers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_mode_from_file_name() {
        assert_eq!(AllocMode::from_file_name("ebr_pool_sweep.csv", "pool"), AllocMode::Pooled);
        assert_eq!(AllocMode::from_file_name("EBR_POOL.csv", "pool"), AllocMode::Pooled);
        assert_eq!(AllocMode::from_file_name("ebr_sweep.csv", "pool"), AllocMode::Heap);
        assert_eq!(AllocMode::from_file_name("anything.csv", ""), AllocMode::Heap);
    }

    #[test]
    fn test_mode_from_cell() {
        assert_eq!(AllocMode::from_cell(" Pooled "), Some(AllocMode::Pooled));
        assert_eq!(AllocMode::from_cell("heap"), Some(AllocMode::Heap));
        assert_eq!(AllocMode::from_cell("arena"), None);
    }

    #[test]
    fn test_heap_orders_before_pooled() {
        assert!(AllocMode::Heap < AllocMode::Pooled);
    }

    #[test]
    fn test_latency_profile_get_set() {
        let mut profile = LatencyProfile::default();
        assert!(profile.is_empty());
        for (i, p) in Percentile::iter().enumerate() {
            profile.set(p, i as f64);
        }
        assert_eq!(profile.get(Percentile::Avg), Some(0.0));
        assert_eq!(profile.get(Percentile::P999), Some(4.0));
        assert_eq!(profile.get(Percentile::Max), Some(5.0));
        assert!(!profile.is_empty());
    }

    #[test]
    fn test_percentile_labels() {
        assert_eq!(Percentile::P999.to_string(), "p99.9");
        let label: &'static str = Percentile::Avg.into();
        assert_eq!(label, "avg");
    }
}
