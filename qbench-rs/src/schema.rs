//! Column layout of a result file.
//!
//! Harness versions differ only in which optional columns they emit, so a single
//! [`Schema`] maps whatever header a file carries onto the known [`Column`]s and
//! records which [`SchemaVersion`] that header corresponds to.

use crate::record::Percentile;
use rustc_hash::FxHashMap;
use serde::Serialize;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
pub enum Column {
    #[strum(serialize = "impl")]
    Implementation,
    #[strum(serialize = "mode")]
    Mode,
    #[strum(serialize = "P")]
    Producers,
    #[strum(serialize = "C")]
    Consumers,
    #[strum(serialize = "payload_us")]
    PayloadUs,
    #[strum(serialize = "duration_s")]
    DurationS,
    #[strum(serialize = "throughput")]
    Throughput,
    #[strum(serialize = "avg_lat")]
    AvgLat,
    #[strum(serialize = "p50")]
    P50,
    #[strum(serialize = "p95")]
    P95,
    #[strum(serialize = "p99")]
    P99,
    #[strum(serialize = "p999")]
    P999,
    #[strum(serialize = "max_lat")]
    MaxLat,
    #[strum(serialize = "peak_mem_kb")]
    PeakMemKb,
    #[strum(serialize = "max_depth")]
    MaxDepth,
}

impl Column {
    /// Canonical header name, used in diagnostics.
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Header spellings accepted for this column, lowercase.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Column::Implementation => &["impl", "implementation", "queue"],
            Column::Mode => &["mode", "alloc", "alloc_mode", "allocator"],
            Column::Producers => &["p", "producers"],
            Column::Consumers => &["c", "consumers"],
            Column::PayloadUs => &["payload_us", "payload"],
            Column::DurationS => &["duration_s", "duration"],
            Column::Throughput => &["throughput", "throughput_ops", "throughput_cons"],
            Column::AvgLat => &["avg_lat", "avg_lat_ns", "avg"],
            Column::P50 => &["p50", "p50_lat", "p50_ns"],
            Column::P95 => &["p95", "p95_lat", "p95_ns"],
            Column::P99 => &["p99", "p99_lat", "p99_ns"],
            Column::P999 => &["p999", "p99.9", "p999_lat", "p999_ns"],
            Column::MaxLat => &["max_lat", "max_lat_ns"],
            Column::PeakMemKb => &["peak_mem_kb", "peak_rss_kb"],
            Column::MaxDepth => &["max_depth", "depth"],
        }
    }

    pub fn from_header(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        Column::iter().find(|column| column.aliases().contains(&name.as_str()))
    }

    pub fn is_mandatory(self) -> bool {
        matches!(
            self,
            Column::Implementation
                | Column::Producers
                | Column::Consumers
                | Column::PayloadUs
                | Column::Throughput
        )
    }

    /// The latency percentile stored in this column, if it is a latency column.
    pub fn percentile(self) -> Option<Percentile> {
        match self {
            Column::AvgLat => Some(Percentile::Avg),
            Column::P50 => Some(Percentile::P50),
            Column::P95 => Some(Percentile::P95),
            Column::P99 => Some(Percentile::P99),
            Column::P999 => Some(Percentile::P999),
            Column::MaxLat => Some(Percentile::Max),
            _ => None,
        }
    }
}

/// Which generation of the harness wrote a file, judged by its optional columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Display)]
pub enum SchemaVersion {
    /// Throughput and queue depth only (no latency, no memory)
    DepthOnly,
    /// Adds latency percentiles
    Latency,
    /// Latency percentiles plus peak resident memory
    Full,
}

#[derive(Debug, Clone)]
pub struct Schema {
    pub version: SchemaVersion,
    columns: FxHashMap<Column, usize>,
    headers: Vec<String>,
}

impl Schema {
    pub fn from_headers<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut columns = FxHashMap::default();
        let mut names = Vec::new();
        for (index, header) in headers.into_iter().enumerate() {
            let header = header.trim();
            names.push(header.to_string());
            if let Some(column) = Column::from_header(header) {
                // first occurrence wins when a file repeats a column
                columns.entry(column).or_insert(index);
            }
        }

        let has_latency = columns.keys().any(|c| c.percentile().is_some());
        let version = match (has_latency, columns.contains_key(&Column::PeakMemKb)) {
            (true, true) => SchemaVersion::Full,
            (true, false) => SchemaVersion::Latency,
            (false, _) => SchemaVersion::DepthOnly,
        };

        Self {
            version,
            columns,
            headers: names,
        }
    }

    pub fn index(&self, column: Column) -> Option<usize> {
        self.columns.get(&column).copied()
    }

    pub fn has(&self, column: Column) -> bool {
        self.columns.contains_key(&column)
    }

    pub fn missing_mandatory(&self) -> Vec<Column> {
        Column::iter()
            .filter(|c| c.is_mandatory() && !self.has(*c))
            .collect()
    }

    /// True when `cells` is a copy of this file's own header line.
    ///
    /// The harness appends a header on every run, so these show up mid-file.
    pub fn is_header_row<'a, I>(&self, cells: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut cells = cells.into_iter();
        let matches = self
            .headers
            .iter()
            .all(|h| cells.next().is_some_and(|c| c.trim().eq_ignore_ascii_case(h)));
        matches && !self.headers.is_empty()
    }
}
