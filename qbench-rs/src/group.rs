use crate::axis::XAxis;
use crate::record::{AllocMode, RunRecord};
use crate::style::{Style, StyleTable};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Identity of one plotted series. `mode` is `None` when modes are not distinguished.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SeriesKey {
    pub implementation: String,
    pub mode: Option<AllocMode>,
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            Some(mode) => write!(f, "{} ({})", self.implementation, mode),
            None => write!(f, "{}", self.implementation),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Implementation,
    ImplementationAndMode,
}

impl GroupBy {
    /// Split by mode only when the records actually mix modes.
    pub fn infer(records: &[RunRecord]) -> Self {
        match records.first() {
            Some(first) if records.iter().any(|r| r.mode != first.mode) => {
                GroupBy::ImplementationAndMode
            }
            _ => GroupBy::Implementation,
        }
    }

    fn key(self, record: &RunRecord) -> SeriesKey {
        SeriesKey {
            implementation: record.implementation.clone(),
            mode: match self {
                GroupBy::Implementation => None,
                GroupBy::ImplementationAndMode => Some(record.mode),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub key: SeriesKey,
    /// Sorted by the chart's x axis
    pub records: Vec<RunRecord>,
    pub style: Style,
}

impl Series {
    pub fn label(&self) -> String {
        self.key.to_string()
    }
}

/// Partition records into styled series, ordered by key.
pub fn group_and_style(
    records: &[RunRecord],
    group_by: GroupBy,
    x_axis: XAxis,
    styles: &StyleTable,
) -> Vec<Series> {
    let mut groups: BTreeMap<SeriesKey, Vec<RunRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(group_by.key(record)).or_default().push(record.clone());
    }

    groups
        .into_iter()
        .map(|(key, mut records)| {
            // stable, so equal x values keep ingestion order
            records.sort_by_key(|r| x_axis.raw(r));
            let mode = key.mode.unwrap_or_else(|| shared_mode(&records));
            let style = styles.style(&key.implementation, mode);
            Series { key, records, style }
        })
        .collect()
}

/// The mode every record agrees on, else heap.
fn shared_mode(records: &[RunRecord]) -> AllocMode {
    match records.first() {
        Some(first) if records.iter().all(|r| r.mode == first.mode) => first.mode,
        _ => AllocMode::Heap,
    }
}
