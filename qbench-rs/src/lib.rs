//! Analysis of concurrent-queue benchmark results
//!
//! This crate reads the CSV files written by the queue benchmark harness,
//! recovers which variable each experiment swept, collapses repeated runs of
//! the same configuration and describes a fixed set of comparison charts.
//! Drawing is left to a [`ChartRenderer`] so the analysis stays testable
//! without a graphics backend.
//!
//! # Quick Start
//!
//! ```no_run
//! use qbench_rs::{Chart, ChartRenderer, PipelineConfig, run};
//! use std::path::Path;
//!
//! struct Print;
//! impl ChartRenderer for Print {
//!     fn render_to_file(&self, chart: &Chart, path: &Path) -> anyhow::Result<()> {
//!         println!("{} -> {}", chart.title, path.display());
//!         Ok(())
//!     }
//! }
//!
//! let report = run(&PipelineConfig::default(), &Print)?;
//! println!("{}", report.summary);
//! # Ok::<(), qbench_rs::AnalysisError>(())
//! ```
//!
//! # Schema versions
//!
//! Older harness builds only write thread, payload, throughput and queue depth
//! columns; newer ones add latency percentiles (nanoseconds) and peak memory
//! (kilobytes). All versions load through the same path and missing columns
//! just leave fields empty. Charts whose metrics are absent are skipped.

pub mod axis;
pub mod builders;
pub mod chart;
pub mod dedup;
pub mod detect;
pub mod error;
pub mod group;
pub mod load;
pub mod parse;
pub mod pipeline;
pub mod record;
pub mod schema;
pub mod style;
pub mod summary;

pub use axis::{Metric, ThreadAxis, XAxis, efficiency};
pub use chart::{
    BarData, BarGroup, Chart, ChartFamily, ChartOutcome, ChartRenderer, LineData, Panel,
    PanelBody, Scale,
};
pub use dedup::{dedup_by, series_key};
pub use detect::{FixedAxes, detect_scaling_payload, detect_sensitivity_threads};
pub use error::{AnalysisError, InsufficientData, MalformedRow, Result, RowError};
pub use group::{GroupBy, Series, SeriesKey, group_and_style};
pub use load::{FileLoad, LoadReport, discover_result_files, load_all, load_file, load_reader};
pub use parse::{ParseConfig, parse_row};
pub use pipeline::{
    Analysis, AnalysisOptions, ChartReport, ChartStatus, PipelineConfig, PipelineReport, analyze,
    run, run_with_styles,
};
pub use record::{AllocMode, LatencyProfile, Percentile, RunRecord};
pub use schema::{Column, Schema, SchemaVersion};
pub use style::{LineStyle, Marker, Palette, Rgb, Style, StyleTable};
pub use summary::{ImplementationSummary, Stats, Summary, ThreadScaling};
