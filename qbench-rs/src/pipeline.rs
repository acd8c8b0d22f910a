//! End-to-end driver: discover, load, analyze, render.

use crate::axis::{Metric, ThreadAxis};
use crate::builders::{
    build_comparison, build_distribution, build_efficiency, build_scaling, build_sensitivity,
};
use crate::chart::{Chart, ChartFamily, ChartOutcome, ChartRenderer};
use crate::detect::FixedAxes;
use crate::error::{AnalysisError, MalformedRow, Result};
use crate::load::{discover_result_files, load_all};
use crate::parse::ParseConfig;
use crate::record::{Percentile, RunRecord};
use crate::style::StyleTable;
use crate::summary::Summary;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

/// Options for building charts from loaded records.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Thread count plotted on scaling charts
    pub thread_axis: ThreadAxis,

    /// One row of scaling panels per allocation mode
    pub split_scaling_by_mode: bool,

    /// Panels on the scaling and sensitivity charts, in order; metrics without data are dropped
    pub scaling_metrics: Vec<Metric>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            thread_axis: ThreadAxis::Producers,
            split_scaling_by_mode: false,
            scaling_metrics: vec![
                Metric::Throughput,
                Metric::Latency(Percentile::P99),
                Metric::PeakMemory,
                Metric::MaxDepth,
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Where result files are read from and images are written to
    pub results_dir: PathBuf,

    /// Result file extension, matched case-insensitively
    pub extension: String,

    pub parse: ParseConfig,
    pub analysis: AnalysisOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("results"),
            extension: "csv".to_string(),
            parse: ParseConfig::default(),
            analysis: AnalysisOptions::default(),
        }
    }
}

/// Everything derived from one record set.
#[derive(Debug)]
pub struct Analysis {
    pub axes: FixedAxes,
    /// In output order: scaling, distribution, sensitivity, efficiency, comparison
    pub charts: Vec<ChartOutcome>,
    pub summary: Summary,
}

impl Analysis {
    pub fn built(&self) -> impl Iterator<Item = &Chart> {
        self.charts.iter().filter_map(|c| c.as_ref().ok())
    }
}

/// Detect the experiment shape and describe every chart family. Pure.
pub fn analyze(records: &[RunRecord], options: &AnalysisOptions, styles: &StyleTable) -> Analysis {
    let axes = FixedAxes::detect(records);

    let charts = vec![
        build_scaling(records, axes.payload_us, options, styles),
        build_distribution(records, axes.payload_us, styles),
        build_sensitivity(records, axes.threads, &options.scaling_metrics, styles),
        build_efficiency(records, axes.threads, styles),
        build_comparison(records, axes, styles),
    ];

    Analysis {
        axes,
        charts,
        summary: Summary::build(records, axes.payload_us, options.thread_axis),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ChartStatus {
    Saved { path: PathBuf },
    Skipped { reason: String },
    Failed { path: PathBuf, error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartReport {
    pub family: ChartFamily,
    #[serde(flatten)]
    pub status: ChartStatus,
}

#[derive(Debug, Serialize)]
pub struct PipelineReport {
    pub files: Vec<PathBuf>,
    pub records: usize,
    pub malformed: Vec<String>,
    pub axes: FixedAxes,
    pub charts: Vec<ChartReport>,
    pub summary: Summary,
}

impl PipelineReport {
    pub fn saved(&self) -> usize {
        self.charts
            .iter()
            .filter(|c| matches!(c.status, ChartStatus::Saved { .. }))
            .count()
    }
}

/// Load every result file under `config.results_dir` and render each chart that has data.
///
/// Fails only with [`AnalysisError::MissingInput`] when there is nothing to analyze;
/// skipped and failed charts are recorded in the report.
pub fn run(config: &PipelineConfig, renderer: &dyn ChartRenderer) -> Result<PipelineReport> {
    run_with_styles(config, renderer, &StyleTable::default())
}

pub fn run_with_styles(
    config: &PipelineConfig,
    renderer: &dyn ChartRenderer,
    styles: &StyleTable,
) -> Result<PipelineReport> {
    let paths = discover_result_files(&config.results_dir, &config.extension);
    if paths.is_empty() {
        return Err(AnalysisError::MissingInput(format!(
            "no *.{} files in {}",
            config.extension,
            config.results_dir.display()
        )));
    }

    let load = load_all(&paths, &config.parse);
    if load.records.is_empty() {
        return Err(AnalysisError::MissingInput(format!(
            "none of the {} file(s) in {} has a valid row",
            paths.len(),
            config.results_dir.display()
        )));
    }

    let analysis = analyze(&load.records, &config.analysis, styles);
    log_axes(&analysis.axes);

    let charts = analysis
        .charts
        .iter()
        .map(|outcome| match outcome {
            Ok(chart) => render_one(chart, config, renderer),
            Err(skip) => {
                warn!("Skipping {}", skip);
                ChartReport {
                    family: skip.family,
                    status: ChartStatus::Skipped {
                        reason: skip.reason.clone(),
                    },
                }
            }
        })
        .collect();

    Ok(PipelineReport {
        files: load.files,
        records: load.records.len(),
        malformed: load.malformed.iter().map(MalformedRow::to_string).collect(),
        axes: analysis.axes,
        charts,
        summary: analysis.summary,
    })
}

fn render_one(chart: &Chart, config: &PipelineConfig, renderer: &dyn ChartRenderer) -> ChartReport {
    let path = config
        .results_dir
        .join(format!("{}.png", chart.file_stem));
    let status = match renderer.render_to_file(chart, &path) {
        Ok(()) => {
            info!("Saved {}", path.display());
            ChartStatus::Saved { path }
        }
        Err(e) => {
            warn!("Failed to render {}: {:#}", path.display(), e);
            ChartStatus::Failed {
                path,
                error: format!("{:#}", e),
            }
        }
    };
    ChartReport {
        family: chart.family,
        status,
    }
}

fn log_axes(axes: &FixedAxes) {
    match axes.payload_us {
        Some(payload) => info!("Thread sweep detected at payload {}μs", payload),
        None => info!("No thread sweep detected"),
    }
    match axes.threads {
        Some(threads) => info!("Payload sweep detected at P={}", threads),
        None => info!("No payload sweep detected"),
    }
}
