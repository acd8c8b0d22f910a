//! Backend-agnostic chart descriptions.
//!
//! Builders produce a [`Chart`]; a [`ChartRenderer`] turns it into an image.
//! Nothing in here knows about pixels or fonts.

use crate::error::InsufficientData;
use crate::style::Style;
use serde::Serialize;
use std::path::Path;
use strum_macros::{Display, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumIter)]
pub enum ChartFamily {
    #[strum(serialize = "scaling")]
    Scaling,
    #[strum(serialize = "payload sensitivity")]
    Sensitivity,
    #[strum(serialize = "latency distribution")]
    Distribution,
    #[strum(serialize = "efficiency")]
    Efficiency,
    #[strum(serialize = "implementation comparison")]
    Comparison,
}

impl ChartFamily {
    /// Output file name without extension; stable across runs.
    pub fn file_stem(self) -> &'static str {
        match self {
            ChartFamily::Scaling => "fig_threads_metrics",
            ChartFamily::Sensitivity => "fig_payload_metrics",
            ChartFamily::Distribution => "fig_latency_breakdown",
            ChartFamily::Efficiency => "fig_efficiency",
            ChartFamily::Comparison => "fig_implementation_comparison",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Scale {
    #[default]
    Linear,
    Log10,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineData {
    pub label: String,
    pub style: Style,
    /// (x, y), sorted by x
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarGroup {
    pub label: String,
    pub style: Style,
    /// One entry per category; `None` leaves a gap
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarData {
    pub categories: Vec<String>,
    pub groups: Vec<BarGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PanelBody {
    Lines(Vec<LineData>),
    Bars(BarData),
}

impl PanelBody {
    pub fn series_labels(&self) -> Vec<&str> {
        match self {
            PanelBody::Lines(lines) => lines.iter().map(|l| l.label.as_str()).collect(),
            PanelBody::Bars(bars) => bars.groups.iter().map(|g| g.label.as_str()).collect(),
        }
    }

    /// Every finite y value in the panel.
    pub fn y_values(&self) -> Vec<f64> {
        match self {
            PanelBody::Lines(lines) => lines
                .iter()
                .flat_map(|l| l.points.iter().map(|(_, y)| *y))
                .collect(),
            PanelBody::Bars(bars) => bars
                .groups
                .iter()
                .flat_map(|g| g.values.iter().flatten().copied())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub y_scale: Scale,
    /// Fixed y range; derived from the data when `None`
    pub y_limit: Option<(f64, f64)>,
    pub body: PanelBody,
}

/// A figure: a grid of panels filled row-major, `columns` wide.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub family: ChartFamily,
    pub title: String,
    pub file_stem: String,
    pub columns: usize,
    pub panels: Vec<Panel>,
}

impl Chart {
    pub fn rows(&self) -> usize {
        if self.columns == 0 {
            return 0;
        }
        self.panels.len().div_ceil(self.columns)
    }
}

/// What a builder hands back: a chart, or the reason there is none.
pub type ChartOutcome = Result<Chart, InsufficientData>;

/// Draws a chart description to an image file.
pub trait ChartRenderer {
    fn render_to_file(&self, chart: &Chart, path: &Path) -> anyhow::Result<()>;
}
