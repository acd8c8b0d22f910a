//! Chart builders, one per figure family.
//!
//! Each builder selects the records its figure needs, deduplicates them on the
//! figure's configuration key and describes the result as a [`Chart`]. An empty
//! selection is reported as [`InsufficientData`], never as a panic or an empty image.
//!
//! [`Chart`]: crate::chart::Chart
//! [`InsufficientData`]: crate::error::InsufficientData

pub mod comparison;
pub mod distribution;
pub mod efficiency;
pub mod scaling;
pub mod sensitivity;

pub use comparison::build_comparison;
pub use distribution::build_distribution;
pub use efficiency::build_efficiency;
pub use scaling::build_scaling;
pub use sensitivity::build_sensitivity;

use crate::axis::{Metric, XAxis};
use crate::chart::{BarData, BarGroup, LineData, Panel, PanelBody, Scale};
use crate::group::{GroupBy, Series, group_and_style};
use crate::record::RunRecord;
use crate::style::StyleTable;

/// Metrics that have at least one value in `records`, in the requested order.
pub(crate) fn metrics_with_data(records: &[RunRecord], metrics: &[Metric]) -> Vec<Metric> {
    metrics
        .iter()
        .copied()
        .filter(|m| records.iter().any(|r| m.value(r).is_some()))
        .collect()
}

/// One line per series; records without a value for `metric` are left out of the line.
pub(crate) fn metric_lines(series: &[Series], x_axis: XAxis, metric: Metric) -> Vec<LineData> {
    series
        .iter()
        .filter_map(|s| {
            let points: Vec<(f64, f64)> = s
                .records
                .iter()
                .filter_map(|r| metric.value(r).map(|y| (x_axis.value(r), y)))
                .collect();
            (!points.is_empty()).then(|| LineData {
                label: s.label(),
                style: s.style,
                points,
            })
        })
        .collect()
}

/// A row of line panels, one per metric, sharing one x axis.
pub(crate) fn line_panels(
    records: &[RunRecord],
    x_axis: XAxis,
    metrics: &[Metric],
    group_by: GroupBy,
    styles: &StyleTable,
    title_suffix: &str,
) -> Vec<Panel> {
    let series = group_and_style(records, group_by, x_axis, styles);
    let x_label = x_axis.label(records);
    let x_name = match x_axis {
        XAxis::Threads(_) => "Threads",
        XAxis::Payload => "Payload",
    };

    metrics
        .iter()
        .map(|&metric| Panel {
            title: format!("{} vs {}{}", metric.title(), x_name, title_suffix),
            x_label: x_label.clone(),
            y_label: metric.label(),
            y_scale: Scale::Linear,
            y_limit: None,
            body: PanelBody::Lines(metric_lines(&series, x_axis, metric)),
        })
        .collect()
}

/// Bars for one value per series, all under a single category.
pub(crate) fn single_category_bars(series: &[Series], category: &str, metric: Metric) -> BarData {
    BarData {
        categories: vec![category.to_string()],
        groups: series
            .iter()
            .map(|s| BarGroup {
                label: s.label(),
                style: s.style,
                values: vec![s.records.first().and_then(|r| metric.value(r))],
            })
            .collect(),
    }
}
