use super::metric_lines;
use crate::axis::{Metric, XAxis};
use crate::chart::{Chart, ChartFamily, ChartOutcome, Panel, PanelBody, Scale};
use crate::dedup::dedup_by;
use crate::error::InsufficientData;
use crate::group::{GroupBy, group_and_style};
use crate::record::RunRecord;
use crate::style::StyleTable;

pub const EFFICIENCY_LIMIT: (f64, f64) = (0.0, 110.0);

/// Throughput as a percentage of the payload-bound ideal, against payload.
/// Zero-payload runs have no finite ideal and are excluded.
pub fn build_efficiency(
    records: &[RunRecord],
    fixed_threads: Option<u32>,
    styles: &StyleTable,
) -> ChartOutcome {
    let family = ChartFamily::Efficiency;
    let threads = fixed_threads
        .ok_or_else(|| InsufficientData::new(family, "no payload sweep detected"))?;

    let eligible: Vec<RunRecord> = records
        .iter()
        .filter(|r| r.producers == threads && r.payload_us > 0)
        .cloned()
        .collect();
    let subset = dedup_by(&eligible, |r| {
        (r.implementation.clone(), r.mode, r.payload_us)
    });
    if subset.is_empty() {
        return Err(InsufficientData::new(
            family,
            format!("no runs with non-zero payload at P={}", threads),
        ));
    }

    let x_axis = XAxis::Payload;
    let series = group_and_style(&subset, GroupBy::infer(&subset), x_axis, styles);
    let panel = Panel {
        title: format!("Efficiency vs Payload (P={})", threads),
        x_label: x_axis.label(&subset),
        y_label: Metric::Efficiency.label(),
        y_scale: Scale::Linear,
        y_limit: Some(EFFICIENCY_LIMIT),
        body: PanelBody::Lines(metric_lines(&series, x_axis, Metric::Efficiency)),
    };

    Ok(Chart {
        family,
        title: format!("Efficiency (P={})", threads),
        file_stem: family.file_stem().to_string(),
        columns: 1,
        panels: vec![panel],
    })
}
