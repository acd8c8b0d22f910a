use super::{line_panels, metrics_with_data};
use crate::axis::{Metric, XAxis};
use crate::chart::{Chart, ChartFamily, ChartOutcome};
use crate::dedup::dedup_by;
use crate::error::InsufficientData;
use crate::group::GroupBy;
use crate::record::RunRecord;
use crate::style::StyleTable;

/// Metrics against payload at the fixed producer count.
pub fn build_sensitivity(
    records: &[RunRecord],
    fixed_threads: Option<u32>,
    metrics: &[Metric],
    styles: &StyleTable,
) -> ChartOutcome {
    let family = ChartFamily::Sensitivity;
    let threads = fixed_threads
        .ok_or_else(|| InsufficientData::new(family, "no payload sweep detected"))?;

    let at_threads: Vec<RunRecord> = records
        .iter()
        .filter(|r| r.producers == threads)
        .cloned()
        .collect();
    let subset = dedup_by(&at_threads, |r| {
        (r.implementation.clone(), r.mode, r.payload_us)
    });
    if subset.is_empty() {
        return Err(InsufficientData::new(family, format!("no runs at P={}", threads)));
    }

    let metrics = metrics_with_data(&subset, metrics);
    if metrics.is_empty() {
        return Err(InsufficientData::new(family, "none of the requested metrics has data"));
    }

    let panels = line_panels(
        &subset,
        XAxis::Payload,
        &metrics,
        GroupBy::infer(&subset),
        styles,
        "",
    );

    Ok(Chart {
        family,
        title: format!("Payload sensitivity (P={})", threads),
        file_stem: family.file_stem().to_string(),
        columns: metrics.len(),
        panels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::test_data::*;
    use crate::chart::PanelBody;
    use crate::record::Percentile;

    #[test]
    fn test_sensitivity_sweeps_payload_at_fixed_threads() {
        let chart = build_sensitivity(&sweep(), Some(2), &[Metric::Throughput], &StyleTable::default())
            .unwrap();
        assert_eq!(chart.file_stem, "fig_payload_metrics");
        assert_eq!(chart.title, "Payload sensitivity (P=2)");
        assert_eq!(chart.panels[0].x_label, "Payload (μs)");

        let PanelBody::Lines(lines) = &chart.panels[0].body else {
            panic!("expected lines");
        };
        assert_eq!(lines.len(), 2);
        let xs: Vec<f64> = lines[0].points.iter().map(|(x, _)| *x).collect();
        assert_eq!(xs, vec![0.0, 50.0, 100.0, 200.0]);
    }

    #[test]
    fn test_latency_panel_appears_with_latency_columns() {
        let records: Vec<RunRecord> = [10, 100]
            .into_iter()
            .map(|payload| with_latency(rec("EBR", 2, payload, 10.0), payload as f64))
            .collect();
        let chart = build_sensitivity(
            &records,
            Some(2),
            &[Metric::Throughput, Metric::Latency(Percentile::P99)],
            &StyleTable::default(),
        )
        .unwrap();
        assert_eq!(chart.panels.len(), 2);
        assert_eq!(chart.panels[1].y_label, "p99 latency (μs)");
    }

    #[test]
    fn test_sensitivity_skipped_without_runs() {
        let styles = StyleTable::default();
        assert!(build_sensitivity(&[], None, &[Metric::Throughput], &styles).is_err());
        let err = build_sensitivity(&sweep(), Some(64), &[Metric::Throughput], &styles).unwrap_err();
        assert_eq!(err.family, ChartFamily::Sensitivity);
    }
}
