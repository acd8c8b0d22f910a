use super::{line_panels, metrics_with_data};
use crate::axis::XAxis;
use crate::chart::{Chart, ChartFamily, ChartOutcome};
use crate::dedup::dedup_by;
use crate::error::InsufficientData;
use crate::group::GroupBy;
use crate::pipeline::AnalysisOptions;
use crate::record::{AllocMode, RunRecord};
use crate::style::StyleTable;
use std::collections::BTreeSet;
use tracing::debug;

/// Metrics against thread count at the fixed payload.
///
/// With `split_scaling_by_mode` each allocation mode gets its own row of panels,
/// otherwise all series share one row and are split by mode only when modes mix.
pub fn build_scaling(
    records: &[RunRecord],
    fixed_payload: Option<u32>,
    options: &AnalysisOptions,
    styles: &StyleTable,
) -> ChartOutcome {
    let family = ChartFamily::Scaling;
    let payload = fixed_payload
        .ok_or_else(|| InsufficientData::new(family, "no thread sweep detected"))?;

    let x_axis = XAxis::Threads(options.thread_axis);
    let at_payload: Vec<RunRecord> = records
        .iter()
        .filter(|r| r.payload_us == payload)
        .cloned()
        .collect();
    let subset = dedup_by(&at_payload, |r| {
        (r.implementation.clone(), r.mode, x_axis.raw(r))
    });
    if subset.is_empty() {
        return Err(InsufficientData::new(
            family,
            format!("no runs at payload {}μs", payload),
        ));
    }

    let metrics = metrics_with_data(&subset, &options.scaling_metrics);
    if metrics.is_empty() {
        return Err(InsufficientData::new(family, "none of the requested metrics has data"));
    }
    debug!("Scaling chart: {} runs, {} metrics", subset.len(), metrics.len());

    let panels = if options.split_scaling_by_mode {
        let modes: BTreeSet<AllocMode> = subset.iter().map(|r| r.mode).collect();
        modes
            .into_iter()
            .flat_map(|mode| {
                let rows: Vec<RunRecord> =
                    subset.iter().filter(|r| r.mode == mode).cloned().collect();
                line_panels(
                    &rows,
                    x_axis,
                    &metrics,
                    GroupBy::Implementation,
                    styles,
                    &format!(" [{}]", mode),
                )
            })
            .collect()
    } else {
        line_panels(
            &subset,
            x_axis,
            &metrics,
            GroupBy::infer(&subset),
            styles,
            "",
        )
    };

    Ok(Chart {
        family,
        title: format!("Scaling with threads (payload={}μs)", payload),
        file_stem: family.file_stem().to_string(),
        columns: metrics.len(),
        panels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::{Metric, ThreadAxis};
    use crate::builders::test_data::*;
    use crate::chart::PanelBody;

    fn lines(chart: &Chart, panel: usize) -> Vec<(String, Vec<(f64, f64)>)> {
        match &chart.panels[panel].body {
            PanelBody::Lines(lines) => lines
                .iter()
                .map(|l| (l.label.clone(), l.points.clone()))
                .collect(),
            PanelBody::Bars(_) => panic!("expected lines"),
        }
    }

    #[test]
    fn test_scaling_uses_fixed_payload_only() {
        let chart = build_scaling(&sweep(), Some(100), &AnalysisOptions::default(), &StyleTable::default())
            .unwrap();

        assert_eq!(chart.file_stem, "fig_threads_metrics");
        // throughput and max depth have data; latency and memory do not
        assert_eq!(chart.panels.len(), 2);
        assert_eq!(chart.columns, 2);
        assert_eq!(chart.panels[0].x_label, "Threads (P=C)");

        let throughput = lines(&chart, 0);
        assert_eq!(throughput.len(), 2);
        assert_eq!(throughput[0].0, "EBR");
        let xs: Vec<f64> = throughput[0].1.iter().map(|(x, _)| *x).collect();
        assert_eq!(xs, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_scaling_dedups_on_thread_count() {
        let mut records = sweep();
        records.push(rec("EBR", 3, 100, 9999.0).with_source("z.csv"));
        let chart = build_scaling(&records, Some(100), &AnalysisOptions::default(), &StyleTable::default())
            .unwrap();
        let ebr = &lines(&chart, 0)[0].1;
        assert_eq!(ebr.len(), 4);
        assert_eq!(ebr[2], (3.0, 9999.0));
    }

    #[test]
    fn test_scaling_on_total_threads() {
        let options = AnalysisOptions {
            thread_axis: ThreadAxis::Total,
            scaling_metrics: vec![Metric::Throughput],
            ..Default::default()
        };
        let chart = build_scaling(&sweep(), Some(100), &options, &StyleTable::default()).unwrap();
        assert_eq!(chart.panels.len(), 1);
        assert_eq!(chart.panels[0].x_label, "Threads (P+C)");
        let xs: Vec<f64> = lines(&chart, 0)[0].1.iter().map(|(x, _)| *x).collect();
        assert_eq!(xs, vec![2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn test_split_by_mode_gives_one_row_per_mode() {
        let mut records = sweep();
        records.extend(pooled(sweep()));
        let options = AnalysisOptions {
            split_scaling_by_mode: true,
            ..Default::default()
        };
        let chart = build_scaling(&records, Some(100), &options, &StyleTable::default()).unwrap();
        assert_eq!(chart.columns, 2);
        assert_eq!(chart.rows(), 2);
        assert!(chart.panels[0].title.ends_with("[heap]"));
        assert!(chart.panels[2].title.ends_with("[pooled]"));
        assert_eq!(lines(&chart, 2)[0].0, "EBR");
    }

    #[test]
    fn test_mixed_modes_without_split_are_separate_series() {
        let mut records = sweep();
        records.extend(pooled(sweep()));
        let chart = build_scaling(&records, Some(100), &AnalysisOptions::default(), &StyleTable::default())
            .unwrap();
        let labels: Vec<String> = lines(&chart, 0).into_iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["EBR (heap)", "EBR (pooled)", "hp (heap)", "hp (pooled)"]);
    }

    #[test]
    fn test_scaling_skipped_without_data() {
        let styles = StyleTable::default();
        let options = AnalysisOptions::default();

        let err = build_scaling(&[], None, &options, &styles).unwrap_err();
        assert_eq!(err.family, ChartFamily::Scaling);

        let err = build_scaling(&sweep(), Some(7), &options, &styles).unwrap_err();
        assert!(err.reason.contains("payload 7"));
    }
}
