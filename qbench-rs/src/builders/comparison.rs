use super::single_category_bars;
use crate::axis::{Metric, XAxis};
use crate::chart::{Chart, ChartFamily, ChartOutcome, Panel, PanelBody, Scale};
use crate::dedup::dedup_by;
use crate::detect::FixedAxes;
use crate::error::InsufficientData;
use crate::group::{GroupBy, group_and_style};
use crate::record::{Percentile, RunRecord};
use crate::style::StyleTable;

/// Side-by-side bars for every implementation at the fixed (P, payload) point:
/// throughput, plus max depth, or p99 latency for files that carry no depth.
pub fn build_comparison(records: &[RunRecord], axes: FixedAxes, styles: &StyleTable) -> ChartOutcome {
    let family = ChartFamily::Comparison;
    let (Some(threads), Some(payload)) = (axes.threads, axes.payload_us) else {
        return Err(InsufficientData::new(family, "fixed thread count or payload not detected"));
    };

    let at_point: Vec<RunRecord> = records
        .iter()
        .filter(|r| r.producers == threads && r.payload_us == payload)
        .cloned()
        .collect();
    let subset = dedup_by(&at_point, |r| (r.implementation.clone(), r.mode));
    if subset.is_empty() {
        return Err(InsufficientData::new(
            family,
            format!("no runs at P={}, payload {}μs", threads, payload),
        ));
    }

    let series = group_and_style(&subset, GroupBy::infer(&subset), XAxis::Payload, styles);
    let secondary = [Metric::MaxDepth, Metric::Latency(Percentile::P99)]
        .into_iter()
        .find(|m| subset.iter().any(|r| m.value(r).is_some()));

    let panels = std::iter::once(Metric::Throughput)
        .chain(secondary)
        .map(|metric| Panel {
            title: format!("{} Comparison", metric.title()),
            x_label: String::new(),
            y_label: metric.label(),
            y_scale: Scale::Linear,
            y_limit: None,
            body: PanelBody::Bars(single_category_bars(&series, &metric.title(), metric)),
        })
        .collect::<Vec<_>>();

    Ok(Chart {
        family,
        title: format!("Implementation comparison (P={}, payload={}μs)", threads, payload),
        file_stem: family.file_stem().to_string(),
        columns: panels.len(),
        panels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::test_data::*;

    fn axes() -> FixedAxes {
        FixedAxes {
            payload_us: Some(100),
            threads: Some(2),
        }
    }

    #[test]
    fn test_comparison_bars_per_implementation() {
        let chart = build_comparison(&sweep(), axes(), &StyleTable::default()).unwrap();
        assert_eq!(chart.file_stem, "fig_implementation_comparison");
        assert_eq!(chart.panels.len(), 2);
        assert_eq!(chart.panels[1].y_label, "Max queue depth");

        let PanelBody::Bars(bars) = &chart.panels[0].body else {
            panic!("expected bars");
        };
        let labels: Vec<&str> = bars.groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["EBR", "hp"]);
        assert_eq!(bars.groups[0].values, vec![Some(2000.0)]);
    }

    #[test]
    fn test_latency_replaces_missing_depth() {
        let records = vec![with_latency(rec("EBR", 2, 100, 1.0), 5.0)];
        let chart = build_comparison(&records, axes(), &StyleTable::default()).unwrap();
        assert_eq!(chart.panels[1].y_label, "p99 latency (μs)");

        let bare = vec![rec("EBR", 2, 100, 1.0)];
        let chart = build_comparison(&bare, axes(), &StyleTable::default()).unwrap();
        assert_eq!(chart.panels.len(), 1);
    }

    #[test]
    fn test_comparison_needs_both_axes() {
        let partial = FixedAxes {
            payload_us: Some(100),
            threads: None,
        };
        assert!(build_comparison(&sweep(), partial, &StyleTable::default()).is_err());
        let err = build_comparison(&[], axes(), &StyleTable::default()).unwrap_err();
        assert_eq!(err.family, ChartFamily::Comparison);
    }
}
