use crate::axis::XAxis;
use crate::chart::{BarData, BarGroup, Chart, ChartFamily, ChartOutcome, Panel, PanelBody, Scale};
use crate::dedup::dedup_by;
use crate::error::InsufficientData;
use crate::group::{GroupBy, group_and_style};
use crate::record::{AllocMode, Percentile, RunRecord};
use crate::style::StyleTable;
use std::collections::BTreeSet;
use strum::IntoEnumIterator;

/// Latency percentiles per implementation at the highest producer count with
/// latency data in the fixed-payload sweep, one grouped-bar panel per
/// allocation mode, log y axis.
///
/// Always keyed on P, whatever thread axis the scaling chart uses.
pub fn build_distribution(
    records: &[RunRecord],
    fixed_payload: Option<u32>,
    styles: &StyleTable,
) -> ChartOutcome {
    let family = ChartFamily::Distribution;
    let payload = fixed_payload
        .ok_or_else(|| InsufficientData::new(family, "no thread sweep detected"))?;

    let with_latency: Vec<&RunRecord> = records
        .iter()
        .filter(|r| r.payload_us == payload && !r.latency.is_empty())
        .collect();
    // depth-only files may sweep further than the latency-bearing ones
    let max_threads = with_latency
        .iter()
        .map(|r| r.producers)
        .max()
        .ok_or_else(|| InsufficientData::new(family, format!("no latency data at payload {}μs", payload)))?;

    let at_point: Vec<RunRecord> = with_latency
        .into_iter()
        .filter(|r| r.producers == max_threads)
        .cloned()
        .collect();
    let subset = dedup_by(&at_point, |r| (r.implementation.clone(), r.mode));

    let modes: BTreeSet<AllocMode> = subset.iter().map(|r| r.mode).collect();
    let panels: Vec<Panel> = modes
        .into_iter()
        .filter_map(|mode| {
            let rows: Vec<RunRecord> = subset.iter().filter(|r| r.mode == mode).cloned().collect();
            mode_panel(&rows, mode, styles)
        })
        .collect();

    Ok(Chart {
        family,
        title: format!("Latency distribution (P={}, payload={}μs)", max_threads, payload),
        file_stem: family.file_stem().to_string(),
        columns: panels.len(),
        panels,
    })
}

fn mode_panel(rows: &[RunRecord], mode: AllocMode, styles: &StyleTable) -> Option<Panel> {
    let percentiles: Vec<Percentile> = Percentile::iter()
        .filter(|&p| rows.iter().any(|r| r.latency.get(p).is_some()))
        .collect();
    if percentiles.is_empty() {
        return None;
    }

    // one record per implementation after dedup
    let series = group_and_style(rows, GroupBy::Implementation, XAxis::Payload, styles);
    let groups = series
        .iter()
        .map(|s| BarGroup {
            label: s.label(),
            style: s.style,
            values: percentiles
                .iter()
                .map(|&p| s.records.first().and_then(|r| r.latency.get(p)))
                .collect(),
        })
        .collect();

    Some(Panel {
        title: format!("{} allocation", capitalize(&mode.to_string())),
        x_label: "Percentile".to_string(),
        y_label: "Latency (μs, log scale)".to_string(),
        y_scale: Scale::Log10,
        y_limit: None,
        body: PanelBody::Bars(BarData {
            categories: percentiles.iter().map(|p| p.to_string()).collect(),
            groups,
        }),
    })
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::test_data::*;

    fn latency_sweep() -> Vec<RunRecord> {
        let mut records = Vec::new();
        for p in 1..=4 {
            records.push(with_latency(rec("EBR", p, 100, 1.0), 10.0 * p as f64));
            records.push(with_latency(rec("mutex", p, 100, 1.0), 1000.0 * p as f64));
        }
        records
    }

    #[test]
    fn test_breakdown_at_max_threads() {
        let chart = build_distribution(&latency_sweep(), Some(100), &StyleTable::default()).unwrap();
        assert_eq!(chart.title, "Latency distribution (P=4, payload=100μs)");
        assert_eq!(chart.panels.len(), 1);

        let panel = &chart.panels[0];
        assert_eq!(panel.y_scale, Scale::Log10);
        assert_eq!(panel.title, "Heap allocation");
        let PanelBody::Bars(bars) = &panel.body else {
            panic!("expected bars");
        };
        assert_eq!(bars.categories, vec!["avg", "p50", "p99", "max"]);
        assert_eq!(bars.groups.len(), 2);
        assert_eq!(bars.groups[0].label, "EBR");
        assert_eq!(bars.groups[0].values[2], Some(40.0));
        assert_eq!(bars.groups[1].values[2], Some(4000.0));
    }

    #[test]
    fn test_one_panel_per_mode() {
        let mut records = latency_sweep();
        records.extend(pooled(latency_sweep()));
        let chart = build_distribution(&records, Some(100), &StyleTable::default()).unwrap();
        let titles: Vec<&str> = chart.panels.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Heap allocation", "Pooled allocation"]);
        assert_eq!(chart.columns, 2);
    }

    #[test]
    fn test_no_latency_columns_is_insufficient() {
        let err = build_distribution(&sweep(), Some(100), &StyleTable::default()).unwrap_err();
        assert_eq!(err.family, ChartFamily::Distribution);
        assert!(build_distribution(&[], None, &StyleTable::default()).is_err());
    }

    #[test]
    fn test_mixed_harness_versions_use_latency_rows() {
        // depth-only rows sweep to P=8, latency rows stop at P=4
        let mut records: Vec<RunRecord> = (1..=8).map(|p| rec("EBR", p, 100, 1.0)).collect();
        records.extend(latency_sweep());

        let chart = build_distribution(&records, Some(100), &StyleTable::default()).unwrap();
        assert_eq!(chart.title, "Latency distribution (P=4, payload=100μs)");
        let PanelBody::Bars(bars) = &chart.panels[0].body else {
            panic!("expected bars");
        };
        assert_eq!(bars.groups.len(), 2);
        assert_eq!(bars.groups[0].values[2], Some(40.0));
    }
}
