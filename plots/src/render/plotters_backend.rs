use crate::options::BasePlotOptions;
use crate::{PlotBytes, log_bounds, nice_bounds};
use anyhow::{Result, anyhow};
use image::{ImageEncoder, RgbImage, codecs::png::PngEncoder};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use qbench_rs::{BarData, Chart, LineData, LineStyle, Marker, Panel, PanelBody, Rgb, Scale};
use std::ops::Range;
use tracing::debug;

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Map a data value onto the drawn axis. Non-positive values have no place on a log axis.
fn to_axis(scale: Scale, value: f64) -> Option<f64> {
    match scale {
        Scale::Linear => Some(value),
        Scale::Log10 if value > 0.0 => Some(value.log10()),
        Scale::Log10 => None,
    }
}

/// Label a tick in data units, undoing the axis transform.
fn format_tick(scale: Scale, value: f64) -> String {
    let data_value = match scale {
        Scale::Linear => value,
        Scale::Log10 => 10f64.powf(value),
    };
    format_value(data_value)
}

pub(crate) fn format_value(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1e6 {
        format!("{:.1e}", value)
    } else if magnitude >= 100.0 || value.fract() == 0.0 {
        format!("{:.0}", value)
    } else if magnitude >= 1.0 {
        format!("{:.1}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn rgb(color: Rgb) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

/// Y range on the drawn axis for a panel.
pub(crate) fn y_range(panel: &Panel) -> Range<f64> {
    if let Some((lo, hi)) = panel.y_limit {
        return match panel.y_scale {
            Scale::Linear => lo..hi,
            Scale::Log10 => log_bounds(lo.max(f64::MIN_POSITIVE), hi),
        };
    }

    let values: Vec<f64> = panel
        .body
        .y_values()
        .into_iter()
        .filter(|v| v.is_finite())
        .collect();
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), v| {
            (min.min(*v), max.max(*v))
        });

    match panel.y_scale {
        Scale::Linear if values.is_empty() => 0.0..1.0,
        Scale::Linear => {
            let (lo, hi) = nice_bounds(min.min(0.0), max);
            lo..hi
        }
        Scale::Log10 => {
            let positive_min = values
                .iter()
                .copied()
                .filter(|v| *v > 0.0)
                .fold(f64::INFINITY, f64::min);
            if positive_min.is_finite() {
                log_bounds(positive_min, max)
            } else {
                0.0..1.0
            }
        }
    }
}

pub(crate) fn x_range(lines: &[LineData]) -> Range<f64> {
    let (min, max) = lines
        .iter()
        .flat_map(|l| l.points.iter().map(|(x, _)| *x))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), x| {
            (min.min(x), max.max(x))
        });
    if !min.is_finite() {
        return 0.0..1.0;
    }
    if min == max {
        return (min - 1.0)..(max + 1.0);
    }
    let pad = (max - min) * 0.05;
    (min - pad)..(max + pad)
}

/// Pixel dimensions of a `rows x columns` panel grid and the length of its RGB
/// buffer (3 bytes per pixel).
pub(crate) fn canvas_size(
    rows: usize,
    columns: usize,
    options: &BasePlotOptions,
) -> Result<(u32, u32, usize)> {
    let too_large = || anyhow!("chart grid of {rows}x{columns} panels is too large to render");
    let columns_px = u32::try_from(columns).map_err(|_| too_large())?;
    let rows_px = u32::try_from(rows).map_err(|_| too_large())?;
    let width = options.panel_width.checked_mul(columns_px).ok_or_else(too_large)?;
    let height = options
        .panel_height
        .checked_mul(rows_px)
        .and_then(|h| h.checked_add(options.title_area_size))
        .ok_or_else(too_large)?;
    let buffer_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(3))
        .ok_or_else(too_large)?;
    Ok((width, height, buffer_len))
}

/// Render a chart description to PNG bytes.
///
/// Panels fill a `rows x columns` grid of `panel_width x panel_height` cells
/// under the chart title.
pub fn render_chart(chart: &Chart, options: &BasePlotOptions) -> Result<PlotBytes> {
    let columns = chart.columns.max(1);
    let rows = chart.rows().max(1);
    let (width, height, buffer_len) = canvas_size(rows, columns, options)?;

    let draw_start = std::time::Instant::now();
    let mut pixel_buffer = vec![255; buffer_len];
    {
        let root = BitMapBackend::with_buffer(&mut pixel_buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| anyhow!("failed to fill plot background: {e}"))?;

        let body = root
            .titled(
                &chart.title,
                (options.font_family.as_str(), options.title_font_size),
            )
            .map_err(|e| anyhow!("failed to draw chart title: {e}"))?;

        let cells = body.split_evenly((rows, columns));
        for (panel, cell) in chart.panels.iter().zip(cells.iter()) {
            draw_panel(cell, panel, options)?;
        }

        root.present()
            .map_err(|e| anyhow!("failed to present plotters buffer: {e}"))?;
    }
    debug!("Drew {} panels in {:?}", chart.panels.len(), draw_start.elapsed());

    let img: RgbImage = image::ImageBuffer::from_vec(width, height, pixel_buffer)
        .ok_or_else(|| anyhow!("plot image buffer had unexpected size"))?;

    let mut encoded = Vec::new();
    PngEncoder::new(&mut encoded)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .map_err(|e| anyhow!("failed to PNG encode plot: {e}"))?;

    Ok(encoded)
}

fn draw_panel(area: &Area<'_>, panel: &Panel, options: &BasePlotOptions) -> Result<()> {
    match &panel.body {
        PanelBody::Lines(lines) => draw_lines(area, panel, lines, options),
        PanelBody::Bars(bars) => draw_bars(area, panel, bars, options),
    }
}

fn draw_lines(
    area: &Area<'_>,
    panel: &Panel,
    lines: &[LineData],
    options: &BasePlotOptions,
) -> Result<()> {
    let scale = panel.y_scale;
    let mut chart = ChartBuilder::on(area)
        .caption(
            &panel.title,
            (options.font_family.as_str(), options.panel_title_font_size),
        )
        .margin(options.margin)
        .x_label_area_size(options.x_label_area_size)
        .y_label_area_size(options.y_label_area_size)
        .build_cartesian_2d(x_range(lines), y_range(panel))
        .map_err(|e| anyhow!("failed to build chart: {e}"))?;

    let y_formatter = move |y: &f64| format_tick(scale, *y);
    let x_formatter = |x: &f64| format_value(*x);
    chart
        .configure_mesh()
        .x_desc(panel.x_label.as_str())
        .y_desc(panel.y_label.as_str())
        .x_label_formatter(&x_formatter)
        .y_label_formatter(&y_formatter)
        .label_style((options.font_family.as_str(), options.label_font_size))
        .axis_desc_style((options.font_family.as_str(), options.axis_desc_font_size))
        .draw()
        .map_err(|e| anyhow!("failed to draw plot mesh: {e}"))?;

    for line in lines {
        let color = rgb(line.style.color);
        let stroke = color.stroke_width(line.style.weight);
        let points: Vec<(f64, f64)> = line
            .points
            .iter()
            .filter_map(|(x, y)| to_axis(scale, *y).map(|y| (*x, y)))
            .collect();

        let anno = match line.style.line {
            LineStyle::Solid => chart.draw_series(LineSeries::new(points.iter().copied(), stroke)),
            LineStyle::Dashed => {
                chart.draw_series(DashedLineSeries::new(points.iter().copied(), 6, 4, stroke))
            }
        }
        .map_err(|e| anyhow!("failed to draw series {}: {e}", line.label))?;
        anno.label(line.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], stroke));

        let marker_size = line.style.weight as i32 + 2;
        let fill = color.filled();
        match line.style.marker {
            Marker::Circle => chart.draw_series(
                points
                    .iter()
                    .map(|p| Circle::new(*p, marker_size, fill)),
            ),
            Marker::Triangle => chart.draw_series(
                points
                    .iter()
                    .map(|p| TriangleMarker::new(*p, marker_size, fill)),
            ),
        }
        .map_err(|e| anyhow!("failed to draw markers for {}: {e}", line.label))?;
    }

    if !lines.is_empty() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font((options.font_family.as_str(), options.label_font_size))
            .draw()
            .map_err(|e| anyhow!("failed to draw legend: {e}"))?;
    }
    Ok(())
}

fn draw_bars(
    area: &Area<'_>,
    panel: &Panel,
    bars: &BarData,
    options: &BasePlotOptions,
) -> Result<()> {
    let scale = panel.y_scale;
    let y_range = y_range(panel);
    let n_categories = bars.categories.len().max(1);
    let x_range = -0.5..(n_categories as f64 - 0.5);

    let mut chart = ChartBuilder::on(area)
        .caption(
            &panel.title,
            (options.font_family.as_str(), options.panel_title_font_size),
        )
        .margin(options.margin)
        .x_label_area_size(options.x_label_area_size)
        .y_label_area_size(options.y_label_area_size)
        .build_cartesian_2d(x_range, y_range.clone())
        .map_err(|e| anyhow!("failed to build chart: {e}"))?;

    let categories = bars.categories.clone();
    let x_formatter = move |x: &f64| category_label(&categories, *x);
    let y_formatter = move |y: &f64| format_tick(scale, *y);
    let mut mesh = chart.configure_mesh();
    mesh.disable_x_mesh()
        .x_labels(n_categories)
        .x_label_formatter(&x_formatter)
        .y_label_formatter(&y_formatter)
        .y_desc(panel.y_label.as_str())
        .label_style((options.font_family.as_str(), options.label_font_size))
        .axis_desc_style((options.font_family.as_str(), options.axis_desc_font_size));
    if !panel.x_label.is_empty() {
        mesh.x_desc(panel.x_label.as_str());
    }
    mesh.draw()
        .map_err(|e| anyhow!("failed to draw plot mesh: {e}"))?;

    let n_groups = bars.groups.len().max(1) as f64;
    let group_width = 0.8;
    let bar_width = group_width / n_groups;
    let base = y_range.start;

    for (group_idx, group) in bars.groups.iter().enumerate() {
        let color = rgb(group.style.color);
        let offset = (group_idx as f64 - (n_groups - 1.0) / 2.0) * bar_width;
        let rects: Vec<Rectangle<(f64, f64)>> = group
            .values
            .iter()
            .enumerate()
            .filter_map(|(category_idx, value)| {
                let top = to_axis(scale, (*value)?)?;
                let center = category_idx as f64 + offset;
                Some(Rectangle::new(
                    [
                        (center - bar_width / 2.0 + 0.01, base),
                        (center + bar_width / 2.0 - 0.01, top),
                    ],
                    color.filled(),
                ))
            })
            .collect();

        chart
            .draw_series(rects)
            .map_err(|e| anyhow!("failed to draw bars for {}: {e}", group.label))?
            .label(group.label.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], color.filled()));
    }

    if !bars.groups.is_empty() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font((options.font_family.as_str(), options.label_font_size))
            .draw()
            .map_err(|e| anyhow!("failed to draw legend: {e}"))?;
    }
    Ok(())
}

/// Category name for a tick at an integer position, blank elsewhere.
pub(crate) fn category_label(categories: &[String], x: f64) -> String {
    let index = x.round();
    if (x - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }
    categories.get(index as usize).cloned().unwrap_or_default()
}
