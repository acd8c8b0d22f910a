//! # qbench-plots
//!
//! Raster rendering for the chart descriptions produced by `qbench-rs`.
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use qbench_plots::{BasePlotOptions, PngRenderer};
//! use qbench_rs::{PipelineConfig, run};
//!
//! # fn main() -> anyhow::Result<()> {
//! let options = BasePlotOptions::new()
//!     .panel_width(600u32)
//!     .panel_height(450u32)
//!     .build()?;
//! let report = run(&PipelineConfig::default(), &PngRenderer::new(options))?;
//! println!("saved {} charts", report.saved());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - `options`: layout settings built with the builder pattern
//! - `render`: the `plotters` drawing code and the [`PngRenderer`] adapter

pub mod options;
pub mod render;

pub use options::{BasePlotOptions, BasePlotOptionsBuilder};
pub use render::PngRenderer;
pub use render::plotters_backend::render_chart;

/// Encoded image bytes
pub type PlotBytes = Vec<u8>;

/// Widen `min..max` outward to multiples of a power of ten.
pub fn nice_bounds(min: f64, max: f64) -> (f64, f64) {
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }

    let range = max - min;
    if range == 0.0 {
        return (min - 0.5, min + 0.5);
    }

    let step_size = 10_f64.powf(range.log10().floor());
    let nice_min = (min / step_size).floor() * step_size;
    let nice_max = (max / step_size).ceil() * step_size;

    (nice_min, nice_max)
}

/// Log10-axis range covering `min..max` in whole decades. Both inputs must be positive.
pub fn log_bounds(min: f64, max: f64) -> std::ops::Range<f64> {
    let lo = min.log10().floor();
    let mut hi = max.max(min).log10().ceil();
    if hi <= lo {
        hi = lo + 1.0;
    }
    lo..hi
}
