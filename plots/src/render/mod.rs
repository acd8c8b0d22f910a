pub mod plotters_backend;

use crate::options::BasePlotOptions;
use anyhow::Context;
use qbench_rs::{Chart, ChartRenderer};
use std::path::Path;

/// Renders charts to PNG files with the `plotters` bitmap backend.
#[derive(Debug, Clone, Default)]
pub struct PngRenderer {
    pub options: BasePlotOptions,
}

impl PngRenderer {
    pub fn new(options: BasePlotOptions) -> Self {
        Self { options }
    }
}

impl ChartRenderer for PngRenderer {
    fn render_to_file(&self, chart: &Chart, path: &Path) -> anyhow::Result<()> {
        let bytes = plotters_backend::render_chart(chart, &self.options)
            .with_context(|| format!("rendering {} chart", chart.family))?;
        std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
    }
}
