use derive_builder::Builder;

/// Layout and typography shared by every chart
///
/// A chart's image size follows from its panel grid: `columns * panel_width`
/// wide and `rows * panel_height + title_area_size` tall.
///
/// # Example
///
/// ```rust,no_run
/// use qbench_plots::options::BasePlotOptions;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let base = BasePlotOptions::new()
///     .panel_width(640u32)
///     .font_family("DejaVu Sans")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Builder, Clone, Debug)]
#[builder(setter(into, strip_option), default)]
pub struct BasePlotOptions {
    /// Width of one panel in pixels
    #[builder(default = "500")]
    pub panel_width: u32,

    /// Height of one panel in pixels
    #[builder(default = "400")]
    pub panel_height: u32,

    /// Extra height for the chart title
    #[builder(default = "50")]
    pub title_area_size: u32,

    /// Margin around each panel in pixels
    #[builder(default = "10")]
    pub margin: u32,

    /// Size of the x-axis label area in pixels
    #[builder(default = "50")]
    pub x_label_area_size: u32,

    /// Size of the y-axis label area in pixels
    #[builder(default = "70")]
    pub y_label_area_size: u32,

    #[builder(default = "\"sans-serif\".to_string()")]
    pub font_family: String,

    #[builder(default = "28")]
    pub title_font_size: u32,

    #[builder(default = "18")]
    pub panel_title_font_size: u32,

    #[builder(default = "16")]
    pub axis_desc_font_size: u32,

    /// Tick and legend labels
    #[builder(default = "13")]
    pub label_font_size: u32,
}

impl Default for BasePlotOptions {
    fn default() -> Self {
        Self {
            panel_width: 500,
            panel_height: 400,
            title_area_size: 50,
            margin: 10,
            x_label_area_size: 50,
            y_label_area_size: 70,
            font_family: "sans-serif".to_string(),
            title_font_size: 28,
            panel_title_font_size: 18,
            axis_desc_font_size: 16,
            label_font_size: 13,
        }
    }
}

impl BasePlotOptions {
    /// Create a new builder for BasePlotOptions
    pub fn new() -> BasePlotOptionsBuilder {
        BasePlotOptionsBuilder::default()
    }
}
