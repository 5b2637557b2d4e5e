use crate::backend::Backend;
use crate::error::{PlotError, Result};
use crate::parser::parse_format;
use crate::style::SeriesStyle;
use std::str::FromStr;

/// Default width/height ratio, the golden mean
pub const GOLDEN_RATIO: f64 = 1.618_033_988_749_895;

const RATIO_TOLERANCE: f64 = 1e-9;

/// Which axis a configuration applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Axis scale kind. Only linear axes are implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisKind {
    #[default]
    Linear,
    Log,
}

impl FromStr for AxisKind {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "linear" => Ok(AxisKind::Linear),
            "log" => Ok(AxisKind::Log),
            other => Err(PlotError::UnsupportedFeature(format!(
                "axis kind '{}'",
                other
            ))),
        }
    }
}

/// Axis configuration. Unset limits are auto-scaled from the data.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AxisConfig {
    pub kind: AxisKind,
    pub label: Option<String>,
    /// Overrides the automatically chosen tick positions when non-empty
    pub manual_ticks: Vec<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl AxisConfig {
    pub fn linear() -> Self {
        Self::default()
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn ticks(mut self, ticks: Vec<f64>) -> Self {
        self.manual_ticks = ticks;
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.kind != AxisKind::Linear {
            return Err(PlotError::UnsupportedFeature(format!(
                "{:?} axes are not implemented, only linear",
                self.kind
            )));
        }
        for (name, limit) in [("minimum", self.min), ("maximum", self.max)] {
            if let Some(value) = limit.filter(|v| !v.is_finite()) {
                return Err(PlotError::Configuration(format!(
                    "axis {} must be finite, got {}",
                    name, value
                )));
            }
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if !(min < max) {
                return Err(PlotError::Configuration(format!(
                    "axis minimum {} must be below maximum {}",
                    min, max
                )));
            }
        }
        Ok(())
    }
}

/// Legend display, positioned by a code such as `tr` or `bl`
#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub position: String,
}

/// Style codes for [`Graph::add_series`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesOptions<'a> {
    pub color: &'a str,
    /// `None` or `"none"` draws no line
    pub line: Option<&'a str>,
    /// `None` or `"none"` draws no marker
    pub marker: Option<&'a str>,
    /// Defaults to `color` when a marker is drawn
    pub marker_fill: Option<&'a str>,
    pub title: &'a str,
}

impl Default for SeriesOptions<'_> {
    fn default() -> Self {
        Self {
            color: "b",
            line: Some("-"),
            marker: None,
            marker_fill: None,
            title: "",
        }
    }
}

/// One plotted data sequence
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub title: String,
    pub style: SeriesStyle,
}

impl Series {
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

/// A single rectangular plot: size, series, axes and legend.
///
/// Graphs do not know where they are placed; a [`Canvas`](crate::Canvas)
/// owns the positions of the graphs added to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    width: f64,
    height: f64,
    series: Vec<Series>,
    x_axis: Option<AxisConfig>,
    y_axis: Option<AxisConfig>,
    legend: Option<Legend>,
}

impl Graph {
    /// Create a graph from a width, a height, or both.
    ///
    /// The missing dimension is derived from `ratio` (width / height). When
    /// both are given they must already satisfy `ratio`.
    pub fn new(width: Option<f64>, height: Option<f64>, ratio: f64) -> Result<Self> {
        if !(ratio.is_finite() && ratio > 0.0) {
            return Err(PlotError::Configuration(format!(
                "ratio must be positive, got {}",
                ratio
            )));
        }

        let (width, height) = match (width, height) {
            (None, None) => {
                return Err(PlotError::Configuration(
                    "either width or height must be specified".to_string(),
                ))
            }
            (Some(w), None) => (w, w / ratio),
            (None, Some(h)) => (h * ratio, h),
            (Some(w), Some(h)) => {
                let actual = w / h;
                if (actual - ratio).abs() > RATIO_TOLERANCE * ratio {
                    return Err(PlotError::Configuration(format!(
                        "width/height is {} but ratio is {}",
                        actual, ratio
                    )));
                }
                (w, h)
            }
        };

        for (name, value) in [("width", width), ("height", height)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(PlotError::Configuration(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        Ok(Graph {
            width,
            height,
            series: Vec::new(),
            x_axis: None,
            y_axis: None,
            legend: None,
        })
    }

    /// Graph of the given width with the golden ratio
    pub fn with_width(width: f64) -> Result<Self> {
        Self::new(Some(width), None, GOLDEN_RATIO)
    }

    /// Graph of the given height with the golden ratio
    pub fn with_height(height: f64) -> Result<Self> {
        Self::new(None, Some(height), GOLDEN_RATIO)
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn axis(&self, axis: Axis) -> Option<&AxisConfig> {
        match axis {
            Axis::X => self.x_axis.as_ref(),
            Axis::Y => self.y_axis.as_ref(),
        }
    }

    pub fn legend(&self) -> Option<&Legend> {
        self.legend.as_ref()
    }

    /// Configure one axis. Fails for anything but a linear axis.
    pub fn set_axis_params(&mut self, axis: Axis, config: AxisConfig) -> Result<()> {
        config.validate()?;
        match axis {
            Axis::X => self.x_axis = Some(config),
            Axis::Y => self.y_axis = Some(config),
        }
        Ok(())
    }

    pub fn set_x_axis(&mut self, config: AxisConfig) -> Result<()> {
        self.set_axis_params(Axis::X, config)
    }

    pub fn set_y_axis(&mut self, config: AxisConfig) -> Result<()> {
        self.set_axis_params(Axis::Y, config)
    }

    /// Show a legend. The position code is checked by the backend when drawn.
    pub fn show_legend(&mut self, position: impl Into<String>) {
        self.legend = Some(Legend {
            position: position.into(),
        });
    }

    /// Append a series styled by code.
    ///
    /// Codes are resolved before anything is stored, so a failure leaves the
    /// graph unchanged.
    pub fn add_series(&mut self, x: Vec<f64>, y: Vec<f64>, options: SeriesOptions) -> Result<()> {
        let style = SeriesStyle::resolve(
            options.color,
            options.line,
            options.marker,
            options.marker_fill,
        )?;
        self.add_styled_series(x, y, options.title, style)
    }

    /// Append a series styled by a format string such as `"r--o"`
    pub fn add_series_formatted(
        &mut self,
        x: Vec<f64>,
        y: Vec<f64>,
        format: &str,
        title: &str,
    ) -> Result<()> {
        let style = parse_format(format)?.into_style();
        self.add_styled_series(x, y, title, style)
    }

    /// Append a series with an already resolved style
    pub fn add_styled_series(
        &mut self,
        x: Vec<f64>,
        y: Vec<f64>,
        title: &str,
        style: SeriesStyle,
    ) -> Result<()> {
        if x.len() != y.len() {
            return Err(PlotError::InvalidData(format!(
                "x and y must have the same length (x: {}, y: {})",
                x.len(),
                y.len()
            )));
        }

        self.series.push(Series {
            x,
            y,
            title: title.to_string(),
            style,
        });
        Ok(())
    }

    /// Compile this graph into one backend drawable. Does not modify the graph.
    pub fn draw<B: Backend>(&self, backend: &B) -> Result<B::Drawable> {
        backend.build_drawable(self)
    }
}
