// Library exports for plotcanvas

pub mod backend;
pub mod canvas;
pub mod data;
pub mod error;
pub mod graph;
pub mod layout;
pub mod parser;
pub mod style;
pub mod viewer;

pub use backend::{Backend, RecordingBackend, VectorBackend};
pub use canvas::{Canvas, Frame, GraphId, Position};
pub use error::{PlotError, Result};
pub use graph::{Axis, AxisConfig, AxisKind, Graph, Legend, Series, SeriesOptions, GOLDEN_RATIO};
pub use style::SeriesStyle;

use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default, clap::ValueEnum)]
pub enum DocumentFormat {
    #[serde(rename = "pdf")]
    #[default]
    Pdf,
    #[serde(rename = "eps")]
    Eps,
}

impl DocumentFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Eps => "eps",
        }
    }

    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "eps" | "ps" => Some(DocumentFormat::Eps),
            _ => None,
        }
    }
}

/// Sizes used when rendering graphs, in points
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RenderOptions {
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_line_width")]
    pub line_width: f64,
    #[serde(default = "default_marker_size")]
    pub marker_size: f64,
    #[serde(default = "default_margin")]
    pub margin: f64,
}

fn default_font_size() -> f64 { 9.0 }
fn default_line_width() -> f64 { 1.0 }
fn default_marker_size() -> f64 { 2.5 }
fn default_margin() -> f64 { 4.0 }

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            font_size: default_font_size(),
            line_width: default_line_width(),
            marker_size: default_marker_size(),
            margin: default_margin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(DocumentFormat::from_path(Path::new("a.pdf")), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_path(Path::new("a.EPS")), Some(DocumentFormat::Eps));
        assert_eq!(DocumentFormat::from_path(Path::new("a.png")), None);
        assert_eq!(DocumentFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_render_options_defaults_from_empty_json() {
        let options: RenderOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, RenderOptions::default());

        let options: RenderOptions = serde_json::from_str(r#"{"font_size": 12}"#).unwrap();
        assert_eq!(options.font_size, 12.0);
        assert_eq!(options.line_width, 1.0);
    }
}
