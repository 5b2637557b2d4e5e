//! Error types for plotcanvas.

use std::io;
use thiserror::Error;

/// Errors raised by graph construction, style lookup, layout and export.
#[derive(Debug, Error)]
pub enum PlotError {
    /// Inconsistent or missing graph dimensions, or invalid axis limits
    #[error("invalid configuration: {0}")]
    Configuration(String),
    /// A recognised but unimplemented feature, e.g. a logarithmic axis
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),
    /// A color, line style or marker code missing from the style tables
    #[error("invalid {kind} code '{code}'")]
    InvalidStyleCode { kind: &'static str, code: String },
    /// Draw or export on a canvas without graphs
    #[error("canvas has no graphs; add one with add_graph() first")]
    EmptyCanvas,
    /// Series data that cannot be plotted
    #[error("invalid data: {0}")]
    InvalidData(String),
    /// A graph handle that was not issued by this canvas
    #[error("graph {0} is not a member of this canvas")]
    UnknownGraph(String),
    /// A legend position code the backend does not understand
    #[error("invalid legend position '{0}'")]
    InvalidLegendPosition(String),
    /// Failure inside the rendering library
    #[error("render error: {0}")]
    Render(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl PlotError {
    pub(crate) fn style_code(kind: &'static str, code: &str) -> Self {
        PlotError::InvalidStyleCode {
            kind,
            code: code.to_string(),
        }
    }
}

/// Result type alias for plotcanvas operations.
pub type Result<T> = std::result::Result<T, PlotError>;
