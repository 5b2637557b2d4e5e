//! Short style codes and the fixed tables they resolve against.
//!
//! ```text
//! color       b r g m y k
//! line style  -  --  :  .-
//! marker      o x ^ d s +
//! ```
//!
//! Line styles and markers can be switched off with `"none"` (or `"None"`).

use crate::error::{PlotError, Result};
use plotters::style::{RGBColor, BLACK, BLUE, GREEN, MAGENTA, RED, YELLOW};

/// Color code table
pub const COLORS: &[(&str, RGBColor)] = &[
    ("b", BLUE),
    ("r", RED),
    ("g", GREEN),
    ("m", MAGENTA),
    ("y", YELLOW),
    ("k", BLACK),
];

/// Line style code table
pub const LINE_STYLES: &[(&str, LineDash)] = &[
    ("-", LineDash::Solid),
    ("--", LineDash::Dashed),
    (":", LineDash::Dotted),
    (".-", LineDash::DashDot),
];

/// Marker code table
pub const MARKERS: &[(&str, MarkerShape)] = &[
    ("o", MarkerShape::Circle),
    ("x", MarkerShape::Cross),
    ("^", MarkerShape::Triangle),
    ("d", MarkerShape::Diamond),
    ("s", MarkerShape::Square),
    ("+", MarkerShape::Plus),
];

const NONE_CODES: &[&str] = &["none", "None"];

/// Stroke pattern of a series line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineDash {
    Solid,
    Dashed,
    Dotted,
    DashDot,
}

impl LineDash {
    /// Alternating on/off lengths in points. Empty for a solid line.
    pub fn pattern(&self) -> &'static [f64] {
        match self {
            LineDash::Solid => &[],
            LineDash::Dashed => &[4.0, 2.5],
            LineDash::Dotted => &[1.0, 1.5],
            LineDash::DashDot => &[4.0, 1.5, 1.0, 1.5],
        }
    }
}

/// Marker symbol drawn at every data point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    Circle,
    Cross,
    Triangle,
    Diamond,
    Square,
    Plus,
}

/// A marker with its fill color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub shape: MarkerShape,
    pub fill: RGBColor,
}

/// Fully resolved display style of one series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStyle {
    pub color: RGBColor,
    /// `None` draws no connecting line
    pub line: Option<LineDash>,
    /// `None` draws no markers
    pub marker: Option<Marker>,
}

impl SeriesStyle {
    /// Resolve style codes against the tables.
    ///
    /// The marker fill falls back to the series color when a marker is
    /// requested without one.
    pub fn resolve(
        color: &str,
        line: Option<&str>,
        marker: Option<&str>,
        marker_fill: Option<&str>,
    ) -> Result<Self> {
        let color = lookup_color(color)?;
        let line = enabled(line).map(lookup_line_style).transpose()?;
        let marker = match enabled(marker) {
            Some(code) => {
                let shape = lookup_marker(code)?;
                let fill = match enabled(marker_fill) {
                    Some(fill) => lookup_color(fill)?,
                    None => color,
                };
                Some(Marker { shape, fill })
            }
            None => None,
        };

        Ok(SeriesStyle {
            color,
            line,
            marker,
        })
    }
}

impl Default for SeriesStyle {
    fn default() -> Self {
        SeriesStyle {
            color: BLUE,
            line: Some(LineDash::Solid),
            marker: None,
        }
    }
}

/// Look up a color code
pub fn lookup_color(code: &str) -> Result<RGBColor> {
    lookup(COLORS, "color", code)
}

/// Look up a line style code
pub fn lookup_line_style(code: &str) -> Result<LineDash> {
    lookup(LINE_STYLES, "line style", code)
}

/// Look up a marker code
pub fn lookup_marker(code: &str) -> Result<MarkerShape> {
    lookup(MARKERS, "marker", code)
}

fn lookup<T: Copy>(table: &[(&str, T)], kind: &'static str, code: &str) -> Result<T> {
    table
        .iter()
        .find(|(key, _)| *key == code)
        .map(|(_, value)| *value)
        .ok_or_else(|| PlotError::style_code(kind, code))
}

fn enabled(code: Option<&str>) -> Option<&str> {
    code.filter(|c| !NONE_CODES.contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_all_colors() {
        assert_eq!(lookup_color("b").unwrap(), BLUE);
        assert_eq!(lookup_color("r").unwrap(), RED);
        assert_eq!(lookup_color("g").unwrap(), GREEN);
        assert_eq!(lookup_color("m").unwrap(), MAGENTA);
        assert_eq!(lookup_color("y").unwrap(), YELLOW);
        assert_eq!(lookup_color("k").unwrap(), BLACK);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let err = lookup_color("B").unwrap_err();
        assert!(matches!(err, PlotError::InvalidStyleCode { kind: "color", .. }));
        assert!(lookup_marker("S").is_err());
    }

    #[test]
    fn test_two_character_line_codes() {
        assert_eq!(lookup_line_style("--").unwrap(), LineDash::Dashed);
        assert_eq!(lookup_line_style(".-").unwrap(), LineDash::DashDot);
        assert!(lookup_line_style("-.").is_err());
    }

    #[test]
    fn test_resolve_defaults_marker_fill_to_color() {
        let style = SeriesStyle::resolve("r", Some("-"), Some("o"), None).unwrap();
        assert_eq!(style.color, RED);
        assert_eq!(style.line, Some(LineDash::Solid));
        assert_eq!(
            style.marker,
            Some(Marker {
                shape: MarkerShape::Circle,
                fill: RED
            })
        );
    }

    #[test]
    fn test_resolve_explicit_marker_fill() {
        let style = SeriesStyle::resolve("b", Some("none"), Some("s"), Some("r")).unwrap();
        assert_eq!(style.line, None);
        assert_eq!(style.marker.unwrap().fill, RED);
    }

    #[test]
    fn test_resolve_none_sentinels() {
        let style = SeriesStyle::resolve("k", Some("None"), Some("None"), Some("None")).unwrap();
        assert_eq!(style.line, None);
        assert_eq!(style.marker, None);

        let style = SeriesStyle::resolve("k", None, None, None).unwrap();
        assert_eq!(style.line, None);
        assert_eq!(style.marker, None);
    }

    #[test]
    fn test_resolve_unknown_marker_fill() {
        let err = SeriesStyle::resolve("b", Some("-"), Some("o"), Some("q")).unwrap_err();
        assert!(err.to_string().contains("'q'"));
    }

    #[test]
    fn test_dash_patterns() {
        assert!(LineDash::Solid.pattern().is_empty());
        assert_eq!(LineDash::Dashed.pattern().len() % 2, 0);
        assert_eq!(LineDash::DashDot.pattern().len(), 4);
    }
}
