// Parser for compact series format strings such as "r--o"

use crate::error::{PlotError, Result};
use crate::style::{
    lookup_color, lookup_line_style, lookup_marker, LineDash, Marker, MarkerShape, SeriesStyle,
};
use nom::{
    branch::alt,
    bytes::complete::tag,
    combinator::{eof, map_res, opt},
    sequence::tuple,
    IResult,
};
use plotters::style::{RGBColor, BLUE};

/// A parsed format string: color, then line style, then marker, each optional
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormatSpec {
    pub color: Option<RGBColor>,
    pub line: Option<LineDash>,
    pub marker: Option<MarkerShape>,
}

impl FormatSpec {
    /// Expand into a series style.
    ///
    /// No line and no marker means a solid line; a marker without a line
    /// draws markers only. The color defaults to blue and also fills the marker.
    pub fn into_style(self) -> SeriesStyle {
        let color = self.color.unwrap_or(BLUE);
        let line = match (self.line, self.marker) {
            (None, None) => Some(LineDash::Solid),
            (line, _) => line,
        };

        SeriesStyle {
            color,
            line,
            marker: self.marker.map(|shape| Marker { shape, fill: color }),
        }
    }
}

/// Parse a color code
/// Format: b | r | g | m | y | k
fn color(input: &str) -> IResult<&str, RGBColor> {
    map_res(
        alt((tag("b"), tag("r"), tag("g"), tag("m"), tag("y"), tag("k"))),
        lookup_color,
    )(input)
}

/// Parse a line style code, longest match first
/// Format: -- | .- | - | :
fn line_style(input: &str) -> IResult<&str, LineDash> {
    map_res(
        alt((tag("--"), tag(".-"), tag("-"), tag(":"))),
        lookup_line_style,
    )(input)
}

/// Parse a marker code
/// Format: o | x | ^ | d | s | +
fn marker(input: &str) -> IResult<&str, MarkerShape> {
    map_res(
        alt((tag("o"), tag("x"), tag("^"), tag("d"), tag("s"), tag("+"))),
        lookup_marker,
    )(input)
}

fn format_spec(input: &str) -> IResult<&str, FormatSpec> {
    let (input, (color, line, marker, _)) =
        tuple((opt(color), opt(line_style), opt(marker), eof))(input)?;

    Ok((
        input,
        FormatSpec {
            color,
            line,
            marker,
        },
    ))
}

/// Parse a whole format string, e.g. `"r--o"`, `"k:"`, `"gs"` or `"-"`.
pub fn parse_format(input: &str) -> Result<FormatSpec> {
    format_spec(input.trim())
        .map(|(_, spec)| spec)
        .map_err(|_| PlotError::style_code("format", input))
}
