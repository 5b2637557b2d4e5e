use crate::style::{MarkerShape, SeriesStyle};
use plotters::{
    element::{Drawable, PointCollection},
    style::{Color, RGBColor, ShapeStyle},
};
use plotters_backend::{BackendCoord, DrawingBackend, DrawingErrorKind};

/// Sizes shared by series and legend glyphs, in scene units
#[derive(Debug, Clone, Copy)]
pub(crate) struct GlyphMetrics {
    pub line_width: u32,
    pub marker_size: u32,
    /// Dash pattern lengths are multiplied by this
    pub pattern_scale: f64,
}

/// A polyline stroked with an on/off dash pattern.
///
/// The pattern carries over vertices so dashes stay even along dense data.
pub(crate) struct PatternedPath<Coord> {
    points: Vec<Coord>,
    pattern: Vec<f64>,
    style: ShapeStyle,
}

impl<Coord> PatternedPath<Coord> {
    pub(crate) fn new(points: Vec<Coord>, pattern: &[f64], scale: f64, style: ShapeStyle) -> Self {
        Self {
            points,
            pattern: pattern.iter().map(|len| len * scale).collect(),
            style,
        }
    }

    pub(crate) fn series(self) -> std::iter::Once<Self> {
        std::iter::once(self)
    }
}

impl<'a, Coord: 'a> PointCollection<'a, Coord> for &'a PatternedPath<Coord> {
    type Point = &'a Coord;
    type IntoIter = &'a [Coord];

    fn point_iter(self) -> Self::IntoIter {
        &self.points
    }
}

impl<Coord, DB: DrawingBackend> Drawable<DB> for PatternedPath<Coord> {
    fn draw<I: Iterator<Item = BackendCoord>>(
        &self,
        points: I,
        backend: &mut DB,
        _: (u32, u32),
    ) -> Result<(), DrawingErrorKind<DB::ErrorType>> {
        let points: Vec<BackendCoord> = points.collect();
        stroke_pattern(backend, &points, &self.pattern, &self.style)
    }
}

fn stroke_pattern<DB: DrawingBackend>(
    backend: &mut DB,
    points: &[BackendCoord],
    pattern: &[f64],
    style: &ShapeStyle,
) -> Result<(), DrawingErrorKind<DB::ErrorType>> {
    if pattern.is_empty() || pattern.iter().all(|len| *len <= 0.0) {
        return backend.draw_path(points.iter().copied(), style);
    }

    let to_i = |(x, y): (f64, f64)| (x.round() as i32, y.round() as i32);
    let mut index = 0;
    let mut remaining = pattern[0];
    let mut dash: Vec<BackendCoord> = Vec::new();

    for pair in points.windows(2) {
        let start = (pair[0].0 as f64, pair[0].1 as f64);
        let (dx, dy) = (pair[1].0 as f64 - start.0, pair[1].1 as f64 - start.1);
        let length = dx.hypot(dy);
        if length <= f64::EPSILON {
            continue;
        }

        let mut travelled = 0.0;
        while travelled < length {
            let step = remaining.min(length - travelled);
            let on = index % 2 == 0;
            if on {
                if dash.is_empty() {
                    let t = travelled / length;
                    dash.push(to_i((start.0 + dx * t, start.1 + dy * t)));
                }
                let t = (travelled + step) / length;
                dash.push(to_i((start.0 + dx * t, start.1 + dy * t)));
            }
            travelled += step;
            remaining -= step;

            if remaining <= f64::EPSILON {
                if on && dash.len() >= 2 {
                    backend.draw_path(dash.drain(..), style)?;
                }
                dash.clear();
                index = (index + 1) % pattern.len();
                remaining = pattern[index];
            }
        }
    }

    if dash.len() >= 2 {
        backend.draw_path(dash, style)?;
    }
    Ok(())
}

/// A single marker symbol centred on a data point
pub(crate) struct MarkerPoint<Coord> {
    at: Coord,
    shape: MarkerShape,
    color: RGBColor,
    metrics: GlyphMetrics,
}

impl<Coord> MarkerPoint<Coord> {
    pub(crate) fn new(at: Coord, shape: MarkerShape, color: RGBColor, metrics: GlyphMetrics) -> Self {
        Self {
            at,
            shape,
            color,
            metrics,
        }
    }
}

impl<'a, Coord: 'a> PointCollection<'a, Coord> for &'a MarkerPoint<Coord> {
    type Point = &'a Coord;
    type IntoIter = std::iter::Once<&'a Coord>;

    fn point_iter(self) -> Self::IntoIter {
        std::iter::once(&self.at)
    }
}

impl<Coord, DB: DrawingBackend> Drawable<DB> for MarkerPoint<Coord> {
    fn draw<I: Iterator<Item = BackendCoord>>(
        &self,
        mut points: I,
        backend: &mut DB,
        _: (u32, u32),
    ) -> Result<(), DrawingErrorKind<DB::ErrorType>> {
        match points.next() {
            Some(center) => draw_marker(backend, center, self.shape, self.color, &self.metrics),
            None => Ok(()),
        }
    }
}

fn draw_marker<DB: DrawingBackend>(
    backend: &mut DB,
    (x, y): BackendCoord,
    shape: MarkerShape,
    color: RGBColor,
    metrics: &GlyphMetrics,
) -> Result<(), DrawingErrorKind<DB::ErrorType>> {
    let r = metrics.marker_size as i32;
    let fill = color.filled();
    let stroke = color.stroke_width(metrics.line_width.max(1));

    match shape {
        MarkerShape::Circle => backend.draw_circle((x, y), r as u32, &fill, true),
        MarkerShape::Square => backend.draw_rect((x - r, y - r), (x + r, y + r), &fill, true),
        MarkerShape::Triangle => {
            // Equilateral, centred on the point
            let h = (r as f64 * 1.5) as i32;
            let half = (r as f64 * 1.3) as i32;
            backend.fill_polygon([(x, y - h * 2 / 3), (x + half, y + h / 3), (x - half, y + h / 3)], &fill)
        }
        MarkerShape::Diamond => {
            let d = (r as f64 * 1.3) as i32;
            backend.fill_polygon([(x, y - d), (x + d, y), (x, y + d), (x - d, y)], &fill)
        }
        MarkerShape::Cross => {
            backend.draw_line((x - r, y - r), (x + r, y + r), &stroke)?;
            backend.draw_line((x - r, y + r), (x + r, y - r), &stroke)
        }
        MarkerShape::Plus => {
            backend.draw_line((x - r, y), (x + r, y), &stroke)?;
            backend.draw_line((x, y - r), (x, y + r), &stroke)
        }
    }
}

/// Legend sample: a short line in the series pattern plus its marker
pub(crate) struct LegendGlyph {
    at: BackendCoord,
    length: i32,
    style: SeriesStyle,
    metrics: GlyphMetrics,
}

impl LegendGlyph {
    pub(crate) fn new(at: BackendCoord, length: i32, style: SeriesStyle, metrics: GlyphMetrics) -> Self {
        Self {
            at,
            length,
            style,
            metrics,
        }
    }
}

impl<'a> PointCollection<'a, BackendCoord> for &'a LegendGlyph {
    type Point = &'a BackendCoord;
    type IntoIter = std::iter::Once<&'a BackendCoord>;

    fn point_iter(self) -> Self::IntoIter {
        std::iter::once(&self.at)
    }
}

impl<DB: DrawingBackend> Drawable<DB> for LegendGlyph {
    fn draw<I: Iterator<Item = BackendCoord>>(
        &self,
        mut points: I,
        backend: &mut DB,
        _: (u32, u32),
    ) -> Result<(), DrawingErrorKind<DB::ErrorType>> {
        let (x, y) = match points.next() {
            Some(p) => p,
            None => return Ok(()),
        };
        if let Some(dash) = self.style.line {
            let line = [(x, y), (x + self.length, y)];
            let style = self.style.color.stroke_width(self.metrics.line_width);
            stroke_pattern(backend, &line, &scaled(dash.pattern(), self.metrics.pattern_scale), &style)?;
        }
        if let Some(marker) = self.style.marker {
            draw_marker(backend, (x + self.length / 2, y), marker.shape, marker.fill, &self.metrics)?;
        }
        Ok(())
    }
}

fn scaled(pattern: &[f64], scale: f64) -> Vec<f64> {
    pattern.iter().map(|len| len * scale).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::scene::{Primitive, SceneBackend};
    use plotters::prelude::{IntoDrawingArea, BLACK, RED};

    const METRICS: GlyphMetrics = GlyphMetrics {
        line_width: 2,
        marker_size: 4,
        pattern_scale: 1.0,
    };

    fn strokes(primitives: &[Primitive]) -> Vec<Vec<BackendCoord>> {
        primitives
            .iter()
            .filter_map(|p| match p {
                Primitive::Stroke { points, .. } => Some(points.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_dash_pattern_splits_segments() {
        let mut primitives = Vec::new();
        {
            let root = SceneBackend::new(&mut primitives, (100, 100)).into_drawing_area();
            let path = PatternedPath::new(vec![(0, 10), (40, 10)], &[10.0, 5.0], 1.0, BLACK.stroke_width(1));
            root.draw(&path).unwrap();
        }
        let dashes = strokes(&primitives);
        assert_eq!(dashes, vec![
            vec![(0, 10), (10, 10)],
            vec![(15, 10), (25, 10)],
            vec![(30, 10), (40, 10)],
        ]);
    }

    #[test]
    fn test_dash_carries_over_vertices() {
        let mut primitives = Vec::new();
        {
            let root = SceneBackend::new(&mut primitives, (100, 100)).into_drawing_area();
            let path = PatternedPath::new(vec![(0, 0), (6, 0), (6, 6)], &[10.0, 5.0], 1.0, BLACK.stroke_width(1));
            root.draw(&path).unwrap();
        }
        assert_eq!(strokes(&primitives), vec![vec![(0, 0), (6, 0), (6, 4)]]);
    }

    #[test]
    fn test_empty_pattern_is_solid() {
        let mut primitives = Vec::new();
        {
            let root = SceneBackend::new(&mut primitives, (100, 100)).into_drawing_area();
            let path = PatternedPath::new(vec![(0, 0), (50, 50), (90, 0)], &[], 1.0, BLACK.stroke_width(1));
            root.draw(&path).unwrap();
        }
        assert_eq!(strokes(&primitives), vec![vec![(0, 0), (50, 50), (90, 0)]]);
    }

    #[test]
    fn test_markers_fill_or_stroke() {
        let mut primitives = Vec::new();
        {
            let root = SceneBackend::new(&mut primitives, (100, 100)).into_drawing_area();
            for shape in [MarkerShape::Circle, MarkerShape::Diamond, MarkerShape::Plus] {
                root.draw(&MarkerPoint::new((50, 50), shape, RED, METRICS)).unwrap();
            }
        }
        assert!(matches!(primitives[0], Primitive::Circle { fill: true, radius: 4, .. }));
        assert!(matches!(primitives[1], Primitive::Fill { .. }));
        assert_eq!(strokes(&primitives).len(), 2);
    }
}
