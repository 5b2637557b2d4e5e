//! Recorded vector scenes.
//!
//! [`SceneBackend`] is a plotters [`DrawingBackend`] that keeps every
//! primitive it is asked to draw instead of rasterizing it. Coordinates are
//! integers in tenths of a point with y pointing down, which is what
//! plotters expects from a pixel backend.

use crate::canvas::Frame;
use plotters_backend::{
    text_anchor::{HPos, VPos},
    BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingBackend,
    DrawingErrorKind, FontStyle, FontTransform,
};
use std::convert::Infallible;

/// Scene units per PostScript point
pub const UNITS_PER_POINT: f64 = 10.0;
/// PostScript points per centimetre
pub const POINTS_PER_CM: f64 = 72.0 / 2.54;

/// Convert centimetres to scene units
pub fn cm_to_units(cm: f64) -> u32 {
    (cm * POINTS_PER_CM * UNITS_PER_POINT).round().max(1.0) as u32
}

/// Convert points to scene units
pub fn pt_to_units(pt: f64) -> u32 {
    (pt * UNITS_PER_POINT).round().max(0.0) as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl From<BackendColor> for Rgb {
    fn from(color: BackendColor) -> Self {
        let (r, g, b) = color.rgb;
        Rgb(r, g, b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Center,
    Bottom,
}

/// Clockwise text rotation in the y-down scene frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    None,
    Quarter,
    Half,
    ThreeQuarter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub text: String,
    pub anchor: BackendCoord,
    /// Font size in scene units
    pub size: f64,
    pub color: Rgb,
    pub bold: bool,
    pub h_align: HAlign,
    pub v_align: VAlign,
    pub rotation: Rotation,
}

impl Text {
    /// Baseline origin, writing direction and glyph-up direction in scene
    /// coordinates.
    pub fn baseline(&self) -> ((f64, f64), (f64, f64), (f64, f64)) {
        let (dir, up) = match self.rotation {
            Rotation::None => ((1.0, 0.0), (0.0, -1.0)),
            Rotation::Quarter => ((0.0, 1.0), (1.0, 0.0)),
            Rotation::Half => ((-1.0, 0.0), (0.0, 1.0)),
            Rotation::ThreeQuarter => ((0.0, -1.0), (-1.0, 0.0)),
        };
        let width = text_width(&self.text, self.size);
        let along = match self.h_align {
            HAlign::Left => 0.0,
            HAlign::Center => -width / 2.0,
            HAlign::Right => -width,
        };
        // Distance from the anchor down to the baseline
        let drop = match self.v_align {
            VAlign::Top => 0.75 * self.size,
            VAlign::Center => 0.35 * self.size,
            VAlign::Bottom => -0.2 * self.size,
        };
        let (ax, ay) = (self.anchor.0 as f64, self.anchor.1 as f64);
        let origin = (
            ax + dir.0 * along - up.0 * drop,
            ay + dir.1 * along - up.1 * drop,
        );
        (origin, dir, up)
    }
}

/// One recorded drawing operation
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Open polyline
    Stroke {
        points: Vec<BackendCoord>,
        color: Rgb,
        width: u32,
    },
    /// Closed filled polygon
    Fill { points: Vec<BackendCoord>, color: Rgb },
    Rect {
        upper_left: BackendCoord,
        bottom_right: BackendCoord,
        color: Rgb,
        width: u32,
        fill: bool,
    },
    Circle {
        center: BackendCoord,
        radius: u32,
        color: Rgb,
        width: u32,
        fill: bool,
    },
    Text(Text),
}

/// The rendered form of one graph: its size in scene units and primitives
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub primitives: Vec<Primitive>,
}

/// Scenes placed on a page, in paint order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub items: Vec<(Frame, Scene)>,
}

impl Document {
    /// Union of all frames, or `None` for an empty document
    pub fn bounds(&self) -> Option<Frame> {
        self.items
            .iter()
            .map(|(frame, _)| *frame)
            .reduce(|a, b| a.union(&b))
    }

    /// Page size in points
    pub fn page_size(&self) -> (f64, f64) {
        match self.bounds() {
            Some(b) => (b.width * POINTS_PER_CM, b.height * POINTS_PER_CM),
            None => (0.0, 0.0),
        }
    }

    /// Transforms from each scene to page points, paired with the scene
    pub fn placed(&self) -> impl Iterator<Item = (PageTransform, &Scene)> + '_ {
        let bounds = self.bounds().unwrap_or_default();
        self.items.iter().map(move |(frame, scene)| {
            let transform = PageTransform {
                origin: (
                    (frame.x - bounds.x) * POINTS_PER_CM,
                    (frame.y - bounds.y) * POINTS_PER_CM,
                ),
                height: frame.height * POINTS_PER_CM,
            };
            (transform, scene)
        })
    }
}

/// Maps scene units (y down) into page points (y up)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageTransform {
    /// Lower-left corner of the scene on the page
    pub origin: (f64, f64),
    /// Scene height in points
    pub height: f64,
}

impl PageTransform {
    pub fn point(&self, (x, y): (f64, f64)) -> (f64, f64) {
        (
            self.origin.0 + x / UNITS_PER_POINT,
            self.origin.1 + self.height - y / UNITS_PER_POINT,
        )
    }

    pub fn coord(&self, (x, y): BackendCoord) -> (f64, f64) {
        self.point((x as f64, y as f64))
    }

    pub fn vector(&self, (x, y): (f64, f64)) -> (f64, f64) {
        (x, -y)
    }

    pub fn length(&self, units: f64) -> f64 {
        units / UNITS_PER_POINT
    }
}

/// Helvetica advance widths for ASCII 32..=126, per 1000 em
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0-9
    278, 278, 584, 584, 584, 556, 1015, // :..@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A-M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N-Z
    278, 278, 278, 469, 556, 333, // [..`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a-m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n-z
    334, 260, 334, 584, // {..~
];

/// Estimated advance width of `text` set in Helvetica at `size`
pub fn text_width(text: &str, size: f64) -> f64 {
    let em: u32 = text
        .chars()
        .map(|c| match c as u32 {
            code @ 32..=126 => HELVETICA_WIDTHS[(code - 32) as usize] as u32,
            _ => 556,
        })
        .sum();
    em as f64 * size / 1000.0
}

/// A plotters backend that records primitives into a borrowed buffer
pub struct SceneBackend<'a> {
    size: (u32, u32),
    primitives: &'a mut Vec<Primitive>,
}

impl<'a> SceneBackend<'a> {
    pub fn new(primitives: &'a mut Vec<Primitive>, size: (u32, u32)) -> Self {
        Self { size, primitives }
    }

    fn push(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }
}

fn visible(color: &BackendColor) -> bool {
    color.alpha > 0.0
}

impl DrawingBackend for SceneBackend<'_> {
    type ErrorType = Infallible;

    fn get_size(&self) -> (u32, u32) {
        self.size
    }

    fn ensure_prepared(&mut self) -> Result<(), DrawingErrorKind<Infallible>> {
        Ok(())
    }

    fn present(&mut self) -> Result<(), DrawingErrorKind<Infallible>> {
        Ok(())
    }

    fn draw_pixel(
        &mut self,
        point: BackendCoord,
        color: BackendColor,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        if visible(&color) {
            self.push(Primitive::Rect {
                upper_left: point,
                bottom_right: (point.0 + 1, point.1 + 1),
                color: color.into(),
                width: 0,
                fill: true,
            });
        }
        Ok(())
    }

    fn draw_line<S: BackendStyle>(
        &mut self,
        from: BackendCoord,
        to: BackendCoord,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        self.draw_path([from, to], style)
    }

    fn draw_rect<S: BackendStyle>(
        &mut self,
        upper_left: BackendCoord,
        bottom_right: BackendCoord,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        if visible(&style.color()) {
            self.push(Primitive::Rect {
                upper_left,
                bottom_right,
                color: style.color().into(),
                width: style.stroke_width(),
                fill,
            });
        }
        Ok(())
    }

    fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        path: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        let points: Vec<BackendCoord> = path.into_iter().collect();
        if points.len() >= 2 && visible(&style.color()) {
            self.push(Primitive::Stroke {
                points,
                color: style.color().into(),
                width: style.stroke_width(),
            });
        }
        Ok(())
    }

    fn draw_circle<S: BackendStyle>(
        &mut self,
        center: BackendCoord,
        radius: u32,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        if visible(&style.color()) {
            self.push(Primitive::Circle {
                center,
                radius,
                color: style.color().into(),
                width: style.stroke_width(),
                fill,
            });
        }
        Ok(())
    }

    fn fill_polygon<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        vert: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        let points: Vec<BackendCoord> = vert.into_iter().collect();
        if points.len() >= 3 && visible(&style.color()) {
            self.push(Primitive::Fill {
                points,
                color: style.color().into(),
            });
        }
        Ok(())
    }

    fn draw_text<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        pos: BackendCoord,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        if text.is_empty() || !visible(&style.color()) {
            return Ok(());
        }
        let anchor = style.anchor();
        self.push(Primitive::Text(Text {
            text: text.to_string(),
            anchor: pos,
            size: style.size(),
            color: style.color().into(),
            bold: matches!(style.style(), FontStyle::Bold),
            h_align: match anchor.h_pos {
                HPos::Left => HAlign::Left,
                HPos::Center => HAlign::Center,
                HPos::Right => HAlign::Right,
            },
            v_align: match anchor.v_pos {
                VPos::Top => VAlign::Top,
                VPos::Center => VAlign::Center,
                VPos::Bottom => VAlign::Bottom,
            },
            rotation: match style.transform() {
                FontTransform::None => Rotation::None,
                FontTransform::Rotate90 => Rotation::Quarter,
                FontTransform::Rotate180 => Rotation::Half,
                FontTransform::Rotate270 => Rotation::ThreeQuarter,
            },
        }));
        Ok(())
    }

    fn estimate_text_size<TStyle: BackendTextStyle>(
        &self,
        text: &str,
        style: &TStyle,
    ) -> Result<(u32, u32), DrawingErrorKind<Infallible>> {
        let size = style.size();
        Ok((text_width(text, size).ceil() as u32, size.ceil() as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotters::element::Text as TextElement;
    use plotters::prelude::{
        Circle, Color, IntoDrawingArea, IntoFont, PathElement, BLACK, RED, TRANSPARENT,
    };

    #[test]
    fn test_units() {
        assert_eq!(cm_to_units(2.54), 720);
        assert_eq!(pt_to_units(1.5), 15);
    }

    #[test]
    fn test_text_width_uses_metrics() {
        assert_eq!(text_width("0", 1000.0), 556.0);
        assert!(text_width("W", 10.0) > text_width("i", 10.0));
        assert_eq!(text_width("", 10.0), 0.0);
    }

    #[test]
    fn test_records_primitives() {
        let mut primitives = Vec::new();
        {
            let root = SceneBackend::new(&mut primitives, (200, 100)).into_drawing_area();
            root.draw(&PathElement::new(vec![(0, 0), (10, 10)], &BLACK))
                .unwrap();
            root.draw(&Circle::new((50, 50), 5, RED.filled())).unwrap();
            root.draw(&TextElement::new(
                "label",
                (20, 20),
                ("sans-serif", 30.0).into_font(),
            ))
                .unwrap();
            root.present().unwrap();
        }

        assert!(primitives.iter().any(|p| matches!(p, Primitive::Stroke { .. })));
        assert!(primitives
            .iter()
            .any(|p| matches!(p, Primitive::Circle { fill: true, radius: 5, .. })));
        let text = primitives.iter().find_map(|p| match p {
            Primitive::Text(t) => Some(t),
            _ => None,
        });
        assert_eq!(text.unwrap().text, "label");
    }

    #[test]
    fn test_transparent_fill_skipped() {
        let mut primitives = Vec::new();
        {
            let root = SceneBackend::new(&mut primitives, (20, 20)).into_drawing_area();
            root.fill(&TRANSPARENT).unwrap();
        }
        assert!(primitives.is_empty());
    }

    #[test]
    fn test_page_transform_flips_y() {
        let t = PageTransform {
            origin: (10.0, 20.0),
            height: 50.0,
        };
        assert_eq!(t.coord((0, 0)), (10.0, 70.0));
        assert_eq!(t.coord((100, 500)), (20.0, 20.0));
        assert_eq!(t.vector((0.0, -1.0)), (0.0, 1.0));
    }

    #[test]
    fn test_document_bounds_cover_negative_positions() {
        let doc = Document {
            items: vec![
                (Frame::new(0.0, 0.0, 8.0, 5.0), Scene::default()),
                (Frame::new(0.0, -7.0, 8.0, 5.0), Scene::default()),
            ],
        };
        let b = doc.bounds().unwrap();
        assert_eq!(b, Frame::new(0.0, -7.0, 8.0, 12.0));

        let origins: Vec<(f64, f64)> = doc.placed().map(|(t, _)| t.origin).collect();
        assert_eq!(origins[1], (0.0, 0.0));
        assert!((origins[0].1 - 7.0 * POINTS_PER_CM).abs() < 1e-9);
    }

    #[test]
    fn test_baseline_of_rotated_text() {
        let text = Text {
            text: "ab".to_string(),
            anchor: (100, 100),
            size: 10.0,
            color: Rgb(0, 0, 0),
            bold: false,
            h_align: HAlign::Left,
            v_align: VAlign::Top,
            rotation: Rotation::ThreeQuarter,
        };
        let (origin, dir, up) = text.baseline();
        assert_eq!(dir, (0.0, -1.0));
        assert_eq!(up, (-1.0, 0.0));
        // Baseline sits to the right of the anchor when reading upwards
        assert_eq!(origin, (107.5, 100.0));
    }
}
