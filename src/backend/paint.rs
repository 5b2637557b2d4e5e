// Shared walk over recorded scenes for the PDF and EPS writers

use super::scene::{Document, PageTransform, Primitive, Rgb, Text};
use std::fmt::Write;

/// Bezier control distance for a quarter circle
const KAPPA: f64 = 0.552_284_749_8;

/// Standard font used for text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Font {
    Regular,
    Bold,
}

/// Page-description operators both PDF and PostScript provide.
///
/// Path calls build the current path; `stroke` and `fill` paint and clear it.
pub(crate) trait Painter {
    fn move_to(&mut self, p: (f64, f64));
    fn line_to(&mut self, p: (f64, f64));
    fn curve_to(&mut self, c1: (f64, f64), c2: (f64, f64), p: (f64, f64));
    fn close(&mut self);
    fn stroke(&mut self, color: Rgb, width: f64);
    fn fill(&mut self, color: Rgb);
    /// Show `text` with the text matrix `[a b c d e f]` at `size` points
    fn text(&mut self, text: &str, font: Font, size: f64, color: Rgb, matrix: [f64; 6]);
}

/// Replay every placed scene of `document` onto `painter`, in paint order
pub(crate) fn paint_document<P: Painter>(document: &Document, painter: &mut P) {
    for (transform, scene) in document.placed() {
        for primitive in &scene.primitives {
            paint_primitive(primitive, &transform, painter);
        }
    }
}

fn paint_primitive<P: Painter>(primitive: &Primitive, t: &PageTransform, painter: &mut P) {
    match primitive {
        Primitive::Stroke {
            points,
            color,
            width,
        } => {
            let mut iter = points.iter();
            if let Some(first) = iter.next() {
                painter.move_to(t.coord(*first));
                for p in iter {
                    painter.line_to(t.coord(*p));
                }
                painter.stroke(*color, stroke_width(t, *width));
            }
        }
        Primitive::Fill { points, color } => {
            let mut iter = points.iter();
            if let Some(first) = iter.next() {
                painter.move_to(t.coord(*first));
                for p in iter {
                    painter.line_to(t.coord(*p));
                }
                painter.close();
                painter.fill(*color);
            }
        }
        Primitive::Rect {
            upper_left,
            bottom_right,
            color,
            width,
            fill,
        } => {
            let (x0, y0) = t.coord(*upper_left);
            let (x1, y1) = t.coord(*bottom_right);
            painter.move_to((x0, y0));
            painter.line_to((x1, y0));
            painter.line_to((x1, y1));
            painter.line_to((x0, y1));
            painter.close();
            if *fill {
                painter.fill(*color);
            } else {
                painter.stroke(*color, stroke_width(t, *width));
            }
        }
        Primitive::Circle {
            center,
            radius,
            color,
            width,
            fill,
        } => {
            circle_path(painter, t.coord(*center), t.length(*radius as f64));
            if *fill {
                painter.fill(*color);
            } else {
                painter.stroke(*color, stroke_width(t, *width));
            }
        }
        Primitive::Text(text) => paint_text(text, t, painter),
    }
}

fn stroke_width(t: &PageTransform, width: u32) -> f64 {
    t.length(width.max(1) as f64)
}

fn circle_path<P: Painter>(painter: &mut P, (cx, cy): (f64, f64), r: f64) {
    let k = r * KAPPA;
    painter.move_to((cx + r, cy));
    painter.curve_to((cx + r, cy + k), (cx + k, cy + r), (cx, cy + r));
    painter.curve_to((cx - k, cy + r), (cx - r, cy + k), (cx - r, cy));
    painter.curve_to((cx - r, cy - k), (cx - k, cy - r), (cx, cy - r));
    painter.curve_to((cx + k, cy - r), (cx + r, cy - k), (cx + r, cy));
    painter.close();
}

fn paint_text<P: Painter>(text: &Text, t: &PageTransform, painter: &mut P) {
    let (origin, dir, up) = text.baseline();
    let (x, y) = t.point(origin);
    let (dx, dy) = t.vector(dir);
    let (ux, uy) = t.vector(up);
    let font = if text.bold { Font::Bold } else { Font::Regular };
    painter.text(
        &text.text,
        font,
        t.length(text.size),
        text.color,
        [dx, dy, ux, uy, x, y],
    );
}

/// Compact decimal for page descriptions: at most three decimals, no
/// trailing zeros.
pub(crate) fn num(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    let mut s = format!("{:.3}", if rounded == 0.0 { 0.0 } else { rounded });
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    s
}

/// RGB components scaled to 0..1
pub(crate) fn rgb(color: Rgb) -> String {
    let c = |v: u8| num(v as f64 / 255.0);
    format!("{} {} {}", c(color.0), c(color.1), c(color.2))
}

/// Escape text for a `( )` string literal. Latin-1 characters become octal
/// escapes; anything else is replaced with `?`.
pub(crate) fn string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('(');
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            '\u{a0}'..='\u{ff}' => {
                let _ = write!(out, "\\{:03o}", c as u32);
            }
            _ => out.push('?'),
        }
    }
    out.push(')');
    out
}
