// Encapsulated PostScript writer for composed scenes

use super::paint::{num, paint_document, rgb, string_literal, Font, Painter};
use super::scene::{Document, Rgb};
use crate::error::Result;
use std::io::{self, Write};

struct PostScript<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> PostScript<W> {
    fn line(&mut self, args: std::fmt::Arguments) {
        if self.error.is_none() {
            if let Err(e) = self.out.write_fmt(args).and_then(|_| self.out.write_all(b"\n")) {
                self.error = Some(e);
            }
        }
    }
}

impl<W: Write> Painter for PostScript<W> {
    fn move_to(&mut self, (x, y): (f64, f64)) {
        self.line(format_args!("{} {} moveto", num(x), num(y)));
    }

    fn line_to(&mut self, (x, y): (f64, f64)) {
        self.line(format_args!("{} {} lineto", num(x), num(y)));
    }

    fn curve_to(&mut self, c1: (f64, f64), c2: (f64, f64), p: (f64, f64)) {
        self.line(format_args!(
            "{} {} {} {} {} {} curveto",
            num(c1.0),
            num(c1.1),
            num(c2.0),
            num(c2.1),
            num(p.0),
            num(p.1)
        ));
    }

    fn close(&mut self) {
        self.line(format_args!("closepath"));
    }

    fn stroke(&mut self, color: Rgb, width: f64) {
        self.line(format_args!(
            "{} setrgbcolor {} setlinewidth stroke",
            rgb(color),
            num(width)
        ));
    }

    fn fill(&mut self, color: Rgb) {
        self.line(format_args!("{} setrgbcolor fill", rgb(color)));
    }

    fn text(&mut self, text: &str, font: Font, size: f64, color: Rgb, m: [f64; 6]) {
        let name = match font {
            Font::Regular => "/Helvetica-Latin1",
            Font::Bold => "/Helvetica-Bold-Latin1",
        };
        self.line(format_args!(
            "gsave {} setrgbcolor {} findfont {} scalefont setfont \
             [{} {} {} {} {} {}] concat 0 0 moveto {} show grestore",
            rgb(color),
            name,
            num(size),
            num(m[0]),
            num(m[1]),
            num(m[2]),
            num(m[3]),
            num(m[4]),
            num(m[5]),
            string_literal(text)
        ));
    }
}

const PROLOG: &str = "\
/reencode { findfont dup length dict begin
  { 1 index /FID ne { def } { pop pop } ifelse } forall
  /Encoding ISOLatin1Encoding def currentdict end definefont pop } bind def
/Helvetica-Latin1 /Helvetica reencode
/Helvetica-Bold-Latin1 /Helvetica-Bold reencode
1 setlinejoin 0 setlinecap";

/// Whole-point extent; sub-millipoint noise does not round up
fn bounding(extent: f64) -> i64 {
    ((extent * 1000.0).round() / 1000.0).ceil() as i64
}

/// Serialize `document` as EPS with a bounding box covering every frame
pub(crate) fn write_eps<W: Write>(document: &Document, out: W) -> Result<()> {
    let (width, height) = document.page_size();
    let mut ps = PostScript { out, error: None };

    ps.line(format_args!("%!PS-Adobe-3.0 EPSF-3.0"));
    ps.line(format_args!(
        "%%BoundingBox: 0 0 {} {}",
        bounding(width),
        bounding(height)
    ));
    ps.line(format_args!(
        "%%HiResBoundingBox: 0 0 {} {}",
        num(width),
        num(height)
    ));
    ps.line(format_args!("%%Creator: plotcanvas {}", env!("CARGO_PKG_VERSION")));
    ps.line(format_args!("%%Pages: 1"));
    ps.line(format_args!("%%EndComments"));
    ps.line(format_args!("{}", PROLOG));
    paint_document(document, &mut ps);
    ps.line(format_args!("showpage"));
    ps.line(format_args!("%%EOF"));

    if let Some(e) = ps.error.take() {
        return Err(e.into());
    }
    ps.out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::scene::{HAlign, Primitive, Rotation, Scene, Text, VAlign};
    use crate::canvas::Frame;

    #[test]
    fn test_eps_header_and_text() {
        let scene = Scene {
            width: 720,
            height: 360,
            primitives: vec![Primitive::Text(Text {
                text: "V (out)".to_string(),
                anchor: (0, 360),
                size: 90.0,
                color: Rgb(0, 0, 0),
                bold: false,
                h_align: HAlign::Left,
                v_align: VAlign::Bottom,
                rotation: Rotation::None,
            })],
        };
        let document = Document {
            items: vec![(Frame::new(1.0, 1.0, 2.54, 1.27), scene)],
        };
        let mut out = Vec::new();
        write_eps(&document, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("%!PS-Adobe-3.0 EPSF-3.0\n%%BoundingBox: 0 0 72 36\n"));
        assert!(text.contains("%%HiResBoundingBox: 0 0 72 36"));
        assert!(text.contains("(V \\(out\\)) show"));
        assert!(text.contains("/Helvetica-Latin1 findfont 9 scalefont"));
        assert!(text.trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn test_write_errors_propagate() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "disk full"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
        let result = write_eps(&Document::default(), Broken);
        assert!(matches!(result, Err(crate::PlotError::Io(_))));
    }
}
