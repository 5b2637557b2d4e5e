// Single-page PDF 1.4 writer for composed scenes

use super::paint::{num, paint_document, rgb, string_literal, Font, Painter};
use super::scene::{Document, Rgb};
use crate::error::Result;
use std::fmt::Write as _;
use std::io::Write;

#[derive(Default)]
struct ContentStream {
    ops: String,
}

impl ContentStream {
    fn op(&mut self, line: std::fmt::Arguments) {
        let _ = self.ops.write_fmt(line);
        self.ops.push('\n');
    }
}

impl Painter for ContentStream {
    fn move_to(&mut self, (x, y): (f64, f64)) {
        self.op(format_args!("{} {} m", num(x), num(y)));
    }

    fn line_to(&mut self, (x, y): (f64, f64)) {
        self.op(format_args!("{} {} l", num(x), num(y)));
    }

    fn curve_to(&mut self, c1: (f64, f64), c2: (f64, f64), p: (f64, f64)) {
        self.op(format_args!(
            "{} {} {} {} {} {} c",
            num(c1.0),
            num(c1.1),
            num(c2.0),
            num(c2.1),
            num(p.0),
            num(p.1)
        ));
    }

    fn close(&mut self) {
        self.op(format_args!("h"));
    }

    fn stroke(&mut self, color: Rgb, width: f64) {
        self.op(format_args!("{} RG {} w S", rgb(color), num(width)));
    }

    fn fill(&mut self, color: Rgb) {
        self.op(format_args!("{} rg f", rgb(color)));
    }

    fn text(&mut self, text: &str, font: Font, size: f64, color: Rgb, m: [f64; 6]) {
        let name = match font {
            Font::Regular => "F1",
            Font::Bold => "F2",
        };
        self.op(format_args!(
            "BT /{} {} Tf {} rg {} {} {} {} {} {} Tm {} Tj ET",
            name,
            num(size),
            rgb(color),
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

/// Tracks byte offsets of numbered objects for the cross-reference table
struct ObjectWriter<W: Write> {
    out: W,
    position: usize,
    offsets: Vec<usize>,
}

impl<W: Write> ObjectWriter<W> {
    fn raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.out.write_all(bytes)?;
        self.position += bytes.len();
        Ok(())
    }

    fn object(&mut self, body: &str) -> Result<()> {
        self.offsets.push(self.position);
        let id = self.offsets.len();
        self.raw(format!("{} 0 obj\n{}\nendobj\n", id, body).as_bytes())
    }
}

/// Serialize `document` as a one-page PDF whose media box is the union of
/// all placed frames.
pub(crate) fn write_pdf<W: Write>(document: &Document, out: W) -> Result<()> {
    let mut content = ContentStream::default();
    paint_document(document, &mut content);
    let (width, height) = document.page_size();

    let mut writer = ObjectWriter {
        out,
        position: 0,
        offsets: Vec::new(),
    };
    writer.raw(b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n")?;
    writer.object("<< /Type /Catalog /Pages 2 0 R >>")?;
    writer.object("<< /Type /Pages /Kids [3 0 R] /Count 1 >>")?;
    writer.object(&format!(
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
         /Resources << /Font << /F1 5 0 R /F2 6 0 R >> >> /Contents 4 0 R >>",
        num(width),
        num(height)
    ))?;
    // The end-of-line before `endstream` is not part of the stream data
    let data = content.ops.strip_suffix('\n').unwrap_or(&content.ops);
    writer.object(&format!(
        "<< /Length {} >>\nstream\n{}\nendstream",
        data.len(),
        data
    ))?;
    writer.object(
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
    )?;
    writer.object(
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>",
    )?;
    writer.object(&format!(
        "<< /Producer (plotcanvas {}) >>",
        env!("CARGO_PKG_VERSION")
    ))?;

    let xref = writer.position;
    let mut table = format!("xref\n0 {}\n0000000000 65535 f \n", writer.offsets.len() + 1);
    for offset in &writer.offsets {
        let _ = writeln!(table, "{:010} 00000 n ", offset);
    }
    let _ = write!(
        table,
        "trailer\n<< /Size {} /Root 1 0 R /Info 7 0 R >>\nstartxref\n{}\n%%EOF\n",
        writer.offsets.len() + 1,
        xref
    );
    writer.raw(table.as_bytes())?;
    writer.out.flush()?;
    Ok(())
}
