use anyhow::{Context, Result};
use clap::Parser;
use plotcanvas::layout::LayoutDocument;
use plotcanvas::DocumentFormat;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "plotcanvas")]
#[command(about = "Compose graphs from a JSON layout into a PDF or EPS document", long_about = None)]
struct Args {
    /// JSON layout describing graphs, placements and series
    layout: PathBuf,

    /// Output file (defaults to the layout path with the format's extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Document format (defaults to the output extension, then pdf)
    #[arg(short, long, value_enum)]
    format: Option<DocumentFormat>,

    /// Open the exported PDF in the default viewer
    #[arg(long)]
    open: bool,
}

/// Pick the format and output path from the arguments
fn resolve_output(args: &Args) -> (DocumentFormat, PathBuf) {
    let format = if args.open {
        DocumentFormat::Pdf
    } else {
        args.format
            .or_else(|| args.output.as_deref().and_then(DocumentFormat::from_path))
            .unwrap_or_default()
    };
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.layout.with_extension(format.extension()));
    (format, output)
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let (format, output) = resolve_output(&args);

    let document = LayoutDocument::from_path(&args.layout)?;
    let base_dir = args.layout.parent().unwrap_or_else(|| Path::new("."));
    let mut canvas = document
        .build(base_dir)
        .with_context(|| format!("Failed to build layout '{}'", args.layout.display()))?;

    if args.open {
        canvas
            .export_and_open(&output)
            .with_context(|| format!("Failed to export '{}'", output.display()))?;
    } else {
        canvas
            .export(format, &output)
            .with_context(|| format!("Failed to export '{}'", output.display()))?;
    }

    info!(path = %output.display(), graphs = canvas.len(), "Wrote document");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::parse_from(std::iter::once("plotcanvas").chain(argv.iter().copied()))
    }

    #[test]
    fn test_default_output_next_to_layout() {
        let (format, output) = resolve_output(&parse(&["figs/layout.json"]));
        assert_eq!(format, DocumentFormat::Pdf);
        assert_eq!(output, PathBuf::from("figs/layout.pdf"));
    }

    #[test]
    fn test_format_from_output_extension() {
        let (format, output) = resolve_output(&parse(&["l.json", "-o", "out.eps"]));
        assert_eq!(format, DocumentFormat::Eps);
        assert_eq!(output, PathBuf::from("out.eps"));
    }

    #[test]
    fn test_explicit_format_wins() {
        let (format, output) = resolve_output(&parse(&["l.json", "-f", "eps"]));
        assert_eq!(format, DocumentFormat::Eps);
        assert_eq!(output, PathBuf::from("l.eps"));
    }

    #[test]
    fn test_open_forces_pdf() {
        let (format, _) = resolve_output(&parse(&["l.json", "-f", "eps", "--open"]));
        assert_eq!(format, DocumentFormat::Pdf);
    }
}
