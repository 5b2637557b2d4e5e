//! A backend that renders nothing.
//!
//! It keeps a summary of each graph it is asked to build and counts the
//! builds, so canvas layout and draw bookkeeping can be checked without a
//! rendering library.

use super::Backend;
use crate::canvas::Frame;
use crate::error::Result;
use crate::graph::Graph;
use std::cell::Cell;
use std::io::Write;

/// What a recorded graph looked like when it was built
#[derive(Debug, Clone, PartialEq)]
pub struct GraphSummary {
    pub width: f64,
    pub height: f64,
    pub series: usize,
    pub titles: Vec<String>,
    pub legend: Option<String>,
}

#[derive(Debug, Default)]
pub struct RecordingBackend {
    builds: Cell<usize>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `build_drawable` calls so far
    pub fn builds(&self) -> usize {
        self.builds.get()
    }

    fn dump<W: Write>(&self, kind: &str, composite: &[(Frame, GraphSummary)], mut out: W) -> Result<()> {
        writeln!(out, "{} {}", kind, composite.len())?;
        for (frame, summary) in composite {
            writeln!(
                out,
                "graph x={} y={} w={} h={} series={}",
                frame.x, frame.y, frame.width, frame.height, summary.series
            )?;
        }
        out.flush()?;
        Ok(())
    }
}

impl Backend for RecordingBackend {
    type Drawable = GraphSummary;
    type Composite = Vec<(Frame, GraphSummary)>;

    fn build_drawable(&self, graph: &Graph) -> Result<GraphSummary> {
        self.builds.set(self.builds.get() + 1);
        Ok(GraphSummary {
            width: graph.width(),
            height: graph.height(),
            series: graph.series().len(),
            titles: graph.series().iter().map(|s| s.title.clone()).collect(),
            legend: graph.legend().map(|l| l.position.clone()),
        })
    }

    fn new_composite(&self) -> Self::Composite {
        Vec::new()
    }

    fn insert(&self, composite: &mut Self::Composite, drawable: GraphSummary, frame: Frame) {
        composite.push((frame, drawable));
    }

    fn write_pdf<W: Write>(&self, composite: &Self::Composite, out: W) -> Result<()> {
        self.dump("pdf", composite, out)
    }

    fn write_eps<W: Write>(&self, composite: &Self::Composite, out: W) -> Result<()> {
        self.dump("eps", composite, out)
    }
}
