//! Composition of several graphs onto one page.
//!
//! A [`Canvas`] owns its graphs together with their positions. Graphs are
//! placed at absolute coordinates or relative to a graph that is already on
//! the canvas; every placement is resolved immediately from the reference's
//! stored frame.

use crate::backend::{Backend, VectorBackend};
use crate::error::{PlotError, Result};
use crate::graph::Graph;
use crate::{viewer, DocumentFormat};
use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Lower-left corner of a graph box, in centimetres with y growing upward
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned box in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Frame {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y + self.height
    }

    /// Smallest frame containing both
    pub fn union(&self, other: &Frame) -> Frame {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Frame::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.top().max(other.top()) - y,
        )
    }
}

static NEXT_CANVAS: AtomicU64 = AtomicU64::new(0);

/// Handle to a graph on the canvas that issued it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GraphId {
    canvas: u64,
    index: usize,
}

impl GraphId {
    /// Insertion index on the owning canvas
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} of canvas {}", self.index, self.canvas)
    }
}

struct Entry {
    graph: Graph,
    position: Position,
}

impl Entry {
    fn frame(&self) -> Frame {
        Frame::new(
            self.position.x,
            self.position.y,
            self.graph.width(),
            self.graph.height(),
        )
    }
}

/// Ordered, positioned graphs exported as a single document
pub struct Canvas<B: Backend = VectorBackend> {
    id: u64,
    backend: B,
    entries: Vec<Entry>,
    composite: Option<B::Composite>,
}

impl<B: Backend> fmt::Debug for Canvas<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let frames: Vec<Frame> = self.entries.iter().map(Entry::frame).collect();
        f.debug_struct("Canvas")
            .field("id", &self.id)
            .field("frames", &frames)
            .field("drawn", &self.is_drawn())
            .finish()
    }
}

impl Canvas<VectorBackend> {
    pub fn new() -> Self {
        Self::with_backend(VectorBackend::default())
    }
}

impl Default for Canvas<VectorBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> Canvas<B> {
    pub fn with_backend(backend: B) -> Self {
        Self {
            id: NEXT_CANVAS.fetch_add(1, Ordering::Relaxed),
            backend,
            entries: Vec::new(),
            composite: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Place `graph` with its lower-left corner at (`x`, `y`)
    pub fn add_graph(&mut self, graph: Graph, x: f64, y: f64) -> Result<GraphId> {
        finite("x", x)?;
        finite("y", y)?;
        Ok(self.push(graph, Position::new(x, y)))
    }

    /// Place `graph` under `reference`, left edges aligned, leaving
    /// `distance` between the two boxes
    pub fn add_graph_below_of(&mut self, graph: Graph, reference: GraphId, distance: f64) -> Result<GraphId> {
        finite("distance", distance)?;
        let r = self.frame(reference)?;
        let position = Position::new(r.x, r.y - graph.height() - distance);
        Ok(self.push(graph, position))
    }

    /// Place `graph` to the right of `reference`, bottom edges aligned,
    /// leaving `distance` between the two boxes
    pub fn add_graph_right_of(&mut self, graph: Graph, reference: GraphId, distance: f64) -> Result<GraphId> {
        finite("distance", distance)?;
        let r = self.frame(reference)?;
        let position = Position::new(r.x + r.width + distance, r.y);
        Ok(self.push(graph, position))
    }

    fn push(&mut self, graph: Graph, position: Position) -> GraphId {
        let id = GraphId {
            canvas: self.id,
            index: self.entries.len(),
        };
        debug!(
            graph = id.index,
            x = position.x,
            y = position.y,
            width = graph.width(),
            height = graph.height(),
            "Placed graph"
        );
        self.entries.push(Entry { graph, position });
        self.composite = None;
        id
    }

    fn entry(&self, id: GraphId) -> Result<&Entry> {
        if id.canvas != self.id {
            return Err(PlotError::UnknownGraph(id.to_string()));
        }
        self.entries
            .get(id.index)
            .ok_or_else(|| PlotError::UnknownGraph(id.to_string()))
    }

    pub fn graph(&self, id: GraphId) -> Result<&Graph> {
        self.entry(id).map(|e| &e.graph)
    }

    /// Mutable access to a placed graph. The canvas will redraw before the
    /// next export.
    pub fn graph_mut(&mut self, id: GraphId) -> Result<&mut Graph> {
        self.entry(id)?;
        self.composite = None;
        Ok(&mut self.entries[id.index].graph)
    }

    pub fn position(&self, id: GraphId) -> Result<Position> {
        self.entry(id).map(|e| e.position)
    }

    /// The box a graph occupies on the canvas
    pub fn frame(&self, id: GraphId) -> Result<Frame> {
        self.entry(id).map(Entry::frame)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Graphs in paint order with their handles and positions
    pub fn iter(&self) -> impl Iterator<Item = (GraphId, &Graph, Position)> + '_ {
        let canvas = self.id;
        self.entries.iter().enumerate().map(move |(index, e)| {
            (GraphId { canvas, index }, &e.graph, e.position)
        })
    }

    /// Union of all graph boxes, `None` for an empty canvas
    pub fn bounds(&self) -> Option<Frame> {
        self.entries
            .iter()
            .map(Entry::frame)
            .reduce(|a, b| a.union(&b))
    }

    pub fn is_drawn(&self) -> bool {
        self.composite.is_some()
    }

    /// Render every graph in insertion order into a fresh composite.
    ///
    /// Calling this again rebuilds the composite, so content is never
    /// duplicated.
    pub fn draw(&mut self) -> Result<()> {
        if self.entries.is_empty() {
            return Err(PlotError::EmptyCanvas);
        }

        let mut composite = self.backend.new_composite();
        for entry in &self.entries {
            let drawable = entry.graph.draw(&self.backend)?;
            self.backend.insert(&mut composite, drawable, entry.frame());
        }
        debug!(graphs = self.entries.len(), "Drew canvas");
        self.composite = Some(composite);
        Ok(())
    }

    fn ensure_drawn(&mut self) -> Result<()> {
        if self.composite.is_none() {
            self.draw()?;
        }
        Ok(())
    }

    /// Serialize the canvas to `out`, drawing it first if needed
    pub fn write<W: Write>(&mut self, format: DocumentFormat, out: W) -> Result<()> {
        self.ensure_drawn()?;
        let composite = self.composite.as_ref().ok_or(PlotError::EmptyCanvas)?;
        match format {
            DocumentFormat::Pdf => self.backend.write_pdf(composite, out),
            DocumentFormat::Eps => self.backend.write_eps(composite, out),
        }
    }

    /// Write the canvas to `path` as a PDF or EPS document
    pub fn export(&mut self, format: DocumentFormat, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        // Draw before touching the file so a failed draw leaves nothing behind
        self.ensure_drawn()?;
        let mut out = BufWriter::new(File::create(path)?);
        self.write(format, &mut out)?;
        out.flush()?;
        debug!(path = %path.display(), format = format.extension(), "Exported canvas");
        Ok(())
    }

    /// Export as PDF, then try to open the file in the platform viewer.
    ///
    /// A viewer that fails to start is logged, not returned.
    pub fn export_and_open(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.export(DocumentFormat::Pdf, path)?;
        viewer::open(path);
        Ok(())
    }
}

fn finite(name: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(PlotError::Configuration(format!(
            "{} must be finite, got {}",
            name, value
        )))
    }
}
