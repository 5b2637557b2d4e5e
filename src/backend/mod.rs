//! Rendering backends.
//!
//! The canvas only needs four capabilities from a backend: turn a [`Graph`]
//! into a drawable, collect drawables into a composite at absolute frames,
//! and serialize that composite as PDF or EPS.

mod elements;
mod eps;
mod paint;
mod pdf;
pub mod recording;
pub mod scene;
pub mod vector;

pub use recording::RecordingBackend;
pub use scene::Scene;
pub use vector::VectorBackend;

use crate::canvas::Frame;
use crate::error::Result;
use crate::graph::Graph;
use std::io::Write;

/// A rendering and export capability injected into a [`Canvas`](crate::Canvas)
pub trait Backend {
    /// Rendered form of one graph
    type Drawable;
    /// Positioned drawables ready to serialize
    type Composite;

    /// Compile a graph's size, axes, legend and series into a drawable
    fn build_drawable(&self, graph: &Graph) -> Result<Self::Drawable>;

    fn new_composite(&self) -> Self::Composite;

    /// Place a drawable at an absolute frame (centimetres, y up)
    fn insert(&self, composite: &mut Self::Composite, drawable: Self::Drawable, frame: Frame);

    fn write_pdf<W: Write>(&self, composite: &Self::Composite, out: W) -> Result<()>;

    fn write_eps<W: Write>(&self, composite: &Self::Composite, out: W) -> Result<()>;
}
