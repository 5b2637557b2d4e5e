//! The plotters-based backend.
//!
//! Each graph is rendered through a plotters chart onto a [`SceneBackend`],
//! which records vector primitives. The canvas composes scenes into a
//! [`Document`] that is serialized by the PDF and EPS writers.

use super::elements::{GlyphMetrics, LegendGlyph, MarkerPoint, PatternedPath};
use super::scene::{
    cm_to_units, pt_to_units, text_width, Document, Scene, SceneBackend, UNITS_PER_POINT,
};
use super::{eps, pdf, Backend};
use crate::canvas::Frame;
use crate::error::{PlotError, Result};
use crate::graph::{Axis, AxisConfig, Graph, Series};
use crate::RenderOptions;
use plotters::coord::ranged1d::{DefaultFormatting, KeyPointHint, Ranged};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::io::Write;
use std::ops::Range;
use tracing::debug;

/// Backend that renders graphs to vector scenes and exports PDF or EPS
#[derive(Debug, Clone, Default)]
pub struct VectorBackend {
    options: RenderOptions,
}

impl VectorBackend {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }
}

impl Backend for VectorBackend {
    type Drawable = Scene;
    type Composite = Document;

    fn build_drawable(&self, graph: &Graph) -> Result<Scene> {
        let plan = ChartPlan::new(graph, &self.options)?;
        let size = (cm_to_units(graph.width()), cm_to_units(graph.height()));

        let mut primitives = Vec::new();
        {
            let root = SceneBackend::new(&mut primitives, size).into_drawing_area();
            render(graph, plan, &root)
                .map_err(|e| PlotError::Render(format!("Failed to render graph: {}", e)))?;
            root.present()
                .map_err(|e| PlotError::Render(format!("Failed to present drawing: {}", e)))?;
        }

        debug!(
            series = graph.series().len(),
            primitives = primitives.len(),
            "Rendered graph scene"
        );
        Ok(Scene {
            width: size.0,
            height: size.1,
            primitives,
        })
    }

    fn new_composite(&self) -> Document {
        Document::default()
    }

    fn insert(&self, composite: &mut Document, drawable: Scene, frame: Frame) {
        composite.items.push((frame, drawable));
    }

    fn write_pdf<W: Write>(&self, composite: &Document, out: W) -> Result<()> {
        pdf::write_pdf(composite, out)
    }

    fn write_eps<W: Write>(&self, composite: &Document, out: W) -> Result<()> {
        eps::write_eps(composite, out)
    }
}

/// Everything about a chart that is decided before drawing starts
struct ChartPlan {
    x_range: Range<f64>,
    y_range: Range<f64>,
    x_ticks: Vec<f64>,
    y_ticks: Vec<f64>,
    legend: Option<SeriesLabelPosition>,
    /// Font size in scene units
    font_size: f64,
    margin: u32,
    metrics: GlyphMetrics,
}

impl ChartPlan {
    fn new(graph: &Graph, options: &RenderOptions) -> Result<Self> {
        let xs: Vec<f64> = graph.series().iter().flat_map(|s| s.x.iter().copied()).collect();
        let ys: Vec<f64> = graph.series().iter().flat_map(|s| s.y.iter().copied()).collect();
        let x_config = graph.axis(Axis::X);
        let y_config = graph.axis(Axis::Y);

        let x_range = axis_range(x_config, &xs);
        let y_range = axis_range(y_config, &ys);
        let x_ticks = axis_ticks(x_config, &x_range);
        let y_ticks = axis_ticks(y_config, &y_range);

        let legend = match graph.legend() {
            Some(legend) if graph.series().iter().any(|s| !s.title.is_empty()) => {
                Some(legend_position(&legend.position)?)
            }
            Some(legend) => {
                // Nothing to list, but a bad code is still an error
                legend_position(&legend.position)?;
                None
            }
            None => None,
        };

        Ok(Self {
            x_range,
            y_range,
            x_ticks,
            y_ticks,
            legend,
            font_size: options.font_size * UNITS_PER_POINT,
            margin: pt_to_units(options.margin),
            metrics: GlyphMetrics {
                line_width: pt_to_units(options.line_width).max(1),
                marker_size: pt_to_units(options.marker_size).max(1),
                pattern_scale: UNITS_PER_POINT * options.line_width.max(0.5),
            },
        })
    }

    fn x_label_area(&self, label: bool) -> u32 {
        let ticks = self.font_size * 1.8;
        let desc = if label { self.font_size * 1.4 } else { 0.0 };
        (ticks + desc).ceil() as u32
    }

    fn y_label_area(&self, label: bool) -> u32 {
        let widest = self
            .y_ticks
            .iter()
            .map(|t| text_width(&format_tick(t), self.font_size))
            .fold(0.0, f64::max);
        let desc = if label { self.font_size * 1.4 } else { 0.0 };
        (widest + self.font_size * 0.8 + desc).ceil() as u32
    }
}

fn render<DB: DrawingBackend>(
    graph: &Graph,
    plan: ChartPlan,
    area: &DrawingArea<DB, Shift>,
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let x_label = graph.axis(Axis::X).and_then(|c| c.label.as_deref());
    let y_label = graph.axis(Axis::Y).and_then(|c| c.label.as_deref());
    let font = plan.font_size;
    let line_width = plan.metrics.line_width;

    let mut chart = ChartBuilder::on(area)
        .margin(plan.margin)
        .x_label_area_size(plan.x_label_area(x_label.is_some()))
        .y_label_area_size(plan.y_label_area(y_label.is_some()))
        .build_cartesian_2d(
            TickedAxis::new(plan.x_range.clone(), plan.x_ticks.clone()),
            TickedAxis::new(plan.y_range.clone(), plan.y_ticks.clone()),
        )?;

    {
        let mut mesh = chart.configure_mesh();
        mesh.disable_mesh()
            .axis_style(BLACK.stroke_width(line_width))
            .set_all_tick_mark_size((font * 0.35).round() as u32)
            .x_label_formatter(&format_tick)
            .y_label_formatter(&format_tick)
            .label_style(("sans-serif", font).into_font().color(&BLACK))
            .axis_desc_style(("sans-serif", font).into_font().color(&BLACK));
        if let Some(label) = x_label {
            mesh.x_desc(label);
        }
        if let Some(label) = y_label {
            mesh.y_desc(label);
        }
        mesh.draw()?;
    }

    // Frame around the plotting area
    chart.draw_series(std::iter::once(Rectangle::new(
        [
            (plan.x_range.start, plan.y_range.start),
            (plan.x_range.end, plan.y_range.end),
        ],
        BLACK.stroke_width(line_width),
    )))?;

    for series in graph.series() {
        draw_series(&mut chart, series, &plan)?;
    }

    if let Some(position) = plan.legend {
        chart
            .configure_series_labels()
            .position(position)
            .margin((font * 0.6).round() as u32)
            .legend_area_size((font * 2.6).round() as u32)
            .label_font(("sans-serif", font).into_font().color(&BLACK))
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK.stroke_width(1))
            .draw()?;
    }

    Ok(())
}

type Chart<'a, DB> = ChartContext<'a, DB, Cartesian2d<TickedAxis, TickedAxis>>;

/// Linear axis whose tick positions are fixed before drawing.
/// Ticks are bold key points only, so no light mesh lines are produced.
#[derive(Clone)]
struct TickedAxis {
    inner: RangedCoordf64,
    ticks: Vec<f64>,
}

impl TickedAxis {
    fn new(range: Range<f64>, ticks: Vec<f64>) -> Self {
        Self {
            inner: range.into(),
            ticks,
        }
    }
}

impl Ranged for TickedAxis {
    type FormatOption = DefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        self.inner.map(value, limit)
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        if hint.weight().allow_light_points() {
            Vec::new()
        } else {
            self.ticks.clone()
        }
    }

    fn range(&self) -> Range<f64> {
        self.inner.range()
    }
}

fn draw_series<DB: DrawingBackend>(
    chart: &mut Chart<'_, DB>,
    series: &Series,
    plan: &ChartPlan,
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let style = series.style;
    let metrics = plan.metrics;
    let points: Vec<(f64, f64)> = series.points().collect();

    if let Some(dash) = style.line {
        let stroke = style.color.stroke_width(metrics.line_width);
        for run in clip_polyline(&points, &plan.x_range, &plan.y_range) {
            if dash.pattern().is_empty() {
                chart.draw_series(LineSeries::new(run, stroke))?;
            } else {
                chart.draw_series(
                    PatternedPath::new(run, dash.pattern(), metrics.pattern_scale, stroke).series(),
                )?;
            }
        }
    }

    if let Some(marker) = style.marker {
        chart.draw_series(
            points
                .iter()
                .filter(|p| contains(&plan.x_range, p.0) && contains(&plan.y_range, p.1))
                .map(|p| MarkerPoint::new(*p, marker.shape, marker.fill, metrics)),
        )?;
    }

    if !series.title.is_empty() {
        let glyph_length = (plan.font_size * 2.0).round() as i32;
        chart
            .draw_series(std::iter::empty::<PatternedPath<(f64, f64)>>())?
            .label(series.title.as_str())
            .legend(move |at| LegendGlyph::new(at, glyph_length, style, metrics));
    }

    Ok(())
}

/// Map a two-letter legend code (vertical then horizontal) to a position
pub(crate) fn legend_position(code: &str) -> Result<SeriesLabelPosition> {
    let position = match code {
        "tl" => SeriesLabelPosition::UpperLeft,
        "tc" => SeriesLabelPosition::UpperMiddle,
        "tr" => SeriesLabelPosition::UpperRight,
        "ml" => SeriesLabelPosition::MiddleLeft,
        "mc" => SeriesLabelPosition::MiddleMiddle,
        "mr" => SeriesLabelPosition::MiddleRight,
        "bl" => SeriesLabelPosition::LowerLeft,
        "bc" => SeriesLabelPosition::LowerMiddle,
        "br" => SeriesLabelPosition::LowerRight,
        _ => return Err(PlotError::InvalidLegendPosition(code.to_string())),
    };
    Ok(position)
}

/// Largest magnitude an axis limit may take, so the span stays finite
const AXIS_LIMIT: f64 = f64::MAX / 4.0;

/// Configured limits, otherwise the finite data extent padded by 5%
fn axis_range(config: Option<&AxisConfig>, values: &[f64]) -> Range<f64> {
    let (lo, hi) = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(-AXIS_LIMIT, AXIS_LIMIT))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

    let (mut start, mut end) = if lo > hi {
        (0.0, 1.0)
    } else if lo == hi {
        (lo - widening(lo), hi + widening(hi))
    } else {
        let pad = (hi - lo) * 0.05;
        (lo - pad, hi + pad)
    };

    let min = config.and_then(|c| c.min).map(|v| v.clamp(-AXIS_LIMIT, AXIS_LIMIT));
    let max = config.and_then(|c| c.max).map(|v| v.clamp(-AXIS_LIMIT, AXIS_LIMIT));
    if let Some(min) = min {
        start = min;
    }
    if let Some(max) = max {
        end = max;
    }
    if start >= end {
        match (min, max) {
            (Some(_), None) => end = start + widening(start),
            (None, Some(_)) => start = end - widening(end),
            _ => {
                start -= widening(start);
                end += widening(end);
            }
        }
    }
    start..end
}

/// Amount a degenerate range is widened by: 1, or enough to change `v`
fn widening(v: f64) -> f64 {
    (v.abs() * 1e-6).max(1.0)
}

/// Manual ticks inside the range, or about five 1/2/5 steps
fn axis_ticks(config: Option<&AxisConfig>, range: &Range<f64>) -> Vec<f64> {
    match config {
        Some(c) if !c.manual_ticks.is_empty() => c
            .manual_ticks
            .iter()
            .copied()
            .filter(|t| contains(range, *t))
            .collect(),
        _ => nice_ticks(range, 5),
    }
}

fn nice_ticks(range: &Range<f64>, target: usize) -> Vec<f64> {
    let span = range.end - range.start;
    if !(span > 0.0) || !span.is_finite() {
        return Vec::new();
    }
    let raw = span / target as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = match raw / magnitude {
        n if n <= 1.0 => 1.0,
        n if n <= 2.0 => 2.0,
        n if n <= 5.0 => 5.0,
        _ => 10.0,
    } * magnitude;

    let first = (range.start / step - 1e-9).ceil() as i64;
    let last = (range.end / step + 1e-9).floor() as i64;
    (first..=last).map(|i| i as f64 * step).collect()
}

fn contains(range: &Range<f64>, value: f64) -> bool {
    let slack = (range.end - range.start).abs() * 1e-9;
    value >= range.start - slack && value <= range.end + slack
}

/// Tick label: at most six decimals without trailing zeros, scientific
/// notation for very large or very small magnitudes
fn format_tick(value: &f64) -> String {
    if value.abs() < 1e-12 {
        return "0".to_string();
    }
    if value.abs() >= 1e7 || value.abs() < 1e-5 {
        let s = format!("{:.3e}", value);
        return match s.split_once('e') {
            Some((mantissa, exponent)) => format!("{}e{}", trim_zeros(mantissa), exponent),
            None => s,
        };
    }
    let s = trim_zeros(&format!("{:.6}", value));
    if s == "-0" {
        "0".to_string()
    } else {
        s
    }
}

fn trim_zeros(s: &str) -> String {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s.to_string()
    }
}

/// Split a polyline into the runs that lie inside the plotting rectangle.
/// Non-finite points break the line.
fn clip_polyline(points: &[(f64, f64)], x: &Range<f64>, y: &Range<f64>) -> Vec<Vec<(f64, f64)>> {
    let mut runs: Vec<Vec<(f64, f64)>> = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();

    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let finite = a.0.is_finite() && a.1.is_finite() && b.0.is_finite() && b.1.is_finite();
        match clip_segment(limited(a), limited(b), x, y).filter(|_| finite) {
            Some((p, q)) => {
                if current.last() != Some(&p) && !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
                if current.is_empty() {
                    current.push(p);
                }
                current.push(q);
            }
            None => {
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Pull a point within the axis limit so segment deltas cannot overflow
fn limited((x, y): (f64, f64)) -> (f64, f64) {
    (x.clamp(-AXIS_LIMIT, AXIS_LIMIT), y.clamp(-AXIS_LIMIT, AXIS_LIMIT))
}

/// Liang-Barsky clipping of one segment
fn clip_segment(
    a: (f64, f64),
    b: (f64, f64),
    x: &Range<f64>,
    y: &Range<f64>,
) -> Option<((f64, f64), (f64, f64))> {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;

    for (p, q) in [
        (-dx, a.0 - x.start),
        (dx, x.end - a.0),
        (-dy, a.1 - y.start),
        (dy, y.end - a.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let at = |t: f64| {
        if t == 0.0 {
            a
        } else if t == 1.0 {
            b
        } else {
            (a.0 + t * dx, a.1 + t * dy)
        }
    };
    Some((at(t0), at(t1)))
}
