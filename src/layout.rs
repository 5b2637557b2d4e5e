//! JSON layout documents.
//!
//! A layout lists graphs with their size, placement, axes, legend and
//! series. Series values are given inline or name columns of a CSV file
//! (or inline JSON rows) declared in `data`.

use crate::backend::{Backend, VectorBackend};
use crate::canvas::{Canvas, GraphId, Position};
use crate::data::DataTable;
use crate::graph::{AxisConfig, AxisKind, Graph, SeriesOptions, GOLDEN_RATIO};
use crate::parser::parse_format;
use crate::style::lookup_color;
use crate::RenderOptions;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutDocument {
    #[serde(default)]
    pub data: Option<DataSource>,
    #[serde(default)]
    pub render: RenderOptions,
    pub graphs: Vec<GraphSpec>,
}

/// A CSV path relative to the layout file, or inline rows
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DataSource {
    File(String),
    Rows(Value),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphSpec {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    /// Defaults to width / height when both are given, else the golden mean
    #[serde(default)]
    pub ratio: Option<f64>,
    #[serde(default)]
    pub place: Placement,
    #[serde(default)]
    pub x_axis: Option<AxisSpec>,
    #[serde(default)]
    pub y_axis: Option<AxisSpec>,
    #[serde(default)]
    pub legend: Option<String>,
    #[serde(default)]
    pub series: Vec<SeriesSpec>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    At(Position),
    RightOf(RelativePlacement),
    BelowOf(RelativePlacement),
}

impl Default for Placement {
    fn default() -> Self {
        Placement::At(Position::default())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelativePlacement {
    pub graph: String,
    #[serde(default = "default_distance")]
    pub distance: f64,
}

fn default_distance() -> f64 {
    1.0
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxisSpec {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub ticks: Vec<f64>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl AxisSpec {
    fn to_config(&self) -> crate::Result<AxisConfig> {
        let kind = match &self.kind {
            Some(kind) => kind.parse::<AxisKind>()?,
            None => AxisKind::Linear,
        };
        Ok(AxisConfig {
            kind,
            label: self.label.clone(),
            manual_ticks: self.ticks.clone(),
            min: self.min,
            max: self.max,
        })
    }
}

/// Inline numbers or a column name
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Values {
    Inline(Vec<f64>),
    Column(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeriesSpec {
    pub x: Values,
    pub y: Values,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub line: Option<String>,
    #[serde(default)]
    pub marker: Option<String>,
    #[serde(default)]
    pub marker_fill: Option<String>,
    #[serde(default)]
    pub title: String,
}

impl LayoutDocument {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Failed to parse layout document")
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read layout '{}'", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("Invalid layout '{}'", path.display()))
    }

    /// Build a canvas rendered with the document's render options.
    /// Relative data paths are resolved against `base_dir`.
    pub fn build(&self, base_dir: &Path) -> Result<Canvas> {
        self.build_with(VectorBackend::new(self.render.clone()), base_dir)
    }

    pub fn build_with<B: Backend>(&self, backend: B, base_dir: &Path) -> Result<Canvas<B>> {
        let table = match &self.data {
            Some(DataSource::File(file)) => Some(DataTable::from_path(&base_dir.join(file))?),
            Some(DataSource::Rows(rows)) => {
                Some(DataTable::from_json(rows).context("Failed to read inline data")?)
            }
            None => None,
        };

        let mut canvas = Canvas::with_backend(backend);
        let mut ids: HashMap<String, GraphId> = HashMap::new();

        for (idx, spec) in self.graphs.iter().enumerate() {
            let name = spec.id.clone().unwrap_or_else(|| format!("#{}", idx + 1));
            if spec.id.as_ref().map_or(false, |key| ids.contains_key(key)) {
                bail!("Duplicate graph id '{}'", name);
            }
            let graph = build_graph(spec, table.as_ref())
                .with_context(|| format!("Failed to build graph '{}'", name))?;

            let id = match &spec.place {
                Placement::At(p) => canvas.add_graph(graph, p.x, p.y)?,
                Placement::RightOf(rel) => {
                    let reference = lookup(&ids, &name, rel)?;
                    canvas.add_graph_right_of(graph, reference, rel.distance)?
                }
                Placement::BelowOf(rel) => {
                    let reference = lookup(&ids, &name, rel)?;
                    canvas.add_graph_below_of(graph, reference, rel.distance)?
                }
            };

            if let Some(key) = &spec.id {
                ids.insert(key.clone(), id);
            }
        }

        debug!(graphs = canvas.len(), "Built canvas from layout");
        Ok(canvas)
    }
}

fn lookup(ids: &HashMap<String, GraphId>, name: &str, rel: &RelativePlacement) -> Result<GraphId> {
    match ids.get(&rel.graph) {
        Some(id) => Ok(*id),
        None => bail!(
            "Graph '{}' is placed relative to '{}', which is not defined before it",
            name,
            rel.graph
        ),
    }
}

fn build_graph(spec: &GraphSpec, table: Option<&DataTable>) -> Result<Graph> {
    let ratio = match (spec.ratio, spec.width, spec.height) {
        (Some(ratio), _, _) => ratio,
        (None, Some(width), Some(height)) => width / height,
        _ => GOLDEN_RATIO,
    };
    let mut graph = Graph::new(spec.width, spec.height, ratio)?;

    if let Some(axis) = &spec.x_axis {
        graph.set_x_axis(axis.to_config()?).context("Invalid x_axis")?;
    }
    if let Some(axis) = &spec.y_axis {
        graph.set_y_axis(axis.to_config()?).context("Invalid y_axis")?;
    }
    if let Some(position) = &spec.legend {
        graph.show_legend(position.as_str());
    }

    for (idx, series) in spec.series.iter().enumerate() {
        add_series(&mut graph, series, table)
            .with_context(|| format!("Invalid series {}", idx + 1))?;
    }
    Ok(graph)
}

fn add_series(graph: &mut Graph, spec: &SeriesSpec, table: Option<&DataTable>) -> Result<()> {
    let x = resolve_values(&spec.x, table)?;
    let y = resolve_values(&spec.y, table)?;

    match &spec.format {
        Some(format) => {
            if spec.color.is_some() || spec.line.is_some() || spec.marker.is_some() {
                bail!("Use either 'format' or 'color'/'line'/'marker', not both");
            }
            let mut style = parse_format(format)?.into_style();
            if let Some(fill) = spec.marker_fill.as_deref() {
                match style.marker.as_mut() {
                    Some(marker) => marker.fill = lookup_color(fill)?,
                    None => bail!("'marker_fill' needs a marker in format '{}'", format),
                }
            }
            graph.add_styled_series(x, y, &spec.title, style)?;
        }
        None => {
            let defaults = SeriesOptions::default();
            let options = SeriesOptions {
                color: spec.color.as_deref().unwrap_or(defaults.color),
                line: spec.line.as_deref().or(defaults.line),
                marker: spec.marker.as_deref(),
                marker_fill: spec.marker_fill.as_deref(),
                title: &spec.title,
            };
            graph.add_series(x, y, options)?;
        }
    }
    Ok(())
}

fn resolve_values(values: &Values, table: Option<&DataTable>) -> Result<Vec<f64>> {
    match values {
        Values::Inline(v) => Ok(v.clone()),
        Values::Column(name) => match table {
            Some(table) => table.column(name),
            None => bail!("Column '{}' requested but the layout has no data", name),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingBackend;
    use crate::PlotError;

    fn build(json: &str) -> Result<Canvas<RecordingBackend>> {
        LayoutDocument::from_json_str(json)?.build_with(RecordingBackend::new(), Path::new("."))
    }

    #[test]
    fn test_relative_placement_from_layout() {
        let canvas = build(
            r#"{"graphs": [
                {"id": "a", "width": 8, "height": 5},
                {"id": "b", "width": 4, "height": 5, "place": {"right_of": {"graph": "a", "distance": 2}}},
                {"width": 8, "height": 3, "place": {"below_of": {"graph": "a"}}}
            ]}"#,
        )
        .unwrap();

        let positions: Vec<Position> = canvas.iter().map(|(_, _, p)| p).collect();
        assert_eq!(positions[1], Position::new(10.0, 0.0));
        assert_eq!(positions[2], Position::new(0.0, -4.0));
    }

    #[test]
    fn test_inline_rows_and_columns() {
        let canvas = build(
            r#"{
                "data": [{"t": 0, "v": 1}, {"t": 1, "v": 3}],
                "graphs": [{"width": 6, "legend": "br", "series": [
                    {"x": "t", "y": "v", "format": "r--o", "title": "v"},
                    {"x": [0, 1], "y": [2, 2], "color": "k", "line": "none", "marker": "s"}
                ]}]
            }"#,
        )
        .unwrap();

        let (_, graph, _) = canvas.iter().next().unwrap();
        assert_eq!(graph.series().len(), 2);
        assert_eq!(graph.series()[0].y, vec![1.0, 3.0]);
        assert!(graph.series()[1].style.line.is_none());
        assert_eq!(graph.legend().unwrap().position, "br");
    }

    #[test]
    fn test_marker_fill_applies_to_format() {
        let canvas = build(
            r#"{"graphs": [{"width": 6, "series": [
                {"x": [0, 1], "y": [1, 2], "format": "bo", "marker_fill": "r"}
            ]}]}"#,
        )
        .unwrap();
        let (_, graph, _) = canvas.iter().next().unwrap();
        let style = graph.series()[0].style;
        assert_eq!(style.color, plotters::style::BLUE);
        assert_eq!(style.marker.unwrap().fill, plotters::style::RED);
    }

    #[test]
    fn test_marker_fill_without_format_marker() {
        let err = build(
            r#"{"graphs": [{"width": 6, "series": [
                {"x": [0], "y": [1], "format": "b--", "marker_fill": "r"}
            ]}]}"#,
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("needs a marker"));
    }

    #[test]
    fn test_unknown_reference() {
        let err = build(
            r#"{"graphs": [{"width": 4, "place": {"below_of": {"graph": "missing"}}}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_duplicate_id() {
        let err = build(r#"{"graphs": [{"id": "a", "width": 4}, {"id": "a", "width": 4}]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("Duplicate graph id"));
    }

    #[test]
    fn test_log_axis_is_unsupported() {
        let err = build(r#"{"graphs": [{"width": 4, "y_axis": {"kind": "log"}}]}"#).unwrap_err();
        let cause = err.chain().find_map(|e| e.downcast_ref::<PlotError>());
        assert!(matches!(cause, Some(PlotError::UnsupportedFeature(_))));
    }

    #[test]
    fn test_bad_style_code_reported() {
        let err = build(
            r#"{"graphs": [{"width": 4, "series": [{"x": [0], "y": [0], "color": "q"}]}]}"#,
        )
        .unwrap_err();
        let cause = err.chain().find_map(|e| e.downcast_ref::<PlotError>());
        assert!(matches!(cause, Some(PlotError::InvalidStyleCode { .. })));
    }

    #[test]
    fn test_column_without_data() {
        let err = build(r#"{"graphs": [{"width": 4, "series": [{"x": "t", "y": "v"}]}]}"#)
            .unwrap_err();
        assert!(format!("{:#}", err).contains("has no data"));
    }
}
