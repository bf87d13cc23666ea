//! SVG rendering of technique trees.
//!
//! Each node is drawn as a rounded box filled with the color of its type, centered on
//! its layout position. The selected node gets an outline and nodes carrying a clip
//! get a badge. Edges run from the bottom of the source box to the top of the target
//! box; edges that do not carry ancestry (manual connections) are dashed.

use std::{collections::HashMap, fs::File, io::Write, path::PathBuf};

use log::{debug, error, info, warn};
use svg::{Document, node::element as svg_element};

use jits_core::{
    color::Color,
    geometry::{Bounds, Point, Size},
    identifier::Id,
    semantic::{Edge, Node, NodeType},
};

use crate::{config::StyleConfig, error::JitsError, export::Exporter, graph::GraphModel};

const MARGIN: f32 = 50.0;
const CORNER_RADIUS: f32 = 8.0;
const BADGE_RADIUS: f32 = 7.0;
const FONT_SIZE: f32 = 14.0;
const FONT_FAMILY: &str = "sans-serif";

/// Builder for [`Svg`] exporters.
///
/// Colors are resolved when the exporter is built, so an invalid color in the style
/// is reported before anything is rendered.
pub struct SvgBuilder {
    file_name: PathBuf,
    style: StyleConfig,
}

impl SvgBuilder {
    pub fn new(file_name: impl Into<PathBuf>) -> Self {
        Self {
            file_name: file_name.into(),
            style: StyleConfig::default(),
        }
    }

    pub fn with_style(mut self, style: &StyleConfig) -> Self {
        self.style = style.clone();
        self
    }

    /// # Errors
    ///
    /// Returns [`JitsError::Config`] if a color of the style cannot be parsed.
    pub fn build(self) -> Result<Svg, JitsError> {
        let style = &self.style;
        let node_colors = NodeType::ALL
            .into_iter()
            .map(|node_type| Ok((node_type, style.node_color(node_type)?)))
            .collect::<Result<HashMap<_, _>, String>>()
            .map_err(JitsError::Config)?;

        Ok(Svg {
            file_name: self.file_name,
            background_color: style.background_color().map_err(JitsError::Config)?,
            selected_color: style.selected_color().map_err(JitsError::Config)?,
            edge_color: style.edge_color().map_err(JitsError::Config)?,
            node_colors,
            node_size: Size::new(style.node_width(), style.node_height()),
        })
    }
}

/// SVG exporter with resolved style.
#[derive(Debug)]
pub struct Svg {
    file_name: PathBuf,
    background_color: Option<Color>,
    selected_color: Color,
    edge_color: Color,
    node_colors: HashMap<NodeType, Color>,
    node_size: Size,
}

impl Svg {
    /// Renders `model` into a document.
    pub fn render(&self, model: &GraphModel, selected: Option<Id>) -> Document {
        let content_bounds = model
            .nodes()
            .map(|node| self.node_bounds(node))
            .reduce(|acc, bounds| acc.merge(&bounds))
            .unwrap_or_default()
            .expand(MARGIN);
        let origin = content_bounds.min_point();
        debug!(
            width = content_bounds.width(),
            height = content_bounds.height();
            "SVG dimensions"
        );

        let mut doc = Document::new()
            .set(
                "viewBox",
                format!(
                    "{} {} {} {}",
                    origin.x(),
                    origin.y(),
                    content_bounds.width(),
                    content_bounds.height()
                ),
            )
            .set("width", content_bounds.width())
            .set("height", content_bounds.height());

        if let Some(color) = self.background_color {
            doc = doc.add(
                svg_element::Rectangle::new()
                    .set("x", origin.x())
                    .set("y", origin.y())
                    .set("width", content_bounds.width())
                    .set("height", content_bounds.height())
                    .set("fill", color.to_string())
                    .set("fill-opacity", color.alpha()),
            );
        }

        doc = doc.add(self.marker_definitions());

        let mut edges = svg_element::Group::new().set("class", "edges");
        for edge in model.edges() {
            match self.render_edge(model, edge) {
                Some(path) => edges = edges.add(path),
                None => warn!(edge:%; "Skipping edge with missing endpoint"),
            }
        }

        let mut nodes = svg_element::Group::new().set("class", "nodes");
        for node in model.nodes() {
            nodes = nodes.add(self.render_node(node, selected == Some(node.id())));
        }

        doc.add(edges).add(nodes)
    }

    /// Renders `model` into an SVG string.
    pub fn render_to_string(&self, model: &GraphModel, selected: Option<Id>) -> String {
        self.render(model, selected).to_string()
    }

    /// Writes a document to the exporter's file.
    ///
    /// # Errors
    ///
    /// - [`JitsError::Io`] if the file cannot be created.
    /// - [`JitsError::Export`] if the document cannot be written to it.
    pub fn write_document(&self, doc: Document) -> Result<(), JitsError> {
        let file_name = self.file_name.display();
        info!(file_name:%; "Creating SVG file");
        let mut f = File::create(&self.file_name).inspect_err(|err| {
            error!(file_name:%, err:%; "Failed to create SVG file");
        })?;

        write!(f, "{doc}").map_err(|err| {
            error!(file_name:%, err:%; "Failed to write SVG content");
            JitsError::Export(format!("failed to write {file_name}: {err}"))
        })?;
        Ok(())
    }

    fn node_bounds(&self, node: &Node) -> Bounds {
        Bounds::new_from_center(node.position(), self.node_size)
    }

    fn node_color(&self, node_type: NodeType) -> Color {
        self.node_colors
            .get(&node_type)
            .copied()
            .unwrap_or_default()
    }

    fn marker_id(&self) -> String {
        format!("arrow-{}", self.edge_color.to_id_safe_string())
    }

    fn marker_definitions(&self) -> svg_element::Definitions {
        let marker = svg_element::Marker::new()
            .set("id", self.marker_id())
            .set("viewBox", "0 0 10 10")
            .set("refX", 9)
            .set("refY", 5)
            .set("markerWidth", 6)
            .set("markerHeight", 6)
            .set("orient", "auto")
            .add(
                svg_element::Path::new()
                    .set("d", "M 0 0 L 10 5 L 0 10 z")
                    .set("fill", self.edge_color.to_string())
                    .set("fill-opacity", self.edge_color.alpha()),
            );
        svg_element::Definitions::new().add(marker)
    }

    fn render_edge(&self, model: &GraphModel, edge: &Edge) -> Option<svg_element::Path> {
        let source = model.node(edge.source())?;
        let target = model.node(edge.target())?;
        let half_height = self.node_size.height() / 2.0;

        let start = source.position().add_point(Point::new(0.0, half_height));
        let end = target.position().add_point(Point::new(0.0, -half_height));
        let mid_y = start.midpoint(end).y();

        let mut path = svg_element::Path::new()
            .set(
                "d",
                format!(
                    "M {} {} C {} {}, {} {}, {} {}",
                    start.x(),
                    start.y(),
                    start.x(),
                    mid_y,
                    end.x(),
                    mid_y,
                    end.x(),
                    end.y()
                ),
            )
            .set("fill", "none")
            .set("stroke", self.edge_color.to_string())
            .set("stroke-opacity", self.edge_color.alpha())
            .set("stroke-width", 2)
            .set("marker-end", format!("url(#{})", self.marker_id()))
            .set("data-edge", edge.id().to_string());

        let is_parent_edge = model
            .parent_edge(target.id())
            .is_some_and(|parent_edge| parent_edge.id() == edge.id());
        if !is_parent_edge {
            path = path.set("stroke-dasharray", "6 4");
        }
        Some(path)
    }

    fn render_node(&self, node: &Node, is_selected: bool) -> svg_element::Group {
        let bounds = self.node_bounds(node);
        let fill = self.node_color(node.node_type());
        let center = node.position();

        let mut rect = svg_element::Rectangle::new()
            .set("x", bounds.min_x())
            .set("y", bounds.min_y())
            .set("width", bounds.width())
            .set("height", bounds.height())
            .set("rx", CORNER_RADIUS)
            .set("fill", fill.to_string())
            .set("fill-opacity", fill.alpha());
        if is_selected {
            rect = rect
                .set("stroke", self.selected_color.to_string())
                .set("stroke-width", 3);
        }

        let label = svg_element::Text::new(node.label())
            .set("x", center.x())
            .set("y", center.y())
            .set("text-anchor", "middle")
            .set("dominant-baseline", "central")
            .set("font-family", FONT_FAMILY)
            .set("font-size", FONT_SIZE)
            .set("fill", "#ffffff");

        let mut group = svg_element::Group::new()
            .set("class", format!("node {}", node.node_type().key()))
            .set("data-node", node.id().to_string())
            .add(rect)
            .add(label);

        if let Some(media_ref) = node.media_ref() {
            group = group
                .set("data-clip", media_ref.source_id())
                .add(
                    svg_element::Circle::new()
                        .set("cx", bounds.max_x())
                        .set("cy", bounds.min_y())
                        .set("r", BADGE_RADIUS)
                        .set("fill", "#ffffff")
                        .set("stroke", fill.to_string())
                        .set("stroke-width", 2),
                );
        }
        group
    }
}

impl Exporter for Svg {
    fn export_graph(&self, model: &GraphModel, selected: Option<Id>) -> Result<(), JitsError> {
        let doc = self.render(model, selected);
        debug!("SVG document rendered");
        self.write_document(doc)
    }
}
