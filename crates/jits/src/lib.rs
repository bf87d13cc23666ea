//! Jits - relationship inference and tree layout for grappling technique trees.
//!
//! A technique tree is built one node at a time. Where a new node hangs is inferred
//! from its type and the currently selected node, and the whole tree is laid out
//! again after every change. The session lives in a [`GraphController`]; records are
//! mirrored to an external store through the [`store`] module and rendered with the
//! [`export`] module.

pub mod config;
pub mod controller;
pub mod export;
pub mod graph;
pub mod layout;
pub mod resolver;
pub mod store;

mod error;

pub use jits_core::{color, geometry, identifier, media, semantic};

pub use controller::GraphController;
pub use error::JitsError;

use log::info;

use config::StyleConfig;
use export::svg::SvgBuilder;

/// Render the current tree of a session to an SVG string.
///
/// # Errors
///
/// Returns [`JitsError::Config`] if `style` contains a color that cannot be parsed.
///
/// # Examples
///
/// ```rust
/// use jits::{GraphController, config::{LayoutConfig, StyleConfig}, semantic::NodeType};
///
/// let mut controller = GraphController::new(&LayoutConfig::default());
/// controller.add_node(NodeType::Variant, "Closed Guard", None)?;
///
/// let svg = jits::render_svg(&controller, &StyleConfig::default())?;
/// assert!(svg.contains("Closed Guard"));
/// # Ok::<(), jits::JitsError>(())
/// ```
pub fn render_svg(controller: &GraphController, style: &StyleConfig) -> Result<String, JitsError> {
    let exporter = SvgBuilder::new("").with_style(style).build()?;
    let svg = exporter.render_to_string(controller.model(), controller.selected());

    info!(nodes_count = controller.model().nodes_count(); "SVG rendered successfully");
    Ok(svg)
}
