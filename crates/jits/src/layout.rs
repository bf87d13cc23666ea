//! Tree layout.
//!
//! A layout pass turns the current node set into a position for every node. It runs
//! after every change to node membership; pure position edits (dragging) do not
//! trigger one.
//!
//! The module uses a builder pattern for creating and configuring layout engines,
//! so a session can be handed any [`LayoutEngine`] implementation.

mod tree;

pub use tree::TreeEngine;

use std::collections::HashSet;

use indexmap::IndexMap;

use jits_core::{geometry::Point, identifier::Id};

use crate::{config::LayoutConfig, graph::GraphModel};

/// Result of a layout pass, in node insertion order.
pub type Positions = IndexMap<Id, Point>;

/// Interface of tree layout engines.
pub trait LayoutEngine {
    /// Calculate a position for every node of `model`.
    ///
    /// - `model`: the node set, with authoritative `parent_id` and `depth`.
    /// - `pinned`: nodes whose current position must be kept. They still take part
    ///   in the layout: their children are placed relative to them.
    ///
    /// Implementations must be deterministic: the same model and pins always yield
    /// the same positions.
    fn calculate(&self, model: &GraphModel, pinned: &HashSet<Id>) -> Positions;
}

/// Builder for creating and configuring layout engines.
#[derive(Debug, Clone)]
pub struct EngineBuilder {
    origin: Point,
    horizontal_spacing: f32,
    vertical_spacing: f32,
    root_spread: f32,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::from_config(&LayoutConfig::default())
    }
}

impl EngineBuilder {
    /// Create a new engine builder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder carrying the spacing units of a [`LayoutConfig`]
    pub fn from_config(config: &LayoutConfig) -> Self {
        Self {
            origin: Point::new(config.origin_x(), config.origin_y()),
            horizontal_spacing: config.horizontal_spacing(),
            vertical_spacing: config.vertical_spacing(),
            root_spread: config.root_spread(),
        }
    }

    /// Set the position of the first root
    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    /// Set the horizontal distance between siblings
    pub fn with_horizontal_spacing(mut self, spacing: f32) -> Self {
        self.horizontal_spacing = spacing;
        self
    }

    /// Set the vertical distance between levels
    pub fn with_vertical_spacing(mut self, spacing: f32) -> Self {
        self.vertical_spacing = spacing;
        self
    }

    /// Set the multiplier applied to the spacing between roots
    pub fn with_root_spread(mut self, spread: f32) -> Self {
        self.root_spread = spread;
        self
    }

    /// Build a tree engine with the configured options
    pub fn build(self) -> TreeEngine {
        let mut engine = TreeEngine::new();
        engine
            .set_origin(self.origin)
            .set_horizontal_spacing(self.horizontal_spacing)
            .set_vertical_spacing(self.vertical_spacing)
            .set_root_spread(self.root_spread);
        engine
    }
}

/// Lays out `model` with the default engine and no pinned nodes.
pub fn layout(model: &GraphModel, config: &LayoutConfig) -> Positions {
    EngineBuilder::from_config(config)
        .build()
        .calculate(model, &HashSet::new())
}

#[cfg(test)]
mod tests {
    use jits_core::semantic::{Node, NodeType};

    use super::*;

    fn guard_tree() -> GraphModel {
        let mut model = GraphModel::new();
        model
            .add_node(Node::new(Id::new("guard"), "Closed Guard", NodeType::Variant))
            .unwrap();
        model
            .add_node(Node::new(Id::new("mount"), "Mount", NodeType::Variant))
            .unwrap();
        for (id, label) in [("hip-bump", "Hip Bump"), ("scissor-sweep", "Scissor Sweep")] {
            let node = Node::new(Id::new(id), label, NodeType::MyMove)
                .with_parent(Some(Id::new("guard")), 1);
            model.add_node(node).unwrap();
        }
        model
    }

    #[test]
    fn test_layout_uses_config_units() {
        let model = guard_tree();
        let positions = layout(&model, &LayoutConfig::default());

        assert_eq!(positions.len(), 4);
        assert_eq!(positions[&Id::new("guard")], Point::new(200.0, 80.0));
        assert_eq!(positions[&Id::new("mount")], Point::new(920.0, 80.0));
        assert_eq!(positions[&Id::new("hip-bump")], Point::new(110.0, 200.0));
        assert_eq!(positions[&Id::new("scissor-sweep")], Point::new(290.0, 200.0));
    }

    #[test]
    fn test_builder_overrides() {
        let model = guard_tree();
        let engine = EngineBuilder::new()
            .with_origin(Point::new(0.0, 10.0))
            .with_horizontal_spacing(100.0)
            .with_vertical_spacing(40.0)
            .with_root_spread(2.0)
            .build();
        let positions = engine.calculate(&model, &HashSet::new());

        assert_eq!(positions[&Id::new("guard")], Point::new(0.0, 10.0));
        assert_eq!(positions[&Id::new("mount")], Point::new(200.0, 10.0));
        assert_eq!(positions[&Id::new("hip-bump")], Point::new(-50.0, 50.0));
        assert_eq!(positions[&Id::new("scissor-sweep")], Point::new(50.0, 50.0));
    }

    #[test]
    fn test_default_builder_matches_default_config() {
        let model = guard_tree();
        let from_default = EngineBuilder::default()
            .build()
            .calculate(&model, &HashSet::new());
        assert_eq!(from_default, layout(&model, &LayoutConfig::default()));
    }
}
