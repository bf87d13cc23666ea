//! Level-by-level tree layout engine.
//!
//! Roots are spread along a top row. Every other level is placed one sibling group
//! at a time: the children of a parent are spaced `horizontal_spacing` apart and
//! centered under the parent's `x`. Level `d` always sits on the row
//! `origin.y + d * vertical_spacing`, even below an orphan or a pinned parent.
//!
//! Levels are processed in order `0..=max_depth`, so parents are always placed
//! before their children. Groups and the nodes inside a group keep the model's
//! insertion order.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, trace};

use jits_core::{geometry::Point, identifier::Id, semantic::Node};

use crate::{
    graph::GraphModel,
    layout::{LayoutEngine, Positions},
};

/// The tree layout engine
pub struct TreeEngine {
    /// Position of the first root
    origin: Point,

    /// Horizontal distance between siblings
    horizontal_spacing: f32,

    /// Vertical distance between levels
    vertical_spacing: f32,

    /// Multiplier on the horizontal spacing between roots, leaving room for the
    /// subtrees that grow under them
    root_spread: f32,
}

impl TreeEngine {
    /// Create a new tree layout engine
    pub fn new() -> Self {
        Self {
            origin: Point::new(200.0, 80.0),
            horizontal_spacing: 180.0,
            vertical_spacing: 120.0,
            root_spread: 4.0,
        }
    }

    pub fn set_origin(&mut self, origin: Point) -> &mut Self {
        self.origin = origin;
        self
    }

    pub fn set_horizontal_spacing(&mut self, spacing: f32) -> &mut Self {
        self.horizontal_spacing = spacing;
        self
    }

    pub fn set_vertical_spacing(&mut self, spacing: f32) -> &mut Self {
        self.vertical_spacing = spacing;
        self
    }

    pub fn set_root_spread(&mut self, spread: f32) -> &mut Self {
        self.root_spread = spread;
        self
    }

    fn place_roots(&self, roots: &[&Node], pinned: &HashSet<Id>, positions: &mut Positions) {
        let step = self.horizontal_spacing * self.root_spread;
        for (slot, node) in roots.iter().enumerate() {
            let position = if pinned.contains(&node.id()) {
                node.position()
            } else {
                self.origin.with_x(self.origin.x() + slot as f32 * step)
            };
            positions.insert(node.id(), position);
        }
    }

    fn place_level(
        &self,
        depth: usize,
        level: &[&Node],
        pinned: &HashSet<Id>,
        positions: &mut Positions,
    ) {
        let row = self.origin.y() + depth as f32 * self.vertical_spacing;
        let mut groups: IndexMap<Option<Id>, Vec<&Node>> = IndexMap::new();
        for &node in level {
            groups.entry(node.parent_id()).or_default().push(node);
        }

        for (parent_id, members) in groups {
            let Some(parent_position) = parent_id.and_then(|id| positions.get(&id).copied())
            else {
                // Orphans stay where they are.
                for node in members {
                    debug!(node:% = node.id(); "Parent not placed, keeping previous position");
                    positions.insert(node.id(), node.position());
                }
                continue;
            };

            let span = (members.len() - 1) as f32 * self.horizontal_spacing;
            let start = Point::new(parent_position.x() - span / 2.0, row);
            for (slot, node) in members.into_iter().enumerate() {
                let position = if pinned.contains(&node.id()) {
                    node.position()
                } else {
                    start.with_x(start.x() + slot as f32 * self.horizontal_spacing)
                };
                positions.insert(node.id(), position);
            }
        }
    }
}

impl Default for TreeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutEngine for TreeEngine {
    fn calculate(&self, model: &GraphModel, pinned: &HashSet<Id>) -> Positions {
        let mut positions = Positions::with_capacity(model.nodes_count());
        let Some(max_depth) = model.max_depth() else {
            return positions;
        };

        for depth in 0..=max_depth {
            let level: Vec<&Node> = model.nodes().filter(|node| node.depth() == depth).collect();
            if depth == 0 {
                self.place_roots(&level, pinned, &mut positions);
            } else {
                self.place_level(depth, &level, pinned, &mut positions);
            }
        }

        // Report positions in node order rather than level order.
        let positions: Positions = model
            .nodes()
            .filter_map(|node| Some((node.id(), *positions.get(&node.id())?)))
            .collect();

        debug!(nodes_count = positions.len(), max_depth; "Tree layout calculated");
        trace!(positions:?; "Tree positions");
        positions
    }
}
