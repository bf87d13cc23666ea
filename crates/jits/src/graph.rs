//! In-memory graph model of a technique tree.
//!
//! [`GraphModel`] owns every [`Node`] and [`Edge`] of one session and is the only place
//! they are mutated. It provides:
//! - Lookup by id and insertion-ordered iteration over nodes
//! - Edge storage with incoming and outgoing indices per node
//! - Ancestry queries (`children`, `parent_edge`, `roots`, `max_depth`)
//! - Mutation primitives that keep the ancestry invariants
//!
//! # Invariants
//!
//! For nodes added through [`GraphModel::add_node`]:
//! - a parent reference always resolves to a node already in the model,
//! - `depth` is 0 for roots and `depth(parent) + 1` otherwise.
//!
//! Edges added through [`GraphModel::add_edge`] never dangle. Snapshots loaded
//! through [`GraphModel::replace_all`] come from the system of record and are taken
//! as they are, except for `depth`, which is derived again from the parent chain.

use std::collections::{HashMap, VecDeque};

use indexmap::IndexMap;
use log::{debug, trace};

use jits_core::{
    geometry::Point,
    identifier::Id,
    semantic::{Edge, Node},
};

use crate::error::JitsError;

/// Index of an edge in the model's edge storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeIndex(usize);

/// The node and edge sets of one session.
#[derive(Debug, Default, Clone)]
pub struct GraphModel {
    nodes: IndexMap<Id, Node>,
    edges: Vec<Edge>,
    incoming_edges: HashMap<Id, Vec<EdgeIndex>>,
    outgoing_edges: HashMap<Id, Vec<EdgeIndex>>,
}

impl GraphModel {
    /// Creates a new empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the node with the given id, if it exists.
    pub fn node(&self, id: Id) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Checks if a node with the given id exists.
    pub fn contains_node(&self, id: Id) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Checks if an edge with the given id exists.
    pub fn contains_edge(&self, id: Id) -> bool {
        self.edges.iter().any(|edge| edge.id() == id)
    }

    /// Returns an iterator over all nodes, in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Returns all edges, in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn nodes_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edges_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns an iterator over root nodes (nodes without a parent).
    pub fn roots(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(|node| node.is_root())
    }

    /// Returns the nodes whose parent is `parent_id`, in insertion order.
    pub fn children(&self, parent_id: Id) -> impl Iterator<Item = &Node> {
        self.nodes
            .values()
            .filter(move |node| node.parent_id() == Some(parent_id))
    }

    /// Returns the deepest depth in the model, or `None` if it is empty.
    pub fn max_depth(&self) -> Option<usize> {
        self.nodes.values().map(Node::depth).max()
    }

    /// Returns the edges pointing at `target_id`.
    pub fn incoming_edges(&self, target_id: Id) -> impl Iterator<Item = &Edge> {
        self.indexed_edges(self.incoming_edges.get(&target_id))
    }

    /// Returns the edges leaving `source_id`.
    pub fn outgoing_edges(&self, source_id: Id) -> impl Iterator<Item = &Edge> {
        self.indexed_edges(self.outgoing_edges.get(&source_id))
    }

    /// Returns the edge that links a node to its parent, if the node has a parent
    /// and such an edge exists.
    pub fn parent_edge(&self, id: Id) -> Option<&Edge> {
        let parent_id = self.node(id)?.parent_id()?;
        self.incoming_edges(id)
            .find(|edge| edge.source() == parent_id)
    }

    /// Adds a node.
    ///
    /// If a node with the same id already exists, it is replaced in place.
    ///
    /// # Errors
    ///
    /// - [`JitsError::InvalidParent`] if the node names a parent that is not in the model.
    /// - [`JitsError::InconsistentDepth`] if the node's depth does not follow from its
    ///   parent's depth.
    pub fn add_node(&mut self, node: Node) -> Result<(), JitsError> {
        let expected = match node.parent_id() {
            None => 0,
            Some(parent_id) => {
                let parent = self.node(parent_id).ok_or(JitsError::InvalidParent {
                    node: node.id(),
                    parent: parent_id,
                })?;
                parent.depth() + 1
            }
        };
        if node.depth() != expected {
            return Err(JitsError::InconsistentDepth {
                node: node.id(),
                depth: node.depth(),
                expected,
            });
        }

        trace!(node:% = node; "Adding node");
        self.nodes.insert(node.id(), node);
        Ok(())
    }

    /// Adds a directed edge.
    ///
    /// # Errors
    ///
    /// Returns [`JitsError::DanglingEndpoint`] if either endpoint is not in the model.
    pub fn add_edge(&mut self, edge: Edge) -> Result<EdgeIndex, JitsError> {
        if !self.contains_node(edge.source()) || !self.contains_node(edge.target()) {
            return Err(JitsError::DanglingEndpoint {
                source_id: edge.source(),
                target: edge.target(),
            });
        }

        trace!(edge:% = edge; "Adding edge");
        Ok(self.push_edge(edge))
    }

    /// Replaces the whole node and edge sets.
    ///
    /// Node order follows the order of `nodes`. Edges are indexed as given, including
    /// edges whose endpoints are missing from the snapshot.
    ///
    /// Stored depths are not trusted: roots get 0 and every node whose parent is in
    /// the snapshot gets its parent's depth plus one. Orphans, and nodes caught in a
    /// parent cycle, keep their stored depth.
    pub fn replace_all(
        &mut self,
        nodes: impl IntoIterator<Item = Node>,
        edges: impl IntoIterator<Item = Edge>,
    ) {
        self.nodes = nodes.into_iter().map(|node| (node.id(), node)).collect();
        self.derive_depths();
        self.edges.clear();
        self.incoming_edges.clear();
        self.outgoing_edges.clear();
        for edge in edges {
            self.push_edge(edge);
        }

        debug!(
            nodes_count = self.nodes.len(),
            edges_count = self.edges.len();
            "Graph replaced"
        );
    }

    /// Moves a node. Returns false if the node does not exist.
    pub fn set_position(&mut self, id: Id, position: Point) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.set_position(position);
                true
            }
            None => false,
        }
    }

    /// Applies a batch of positions, ignoring ids that are not in the model.
    pub fn apply_positions(&mut self, positions: impl IntoIterator<Item = (Id, Point)>) {
        for (id, position) in positions {
            self.set_position(id, position);
        }
    }

    fn derive_depths(&mut self) {
        let mut children: HashMap<Id, Vec<Id>> = HashMap::new();
        let mut queue = VecDeque::new();
        for node in self.nodes.values() {
            match node.parent_id() {
                None => queue.push_back((node.id(), 0)),
                Some(parent_id) if self.nodes.contains_key(&parent_id) => {
                    children.entry(parent_id).or_default().push(node.id());
                }
                Some(_) => queue.push_back((node.id(), node.depth())),
            }
        }

        while let Some((id, depth)) = queue.pop_front() {
            if let Some(node) = self.nodes.get_mut(&id) {
                if node.depth() != depth {
                    debug!(id:%, stored = node.depth(), derived = depth; "Correcting snapshot depth");
                    node.set_depth(depth);
                }
            }
            for &child in children.get(&id).into_iter().flatten() {
                queue.push_back((child, depth + 1));
            }
        }
    }

    fn push_edge(&mut self, edge: Edge) -> EdgeIndex {
        self.edges.push(edge);

        let idx = EdgeIndex(self.edges.len() - 1);
        self.outgoing_edges
            .entry(edge.source())
            .or_default()
            .push(idx);
        self.incoming_edges
            .entry(edge.target())
            .or_default()
            .push(idx);
        idx
    }

    fn indexed_edges<'a>(
        &'a self,
        indices: Option<&'a Vec<EdgeIndex>>,
    ) -> impl Iterator<Item = &'a Edge> {
        indices
            .into_iter()
            .flatten()
            .map(|idx| &self.edges[idx.0])
    }
}

#[cfg(test)]
mod tests {
    use jits_core::semantic::NodeType;

    use super::*;

    fn root(name: &str) -> Node {
        Node::new(Id::new(name), name, NodeType::Variant)
    }

    fn child(name: &str, parent: &Node, node_type: NodeType) -> Node {
        Node::new(Id::new(name), name, node_type)
            .with_parent(Some(parent.id()), parent.depth() + 1)
    }

    fn edge(name: &str, source: &Node, target: &Node) -> Edge {
        Edge::new(Id::new(name), source.id(), target.id())
    }

    #[test]
    fn test_graph_new() {
        let graph = GraphModel::new();

        assert!(graph.is_empty());
        assert_eq!(graph.nodes_count(), 0);
        assert_eq!(graph.edges_count(), 0);
        assert_eq!(graph.roots().count(), 0);
        assert_eq!(graph.max_depth(), None);
    }

    #[test]
    fn test_add_nodes_keeps_insertion_order() {
        let mut graph = GraphModel::new();
        let guard = root("guard");
        let mount = root("mount");
        let sweep = child("sweep", &guard, NodeType::MyMove);

        graph.add_node(mount.clone()).unwrap();
        graph.add_node(guard.clone()).unwrap();
        graph.add_node(sweep.clone()).unwrap();

        let ids: Vec<Id> = graph.nodes().map(Node::id).collect();
        assert_eq!(ids, vec![mount.id(), guard.id(), sweep.id()]);
        assert_eq!(graph.node(sweep.id()), Some(&sweep));
        assert_eq!(graph.max_depth(), Some(1));
    }

    #[test]
    fn test_add_node_rejects_missing_parent() {
        let mut graph = GraphModel::new();
        let ghost = root("ghost");
        let orphan = child("orphan", &ghost, NodeType::Outcome);

        let err = graph.add_node(orphan).unwrap_err();
        assert!(matches!(
            err,
            JitsError::InvalidParent { parent, .. } if parent == ghost.id()
        ));
        assert!(graph.is_empty());
    }

    #[test]
    fn test_add_node_rejects_wrong_depth() {
        let mut graph = GraphModel::new();
        let guard = root("guard");
        graph.add_node(guard.clone()).unwrap();

        let too_deep = Node::new(Id::new("deep"), "Deep", NodeType::MyMove)
            .with_parent(Some(guard.id()), 3);
        let err = graph.add_node(too_deep).unwrap_err();
        assert!(matches!(
            err,
            JitsError::InconsistentDepth {
                depth: 3,
                expected: 1,
                ..
            }
        ));

        let floating_root = root("floating").with_parent(None, 2);
        assert!(graph.add_node(floating_root).is_err());
    }

    #[test]
    fn test_add_edge_and_parent_edge() {
        let mut graph = GraphModel::new();
        let guard = root("guard");
        let sweep = child("sweep", &guard, NodeType::MyMove);
        graph.add_node(guard.clone()).unwrap();
        graph.add_node(sweep.clone()).unwrap();

        graph.add_edge(edge("e1", &guard, &sweep)).unwrap();

        assert_eq!(graph.edges_count(), 1);
        assert_eq!(graph.outgoing_edges(guard.id()).count(), 1);
        assert_eq!(graph.incoming_edges(sweep.id()).count(), 1);
        assert_eq!(graph.parent_edge(sweep.id()).map(Edge::id), Some(Id::new("e1")));
        assert!(graph.parent_edge(guard.id()).is_none());
        assert!(graph.contains_edge(Id::new("e1")));
    }

    #[test]
    fn test_add_edge_rejects_dangling_endpoint() {
        let mut graph = GraphModel::new();
        let guard = root("guard");
        let ghost = root("ghost");
        graph.add_node(guard.clone()).unwrap();

        let err = graph.add_edge(edge("e1", &guard, &ghost)).unwrap_err();
        assert!(matches!(err, JitsError::DanglingEndpoint { .. }));
        let err = graph.add_edge(edge("e2", &ghost, &guard)).unwrap_err();
        assert!(matches!(err, JitsError::DanglingEndpoint { .. }));
        assert_eq!(graph.edges_count(), 0);
    }

    #[test]
    fn test_manual_edge_is_not_a_parent_edge() {
        let mut graph = GraphModel::new();
        let guard = root("guard");
        let sweep = child("sweep", &guard, NodeType::MyMove);
        let mount = root("mount");
        for node in [&guard, &sweep, &mount] {
            graph.add_node(node.clone()).unwrap();
        }

        graph.add_edge(edge("free", &mount, &sweep)).unwrap();

        assert_eq!(graph.incoming_edges(sweep.id()).count(), 1);
        assert!(graph.parent_edge(sweep.id()).is_none());
        assert_eq!(graph.node(sweep.id()).unwrap().parent_id(), Some(guard.id()));
    }

    #[test]
    fn test_children_and_roots() {
        let mut graph = GraphModel::new();
        let guard = root("guard");
        let sweep = child("sweep", &guard, NodeType::MyMove);
        let armbar = child("armbar", &guard, NodeType::MyMove);
        let mount = child("mount", &sweep, NodeType::Outcome);
        for node in [&guard, &sweep, &armbar, &mount] {
            graph.add_node(node.clone()).unwrap();
        }

        let children: Vec<Id> = graph.children(guard.id()).map(Node::id).collect();
        assert_eq!(children, vec![sweep.id(), armbar.id()]);
        assert_eq!(graph.roots().count(), 1);
        assert_eq!(graph.children(mount.id()).count(), 0);
        assert_eq!(graph.max_depth(), Some(2));
    }

    #[test]
    fn test_replace_all() {
        let mut graph = GraphModel::new();
        graph.add_node(root("old")).unwrap();

        let guard = root("guard");
        let sweep = child("sweep", &guard, NodeType::MyMove);
        let ghost = root("ghost");
        graph.replace_all(
            vec![sweep.clone(), guard.clone()],
            vec![edge("e1", &guard, &sweep), edge("e2", &ghost, &sweep)],
        );

        assert!(!graph.contains_node(Id::new("old")));
        let ids: Vec<Id> = graph.nodes().map(Node::id).collect();
        assert_eq!(ids, vec![sweep.id(), guard.id()]);
        assert_eq!(graph.edges_count(), 2);
        assert_eq!(graph.incoming_edges(sweep.id()).count(), 2);
        assert_eq!(graph.parent_edge(sweep.id()).map(Edge::id), Some(Id::new("e1")));
    }

    #[test]
    fn test_replace_all_derives_depth_from_parents() {
        let mut graph = GraphModel::new();
        let guard = root("guard");
        // Children listed before their parents, with missing or wrong depths.
        let armbar = Node::new(Id::new("armbar"), "armbar", NodeType::Outcome)
            .with_parent(Some(Id::new("sweep")), 7);
        let sweep = Node::new(Id::new("sweep"), "sweep", NodeType::MyMove)
            .with_parent(Some(guard.id()), 0);
        let orphan = Node::new(Id::new("orphan"), "orphan", NodeType::MyMove)
            .with_parent(Some(Id::new("gone")), 3);
        let orphan_child = Node::new(Id::new("orphan-child"), "finish", NodeType::Outcome)
            .with_parent(Some(Id::new("orphan")), 0);
        let looped = Node::new(Id::new("looped"), "looped", NodeType::MyMove)
            .with_parent(Some(Id::new("looped")), 5);

        graph.replace_all(
            vec![armbar, sweep, guard, orphan, orphan_child, looped],
            Vec::new(),
        );

        let depth = |name: &str| graph.node(Id::new(name)).unwrap().depth();
        assert_eq!(depth("guard"), 0);
        assert_eq!(depth("sweep"), 1);
        assert_eq!(depth("armbar"), 2);
        assert_eq!(depth("orphan"), 3);
        assert_eq!(depth("orphan-child"), 4);
        assert_eq!(depth("looped"), 5);
    }

    #[test]
    fn test_set_and_apply_positions() {
        let mut graph = GraphModel::new();
        let guard = root("guard");
        graph.add_node(guard.clone()).unwrap();

        assert!(graph.set_position(guard.id(), Point::new(1.0, 2.0)));
        assert!(!graph.set_position(Id::new("ghost"), Point::new(1.0, 2.0)));
        assert_eq!(graph.node(guard.id()).unwrap().position(), Point::new(1.0, 2.0));

        graph.apply_positions([
            (guard.id(), Point::new(5.0, 6.0)),
            (Id::new("ghost"), Point::new(0.0, 0.0)),
        ]);
        assert_eq!(graph.node(guard.id()).unwrap().position(), Point::new(5.0, 6.0));
    }
}
