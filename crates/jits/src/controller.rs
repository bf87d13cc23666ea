//! The session object.
//!
//! A [`GraphController`] owns everything one editing session needs: the graph, the
//! selection, the annotation-mode flag, the layout engine with its positioning
//! policy, and an optional [`StoreWriter`] every created record is mirrored to.
//!
//! Every operation completes its model mutation and layout pass before returning.

use std::{collections::HashSet, fmt};

use log::{debug, info, warn};

use jits_core::{
    geometry::Point,
    identifier::Id,
    media::MediaRef,
    semantic::{Edge, Node, NodeType},
};

use crate::{
    config::{LayoutConfig, PositioningPolicy},
    error::JitsError,
    graph::GraphModel,
    layout::{EngineBuilder, LayoutEngine},
    resolver::{self, Relation},
    store::{Record, StoreWriter},
};

/// One editing session over a technique tree.
///
/// # Lifecycle of the selection
///
/// The selection is set by [`select_node`](Self::select_node) and by a successful
/// [`add_node`](Self::add_node), which selects the node it created. It is never
/// cleared automatically, except when a snapshot no longer contains the node.
///
/// # Examples
///
/// ```
/// use jits::{GraphController, config::LayoutConfig, semantic::NodeType};
///
/// let mut controller = GraphController::new(&LayoutConfig::default());
/// let guard = controller.add_node(NodeType::Variant, "Closed Guard", None)?;
/// let sweep = controller.add_node(NodeType::MyMove, "Scissor Sweep", None)?;
///
/// let node = controller.model().node(sweep).unwrap();
/// assert_eq!(node.parent_id(), Some(guard));
/// assert_eq!(controller.selected(), Some(sweep));
/// # Ok::<(), jits::JitsError>(())
/// ```
pub struct GraphController {
    model: GraphModel,
    selected: Option<Id>,
    annotation_mode: bool,
    engine: Box<dyn LayoutEngine>,
    positioning: PositioningPolicy,
    pinned: HashSet<Id>,
    next_node: usize,
    next_edge: usize,
    store: Option<Box<dyn StoreWriter>>,
}

impl fmt::Debug for GraphController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphController")
            .field("nodes_count", &self.model.nodes_count())
            .field("edges_count", &self.model.edges_count())
            .field("selected", &self.selected)
            .field("annotation_mode", &self.annotation_mode)
            .field("positioning", &self.positioning)
            .field("pinned", &self.pinned)
            .finish_non_exhaustive()
    }
}

impl GraphController {
    /// Creates an empty session laid out with the default engine configured by `config`.
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            model: GraphModel::new(),
            selected: None,
            annotation_mode: false,
            engine: Box::new(EngineBuilder::from_config(config).build()),
            positioning: config.positioning(),
            pinned: HashSet::new(),
            next_node: 0,
            next_edge: 0,
            store: None,
        }
    }

    /// Replaces the layout engine.
    pub fn with_engine(mut self, engine: impl LayoutEngine + 'static) -> Self {
        self.engine = Box::new(engine);
        self
    }

    /// Mirrors every record created from now on to `store`.
    pub fn with_store(mut self, store: impl StoreWriter + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    pub fn model(&self) -> &GraphModel {
        &self.model
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.model.nodes()
    }

    pub fn edges(&self) -> &[Edge] {
        self.model.edges()
    }

    pub fn selected(&self) -> Option<Id> {
        self.selected
    }

    pub fn selected_node(&self) -> Option<&Node> {
        self.selected.and_then(|id| self.model.node(id))
    }

    pub fn annotation_mode(&self) -> bool {
        self.annotation_mode
    }

    pub fn set_annotation_mode(&mut self, enabled: bool) {
        debug!(enabled; "Annotation mode changed");
        self.annotation_mode = enabled;
    }

    pub fn positioning(&self) -> PositioningPolicy {
        self.positioning
    }

    /// Returns true if `id` keeps a manual position across layout passes.
    pub fn is_pinned(&self, id: Id) -> bool {
        self.pinned.contains(&id)
    }

    /// Makes `id` the anchor for the next [`add_node`](Self::add_node).
    ///
    /// Unknown ids are ignored and leave the selection unchanged.
    pub fn select_node(&mut self, id: Id) {
        if !self.model.contains_node(id) {
            debug!(id:%; "Ignoring selection of unknown node");
            return;
        }
        debug!(id:%; "Node selected");
        self.selected = Some(id);
    }

    /// Creates a node of `declared_type` relative to the current selection.
    ///
    /// The node's parent and depth come from [`resolver::resolve`]. A parent edge is
    /// created from the resolved parent, which for a sibling is the selected node's
    /// parent and never the selected node itself. The layout is then recomputed, the
    /// new node becomes the selection and annotation mode is cleared.
    ///
    /// # Errors
    ///
    /// - [`JitsError::SelectedNodeMissing`] on a stale selection. Nothing is changed.
    /// - [`JitsError::PersistenceFailed`] if the store rejects a record. The node
    ///   stays in the session.
    pub fn add_node(
        &mut self,
        declared_type: NodeType,
        label: impl Into<String>,
        media_ref: Option<MediaRef>,
    ) -> Result<Id, JitsError> {
        let resolution = resolver::resolve(&self.model, declared_type, self.selected)?;

        let id = self.mint_node_id();
        let node = Node::new(id, label, declared_type)
            .with_parent(resolution.parent_id(), resolution.depth())
            .with_media(media_ref);
        self.model.add_node(node)?;

        let edge = match resolution.parent_id() {
            Some(parent_id) => {
                let edge = Edge::new(self.mint_edge_id(), parent_id, id);
                self.model.add_edge(edge)?;
                Some(edge)
            }
            None => None,
        };

        self.relayout();
        self.selected = Some(id);
        self.annotation_mode = false;

        let relation = resolution.relation();
        info!(
            id:%,
            node_type:% = declared_type,
            depth = resolution.depth(),
            relation:?;
            "Node added"
        );
        if let Relation::Sibling { of } = relation {
            debug!(id:%, sibling_of:% = of; "Parent edge skips the selected node");
        }

        let mut records = Vec::with_capacity(2);
        if let Some(node) = self.model.node(id) {
            records.push(Record::Position(node.clone()));
        }
        records.extend(edge.map(Record::Edge));
        self.mirror(id, records)?;

        Ok(id)
    }

    /// Connects two existing nodes with an edge that carries no ancestry.
    ///
    /// Parent and depth of both nodes are untouched and the layout is not recomputed.
    ///
    /// # Errors
    ///
    /// - [`JitsError::DanglingEndpoint`] if either node does not exist.
    /// - [`JitsError::PersistenceFailed`] if the store rejects the edge. The edge
    ///   stays in the session.
    pub fn connect_manually(&mut self, source: Id, target: Id) -> Result<Id, JitsError> {
        let edge = Edge::new(self.mint_edge_id(), source, target);
        self.model.add_edge(edge)?;

        info!(edge:%; "Nodes connected manually");
        self.mirror(edge.id(), vec![Record::Edge(edge)])?;
        Ok(edge.id())
    }

    /// Replaces the whole graph with a snapshot from the store and lays it out.
    ///
    /// The selection is dropped if its node is gone; so are pins of vanished nodes.
    pub fn load_snapshot(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        self.model.replace_all(nodes, edges);

        if let Some(selected) = self.selected {
            if !self.model.contains_node(selected) {
                debug!(selected:%; "Selection vanished with snapshot");
                self.selected = None;
            }
        }
        let model = &self.model;
        self.pinned.retain(|id| model.contains_node(*id));

        self.relayout();
        info!(
            nodes_count = self.model.nodes_count(),
            edges_count = self.model.edges_count();
            "Snapshot loaded"
        );
    }

    /// Takes over positions the store reports for known nodes, without a layout pass.
    ///
    /// A stored position counts as a manual move: it lasts until the next layout pass,
    /// and under [`PositioningPolicy::PreserveManual`] the node is pinned. Nothing is
    /// written back to the store. Unknown ids are ignored.
    pub fn load_positions(&mut self, positions: impl IntoIterator<Item = (Id, Point)>) {
        let mut moved_count = 0;
        for (id, position) in positions {
            if !self.model.set_position(id, position) {
                debug!(id:%; "Ignoring stored position of unknown node");
                continue;
            }
            if self.positioning == PositioningPolicy::PreserveManual {
                self.pinned.insert(id);
            }
            moved_count += 1;
        }
        info!(moved_count; "Stored positions loaded");
    }

    /// Places a node by hand.
    ///
    /// Under [`PositioningPolicy::AutoLayout`] the position lasts until the next layout
    /// pass. Under [`PositioningPolicy::PreserveManual`] the node is pinned until
    /// [`reorganize`](Self::reorganize).
    ///
    /// Returns `Ok(false)` for unknown ids.
    ///
    /// # Errors
    ///
    /// Returns [`JitsError::PersistenceFailed`] if the store rejects the new position.
    pub fn move_node(&mut self, id: Id, position: Point) -> Result<bool, JitsError> {
        if !self.model.set_position(id, position) {
            debug!(id:%; "Ignoring move of unknown node");
            return Ok(false);
        }
        if self.positioning == PositioningPolicy::PreserveManual {
            self.pinned.insert(id);
        }
        debug!(id:%, x = position.x(), y = position.y(); "Node moved");

        if let (Some(store), Some(node)) = (self.store.as_mut(), self.model.node(id)) {
            store
                .update_record(Record::Position(node.clone()))
                .map_err(|source| {
                    warn!(id:%, err:% = source; "Failed to mirror move");
                    JitsError::PersistenceFailed { id, source }
                })?;
        }
        Ok(true)
    }

    /// Drops every manual position and lays the whole tree out again.
    pub fn reorganize(&mut self) {
        info!(pinned_count = self.pinned.len(); "Reorganizing");
        self.pinned.clear();
        self.relayout();
    }

    fn relayout(&mut self) {
        let positions = self.engine.calculate(&self.model, &self.pinned);
        self.model.apply_positions(positions);
    }

    fn mint_node_id(&mut self) -> Id {
        loop {
            let id = Id::with_prefix("node", self.next_node);
            self.next_node += 1;
            if !self.model.contains_node(id) {
                return id;
            }
        }
    }

    fn mint_edge_id(&mut self) -> Id {
        loop {
            let id = Id::with_prefix("edge", self.next_edge);
            self.next_edge += 1;
            if !self.model.contains_edge(id) {
                return id;
            }
        }
    }

    /// Writes `records` to the store, reporting the first failure against `owner`.
    ///
    /// Every record is attempted even after a failure.
    fn mirror(&mut self, owner: Id, records: Vec<Record>) -> Result<(), JitsError> {
        let Some(store) = self.store.as_mut() else {
            return Ok(());
        };

        let mut first_error = None;
        for record in records {
            let record_id = record.id();
            let collection = record.collection();
            match store.create_record(record) {
                Ok(stored_id) => {
                    debug!(record_id:%, stored_id:%, collection:%; "Record mirrored");
                }
                Err(err) => {
                    warn!(record_id:%, collection:%, err:%; "Failed to mirror record");
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(source) => Err(JitsError::PersistenceFailed { id: owner, source }),
            None => Ok(()),
        }
    }
}
