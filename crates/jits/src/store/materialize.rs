//! Folding store events into snapshots.

use std::sync::mpsc::Receiver;

use indexmap::{IndexMap, IndexSet};
use log::{debug, trace};

use jits_core::{
    geometry::Point,
    identifier::Id,
    semantic::{Edge, Node},
};

use crate::{
    controller::GraphController,
    store::{Change, Record, Snapshot, StoreEvent},
};

/// What a session has to do to catch up with the store.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotUpdate {
    /// Membership, ancestry or content changed: the graph must be reloaded.
    Reload(Snapshot),
    /// Only positions of known nodes changed, in the order they were moved.
    Moves(Vec<(Id, Point)>),
}

/// Keeps the current record set of the store, built from its change events.
///
/// Records keep the order in which they were first added; a modification updates a
/// record in place.
#[derive(Debug, Default)]
pub struct SnapshotMaterializer {
    nodes: IndexMap<Id, Node>,
    edges: IndexMap<Id, Edge>,
    dirty: bool,
    /// Set by any event other than a position-only modification.
    structural: bool,
    moved: IndexSet<Id>,
}

impl SnapshotMaterializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one event.
    pub fn apply(&mut self, event: StoreEvent) {
        trace!(event:?; "Applying store event");
        let StoreEvent { change, record } = event;
        match (change, record) {
            (Change::Modified, Record::Position(node)) => {
                let position_only = self
                    .nodes
                    .get(&node.id())
                    .is_some_and(|known| moves_only(known, &node));
                if position_only {
                    self.moved.insert(node.id());
                } else {
                    self.structural = true;
                }
                self.nodes.insert(node.id(), node);
            }
            (Change::Added, Record::Position(node)) => {
                self.structural = true;
                self.nodes.insert(node.id(), node);
            }
            (Change::Added | Change::Modified, Record::Edge(edge)) => {
                self.structural = true;
                self.edges.insert(edge.id(), edge);
            }
            (Change::Removed, Record::Position(node)) => {
                self.structural = true;
                self.nodes.shift_remove(&node.id());
            }
            (Change::Removed, Record::Edge(edge)) => {
                self.structural = true;
                self.edges.shift_remove(&edge.id());
            }
        }
        self.dirty = true;
    }

    /// Returns true if events were applied since the last snapshot was taken.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns the current record set if it changed since the last call.
    pub fn take_snapshot(&mut self) -> Option<Snapshot> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        self.structural = false;
        self.moved.clear();
        Some(Snapshot::new(
            self.nodes.values().cloned().collect(),
            self.edges.values().copied().collect(),
        ))
    }

    /// Returns the cheapest update that brings a session up to date, if anything
    /// changed since the last call.
    ///
    /// A batch made only of position modifications of known nodes yields
    /// [`SnapshotUpdate::Moves`]; anything else yields a full snapshot.
    pub fn take_update(&mut self) -> Option<SnapshotUpdate> {
        if !self.dirty {
            return None;
        }
        if self.structural {
            return self.take_snapshot().map(SnapshotUpdate::Reload);
        }

        self.dirty = false;
        let nodes = &self.nodes;
        let moves = self
            .moved
            .drain(..)
            .filter_map(|id| Some((id, nodes.get(&id)?.position())))
            .collect();
        Some(SnapshotUpdate::Moves(moves))
    }
}

/// True if `updated` differs from `known` in nothing but its position.
///
/// Depth is derived again on every load, so only the parent reference counts.
fn moves_only(known: &Node, updated: &Node) -> bool {
    known.parent_id() == updated.parent_id()
        && known
            .clone()
            .with_parent(updated.parent_id(), updated.depth())
            .with_position(updated.position())
            == *updated
}

/// Drains store events from a channel into a session.
///
/// All events pending at the time of a [`pump`](SnapshotFeed::pump) are applied
/// before the session is reloaded, so a burst of changes costs one reload and one
/// layout pass. A batch that only moves nodes is handed over as positions and
/// triggers no layout pass at all.
pub struct SnapshotFeed {
    events: Receiver<StoreEvent>,
    materializer: SnapshotMaterializer,
}

impl SnapshotFeed {
    pub fn new(events: Receiver<StoreEvent>) -> Self {
        Self {
            events,
            materializer: SnapshotMaterializer::new(),
        }
    }

    /// Applies every pending event and brings `controller` up to date if anything
    /// changed.
    ///
    /// Returns the number of events applied.
    pub fn pump(&mut self, controller: &mut GraphController) -> usize {
        let mut applied = 0;
        for event in self.events.try_iter() {
            self.materializer.apply(event);
            applied += 1;
        }

        match self.materializer.take_update() {
            Some(SnapshotUpdate::Reload(snapshot)) => {
                debug!(
                    events = applied,
                    nodes_count = snapshot.nodes.len(),
                    edges_count = snapshot.edges.len();
                    "Loading store snapshot"
                );
                controller.load_snapshot(snapshot.nodes, snapshot.edges);
            }
            Some(SnapshotUpdate::Moves(moves)) => {
                debug!(events = applied, moved_count = moves.len(); "Loading store moves");
                controller.load_positions(moves);
            }
            None => {}
        }
        applied
    }
}
