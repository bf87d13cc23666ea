//! Boundary with the external document store.
//!
//! The store is the system of record across sessions; a session only mirrors its
//! changes to it and reloads from it. Two logical collections are involved:
//! `positions` (node records) and `edges` (edge records).
//!
//! - Writing: a session hands every record it creates to a [`StoreWriter`].
//! - Observing: the store reports changes as [`StoreEvent`]s. A
//!   [`SnapshotMaterializer`] folds them into the full current record set, and a
//!   [`SnapshotFeed`] drains a channel of events into
//!   [`GraphController::load_snapshot`](crate::GraphController::load_snapshot),
//!   once per batch. Batches that only move nodes go to
//!   [`GraphController::load_positions`](crate::GraphController::load_positions)
//!   instead.
//!
//! [`MemoryStore`] is an in-memory store implementing both sides.

mod materialize;
mod memory;

pub use materialize::{SnapshotFeed, SnapshotMaterializer, SnapshotUpdate};
pub use memory::MemoryStore;

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

use jits_core::{
    identifier::Id,
    semantic::{Edge, Node},
};

/// A logical collection of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Node records.
    Positions,
    /// Edge records.
    Edges,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Collection::Positions => "positions",
            Collection::Edges => "edges",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A record as held by the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Position(Node),
    Edge(Edge),
}

impl Record {
    pub fn id(&self) -> Id {
        match self {
            Record::Position(node) => node.id(),
            Record::Edge(edge) => edge.id(),
        }
    }

    pub fn collection(&self) -> Collection {
        match self {
            Record::Position(_) => Collection::Positions,
            Record::Edge(_) => Collection::Edges,
        }
    }
}

/// Kind of change reported by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Added,
    Modified,
    Removed,
}

/// One change notification from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreEvent {
    change: Change,
    record: Record,
}

impl StoreEvent {
    pub fn new(change: Change, record: Record) -> Self {
        Self { change, record }
    }

    pub fn change(&self) -> Change {
        self.change
    }

    pub fn record(&self) -> &Record {
        &self.record
    }
}

/// Errors reported by a store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{collection} write rejected: {reason}")]
    Rejected {
        collection: Collection,
        reason: String,
    },

    #[error("no {collection} record with id {id}")]
    NotFound { collection: Collection, id: Id },
}

/// Write side of the store.
///
/// Calls are fire-and-forget from the session's point of view: a failure is reported
/// to the caller of the session operation but never undoes the local change.
pub trait StoreWriter {
    /// Creates a record, returning the id the store filed it under.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store rejects the write.
    fn create_record(&mut self, record: Record) -> Result<Id, StoreError>;

    /// Overwrites an existing record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the record does not exist or the store rejects the write.
    fn update_record(&mut self, record: Record) -> Result<(), StoreError>;
}

/// The full node and edge sets at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Snapshot {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}
