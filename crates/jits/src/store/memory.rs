//! An in-memory document store.

use std::{
    cell::RefCell,
    rc::Rc,
    sync::mpsc::{self, Receiver, Sender},
};

use indexmap::IndexMap;
use log::{debug, warn};

use jits_core::{
    identifier::Id,
    semantic::{Edge, Node},
};

use crate::store::{Change, Collection, Record, Snapshot, StoreError, StoreEvent, StoreWriter};

#[derive(Debug, Default)]
struct State {
    positions: IndexMap<Id, Node>,
    edges: IndexMap<Id, Edge>,
    subscribers: Vec<Sender<StoreEvent>>,
    rejecting: Option<String>,
}

impl State {
    fn broadcast(&mut self, event: &StoreEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    fn check_writable(&self, collection: Collection) -> Result<(), StoreError> {
        match &self.rejecting {
            Some(reason) => Err(StoreError::Rejected {
                collection,
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }

    fn contains(&self, record: &Record) -> bool {
        match record {
            Record::Position(node) => self.positions.contains_key(&node.id()),
            Record::Edge(edge) => self.edges.contains_key(&edge.id()),
        }
    }

    fn insert(&mut self, record: Record) {
        match record {
            Record::Position(node) => {
                self.positions.insert(node.id(), node);
            }
            Record::Edge(edge) => {
                self.edges.insert(edge.id(), edge);
            }
        }
    }
}

/// A store that keeps its records in memory.
///
/// `MemoryStore` is a shared handle: clones refer to the same records, so one clone can
/// be handed to a [`GraphController`](crate::GraphController) as its writer while
/// another is kept to observe or manipulate the store.
///
/// Subscribers receive every change as a [`StoreEvent`] over a channel. Records are
/// filed under the id they carry.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Rc<RefCell<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `snapshot`.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let store = Self::new();
        {
            let mut state = store.state.borrow_mut();
            for node in snapshot.nodes {
                state.insert(Record::Position(node));
            }
            for edge in snapshot.edges {
                state.insert(Record::Edge(edge));
            }
        }
        store
    }

    /// Registers a subscriber.
    ///
    /// The receiver first gets an [`Change::Added`] event for every existing record,
    /// then every subsequent change.
    pub fn subscribe(&self) -> Receiver<StoreEvent> {
        let (sender, receiver) = mpsc::channel();
        let mut state = self.state.borrow_mut();

        let existing = state
            .positions
            .values()
            .cloned()
            .map(Record::Position)
            .chain(state.edges.values().copied().map(Record::Edge));
        for record in existing {
            // The receiver is still in scope, so sending cannot fail.
            let _ = sender.send(StoreEvent::new(Change::Added, record));
        }

        state.subscribers.push(sender);
        receiver
    }

    /// Makes every subsequent write fail with `reason`, or accepts writes again on `None`.
    pub fn set_rejecting(&self, reason: Option<&str>) {
        self.state.borrow_mut().rejecting = reason.map(str::to_owned);
    }

    /// Removes a record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no such record exists.
    pub fn remove(&self, collection: Collection, id: Id) -> Result<Record, StoreError> {
        let mut state = self.state.borrow_mut();
        state.check_writable(collection)?;

        let removed = match collection {
            Collection::Positions => state.positions.shift_remove(&id).map(Record::Position),
            Collection::Edges => state.edges.shift_remove(&id).map(Record::Edge),
        };
        let Some(record) = removed else {
            return Err(StoreError::NotFound { collection, id });
        };

        debug!(collection:%, id:%; "Record removed");
        state.broadcast(&StoreEvent::new(Change::Removed, record.clone()));
        Ok(record)
    }

    /// Returns the node records in creation order.
    pub fn nodes(&self) -> Vec<Node> {
        self.state.borrow().positions.values().cloned().collect()
    }

    /// Returns the edge records in creation order.
    pub fn edges(&self) -> Vec<Edge> {
        self.state.borrow().edges.values().copied().collect()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.nodes(), self.edges())
    }
}

impl StoreWriter for MemoryStore {
    fn create_record(&mut self, record: Record) -> Result<Id, StoreError> {
        let mut state = self.state.borrow_mut();
        let collection = record.collection();
        state.check_writable(collection).inspect_err(|err| {
            warn!(collection:%, err:%; "Rejecting record");
        })?;

        let id = record.id();
        if state.contains(&record) {
            warn!(collection:%, id:%; "Record already exists, overwriting");
        }
        state.insert(record.clone());

        debug!(collection:%, id:%; "Record created");
        state.broadcast(&StoreEvent::new(Change::Added, record));
        Ok(id)
    }

    fn update_record(&mut self, record: Record) -> Result<(), StoreError> {
        let mut state = self.state.borrow_mut();
        let collection = record.collection();
        state.check_writable(collection)?;

        let id = record.id();
        if !state.contains(&record) {
            return Err(StoreError::NotFound { collection, id });
        }
        state.insert(record.clone());

        debug!(collection:%, id:%; "Record updated");
        state.broadcast(&StoreEvent::new(Change::Modified, record));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use jits_core::semantic::NodeType;

    use super::*;

    fn node(id: &str) -> Node {
        Node::new(Id::new(id), id, NodeType::Variant)
    }

    #[test]
    fn test_create_record_returns_record_id() {
        let mut store = MemoryStore::new();
        let id = store.create_record(Record::Position(node("guard"))).unwrap();
        assert_eq!(id, "guard");
        assert_eq!(store.nodes(), vec![node("guard")]);
    }

    #[test]
    fn test_clones_share_records() {
        let store = MemoryStore::new();
        let mut writer = store.clone();
        writer.create_record(Record::Position(node("guard"))).unwrap();
        assert_eq!(store.nodes().len(), 1);
    }

    #[test]
    fn test_subscriber_gets_existing_then_new_records() {
        let mut store = MemoryStore::from_snapshot(Snapshot::new(vec![node("guard")], vec![]));
        let events = store.subscribe();

        store.create_record(Record::Position(node("mount"))).unwrap();
        store
            .create_record(Record::Edge(Edge::new(
                Id::new("e"),
                Id::new("guard"),
                Id::new("mount"),
            )))
            .unwrap();

        let received: Vec<_> = events.try_iter().collect();
        assert_eq!(received.len(), 3);
        assert!(received.iter().all(|event| event.change() == Change::Added));
        assert_eq!(received[0].record().id(), "guard");
        assert_eq!(received[2].record().collection(), Collection::Edges);
    }

    #[test]
    fn test_rejecting_store() {
        let mut store = MemoryStore::new();
        store.set_rejecting(Some("offline"));

        let err = store.create_record(Record::Position(node("guard"))).unwrap_err();
        assert_eq!(
            err,
            StoreError::Rejected {
                collection: Collection::Positions,
                reason: "offline".to_string()
            }
        );
        assert!(store.nodes().is_empty());

        store.set_rejecting(None);
        assert!(store.create_record(Record::Position(node("guard"))).is_ok());
    }

    #[test]
    fn test_update_and_remove() {
        let mut store = MemoryStore::new();
        let events = store.subscribe();

        assert!(matches!(
            store.update_record(Record::Position(node("guard"))),
            Err(StoreError::NotFound { .. })
        ));

        store.create_record(Record::Position(node("guard"))).unwrap();
        let renamed = Node::new(Id::new("guard"), "Full Guard", NodeType::Variant);
        store.update_record(Record::Position(renamed.clone())).unwrap();
        assert_eq!(store.nodes(), vec![renamed]);

        store.remove(Collection::Positions, Id::new("guard")).unwrap();
        assert!(store.nodes().is_empty());
        assert!(store.remove(Collection::Positions, Id::new("guard")).is_err());

        let changes: Vec<_> = events.try_iter().map(|event| event.change()).collect();
        assert_eq!(changes, vec![Change::Added, Change::Modified, Change::Removed]);
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let mut store = MemoryStore::new();
        drop(store.subscribe());
        store.create_record(Record::Position(node("guard"))).unwrap();
        assert!(store.state.borrow().subscribers.is_empty());
    }
}
