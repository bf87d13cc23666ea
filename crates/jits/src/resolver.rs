//! Relationship inference for new nodes.
//!
//! Decides where a node about to be created hangs in the tree, from its declared
//! type and the currently selected node:
//!
//! - nothing selected, or a [`NodeType::Variant`] → a new root;
//! - same type as the selection → a sibling of the selection (same parent, same depth);
//! - different type → a child of the selection.
//!
//! A move of the same kind as the focused one is an alternative to it; a move of a
//! different kind is a consequence of it. The rule is stateless and the resolver
//! never mutates the model.

use log::debug;

use jits_core::{identifier::Id, semantic::NodeType};

use crate::{error::JitsError, graph::GraphModel};

/// Which inference rule placed the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Root,
    /// Alternative to the given node.
    Sibling { of: Id },
    /// Consequence of the given node.
    Child { of: Id },
}

/// Ancestry computed for a node that does not exist yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    parent_id: Option<Id>,
    depth: usize,
    relation: Relation,
}

impl Resolution {
    fn root() -> Self {
        Self {
            parent_id: None,
            depth: 0,
            relation: Relation::Root,
        }
    }

    pub fn parent_id(&self) -> Option<Id> {
        self.parent_id
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn relation(&self) -> Relation {
        self.relation
    }
}

/// Computes the parent and depth of a node of type `declared_type` about to be
/// added while `selected` is the selection.
///
/// # Errors
///
/// Returns [`JitsError::SelectedNodeMissing`] if `selected` names a node that is not
/// in the model. A stale selection is reported even for root types, so callers learn
/// about it early.
pub fn resolve(
    model: &GraphModel,
    declared_type: NodeType,
    selected: Option<Id>,
) -> Result<Resolution, JitsError> {
    let Some(selected_id) = selected else {
        return Ok(Resolution::root());
    };
    let selected_node = model
        .node(selected_id)
        .ok_or(JitsError::SelectedNodeMissing(selected_id))?;

    let resolution = if declared_type.is_root_type() {
        Resolution::root()
    } else if selected_node.node_type() == declared_type {
        Resolution {
            parent_id: selected_node.parent_id(),
            depth: selected_node.depth(),
            relation: Relation::Sibling { of: selected_id },
        }
    } else {
        Resolution {
            parent_id: Some(selected_id),
            depth: selected_node.depth() + 1,
            relation: Relation::Child { of: selected_id },
        }
    };

    debug!(
        declared_type:% = declared_type,
        selected:% = selected_id,
        relation:? = resolution.relation;
        "Resolved relationship"
    );
    Ok(resolution)
}

#[cfg(test)]
mod tests {
    use jits_core::semantic::Node;

    use super::*;

    /// guard (variant, root) → sweep (myMove, depth 1)
    fn guard_with_sweep() -> (GraphModel, Id, Id) {
        let mut model = GraphModel::new();
        let guard = Node::new(Id::new("guard"), "Closed Guard", NodeType::Variant);
        let sweep = Node::new(Id::new("sweep"), "Hip Bump", NodeType::MyMove)
            .with_parent(Some(guard.id()), 1);
        let (guard_id, sweep_id) = (guard.id(), sweep.id());
        model.add_node(guard).unwrap();
        model.add_node(sweep).unwrap();
        (model, guard_id, sweep_id)
    }

    #[test]
    fn test_no_selection_makes_root() {
        let (model, _, _) = guard_with_sweep();

        for node_type in NodeType::ALL {
            let resolution = resolve(&model, node_type, None).unwrap();
            assert_eq!(resolution.parent_id(), None);
            assert_eq!(resolution.depth(), 0);
            assert_eq!(resolution.relation(), Relation::Root);
        }
    }

    #[test]
    fn test_variant_is_always_root() {
        let (model, _, sweep) = guard_with_sweep();

        let resolution = resolve(&model, NodeType::Variant, Some(sweep)).unwrap();
        assert_eq!(resolution.parent_id(), None);
        assert_eq!(resolution.depth(), 0);
    }

    #[test]
    fn test_same_type_makes_sibling() {
        let (model, guard, sweep) = guard_with_sweep();

        let resolution = resolve(&model, NodeType::MyMove, Some(sweep)).unwrap();
        assert_eq!(resolution.parent_id(), Some(guard));
        assert_eq!(resolution.depth(), 1);
        assert_eq!(resolution.relation(), Relation::Sibling { of: sweep });
    }

    #[test]
    fn test_different_type_makes_child() {
        let (model, _, sweep) = guard_with_sweep();

        for node_type in [NodeType::OpponentMove, NodeType::Outcome] {
            let resolution = resolve(&model, node_type, Some(sweep)).unwrap();
            assert_eq!(resolution.parent_id(), Some(sweep));
            assert_eq!(resolution.depth(), 2);
            assert_eq!(resolution.relation(), Relation::Child { of: sweep });
        }
    }

    #[test]
    fn test_sibling_of_root_is_root() {
        let mut model = GraphModel::new();
        let loose = Node::new(Id::new("loose"), "Loose Move", NodeType::MyMove);
        model.add_node(loose).unwrap();

        let resolution = resolve(&model, NodeType::MyMove, Some(Id::new("loose"))).unwrap();
        assert_eq!(resolution.parent_id(), None);
        assert_eq!(resolution.depth(), 0);
    }

    #[test]
    fn test_stale_selection_fails() {
        let (model, _, _) = guard_with_sweep();
        let ghost = Id::new("ghost");

        for node_type in NodeType::ALL {
            let err = resolve(&model, node_type, Some(ghost)).unwrap_err();
            assert!(matches!(err, JitsError::SelectedNodeMissing(id) if id == ghost));
        }
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let (model, _, sweep) = guard_with_sweep();

        for node_type in NodeType::ALL {
            let first = resolve(&model, node_type, Some(sweep)).unwrap();
            let second = resolve(&model, node_type, Some(sweep)).unwrap();
            assert_eq!(first, second);
        }
    }
}
