//! Semantic model of a technique tree.
//!
//! A technique tree is a set of [`Node`]s, each tagged with a [`NodeType`], linked by
//! directed [`Edge`]s. Nodes carry their own ancestry (`parent_id` and `depth`), which
//! is what relationship inference and tree layout operate on; edges are what gets
//! drawn and persisted.
//!
//! These are also the records mirrored to and read back from the external store, so
//! all types here are serde-friendly. Field names follow the store's camelCase
//! convention.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{geometry::Point, identifier::Id, media::MediaRef};

/// The category a user picks when creating a node.
///
/// The category decides both the visual style of a node and how a new node relates
/// to the currently selected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeType {
    /// A starting position. Always creates a new root.
    #[default]
    Variant,
    MyMove,
    OpponentMove,
    Outcome,
}

impl NodeType {
    /// All node types, in the order a picker would list them.
    pub const ALL: [NodeType; 4] = [
        NodeType::Variant,
        NodeType::MyMove,
        NodeType::OpponentMove,
        NodeType::Outcome,
    ];

    /// Returns true for the designated root type.
    pub fn is_root_type(self) -> bool {
        self == NodeType::Variant
    }

    /// Stable camelCase key, as used in records and configuration.
    pub fn key(self) -> &'static str {
        match self {
            NodeType::Variant => "variant",
            NodeType::MyMove => "myMove",
            NodeType::OpponentMove => "opponentMove",
            NodeType::Outcome => "outcome",
        }
    }

    /// Human-readable name.
    pub fn display_name(self) -> &'static str {
        match self {
            NodeType::Variant => "Variant",
            NodeType::MyMove => "My Move",
            NodeType::OpponentMove => "Opponent Move",
            NodeType::Outcome => "Outcome",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeType::ALL
            .into_iter()
            .find(|node_type| node_type.key() == s)
            .ok_or_else(|| format!("unknown node type `{s}`"))
    }
}

/// A vertex of the technique tree.
///
/// `depth` is 0 exactly when `parent_id` is absent; otherwise it is one more than the
/// parent's depth. The graph model enforces this on insertion.
///
/// `position` is derived by the layout engine. It is only authoritative for nodes
/// the engine cannot place (orphans) and for manually pinned nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    id: Id,
    label: String,
    node_type: NodeType,
    #[serde(default)]
    parent_id: Option<Id>,
    #[serde(default)]
    depth: usize,
    #[serde(default, alias = "media")]
    media_ref: Option<MediaRef>,
    #[serde(default)]
    position: Point,
}

impl Node {
    /// Creates a root node at the origin.
    pub fn new(id: Id, label: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id,
            label: label.into(),
            node_type,
            parent_id: None,
            depth: 0,
            media_ref: None,
            position: Point::default(),
        }
    }

    /// Places the node under `parent_id` at the given depth.
    pub fn with_parent(mut self, parent_id: Option<Id>, depth: usize) -> Self {
        self.parent_id = parent_id;
        self.depth = depth;
        self
    }

    /// Attaches a clip.
    pub fn with_media(mut self, media_ref: Option<MediaRef>) -> Self {
        self.media_ref = media_ref;
        self
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn parent_id(&self) -> Option<Id> {
        self.parent_id
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn media_ref(&self) -> Option<&MediaRef> {
        self.media_ref.as_ref()
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub fn set_depth(&mut self, depth: usize) {
        self.depth = depth;
    }

    /// Returns true if the node has no parent.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.label, self.node_type, self.id)
    }
}

/// A directed connection between two nodes.
///
/// Either the parent link implied by a node's ancestry, or a free-form connection
/// drawn by the user. The store historically names the endpoints `fromId`/`toId`;
/// both spellings are accepted when reading records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    id: Id,
    #[serde(alias = "fromId")]
    source: Id,
    #[serde(alias = "toId")]
    target: Id,
}

impl Edge {
    pub fn new(id: Id, source: Id, target: Id) -> Self {
        Self { id, source, target }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn source(&self) -> Id {
        self.source
    }

    pub fn target(&self) -> Id {
        self.target
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.source, self.target, self.id)
    }
}
