//! Session scripts.
//!
//! A script replays what a user does in an editing session: adding nodes, selecting
//! them, connecting and dragging them. It may start from a snapshot of the store.
//!
//! ```toml
//! [[snapshot.nodes]]
//! id = "guard"
//! label = "Closed Guard"
//! nodeType = "variant"
//!
//! [[actions]]
//! action = "select"
//! node = "Closed Guard"
//!
//! [[actions]]
//! action = "add"
//! type = "myMove"
//! label = "Scissor Sweep"
//! clip = { source = "https://youtu.be/dQw4w9WgXcQ", start = 3.0, end = 9.5 }
//! ```
//!
//! Nodes are referenced by id, or by label when no node has that id. A label
//! reference picks the first node carrying it.

use log::{debug, info};
use serde::Deserialize;

use jits::{
    GraphController, JitsError,
    config::LayoutConfig,
    geometry::Point,
    identifier::Id,
    media::MediaRef,
    semantic::NodeType,
    store::{MemoryStore, Snapshot, SnapshotFeed},
};

/// A clip attached to a node being added.
#[derive(Debug, Clone, Deserialize)]
pub struct ClipSpec {
    source: String,
    start: f32,
    end: f32,
    #[serde(rename = "loop", default = "default_loop")]
    looped: bool,
}

fn default_loop() -> bool {
    true
}

fn default_enabled() -> bool {
    true
}

/// One user action.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Action {
    Add {
        #[serde(rename = "type")]
        node_type: NodeType,
        label: String,
        #[serde(default)]
        clip: Option<ClipSpec>,
    },
    Select {
        node: String,
    },
    Connect {
        from: String,
        to: String,
    },
    Move {
        node: String,
        x: f32,
        y: f32,
    },
    Reorganize,
    Annotate {
        #[serde(default = "default_enabled")]
        enabled: bool,
    },
}

/// A parsed session script.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Script {
    #[serde(default)]
    snapshot: Snapshot,
    #[serde(default)]
    actions: Vec<Action>,
}

impl Script {
    /// Parses a script from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`JitsError::Script`] if the source is not a valid script.
    pub fn parse(source: &str) -> Result<Self, JitsError> {
        toml::from_str(source).map_err(|err| JitsError::Script(err.to_string()))
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Replays the script in a fresh session backed by an in-memory store.
    ///
    /// The store starts out with the snapshot. The session follows the store the same
    /// way a live session does: store events are pumped into it after every action.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by an action.
    pub fn run(self, layout: &LayoutConfig) -> Result<GraphController, JitsError> {
        let store = MemoryStore::from_snapshot(self.snapshot);
        let mut feed = SnapshotFeed::new(store.subscribe());
        let mut controller = GraphController::new(layout).with_store(store);
        feed.pump(&mut controller);

        for (step, action) in self.actions.into_iter().enumerate() {
            debug!(step, action:?; "Running action");
            apply(&mut controller, action).map_err(|err| match err {
                JitsError::Script(msg) => JitsError::Script(format!("action {}: {msg}", step + 1)),
                other => other,
            })?;
            feed.pump(&mut controller);
        }

        info!(
            nodes_count = controller.model().nodes_count(),
            edges_count = controller.model().edges_count();
            "Script finished"
        );
        Ok(controller)
    }
}

fn apply(controller: &mut GraphController, action: Action) -> Result<(), JitsError> {
    match action {
        Action::Add {
            node_type,
            label,
            clip,
        } => {
            let media_ref = clip
                .map(|clip| MediaRef::from_raw(&clip.source, clip.start, clip.end, clip.looped))
                .transpose()?;
            controller.add_node(node_type, label, media_ref)?;
        }
        Action::Select { node } => {
            let id = find_node(controller, &node)?;
            controller.select_node(id);
        }
        Action::Connect { from, to } => {
            let source = find_node(controller, &from)?;
            let target = find_node(controller, &to)?;
            controller.connect_manually(source, target)?;
        }
        Action::Move { node, x, y } => {
            let id = find_node(controller, &node)?;
            controller.move_node(id, Point::new(x, y))?;
        }
        Action::Reorganize => controller.reorganize(),
        Action::Annotate { enabled } => controller.set_annotation_mode(enabled),
    }
    Ok(())
}

/// Looks a node up by id, then by label.
fn find_node(controller: &GraphController, reference: &str) -> Result<Id, JitsError> {
    let model = controller.model();
    let id = Id::new(reference);
    if model.contains_node(id) {
        return Ok(id);
    }

    model
        .nodes()
        .find(|node| node.label() == reference)
        .map(|node| node.id())
        .ok_or_else(|| JitsError::Script(format!("no node with id or label `{reference}`")))
}
