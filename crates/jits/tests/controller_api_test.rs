//! Integration tests for the GraphController API
//!
//! These tests drive sessions through the public API only, including the store
//! round trip between two sessions.

use jits::{
    GraphController, JitsError,
    config::{LayoutConfig, PositioningPolicy, StyleConfig},
    geometry::Point,
    identifier::Id,
    media::MediaRef,
    semantic::NodeType,
    store::{Collection, MemoryStore, SnapshotFeed},
};

fn build_guard_tree(controller: &mut GraphController) -> Result<(Id, Id, Id), JitsError> {
    let guard = controller.add_node(NodeType::Variant, "Closed Guard", None)?;
    let sweep = controller.add_node(NodeType::MyMove, "Scissor Sweep", None)?;
    let armbar = controller.add_node(NodeType::Outcome, "Armbar", None)?;
    Ok((guard, sweep, armbar))
}

#[test]
fn test_build_simple_tree() {
    let mut controller = GraphController::new(&LayoutConfig::default());
    let (guard, sweep, armbar) = build_guard_tree(&mut controller).expect("Failed to build tree");

    let model = controller.model();
    assert_eq!(model.nodes_count(), 3);
    assert_eq!(model.edges_count(), 2);
    assert_eq!(model.node(sweep).unwrap().parent_id(), Some(guard));
    assert_eq!(model.node(armbar).unwrap().depth(), 2);
    assert_eq!(model.max_depth(), Some(2));
}

#[test]
fn test_sibling_shares_parent_edge_source() {
    let mut controller = GraphController::new(&LayoutConfig::default());
    let (guard, sweep, _) = build_guard_tree(&mut controller).expect("Failed to build tree");

    controller.select_node(sweep);
    let hip_bump = controller
        .add_node(NodeType::MyMove, "Hip Bump", None)
        .expect("Failed to add sibling");

    let edge = controller.model().parent_edge(hip_bump).unwrap();
    assert_eq!(edge.source(), guard);
    assert_eq!(controller.model().children(guard).count(), 2);
}

#[test]
fn test_second_session_follows_store() {
    let store = MemoryStore::new();
    let mut writer = GraphController::new(&LayoutConfig::default()).with_store(store.clone());
    let mut reader = GraphController::new(&LayoutConfig::default());
    let mut feed = SnapshotFeed::new(store.subscribe());

    let (_, sweep, _) = build_guard_tree(&mut writer).expect("Failed to build tree");
    let clip = MediaRef::from_raw("https://www.youtube.com/watch?v=dQw4w9WgXcQ", 1.0, 6.0, false)
        .expect("Failed to parse clip");
    writer.select_node(sweep);
    writer
        .add_node(NodeType::MyMove, "Hip Bump", Some(clip))
        .expect("Failed to add sibling");

    assert_eq!(feed.pump(&mut reader), 7);

    let writer_nodes: Vec<_> = writer.nodes().cloned().collect();
    let reader_nodes: Vec<_> = reader.nodes().cloned().collect();
    assert_eq!(writer_nodes, reader_nodes);
    assert_eq!(writer.edges(), reader.edges());
    assert_eq!(
        reader_nodes[3].media_ref().unwrap().source_id(),
        "dQw4w9WgXcQ"
    );

    // Nothing new, nothing reloaded.
    assert_eq!(feed.pump(&mut reader), 0);
}

#[test]
fn test_removal_in_store_reaches_session() {
    let store = MemoryStore::new();
    let mut writer = GraphController::new(&LayoutConfig::default()).with_store(store.clone());
    let (guard, sweep, armbar) = build_guard_tree(&mut writer).expect("Failed to build tree");

    let mut feed = SnapshotFeed::new(store.subscribe());
    feed.pump(&mut writer);
    assert_eq!(writer.selected(), Some(armbar));

    store
        .remove(Collection::Positions, armbar)
        .expect("Failed to remove record");
    feed.pump(&mut writer);

    assert!(!writer.model().contains_node(armbar));
    assert_eq!(writer.selected(), None);

    // The dangling edge stays until the store drops it as well.
    assert_eq!(writer.model().edges_count(), 2);
    assert!(writer.model().contains_node(guard));
    assert!(writer.model().contains_node(sweep));
}

#[test]
fn test_preserve_manual_round_trip() {
    let config = LayoutConfig::default().with_positioning(PositioningPolicy::PreserveManual);
    let store = MemoryStore::new();
    let mut controller = GraphController::new(&config).with_store(store.clone());
    let (guard, sweep, _) = build_guard_tree(&mut controller).expect("Failed to build tree");

    let moved = controller
        .move_node(guard, Point::new(600.0, 100.0))
        .expect("Failed to move node");
    assert!(moved);

    let mut feed = SnapshotFeed::new(store.subscribe());
    feed.pump(&mut controller);

    assert_eq!(
        controller.model().node(guard).unwrap().position(),
        Point::new(600.0, 100.0)
    );
    assert_eq!(
        controller.model().node(sweep).unwrap().position(),
        Point::new(600.0, 200.0)
    );
}

#[test]
fn test_move_reaches_second_session_without_relayout() {
    let store = MemoryStore::new();
    let mut writer = GraphController::new(&LayoutConfig::default()).with_store(store.clone());
    let mut reader = GraphController::new(&LayoutConfig::default());
    let mut feed = SnapshotFeed::new(store.subscribe());

    let (guard, sweep, armbar) = build_guard_tree(&mut writer).expect("Failed to build tree");
    feed.pump(&mut reader);

    writer
        .move_node(sweep, Point::new(420.0, 260.0))
        .expect("Failed to move node");
    assert_eq!(feed.pump(&mut reader), 1);

    let position = |id: Id| reader.model().node(id).unwrap().position();
    assert_eq!(position(sweep), Point::new(420.0, 260.0));
    assert_eq!(position(guard), Point::new(200.0, 80.0));
    assert_eq!(position(armbar), Point::new(200.0, 320.0));
    assert!(!reader.is_pinned(sweep));
}

#[test]
fn test_render_svg() {
    let mut controller = GraphController::new(&LayoutConfig::default());
    build_guard_tree(&mut controller).expect("Failed to build tree");

    let svg = jits::render_svg(&controller, &StyleConfig::default()).expect("Failed to render");
    assert!(svg.contains("<svg"), "Output should contain SVG tag");
    assert!(svg.contains("</svg>"), "Output should be complete SVG");
    assert!(svg.contains("Armbar"));
}
