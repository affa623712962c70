//! Integration tests for the public Graph API
//!
//! These tests drive whole scenarios through the facade: building a
//! diagram, validating connections, reacting to changes, and undoing.

use proptest::prelude::*;

use trellis::layout::{Layout, RadialTreeLayout, SwimlaneManager};
use trellis::{EventKind, Graph, GraphEvent, Multiplicity};
use trellis_core::{keys, CellId, CellValue, Geometry, Rectangle, Style, SHAPE_SWIMLANE};

fn vertex(graph: &mut Graph, type_name: &str, x: f64, y: f64) -> CellId {
    let root = graph.root();
    graph
        .insert_vertex(
            root,
            Some(CellValue::new(type_name)),
            Geometry::new(Rectangle::new(x, y, 60.0, 30.0)),
            Style::default(),
        )
        .expect("insert under root")
}

fn bounds(graph: &Graph, cell: CellId) -> Rectangle {
    graph
        .model()
        .cell(cell)
        .and_then(|c| c.geometry())
        .expect("cell has geometry")
        .bounds()
}

#[test]
fn test_build_validate_and_undo_a_diagram() {
    let mut graph = Graph::new();
    let root = graph.root();

    let source = vertex(&mut graph, "task", 0.0, 0.0);
    let sink = vertex(&mut graph, "store", 200.0, 0.0);
    let other = vertex(&mut graph, "task", 0.0, 100.0);

    graph.add_multiplicity(Multiplicity::new(
        true,
        "task",
        0,
        Some(1),
        vec!["store".to_owned()],
        "a task feeds at most one store",
        "tasks may only feed stores",
    ));

    assert_eq!(graph.validate_connection(None, source, sink), None);
    let edge = graph
        .insert_edge(root, None, Style::default(), source, sink)
        .unwrap();

    // the existing edge now saturates the rule
    let error = graph.validate_connection(None, source, sink).unwrap();
    assert!(error.contains("at most one store"));
    // rewiring the same edge stays valid
    assert_eq!(graph.validate_connection(Some(edge), source, sink), None);
    // a task is not a valid neighbor
    let error = graph.validate_connection(None, sink, other);
    assert!(error.is_none(), "rule only constrains task sources");
    assert!(graph.validate_connection(None, other, source).is_some());

    // removing the source cascades to the edge, in one undoable step
    graph.remove_cells(&[source]).unwrap();
    assert!(!graph.model().is_attached(edge));
    graph.undo().unwrap();
    assert!(graph.model().is_attached(edge));
    assert_eq!(graph.model().terminal(edge, true), Some(source));
}

#[test]
fn test_swimlane_pool_reacts_to_lane_changes() {
    let mut graph = Graph::new();
    let root = graph.root();
    let pool = graph
        .insert_vertex(
            root,
            None,
            Geometry::new(Rectangle::new(0.0, 0.0, 400.0, 120.0)),
            Style::new()
                .with(keys::SHAPE, SHAPE_SWIMLANE)
                .with(keys::START_SIZE, 20.0),
        )
        .unwrap();
    let lane_style = || {
        Style::new()
            .with(keys::SHAPE, SHAPE_SWIMLANE)
            .with(keys::HORIZONTAL, false)
            .with(keys::START_SIZE, 15.0)
    };
    let first = graph
        .insert_vertex(
            pool,
            None,
            Geometry::new(Rectangle::new(0.0, 20.0, 200.0, 100.0)),
            lane_style(),
        )
        .unwrap();

    let manager = SwimlaneManager::new();
    SwimlaneManager::attach(&manager, &mut graph);

    // a new lane adopts the existing lane's height
    let second = graph
        .insert_vertex(
            pool,
            None,
            Geometry::new(Rectangle::new(200.0, 20.0, 200.0, 40.0)),
            lane_style(),
        )
        .unwrap();
    assert_eq!(bounds(&graph, second).height(), 100.0);

    // growing one lane grows the pool by the header, leaving the sibling
    graph
        .resize_cell(first, bounds(&graph, first).with_height(180.0))
        .unwrap();
    assert_eq!(bounds(&graph, pool).height(), 200.0);
    assert_eq!(bounds(&graph, second).height(), 100.0);

    // the resize and its ripple are one edit
    graph.undo().unwrap();
    assert_eq!(bounds(&graph, first).height(), 100.0);
    assert_eq!(bounds(&graph, pool).height(), 120.0);
}

#[test]
fn test_radial_layout_arranges_rings_around_root() {
    let mut graph = Graph::new();
    let root = graph.root();

    let hub = vertex(&mut graph, "hub", 400.0, 300.0);
    let spokes: Vec<CellId> = (0..5).map(|i| vertex(&mut graph, "spoke", i as f64, 0.0)).collect();
    for &spoke in &spokes {
        graph
            .insert_edge(root, None, Style::default(), hub, spoke)
            .unwrap();
    }

    let mut layout = RadialTreeLayout::new()
        .with_level_distance(100.0)
        .with_node_distance(50.0);
    layout.execute(&mut graph, root).unwrap();

    assert_eq!(layout.row_radii(), &[0.0, 50.0]);
    let center = bounds(&graph, hub).center();
    assert_eq!(center, trellis_core::Point::new(430.0, 315.0));
    for &spoke in &spokes {
        let distance = center.distance(bounds(&graph, spoke).center());
        assert!((distance - 50.0).abs() < 1e-9);
    }
}

#[test]
fn test_change_events_batch_per_transaction() {
    let mut graph = Graph::new();
    let a = vertex(&mut graph, "task", 0.0, 0.0);
    let b = vertex(&mut graph, "task", 100.0, 0.0);

    let log: std::rc::Rc<std::cell::RefCell<Vec<usize>>> = Default::default();
    let sink = std::rc::Rc::clone(&log);
    graph.add_listener(EventKind::Change, move |_: &mut Graph, event: &GraphEvent| {
        if let GraphEvent::Change { changes } = event {
            sink.borrow_mut().push(changes.len());
        }
    });

    // two separate edits
    graph.update(|g| g.model_mut().set_visible(a, false).unwrap());
    graph.update(|g| g.model_mut().set_visible(b, false).unwrap());
    // one batched edit
    graph.update(|g| {
        g.model_mut().set_visible(a, true).unwrap();
        g.model_mut().set_visible(b, true).unwrap();
    });

    assert_eq!(*log.borrow(), vec![1, 1, 2]);
}

#[derive(Debug, Clone)]
enum Op {
    Visible(usize, bool),
    Collapsed(usize, bool),
    Move(usize, f64, f64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..3usize, any::<bool>()).prop_map(|(i, v)| Op::Visible(i, v)),
        (0..3usize, any::<bool>()).prop_map(|(i, v)| Op::Collapsed(i, v)),
        (0..3usize, 0.0..500.0f64, 0.0..500.0f64).prop_map(|(i, x, y)| Op::Move(i, x, y)),
    ]
}

proptest! {
    /// Undoing every committed edit restores the exact starting state, and
    /// redoing them all restores the exact ending state.
    #[test]
    fn prop_undo_redo_round_trip(ops in proptest::collection::vec(op_strategy(), 0..20)) {
        let mut graph = Graph::new();
        let cells: Vec<CellId> = (0..3)
            .map(|i| vertex(&mut graph, "node", i as f64 * 100.0, 0.0))
            .collect();

        graph.model_mut().clear_history();

        let snapshot = |graph: &Graph| -> Vec<trellis_core::Cell> {
            cells.iter().map(|&c| graph.model().cell(c).unwrap().clone()).collect()
        };
        let before = snapshot(&graph);

        for op in &ops {
            match *op {
                Op::Visible(i, v) => {
                    graph.update(|g| g.model_mut().set_visible(cells[i], v).unwrap());
                }
                Op::Collapsed(i, v) => {
                    graph.update(|g| g.model_mut().set_collapsed(cells[i], v).unwrap());
                }
                Op::Move(i, x, y) => {
                    graph
                        .resize_cell(cells[i], bounds(&graph, cells[i])
                            .with_position(trellis_core::Point::new(x, y)))
                        .unwrap();
                }
            }
        }
        let committed = ops.len();

        let after = snapshot(&graph);
        for _ in 0..committed {
            prop_assert!(graph.undo().is_some());
        }
        prop_assert!(graph.undo().is_none());
        prop_assert_eq!(&snapshot(&graph), &before);

        for _ in 0..committed {
            prop_assert!(graph.redo().is_some());
        }
        prop_assert!(graph.redo().is_none());
        prop_assert_eq!(&snapshot(&graph), &after);
    }
}
