//! The layout family: algorithms that assign geometry to a parent's
//! children, and the manager that runs one automatically.
//!
//! Layouts mutate through model-level geometry changes inside a single
//! transaction, so running a layout commits one undoable edit and fires one
//! change event, never a resize event.

pub mod radial;
pub mod sorter;
pub mod swimlane;
pub mod tree;

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

use trellis_core::CellId;

use crate::error::TrellisError;
use crate::event::{EventKind, GraphEvent, ListenerId};
use crate::graph::Graph;

pub use radial::RadialTreeLayout;
pub use sorter::WeightedCellSorter;
pub use swimlane::SwimlaneManager;
pub use tree::CompactTreeLayout;

/// A layout algorithm. `execute` arranges the children of `parent`.
pub trait Layout {
    fn execute(&mut self, graph: &mut Graph, parent: CellId) -> Result<(), TrellisError>;
}

/// Runs a layout whenever cells are added under its parent.
///
/// The manager is shared between the caller and the graph's listener table;
/// attach it with [`LayoutManager::attach`] and keep the `Rc` to reconfigure
/// or detach it later.
pub struct LayoutManager {
    layout: Box<dyn Layout>,
    parent: CellId,
    enabled: bool,
    listeners: Vec<ListenerId>,
}

impl LayoutManager {
    pub fn new(layout: impl Layout + 'static, parent: CellId) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            layout: Box::new(layout),
            parent,
            enabled: true,
            listeners: Vec::new(),
        }))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Subscribes the manager to cell additions.
    pub fn attach(manager: &Rc<RefCell<Self>>, graph: &mut Graph) {
        let shared = Rc::clone(manager);
        let id = graph.add_listener(
            EventKind::CellsAdded,
            move |graph: &mut Graph, event: &GraphEvent| {
                let GraphEvent::CellsAdded { cells } = event else {
                    return;
                };
                let mut manager = shared.borrow_mut();
                if !manager.enabled {
                    return;
                }
                let parent = manager.parent;
                let affected = cells
                    .iter()
                    .any(|&cell| graph.model().parent(cell) == Some(parent));
                if affected {
                    if let Err(error) = manager.layout.execute(graph, parent) {
                        debug!(parent = parent.raw(), error:% = error; "Automatic layout failed");
                    }
                }
            },
        );
        manager.borrow_mut().listeners.push(id);
    }

    /// Unsubscribes the manager from the graph.
    pub fn detach(&mut self, graph: &mut Graph) {
        for id in self.listeners.drain(..) {
            graph.remove_listener(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::{Geometry, Rectangle, Style};

    struct CountingLayout {
        runs: Rc<std::cell::Cell<usize>>,
    }

    impl Layout for CountingLayout {
        fn execute(&mut self, _graph: &mut Graph, _parent: CellId) -> Result<(), TrellisError> {
            self.runs.set(self.runs.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn test_manager_runs_on_additions_under_parent() {
        let mut graph = Graph::new();
        let root = graph.root();
        let container = graph
            .insert_vertex(
                root,
                None,
                Geometry::new(Rectangle::new(0.0, 0.0, 400.0, 300.0)),
                Style::default(),
            )
            .unwrap();

        let runs = Rc::new(std::cell::Cell::new(0usize));
        let manager = LayoutManager::new(
            CountingLayout {
                runs: Rc::clone(&runs),
            },
            container,
        );
        LayoutManager::attach(&manager, &mut graph);

        graph
            .insert_vertex(
                container,
                None,
                Geometry::new(Rectangle::new(0.0, 0.0, 10.0, 10.0)),
                Style::default(),
            )
            .unwrap();
        assert_eq!(runs.get(), 1);

        // additions elsewhere do not trigger the layout
        graph
            .insert_vertex(
                root,
                None,
                Geometry::new(Rectangle::new(0.0, 0.0, 10.0, 10.0)),
                Style::default(),
            )
            .unwrap();
        assert_eq!(runs.get(), 1);

        manager.borrow_mut().set_enabled(false);
        graph
            .insert_vertex(
                container,
                None,
                Geometry::new(Rectangle::new(0.0, 0.0, 10.0, 10.0)),
                Style::default(),
            )
            .unwrap();
        assert_eq!(runs.get(), 1);

        manager.borrow_mut().set_enabled(true);
        manager.borrow_mut().detach(&mut graph);
        graph
            .insert_vertex(
                container,
                None,
                Geometry::new(Rectangle::new(0.0, 0.0, 10.0, 10.0)),
                Style::default(),
            )
            .unwrap();
        assert_eq!(runs.get(), 1);
    }
}
