//! Keeps nested swimlane sizes consistent.
//!
//! A pool is a swimlane whose children are themselves swimlanes. The
//! manager watches the graph: a lane added next to existing lanes adopts
//! their size, and resizing a lane grows the pool around it, propagating
//! header offsets up and the shared dimension back down. All propagation
//! happens through geometry changes in one transaction, so a user resize
//! plus its ripple undoes as a single step.

use std::cell::RefCell;
use std::rc::Rc;

use log::trace;

use trellis_core::{keys, CellId, Geometry};

use crate::event::{EventKind, GraphEvent, ListenerId};
use crate::graph::Graph;

pub struct SwimlaneManager {
    /// Orientation assumed for cells that are not swimlanes.
    horizontal: bool,
    enabled: bool,
    add_enabled: bool,
    resize_enabled: bool,
    listeners: Vec<ListenerId>,
}

impl Default for SwimlaneManager {
    fn default() -> Self {
        Self {
            horizontal: true,
            enabled: true,
            add_enabled: true,
            resize_enabled: true,
            listeners: Vec::new(),
        }
    }
}

impl SwimlaneManager {
    pub fn new() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::default()))
    }

    pub fn is_horizontal(&self) -> bool {
        self.horizontal
    }

    pub fn set_horizontal(&mut self, horizontal: bool) {
        self.horizontal = horizontal;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_add_enabled(&self) -> bool {
        self.add_enabled
    }

    pub fn set_add_enabled(&mut self, add_enabled: bool) {
        self.add_enabled = add_enabled;
    }

    pub fn is_resize_enabled(&self) -> bool {
        self.resize_enabled
    }

    pub fn set_resize_enabled(&mut self, resize_enabled: bool) {
        self.resize_enabled = resize_enabled;
    }

    /// Subscribes the manager to cell additions and resizes.
    pub fn attach(manager: &Rc<RefCell<Self>>, graph: &mut Graph) {
        let shared = Rc::clone(manager);
        let added = graph.add_listener(
            EventKind::CellsAdded,
            move |graph: &mut Graph, event: &GraphEvent| {
                let GraphEvent::CellsAdded { cells } = event else {
                    return;
                };
                let manager = shared.borrow();
                if manager.enabled && manager.add_enabled {
                    manager.cells_added(graph, cells);
                }
            },
        );
        let shared = Rc::clone(manager);
        let resized = graph.add_listener(
            EventKind::CellsResized,
            move |graph: &mut Graph, event: &GraphEvent| {
                let GraphEvent::CellsResized { cells } = event else {
                    return;
                };
                let manager = shared.borrow();
                if manager.enabled && manager.resize_enabled {
                    manager.cells_resized(graph, cells);
                }
            },
        );
        manager.borrow_mut().listeners.extend([added, resized]);
    }

    /// Unsubscribes the manager from the graph.
    pub fn detach(&mut self, graph: &mut Graph) {
        for id in self.listeners.drain(..) {
            graph.remove_listener(id);
        }
    }

    /// A swimlane's orientation comes from its style; any other cell is
    /// taken to be perpendicular to the manager's default.
    fn is_cell_horizontal(&self, graph: &Graph, cell: CellId) -> bool {
        if graph.is_swimlane(cell) {
            graph
                .model()
                .cell(cell)
                .is_some_and(|c| c.style().get_bool(keys::HORIZONTAL, true))
        } else {
            !self.horizontal
        }
    }

    fn cells_added(&self, graph: &mut Graph, cells: &[CellId]) {
        for &cell in cells {
            if graph.is_swimlane(cell) {
                self.swimlane_added(graph, cell);
            }
        }
    }

    /// Sizes a freshly added lane like its siblings: the parent's
    /// orientation decides which dimension the siblings share.
    fn swimlane_added(&self, graph: &mut Graph, swimlane: CellId) {
        let Some(parent) = graph.model().parent(swimlane) else {
            return;
        };
        let template = graph
            .model()
            .children(parent)
            .iter()
            .filter(|&&sibling| sibling != swimlane && graph.is_swimlane(sibling))
            .find_map(|&sibling| {
                graph
                    .model()
                    .cell(sibling)
                    .and_then(|c| c.geometry())
                    .map(Geometry::bounds)
            });
        let Some(bounds) = template else {
            return;
        };
        trace!(swimlane = swimlane.raw(); "Sizing added swimlane from its siblings");
        self.resize_swimlane(
            graph,
            swimlane,
            bounds.width(),
            bounds.height(),
            self.is_cell_horizontal(graph, parent),
        );
    }

    /// Propagates a lane resize upward: each enclosing swimlane grows by
    /// its own header, and the topmost one is resized with the accumulated
    /// total, which then flows back down the shared dimension.
    fn cells_resized(&self, graph: &mut Graph, cells: &[CellId]) {
        graph.begin_update();
        for &cell in cells {
            if !graph.is_swimlane(cell) {
                continue;
            }
            let Some(bounds) = graph
                .model()
                .cell(cell)
                .and_then(|c| c.geometry())
                .map(Geometry::bounds)
            else {
                continue;
            };
            let mut width = bounds.width();
            let mut height = bounds.height();
            let mut top = cell;
            while let Some(parent) = graph.model().parent(top) {
                if !graph.is_swimlane(parent) {
                    break;
                }
                let start = graph.start_size(parent);
                width += start.width();
                height += start.height();
                top = parent;
            }
            self.resize_swimlane(graph, top, width, height, self.is_cell_horizontal(graph, top));
        }
        graph.end_update();
    }

    /// Applies a size to a swimlane and walks its subtree. Orientation
    /// picks the dimension: a horizontal lane takes the height, a vertical
    /// one the width, and the other dimension is left alone. Each level
    /// subtracts its header before descending, so nested lanes fill their
    /// parent's body exactly.
    fn resize_swimlane(
        &self,
        graph: &mut Graph,
        swimlane: CellId,
        width: f64,
        height: f64,
        horizontal: bool,
    ) {
        graph.begin_update();
        let mut stack = vec![(swimlane, width, height, horizontal)];
        while let Some((cell, mut width, mut height, horizontal)) = stack.pop() {
            if graph.is_swimlane(cell) {
                if let Some(geometry) = graph
                    .model()
                    .cell(cell)
                    .and_then(|c| c.geometry())
                    .cloned()
                {
                    let bounds = geometry.bounds();
                    let resized = if horizontal && bounds.height() != height {
                        Some(bounds.with_height(height))
                    } else if !horizontal && bounds.width() != width {
                        Some(bounds.with_width(width))
                    } else {
                        None
                    };
                    if let Some(bounds) = resized {
                        graph
                            .model_mut()
                            .set_geometry(cell, geometry.with_bounds(bounds))
                            .expect("resized swimlane should exist");
                    }
                }
                let start = graph.start_size(cell);
                width -= start.width();
                height -= start.height();
            }
            let children: Vec<CellId> = graph.model().children(cell).to_vec();
            for child in children {
                stack.push((
                    child,
                    width,
                    height,
                    self.is_cell_horizontal(graph, child),
                ));
            }
        }
        graph.end_update();
    }
}
