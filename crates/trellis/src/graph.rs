//! The graph facade: model, events, and connection validation in one place.
//!
//! [`Graph`] wraps a [`GraphModel`] and adds the pieces the model itself
//! stays ignorant of: the listener table, high-level compound operations
//! (insert, remove, resize, connect), multiplicity validation, and the
//! traversal helpers layouts are built on.
//!
//! Change events fire on the caller's stack once the outermost transaction
//! commits. Compound operations additionally fire their specific event
//! (cells added, removed, resized) while their transaction is still open,
//! so anything a reactive listener does in response lands in the same
//! undoable edit.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexSet;
use log::debug;

use trellis_core::{keys, CellId, CellValue, Geometry, Rectangle, Style, SHAPE_SWIMLANE};

use crate::change::Edit;
use crate::error::TrellisError;
use crate::event::{EventKind, GraphEvent, GraphListener, ListenerId, ListenerTable};
use crate::model::GraphModel;
use crate::multiplicity::Multiplicity;

/// Header size assumed for swimlanes that do not set one in their style.
pub const DEFAULT_START_SIZE: f64 = 40.0;

#[derive(Default)]
pub struct Graph {
    model: GraphModel,
    listeners: ListenerTable,
    multiplicities: Vec<Multiplicity>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(&self) -> &GraphModel {
        &self.model
    }

    /// Mutable model access for callers inside an [`update`](Self::update)
    /// closure or an open transaction. Mutations made here while idle
    /// commit, but notify only at the next flush; use the facade setters
    /// when listeners must hear about them immediately.
    pub fn model_mut(&mut self) -> &mut GraphModel {
        &mut self.model
    }

    pub fn root(&self) -> CellId {
        self.model.root()
    }

    // -------------------------------------------------------------------
    // Listeners
    // -------------------------------------------------------------------

    /// Registers a listener for one event kind and returns its handle.
    pub fn add_listener(
        &mut self,
        kind: EventKind,
        listener: impl GraphListener + 'static,
    ) -> ListenerId {
        self.listeners.add(kind, Rc::new(RefCell::new(listener)))
    }

    /// Registers a listener shared with the caller, so the caller can keep
    /// driving the same state the handler mutates.
    pub fn add_shared_listener(
        &mut self,
        kind: EventKind,
        listener: Rc<RefCell<dyn GraphListener>>,
    ) -> ListenerId {
        self.listeners.add(kind, listener)
    }

    /// Removes a listener; returns false when the handle is unknown.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Dispatches an event to its subscribers in registration order.
    ///
    /// A handler that is still running when an event reaches it again is
    /// not re-entered; the event is queued and delivered once the current
    /// invocation returns, so nested dispatch never drops events.
    pub fn fire_event(&mut self, event: GraphEvent) {
        if self.listeners.is_empty() {
            return;
        }
        for subscriber in self.listeners.matching(event.kind()) {
            match subscriber.handler().try_borrow_mut() {
                Ok(mut handler) => {
                    handler.on_event(self, &event);
                    drop(handler);
                    // deliver whatever reached this handler while it ran;
                    // deliveries may queue further events, hence the loop
                    loop {
                        let Some(next) = subscriber.next_deferred() else {
                            break;
                        };
                        if let Ok(mut handler) = subscriber.handler().try_borrow_mut() {
                            handler.on_event(self, &next);
                        }
                    }
                }
                Err(_) => {
                    debug!(kind:? = event.kind(); "Deferring event for a running listener");
                    subscriber.defer(event.clone());
                }
            }
        }
    }

    // -------------------------------------------------------------------
    // Transactions
    // -------------------------------------------------------------------

    pub fn begin_update(&mut self) {
        self.model.begin_update();
    }

    /// Closes one transaction level and, when the outermost level closes,
    /// fires one change event per committed edit.
    pub fn end_update(&mut self) {
        self.model.end_update();
        if !self.model.in_transaction() {
            self.flush_events();
        }
    }

    fn flush_events(&mut self) {
        // handlers may commit further edits while we notify
        loop {
            let edits = self.model.take_committed();
            if edits.is_empty() {
                break;
            }
            for edit in edits {
                self.fire_event(GraphEvent::Change {
                    changes: edit.changes().to_vec(),
                });
            }
        }
    }

    /// Runs a closure inside one transaction, so every mutation it makes
    /// commits as a single edit.
    pub fn update<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.begin_update();
        let result = f(self);
        self.end_update();
        result
    }

    // -------------------------------------------------------------------
    // Compound operations
    // -------------------------------------------------------------------

    /// Creates a vertex and attaches it under `parent` in one transaction.
    pub fn insert_vertex(
        &mut self,
        parent: CellId,
        value: Option<CellValue>,
        geometry: Geometry,
        style: Style,
    ) -> Result<CellId, TrellisError> {
        if !self.model.contains(parent) {
            return Err(TrellisError::NotFound(parent));
        }
        let cell = self.model.create_vertex(value, Some(geometry), style);
        self.begin_update();
        let result = self.model.add_child(parent, cell, None);
        if result.is_ok() {
            // inside the transaction, so reactions join this edit
            self.fire_event(GraphEvent::CellsAdded { cells: vec![cell] });
        }
        self.end_update();
        result?;
        Ok(cell)
    }

    /// Creates an edge between two cells in one transaction.
    pub fn insert_edge(
        &mut self,
        parent: CellId,
        value: Option<CellValue>,
        style: Style,
        source: CellId,
        target: CellId,
    ) -> Result<CellId, TrellisError> {
        for terminal in [parent, source, target] {
            if !self.model.contains(terminal) {
                return Err(TrellisError::NotFound(terminal));
            }
        }
        let edge = self.model.create_edge(value, style);
        self.begin_update();
        let result = self
            .model
            .add_child(parent, edge, None)
            .and_then(|_| self.model.set_terminal(edge, Some(source), true))
            .and_then(|_| self.model.set_terminal(edge, Some(target), false));
        if result.is_ok() {
            self.fire_event(GraphEvent::CellsAdded { cells: vec![edge] });
        }
        self.end_update();
        result?;
        Ok(edge)
    }

    /// Rewires one end of an existing edge.
    pub fn connect(
        &mut self,
        edge: CellId,
        terminal: Option<CellId>,
        is_source: bool,
    ) -> Result<(), TrellisError> {
        self.begin_update();
        let result = self.model.set_terminal(edge, terminal, is_source);
        self.end_update();
        result
    }

    /// Removes the given cells, each with its subtree and dangling edges,
    /// as a single transaction.
    pub fn remove_cells(&mut self, cells: &[CellId]) -> Result<(), TrellisError> {
        self.begin_update();
        let mut result = Ok(());
        for &cell in cells {
            // a cell may already be gone as part of an earlier subtree
            if self.model.is_attached(cell) && cell != self.model.root() {
                result = self.model.remove_cell(cell);
                if result.is_err() {
                    break;
                }
            }
        }
        if result.is_ok() {
            self.fire_event(GraphEvent::CellsRemoved {
                cells: cells.to_vec(),
            });
        }
        self.end_update();
        result
    }

    /// Applies new bounds to the given cells in one transaction, preserving
    /// each geometry's relative flag, offset, and control points.
    pub fn resize_cells(
        &mut self,
        resizes: &[(CellId, Rectangle)],
    ) -> Result<(), TrellisError> {
        self.begin_update();
        let mut result = Ok(());
        for &(cell, bounds) in resizes {
            let geometry = match self.model.cell(cell).map(|c| c.geometry().cloned()) {
                Some(Some(geometry)) => geometry.with_bounds(bounds),
                Some(None) => Geometry::new(bounds),
                None => {
                    result = Err(TrellisError::NotFound(cell));
                    break;
                }
            };
            result = self.model.set_geometry(cell, geometry);
            if result.is_err() {
                break;
            }
        }
        if result.is_ok() {
            self.fire_event(GraphEvent::CellsResized {
                cells: resizes.iter().map(|&(cell, _)| cell).collect(),
            });
        }
        self.end_update();
        result
    }

    pub fn resize_cell(&mut self, cell: CellId, bounds: Rectangle) -> Result<(), TrellisError> {
        self.resize_cells(&[(cell, bounds)])
    }

    // -------------------------------------------------------------------
    // Model setters
    //
    // Each forwards to the model inside an implicit transaction, so a call
    // made while idle commits one edit and publishes its change event
    // right away instead of waiting for the next flush.
    // -------------------------------------------------------------------

    /// Attaches `cell` under `parent`, appending when `index` is `None`.
    pub fn add_child(
        &mut self,
        parent: CellId,
        cell: CellId,
        index: Option<usize>,
    ) -> Result<(), TrellisError> {
        self.update(|g| g.model.add_child(parent, cell, index))
    }

    pub fn set_geometry(&mut self, cell: CellId, geometry: Geometry) -> Result<(), TrellisError> {
        self.update(|g| g.model.set_geometry(cell, geometry))
    }

    pub fn set_style(&mut self, cell: CellId, style: Style) -> Result<(), TrellisError> {
        self.update(|g| g.model.set_style(cell, style))
    }

    pub fn set_visible(&mut self, cell: CellId, visible: bool) -> Result<(), TrellisError> {
        self.update(|g| g.model.set_visible(cell, visible))
    }

    pub fn set_collapsed(&mut self, cell: CellId, collapsed: bool) -> Result<(), TrellisError> {
        self.update(|g| g.model.set_collapsed(cell, collapsed))
    }

    // -------------------------------------------------------------------
    // Undo / redo
    // -------------------------------------------------------------------

    pub fn can_undo(&self) -> bool {
        self.model.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.model.can_redo()
    }

    /// Reverts the most recent edit and notifies. Returns the reverted edit.
    pub fn undo(&mut self) -> Option<Edit> {
        let edit = self.model.undo()?;
        self.fire_event(GraphEvent::Undone {
            changes: edit.changes().to_vec(),
        });
        Some(edit)
    }

    /// Replays the most recently undone edit and notifies.
    pub fn redo(&mut self) -> Option<Edit> {
        let edit = self.model.redo()?;
        self.fire_event(GraphEvent::Redone {
            changes: edit.changes().to_vec(),
        });
        Some(edit)
    }

    // -------------------------------------------------------------------
    // Multiplicities
    // -------------------------------------------------------------------

    pub fn add_multiplicity(&mut self, rule: Multiplicity) {
        self.multiplicities.push(rule);
    }

    pub fn multiplicities(&self) -> &[Multiplicity] {
        &self.multiplicities
    }

    /// Evaluates every multiplicity rule against a prospective connection.
    ///
    /// `edge` names an existing edge being rewired so its current terminals
    /// are excluded from the counts. Returns the newline-joined error
    /// strings of all violated rules, or `None` when the connection is
    /// valid. Validation never blocks the mutation itself.
    pub fn validate_connection(
        &self,
        edge: Option<CellId>,
        source: CellId,
        target: CellId,
    ) -> Option<String> {
        let source_out = self.model.directed_edge_count(source, true, edge);
        let target_in = self.model.directed_edge_count(target, false, edge);

        let mut errors = String::new();
        for rule in &self.multiplicities {
            if let Some(error) = rule.check(&self.model, source, target, source_out, target_in) {
                errors.push_str(&error);
            }
        }

        if errors.is_empty() {
            None
        } else {
            debug!(source = source.raw(), target = target.raw(); "Connection rejected by multiplicity rules");
            Some(errors.trim_end().to_owned())
        }
    }

    // -------------------------------------------------------------------
    // Swimlane helpers
    // -------------------------------------------------------------------

    /// Returns true when the cell's style marks it as a swimlane.
    pub fn is_swimlane(&self, cell: CellId) -> bool {
        self.model
            .cell(cell)
            .is_some_and(|c| c.style().get_text(keys::SHAPE) == Some(SHAPE_SWIMLANE))
    }

    /// The area a swimlane's header occupies: a horizontal lane gives up
    /// height at the top, a vertical one width at the left.
    pub fn start_size(&self, swimlane: CellId) -> Rectangle {
        let mut result = Rectangle::default();
        let Some(cell) = self.model.cell(swimlane) else {
            return result;
        };
        let size = cell.style().get_number(keys::START_SIZE, DEFAULT_START_SIZE);
        if cell.style().get_bool(keys::HORIZONTAL, true) {
            result = result.with_height(size);
        } else {
            result = result.with_width(size);
        }
        result
    }

    // -------------------------------------------------------------------
    // Traversal
    // -------------------------------------------------------------------

    /// Finds the children of `parent` that act as tree roots: vertices with
    /// outgoing but no incoming edges (swapped when `invert`). When no child
    /// qualifies, the vertex with the greatest edge imbalance is returned as
    /// the sole root.
    ///
    /// With `isolate`, only edges whose opposite terminal is a sibling under
    /// the same parent are counted.
    pub fn find_tree_roots(&self, parent: CellId, isolate: bool, invert: bool) -> Vec<CellId> {
        let mut roots = Vec::new();
        let mut best: Option<(CellId, i64)> = None;

        for &child in self.model.children(parent) {
            if !self.model.is_vertex(child) {
                continue;
            }
            let mut fan_in = 0i64;
            let mut fan_out = 0i64;
            for &edge in self.model.connected_edges(child) {
                if !self.model.is_attached(edge) {
                    continue;
                }
                if isolate {
                    let opposite = self.model.opposite(edge, child);
                    if opposite.and_then(|o| self.model.parent(o)) != Some(parent) {
                        continue;
                    }
                }
                if self.model.terminal(edge, true) == Some(child) {
                    fan_out += 1;
                } else {
                    fan_in += 1;
                }
            }

            let qualifies = if invert {
                fan_out == 0 && fan_in > 0
            } else {
                fan_in == 0 && fan_out > 0
            };
            if qualifies {
                roots.push(child);
            }
            let diff = if invert {
                fan_in - fan_out
            } else {
                fan_out - fan_in
            };
            if best.is_none_or(|(_, best_diff)| diff > best_diff) {
                best = Some((child, diff));
            }
        }

        if roots.is_empty() {
            if let Some((cell, _)) = best {
                roots.push(cell);
            }
        }
        roots
    }

    /// Depth-first traversal along edges starting at `start`.
    ///
    /// With `directed`, edges are only followed from source to target
    /// (target to source when `inverse`). The visitor receives each vertex
    /// with the edge it was reached through; returning `false` prunes the
    /// branch below that vertex. Each vertex is visited at most once.
    pub fn traverse(
        &self,
        start: CellId,
        directed: bool,
        inverse: bool,
        mut visit: impl FnMut(CellId, Option<CellId>) -> bool,
    ) {
        let mut visited: IndexSet<CellId> = IndexSet::new();
        let mut stack: Vec<(CellId, Option<CellId>)> = vec![(start, None)];

        while let Some((cell, via)) = stack.pop() {
            if !visited.insert(cell) {
                continue;
            }
            if !visit(cell, via) {
                continue;
            }
            // reversed push keeps edge order in the visit order
            for &edge in self.model.connected_edges(cell).iter().rev() {
                if !self.model.is_attached(edge) {
                    continue;
                }
                let is_source = self.model.terminal(edge, true) == Some(cell);
                if directed && is_source == inverse {
                    continue;
                }
                if let Some(next) = self.model.opposite(edge, cell) {
                    if !visited.contains(&next) {
                        stack.push((next, Some(edge)));
                    }
                }
            }
        }
    }
}
