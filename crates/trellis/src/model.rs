//! The cell hierarchy model and its transaction machinery.
//!
//! [`GraphModel`] owns every cell of one diagram in an insertion-ordered
//! arena and maintains the single-rooted tree invariant over them. All
//! mutation goes through change records: each operation validates first,
//! then applies exactly one [`Change`] per call, so a rejected operation
//! leaves the model untouched and a committed one can be replayed in either
//! direction.
//!
//! Transactions nest by depth counter. Mutations issued while idle wrap
//! themselves in an implicit single-change transaction; only when the depth
//! returns to zero is the accumulated change list committed as one [`Edit`],
//! pushed on the undo stack, and queued for notification.

use indexmap::{IndexMap, IndexSet};
use log::{debug, trace};

use trellis_core::{Cell, CellId, CellKind, CellValue, Geometry, Rectangle, Style};

use crate::change::{Change, Edit};
use crate::error::TrellisError;
use crate::history::History;

/// Default bound on the number of edits the undo stack retains.
pub const DEFAULT_HISTORY_DEPTH: usize = 100;

pub struct GraphModel {
    cells: IndexMap<CellId, Cell>,
    root: CellId,
    next_id: u64,
    update_level: usize,
    current: Vec<Change>,
    committed: Vec<Edit>,
    history: History,
}

impl Default for GraphModel {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphModel {
    /// Creates an empty model holding only the root cell.
    pub fn new() -> Self {
        let root = CellId::new(0);
        let mut cells = IndexMap::new();
        cells.insert(root, Cell::new(root, CellKind::Vertex));
        Self {
            cells,
            root,
            next_id: 1,
            update_level: 0,
            current: Vec::new(),
            committed: Vec::new(),
            history: History::new(DEFAULT_HISTORY_DEPTH),
        }
    }

    /// Replaces the bounded undo history with one of the given depth.
    /// Existing history is dropped.
    pub fn set_history_depth(&mut self, max_depth: usize) {
        self.history = History::new(max_depth);
    }

    /// Drops all undo and redo state, keeping the model as it is.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn root(&self) -> CellId {
        self.root
    }

    // -------------------------------------------------------------------
    // Factory
    // -------------------------------------------------------------------

    fn allocate(&mut self, kind: CellKind) -> CellId {
        let id = CellId::new(self.next_id);
        self.next_id += 1;
        self.cells.insert(id, Cell::new(id, kind));
        id
    }

    /// Creates a detached vertex. The cell is inert until attached with
    /// [`GraphModel::add_child`] inside a transaction.
    pub fn create_vertex(
        &mut self,
        value: Option<CellValue>,
        geometry: Option<Geometry>,
        style: Style,
    ) -> CellId {
        let id = self.allocate(CellKind::Vertex);
        let cell = self.cells.get_mut(&id).expect("freshly allocated cell");
        cell.set_value(value);
        cell.set_geometry(geometry);
        cell.set_style(style);
        id
    }

    /// Creates a detached edge. Terminals are wired up with
    /// [`GraphModel::set_terminal`] after the edge is attached.
    pub fn create_edge(&mut self, value: Option<CellValue>, style: Style) -> CellId {
        let id = self.allocate(CellKind::Edge);
        let cell = self.cells.get_mut(&id).expect("freshly allocated cell");
        cell.set_value(value);
        cell.set_style(style);
        id
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(&id)
    }

    fn get(&self, id: CellId) -> Result<&Cell, TrellisError> {
        self.cells.get(&id).ok_or(TrellisError::NotFound(id))
    }

    /// Returns true if the id is known to the model, attached or not
    pub fn contains(&self, id: CellId) -> bool {
        self.cells.contains_key(&id)
    }

    /// Returns true if the cell is reachable from the root
    pub fn is_attached(&self, id: CellId) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.cells.get(&current).and_then(Cell::parent) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    pub fn parent(&self, id: CellId) -> Option<CellId> {
        self.cells.get(&id).and_then(Cell::parent)
    }

    pub fn children(&self, id: CellId) -> &[CellId] {
        self.cells.get(&id).map(Cell::children).unwrap_or(&[])
    }

    pub fn child_count(&self, id: CellId) -> usize {
        self.children(id).len()
    }

    pub fn is_vertex(&self, id: CellId) -> bool {
        self.cells.get(&id).is_some_and(Cell::is_vertex)
    }

    pub fn is_edge(&self, id: CellId) -> bool {
        self.cells.get(&id).is_some_and(Cell::is_edge)
    }

    /// Returns true if `ancestor` lies on the parent chain of `cell`,
    /// including the case `ancestor == cell`.
    pub fn is_ancestor(&self, ancestor: CellId, cell: CellId) -> bool {
        let mut current = Some(cell);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.cells.get(&id).and_then(Cell::parent);
        }
        false
    }

    pub fn terminal(&self, edge: CellId, is_source: bool) -> Option<CellId> {
        self.cells.get(&edge).and_then(|cell| cell.terminal(is_source))
    }

    /// Returns the terminal of `edge` opposite to the given cell
    pub fn opposite(&self, edge: CellId, terminal: CellId) -> Option<CellId> {
        let cell = self.cells.get(&edge)?;
        if cell.source() == Some(terminal) {
            cell.target()
        } else if cell.target() == Some(terminal) {
            cell.source()
        } else {
            None
        }
    }

    /// Edges that reference the cell as a terminal, attached or not
    pub fn connected_edges(&self, id: CellId) -> &[CellId] {
        self.cells.get(&id).map(Cell::edges).unwrap_or(&[])
    }

    /// Counts the attached edges leaving (or entering) a cell, optionally
    /// ignoring one edge. Used by multiplicity validation to exclude the
    /// connection under test.
    pub fn directed_edge_count(
        &self,
        cell: CellId,
        outgoing: bool,
        exclude: Option<CellId>,
    ) -> usize {
        self.connected_edges(cell)
            .iter()
            .filter(|&&edge| {
                Some(edge) != exclude && self.is_attached(edge) && {
                    let terminal = if outgoing {
                        self.cells[&edge].source()
                    } else {
                        self.cells[&edge].target()
                    };
                    terminal == Some(cell)
                }
            })
            .count()
    }

    /// Resolves a cell's geometry to absolute coordinates by folding the
    /// ancestor chain top-down, so relative cells are mapped through every
    /// relative ancestor. Returns `None` if the cell has no geometry.
    pub fn absolute_geometry(&self, cell: CellId) -> Option<Rectangle> {
        let mut chain = Vec::new();
        let mut current = Some(cell);
        while let Some(id) = current {
            chain.push(id);
            current = self.cells.get(&id)?.parent();
        }

        let mut parent_bounds = Rectangle::default();
        for id in chain.iter().rev() {
            match self.cells[id].geometry() {
                Some(geometry) => {
                    let bounds = geometry.resolve(parent_bounds);
                    if *id == cell {
                        return Some(bounds);
                    }
                    parent_bounds = bounds;
                }
                None if *id == cell => return None,
                // ancestors without geometry contribute no offset
                None => {}
            }
        }
        None
    }

    // -------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------

    /// Attaches a cell under a parent at the given z-order index, or appends
    /// when `index` is `None`. Reparenting is the same operation; the prior
    /// parent and index are recorded so undo restores the exact position.
    pub fn add_child(
        &mut self,
        parent: CellId,
        cell: CellId,
        index: Option<usize>,
    ) -> Result<(), TrellisError> {
        self.get(parent)?;
        self.get(cell)?;
        if self.is_ancestor(cell, parent) {
            return Err(TrellisError::Cycle { cell, parent });
        }

        let previous = self.cells[&cell].parent().map(|old_parent| {
            let old_index = self.cells[&old_parent]
                .child_index(cell)
                .expect("child is indexed under its parent");
            (old_parent, old_index)
        });
        let index = index.unwrap_or_else(|| {
            let count = self.cells[&parent].child_count();
            // a move within the same parent first vacates one slot
            if previous.map(|(p, _)| p) == Some(parent) {
                count.saturating_sub(1)
            } else {
                count
            }
        });

        self.execute(Change::Added {
            cell,
            parent,
            index,
            previous,
        });
        Ok(())
    }

    /// Detaches a cell and everything below it. Edges with a terminal inside
    /// the removed subtree are removed first, each as its own change, so
    /// undo restores them with terminals intact.
    pub fn remove_cell(&mut self, cell: CellId) -> Result<(), TrellisError> {
        let Some(parent) = self.get(cell)?.parent() else {
            return if cell == self.root {
                Err(TrellisError::RootRemoval)
            } else {
                Err(TrellisError::NotFound(cell))
            };
        };

        // collect the subtree with an explicit stack
        let mut subtree: IndexSet<CellId> = IndexSet::new();
        let mut stack = vec![cell];
        while let Some(id) = stack.pop() {
            if subtree.insert(id) {
                stack.extend(self.children(id).iter().copied());
            }
        }

        // edges that reference the subtree but live outside it
        let mut dangling: Vec<CellId> = Vec::new();
        for &member in &subtree {
            for &edge in self.cells[&member].edges() {
                if !subtree.contains(&edge)
                    && self.is_attached(edge)
                    && !dangling.contains(&edge)
                {
                    dangling.push(edge);
                }
            }
        }

        self.begin_update();
        for edge in &dangling {
            let edge_parent = self.cells[edge]
                .parent()
                .expect("attached edge has a parent");
            let index = self.cells[&edge_parent]
                .child_index(*edge)
                .expect("child is indexed under its parent");
            self.execute(Change::Removed {
                cell: *edge,
                parent: edge_parent,
                index,
            });
        }
        let index = self.cells[&parent]
            .child_index(cell)
            .expect("child is indexed under its parent");
        self.execute(Change::Removed {
            cell,
            parent,
            index,
        });
        self.end_update();

        debug!(cell = cell.raw(), descendants = subtree.len() - 1, edges = dangling.len();
            "Removed cell subtree");
        Ok(())
    }

    pub fn set_geometry(&mut self, cell: CellId, geometry: Geometry) -> Result<(), TrellisError> {
        let previous = self.get(cell)?.geometry().cloned();
        self.execute(Change::Geometry {
            cell,
            previous,
            next: Some(geometry),
        });
        Ok(())
    }

    pub fn set_style(&mut self, cell: CellId, style: Style) -> Result<(), TrellisError> {
        let previous = self.get(cell)?.style().clone();
        self.execute(Change::Style {
            cell,
            previous,
            next: style,
        });
        Ok(())
    }

    pub fn set_visible(&mut self, cell: CellId, visible: bool) -> Result<(), TrellisError> {
        let previous = self.get(cell)?.is_visible();
        self.execute(Change::Visible {
            cell,
            previous,
            next: visible,
        });
        Ok(())
    }

    pub fn set_collapsed(&mut self, cell: CellId, collapsed: bool) -> Result<(), TrellisError> {
        let previous = self.get(cell)?.is_collapsed();
        self.execute(Change::Collapsed {
            cell,
            previous,
            next: collapsed,
        });
        Ok(())
    }

    /// Rewires one terminal of an edge. `terminal: None` disconnects that
    /// end. Setting the value already present is a no-op and records no
    /// change.
    pub fn set_terminal(
        &mut self,
        edge: CellId,
        terminal: Option<CellId>,
        is_source: bool,
    ) -> Result<(), TrellisError> {
        let cell = self.get(edge)?;
        if !cell.is_edge() {
            return Err(TrellisError::NotAnEdge(edge));
        }
        let previous = cell.terminal(is_source);
        if let Some(t) = terminal {
            self.get(t)?;
        }
        if previous == terminal {
            return Ok(());
        }
        self.execute(Change::Terminal {
            edge,
            is_source,
            previous,
            next: terminal,
        });
        Ok(())
    }

    // -------------------------------------------------------------------
    // Transactions
    // -------------------------------------------------------------------

    pub fn begin_update(&mut self) {
        self.update_level += 1;
    }

    /// Closes one nesting level. When the outermost level closes with
    /// changes pending, they are committed as a single [`Edit`]: pushed on
    /// the undo stack (clearing redo) and queued for
    /// [`GraphModel::take_committed`].
    ///
    /// # Panics
    /// Panics when called more often than [`GraphModel::begin_update`];
    /// tolerating that silently would corrupt the undo history.
    pub fn end_update(&mut self) {
        assert!(
            self.update_level > 0,
            "end_update called without a matching begin_update"
        );
        self.update_level -= 1;
        if self.update_level == 0 && !self.current.is_empty() {
            let edit = Edit::new(std::mem::take(&mut self.current));
            trace!(changes = edit.len(); "Committed edit");
            self.history.commit(edit.clone());
            self.committed.push(edit);
        }
    }

    pub fn in_transaction(&self) -> bool {
        self.update_level > 0
    }

    /// Drains the edits committed since the last call. The graph facade
    /// turns each into one batched change event.
    pub fn take_committed(&mut self) -> Vec<Edit> {
        std::mem::take(&mut self.committed)
    }

    fn execute(&mut self, change: Change) {
        self.begin_update();
        self.apply(&change, false);
        self.current.push(change);
        self.end_update();
    }

    // -------------------------------------------------------------------
    // Undo / redo
    // -------------------------------------------------------------------

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Reverts the most recent edit by replaying its changes back to front
    /// with each change's inverse. Returns the edit for notification.
    ///
    /// # Panics
    /// Panics when a transaction is open; history must only move between
    /// consistent states.
    pub fn undo(&mut self) -> Option<Edit> {
        assert!(self.update_level == 0, "undo during an open transaction");
        let edit = self.history.pop_undo()?;
        for change in edit.changes().iter().rev() {
            self.apply(change, true);
        }
        self.history.push_redo(edit.clone());
        trace!(changes = edit.len(); "Undid edit");
        Some(edit)
    }

    /// Replays the most recently undone edit front to back.
    ///
    /// # Panics
    /// Panics when a transaction is open.
    pub fn redo(&mut self) -> Option<Edit> {
        assert!(self.update_level == 0, "redo during an open transaction");
        let edit = self.history.pop_redo()?;
        for change in edit.changes() {
            self.apply(change, false);
        }
        self.history.push_undo(edit.clone());
        trace!(changes = edit.len(); "Redid edit");
        Some(edit)
    }

    // -------------------------------------------------------------------
    // Change application
    // -------------------------------------------------------------------

    /// Applies a change record, or its inverse. This is the only place
    /// structure is edited; everything above only validates and records.
    fn apply(&mut self, change: &Change, invert: bool) {
        match *change {
            Change::Added {
                cell,
                parent,
                index,
                previous,
            } => {
                if !invert {
                    if let Some((old_parent, _)) = previous {
                        self.cell_mut(old_parent).remove_child(cell);
                    }
                    self.cell_mut(parent).insert_child(index, cell);
                    self.cell_mut(cell).set_parent(Some(parent));
                } else {
                    self.cell_mut(parent).remove_child(cell);
                    match previous {
                        Some((old_parent, old_index)) => {
                            self.cell_mut(old_parent).insert_child(old_index, cell);
                            self.cell_mut(cell).set_parent(Some(old_parent));
                        }
                        None => self.cell_mut(cell).set_parent(None),
                    }
                }
            }
            Change::Removed {
                cell,
                parent,
                index,
            } => {
                if !invert {
                    self.cell_mut(parent).remove_child(cell);
                    self.cell_mut(cell).set_parent(None);
                } else {
                    self.cell_mut(parent).insert_child(index, cell);
                    self.cell_mut(cell).set_parent(Some(parent));
                }
            }
            Change::Geometry {
                cell,
                ref previous,
                ref next,
            } => {
                let value = if invert { previous } else { next };
                self.cell_mut(cell).set_geometry(value.clone());
            }
            Change::Style {
                cell,
                ref previous,
                ref next,
            } => {
                let value = if invert { previous } else { next };
                self.cell_mut(cell).set_style(value.clone());
            }
            Change::Visible {
                cell,
                previous,
                next,
            } => {
                self.cell_mut(cell)
                    .set_visible(if invert { previous } else { next });
            }
            Change::Collapsed {
                cell,
                previous,
                next,
            } => {
                self.cell_mut(cell)
                    .set_collapsed(if invert { previous } else { next });
            }
            Change::Terminal {
                edge,
                is_source,
                previous,
                next,
            } => {
                let (from, to) = if invert { (next, previous) } else { (previous, next) };
                self.cell_mut(edge).set_terminal(to, is_source);
                if let Some(old) = from {
                    // keep the reverse index only while some terminal still
                    // points at the cell (self-loops share one entry)
                    let still_connected = {
                        let e = &self.cells[&edge];
                        e.source() == Some(old) || e.target() == Some(old)
                    };
                    if !still_connected {
                        self.cell_mut(old).remove_edge(edge);
                    }
                }
                if let Some(new) = to {
                    self.cell_mut(new).insert_edge(edge);
                }
            }
        }
    }

    fn cell_mut(&mut self, id: CellId) -> &mut Cell {
        self.cells.get_mut(&id).expect("change refers to a known cell")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::Point;

    fn vertex(model: &mut GraphModel) -> CellId {
        let id = model.create_vertex(
            None,
            Some(Geometry::new(Rectangle::new(0.0, 0.0, 10.0, 10.0))),
            Style::default(),
        );
        let root = model.root();
        model.add_child(root, id, None).unwrap();
        id
    }

    #[test]
    fn test_add_child_order_and_queries() {
        let mut model = GraphModel::new();
        let a = vertex(&mut model);
        let b = vertex(&mut model);
        let c = vertex(&mut model);

        assert_eq!(model.children(model.root()), &[a, b, c]);
        assert_eq!(model.child_count(model.root()), 3);
        assert_eq!(model.parent(a), Some(model.root()));
        assert!(model.is_vertex(a));
        assert!(!model.is_edge(a));
        assert!(model.is_attached(b));
    }

    #[test]
    fn test_add_child_at_index() {
        let mut model = GraphModel::new();
        let a = vertex(&mut model);
        let b = vertex(&mut model);
        let c = model.create_vertex(None, None, Style::default());
        model.add_child(model.root(), c, Some(1)).unwrap();
        assert_eq!(model.children(model.root()), &[a, c, b]);
    }

    #[test]
    fn test_reparent_records_previous_position() {
        let mut model = GraphModel::new();
        let a = vertex(&mut model);
        let b = vertex(&mut model);
        let child = model.create_vertex(None, None, Style::default());
        model.add_child(a, child, None).unwrap();

        model.add_child(b, child, None).unwrap();
        assert_eq!(model.parent(child), Some(b));
        assert!(model.children(a).is_empty());

        model.undo().unwrap();
        assert_eq!(model.parent(child), Some(a));
        assert_eq!(model.children(a), &[child]);
    }

    #[test]
    fn test_cycle_rejected_without_mutation() {
        let mut model = GraphModel::new();
        let a = vertex(&mut model);
        let b = model.create_vertex(None, None, Style::default());
        model.add_child(a, b, None).unwrap();

        // root -> a -> b; b may not become a's parent
        let err = model.add_child(b, a, None).unwrap_err();
        assert!(matches!(err, TrellisError::Cycle { .. }));
        assert_eq!(model.parent(a), Some(model.root()));
        assert_eq!(model.parent(b), Some(a));
        // a rejected operation records nothing
        assert!(model.take_committed().is_empty());

        // self-parenting is the degenerate cycle
        assert!(matches!(
            model.add_child(a, a, None),
            Err(TrellisError::Cycle { .. })
        ));
    }

    #[test]
    fn test_missing_cell_rejected() {
        let mut model = GraphModel::new();
        let ghost = CellId::new(999);
        assert!(matches!(
            model.add_child(model.root(), ghost, None),
            Err(TrellisError::NotFound(_))
        ));
        assert!(matches!(
            model.set_visible(ghost, false),
            Err(TrellisError::NotFound(_))
        ));
    }

    #[test]
    fn test_terminal_maintains_reverse_index() {
        let mut model = GraphModel::new();
        let a = vertex(&mut model);
        let b = vertex(&mut model);
        let edge = model.create_edge(None, Style::default());
        model.add_child(model.root(), edge, None).unwrap();

        model.set_terminal(edge, Some(a), true).unwrap();
        model.set_terminal(edge, Some(b), false).unwrap();
        assert_eq!(model.terminal(edge, true), Some(a));
        assert_eq!(model.opposite(edge, a), Some(b));
        assert_eq!(model.connected_edges(a), &[edge]);
        assert_eq!(model.directed_edge_count(a, true, None), 1);
        assert_eq!(model.directed_edge_count(a, false, None), 0);
        assert_eq!(model.directed_edge_count(b, false, None), 1);

        model.set_terminal(edge, None, true).unwrap();
        assert!(model.connected_edges(a).is_empty());
        assert_eq!(model.connected_edges(b), &[edge]);
    }

    #[test]
    fn test_self_loop_reverse_index() {
        let mut model = GraphModel::new();
        let a = vertex(&mut model);
        let edge = model.create_edge(None, Style::default());
        model.add_child(model.root(), edge, None).unwrap();
        model.set_terminal(edge, Some(a), true).unwrap();
        model.set_terminal(edge, Some(a), false).unwrap();
        assert_eq!(model.connected_edges(a), &[edge]);

        // clearing one end keeps the entry for the other
        model.set_terminal(edge, None, true).unwrap();
        assert_eq!(model.connected_edges(a), &[edge]);
        model.set_terminal(edge, None, false).unwrap();
        assert!(model.connected_edges(a).is_empty());
    }

    #[test]
    fn test_remove_cascades_to_connected_edges() {
        let mut model = GraphModel::new();
        let a = vertex(&mut model);
        let b = vertex(&mut model);
        let edge = model.create_edge(None, Style::default());
        model.add_child(model.root(), edge, None).unwrap();
        model.set_terminal(edge, Some(a), true).unwrap();
        model.set_terminal(edge, Some(b), false).unwrap();
        model.take_committed();

        model.remove_cell(a).unwrap();
        assert!(!model.is_attached(a));
        assert!(!model.is_attached(edge));
        assert!(model.is_attached(b));
        // one edit covering both removals
        let committed = model.take_committed();
        assert_eq!(committed.len(), 1);
        assert_eq!(committed[0].len(), 2);

        model.undo().unwrap();
        assert!(model.is_attached(a));
        assert!(model.is_attached(edge));
        assert_eq!(model.terminal(edge, true), Some(a));
    }

    #[test]
    fn test_remove_subtree_keeps_internal_structure() {
        let mut model = GraphModel::new();
        let a = vertex(&mut model);
        let child = model.create_vertex(None, None, Style::default());
        model.add_child(a, child, None).unwrap();

        model.remove_cell(a).unwrap();
        assert!(!model.is_attached(child));
        // the detached subtree keeps its shape for undo
        assert_eq!(model.parent(child), Some(a));

        model.undo().unwrap();
        assert!(model.is_attached(child));
    }

    #[test]
    fn test_remove_root_rejected() {
        let mut model = GraphModel::new();
        let root = model.root();
        assert!(matches!(
            model.remove_cell(root),
            Err(TrellisError::RootRemoval)
        ));
    }

    #[test]
    fn test_nested_transaction_commits_once() {
        let mut model = GraphModel::new();
        let a = vertex(&mut model);
        model.take_committed();

        model.begin_update();
        model.set_visible(a, false).unwrap();
        model.begin_update();
        model.set_collapsed(a, true).unwrap();
        model.end_update();
        assert!(model.take_committed().is_empty());
        model.set_visible(a, true).unwrap();
        model.end_update();

        let committed = model.take_committed();
        assert_eq!(committed.len(), 1);
        let kinds: Vec<CellId> = committed[0].changes().iter().map(Change::cell).collect();
        assert_eq!(kinds, vec![a, a, a]);
        assert!(model.is_visible_cell(a));
    }

    #[test]
    #[should_panic(expected = "end_update called without a matching begin_update")]
    fn test_unbalanced_end_update_panics() {
        let mut model = GraphModel::new();
        model.end_update();
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut model = GraphModel::new();
        let a = vertex(&mut model);
        let before = model.cell(a).unwrap().clone();

        model.begin_update();
        model
            .set_geometry(a, Geometry::new(Rectangle::new(5.0, 6.0, 20.0, 30.0)))
            .unwrap();
        model
            .set_style(a, Style::new().with("label", "renamed"))
            .unwrap();
        model.set_visible(a, false).unwrap();
        model.end_update();
        let after = model.cell(a).unwrap().clone();

        model.undo().unwrap();
        assert_eq!(model.cell(a).unwrap(), &before);
        model.redo().unwrap();
        assert_eq!(model.cell(a).unwrap(), &after);
        model.undo().unwrap();
        assert_eq!(model.cell(a).unwrap(), &before);
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut model = GraphModel::new();
        let a = vertex(&mut model);
        model.set_visible(a, false).unwrap();
        model.undo().unwrap();
        assert!(model.can_redo());
        model.set_collapsed(a, true).unwrap();
        assert!(!model.can_redo());
    }

    #[test]
    fn test_absolute_geometry_resolves_relative_chain() {
        let mut model = GraphModel::new();
        let parent = model.create_vertex(
            None,
            Some(Geometry::new(Rectangle::new(100.0, 50.0, 200.0, 80.0))),
            Style::default(),
        );
        model.add_child(model.root(), parent, None).unwrap();
        let child = model.create_vertex(
            None,
            Some(Geometry::new_relative(
                Rectangle::new(0.5, 0.5, 20.0, 10.0),
                Some(Point::new(1.0, 2.0)),
            )),
            Style::default(),
        );
        model.add_child(parent, child, None).unwrap();

        let bounds = model.absolute_geometry(child).unwrap();
        assert_eq!(bounds.x(), 100.0 + 100.0 + 1.0);
        assert_eq!(bounds.y(), 50.0 + 40.0 + 2.0);
        assert_eq!(bounds.width(), 20.0);
    }

    impl GraphModel {
        fn is_visible_cell(&self, id: CellId) -> bool {
            self.cell(id).is_some_and(Cell::is_visible)
        }
    }
}
