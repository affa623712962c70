//! Atomic, reversible mutation records.
//!
//! Every model mutation produces exactly one [`Change`] carrying the prior
//! and the new value, which is enough to replay the operation in either
//! direction. A burst of changes committed by one top-level transaction is
//! aggregated into an [`Edit`], the unit the undo stack works with.

use serde::{Deserialize, Serialize};

use trellis_core::{CellId, Geometry, Style};

/// One reversible mutation of the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Change {
    /// A cell was attached to (or moved under) a parent at a z-order index.
    /// `previous` holds the old parent and index when this was a move.
    Added {
        cell: CellId,
        parent: CellId,
        index: usize,
        previous: Option<(CellId, usize)>,
    },

    /// A cell was detached from its parent. Descendants travel with it; the
    /// cell keeps its internal structure so the inverse can reattach it.
    Removed {
        cell: CellId,
        parent: CellId,
        index: usize,
    },

    Geometry {
        cell: CellId,
        previous: Option<Geometry>,
        next: Option<Geometry>,
    },

    Style {
        cell: CellId,
        previous: Style,
        next: Style,
    },

    Visible {
        cell: CellId,
        previous: bool,
        next: bool,
    },

    Collapsed {
        cell: CellId,
        previous: bool,
        next: bool,
    },

    /// An edge terminal was rewired. `is_source` selects which end.
    Terminal {
        edge: CellId,
        is_source: bool,
        previous: Option<CellId>,
        next: Option<CellId>,
    },
}

impl Change {
    /// The cell this change affects
    pub fn cell(&self) -> CellId {
        match self {
            Change::Added { cell, .. }
            | Change::Removed { cell, .. }
            | Change::Geometry { cell, .. }
            | Change::Style { cell, .. }
            | Change::Visible { cell, .. }
            | Change::Collapsed { cell, .. } => *cell,
            Change::Terminal { edge, .. } => *edge,
        }
    }
}

/// The aggregated, reversible unit produced by one top-level transaction.
///
/// Changes are kept in the chronological order they were applied; undo
/// replays their inverses back to front, redo replays them front to back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edit {
    changes: Vec<Change>,
}

impl Edit {
    pub fn new(changes: Vec<Change>) -> Self {
        Self { changes }
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}
