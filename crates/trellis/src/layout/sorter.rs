//! Weighted ordering of cells during layout.

use std::cmp::Ordering;

use trellis_core::CellId;

/// A cell paired with the weight a layout sorts it by.
///
/// Sorting is descending by weight. The `nudge` flag breaks ties: a nudged
/// entry sorts before an equal-weighted unnudged one, which lets a layout
/// bias freshly moved cells toward the front of their rank without changing
/// their weight. `visited` and `rank_index` are scratch state for the layout
/// that owns the sorter list.
#[derive(Debug, Clone)]
pub struct WeightedCellSorter {
    cell: CellId,
    weighted_value: f64,
    nudge: bool,
    visited: bool,
    rank_index: Option<usize>,
}

impl WeightedCellSorter {
    pub fn new(cell: CellId, weighted_value: f64) -> Self {
        Self {
            cell,
            weighted_value,
            nudge: false,
            visited: false,
            rank_index: None,
        }
    }

    pub fn cell(&self) -> CellId {
        self.cell
    }

    pub fn weighted_value(&self) -> f64 {
        self.weighted_value
    }

    pub fn set_weighted_value(&mut self, value: f64) {
        self.weighted_value = value;
    }

    pub fn is_nudged(&self) -> bool {
        self.nudge
    }

    pub fn set_nudge(&mut self, nudge: bool) {
        self.nudge = nudge;
    }

    pub fn is_visited(&self) -> bool {
        self.visited
    }

    pub fn set_visited(&mut self, visited: bool) {
        self.visited = visited;
    }

    pub fn rank_index(&self) -> Option<usize> {
        self.rank_index
    }

    pub fn set_rank_index(&mut self, index: Option<usize>) {
        self.rank_index = index;
    }

    /// Comparator for descending weight order with nudge tie-breaking.
    ///
    /// Entries with equal weight and equal nudge state compare `Equal`, so
    /// a stable sort keeps them in input order.
    pub fn compare(a: &Self, b: &Self) -> Ordering {
        b.weighted_value
            .partial_cmp(&a.weighted_value)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.nudge.cmp(&a.nudge))
    }
}

/// Sorts a slice into descending weight order.
pub fn sort_by_weight(entries: &mut [WeightedCellSorter]) {
    entries.sort_by(WeightedCellSorter::compare);
}
