//! Error types for model and layout operations.
//!
//! Structural violations are detected before any change record is created,
//! so a failed operation leaves the model untouched. Multiplicity violations
//! are not errors; they are advisory strings returned by
//! [`crate::Graph::validate_connection`]. An unbalanced transaction is a
//! programmer error and panics instead of surfacing here.

use thiserror::Error;

use trellis_core::CellId;

/// The main error type for Trellis operations.
#[derive(Debug, Error)]
pub enum TrellisError {
    #[error("cell {0} is not part of the model")]
    NotFound(CellId),

    #[error("attaching {cell} under {parent} would create a cycle")]
    Cycle { cell: CellId, parent: CellId },

    #[error("cell {0} is not an edge")]
    NotAnEdge(CellId),

    #[error("the root cell cannot be removed")]
    RootRemoval,

    #[error("layout error: {0}")]
    Layout(String),
}
