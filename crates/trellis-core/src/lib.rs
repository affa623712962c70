//! Core value types for Trellis diagram models.
//!
//! This crate holds the plain data the model and layout crates operate on:
//! geometry primitives, cell structures, styles, and typed cell values.
//! It has no model logic of its own.

mod cell;
mod geometry;
mod style;

pub use cell::{Cell, CellId, CellKind, CellValue};
pub use geometry::{Geometry, Point, Rectangle};
pub use style::{SHAPE_SWIMLANE, Style, StyleValue, keys};
