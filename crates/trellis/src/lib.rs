//! Trellis - a transactional diagram graph with reactive layouts.
//!
//! The heart of the crate is [`Graph`]: a single-rooted hierarchy of cells
//! (vertices and edges) whose every mutation is recorded, undoable, and
//! observable. On top of that sit declarative connection rules
//! ([`Multiplicity`]) and a family of layouts ([`layout`] module) that keep
//! swimlanes consistent and arrange trees in compact or radial form.
//!
//! # Examples
//!
//! ```rust
//! use trellis::{EventKind, Graph};
//! use trellis_core::{Geometry, Rectangle, Style};
//!
//! let mut graph = Graph::new();
//! let root = graph.root();
//!
//! let a = graph
//!     .insert_vertex(
//!         root,
//!         None,
//!         Geometry::new(Rectangle::new(0.0, 0.0, 80.0, 40.0)),
//!         Style::default(),
//!     )
//!     .expect("root should accept children");
//! let b = graph
//!     .insert_vertex(
//!         root,
//!         None,
//!         Geometry::new(Rectangle::new(200.0, 0.0, 80.0, 40.0)),
//!         Style::default(),
//!     )
//!     .expect("root should accept children");
//! let edge = graph
//!     .insert_edge(root, None, Style::default(), a, b)
//!     .expect("terminals should exist");
//!
//! // mutations batched in one update commit as a single undoable edit
//! graph.update(|g| {
//!     g.set_visible(a, false).unwrap();
//!     g.set_collapsed(b, true).unwrap();
//! });
//! graph.undo();
//! assert!(graph.model().cell(a).unwrap().is_visible());
//! assert_eq!(graph.model().terminal(edge, true), Some(a));
//! ```

mod change;
mod error;
mod event;
mod graph;
mod history;
mod model;
mod multiplicity;

pub mod layout;

pub use change::{Change, Edit};
pub use error::TrellisError;
pub use event::{EventKind, GraphEvent, GraphListener, ListenerId};
pub use graph::{Graph, DEFAULT_START_SIZE};
pub use model::{GraphModel, DEFAULT_HISTORY_DEPTH};
pub use multiplicity::Multiplicity;
