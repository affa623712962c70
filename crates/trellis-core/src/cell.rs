use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::geometry::Geometry;
use crate::style::Style;

/// Opaque identifier of a cell within one model instance.
///
/// Ids are assigned by the model's factory methods and are never reused,
/// so a change record can refer to a removed cell until the history that
/// mentions it is dropped.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CellId(u64);

impl CellId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for CellId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Discriminates the two cell roles in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellKind {
    Vertex,
    Edge,
}

/// Typed user payload carried by a cell.
///
/// Multiplicity rules match against the type name and the attribute map;
/// everything else treats the value as opaque.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellValue {
    type_name: String,
    attributes: IndexMap<String, String>,
}

impl CellValue {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            attributes: IndexMap::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns true if the payload has the given type name
    pub fn is_type(&self, type_name: &str) -> bool {
        self.type_name == type_name
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// A node in the cell hierarchy: either a vertex or an edge.
///
/// Parent/child links form a single-rooted tree whose child order defines
/// z-order. Edge terminals are weak references into that tree; they are the
/// one place the structure is a general graph. The `edges` list is the
/// reverse index of terminal references and is maintained by the model, not
/// by callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    id: CellId,
    kind: CellKind,
    value: Option<CellValue>,
    geometry: Option<Geometry>,
    style: Style,
    visible: bool,
    collapsed: bool,
    parent: Option<CellId>,
    children: Vec<CellId>,
    source: Option<CellId>,
    target: Option<CellId>,
    edges: Vec<CellId>,
}

impl Cell {
    /// Creates a detached cell. Use the model factories instead of calling
    /// this directly; a cell is inert until attached inside a transaction.
    pub fn new(id: CellId, kind: CellKind) -> Self {
        Self {
            id,
            kind,
            value: None,
            geometry: None,
            style: Style::default(),
            visible: true,
            collapsed: false,
            parent: None,
            children: Vec::new(),
            source: None,
            target: None,
            edges: Vec::new(),
        }
    }

    pub fn id(&self) -> CellId {
        self.id
    }

    pub fn kind(&self) -> CellKind {
        self.kind
    }

    pub fn is_vertex(&self) -> bool {
        self.kind == CellKind::Vertex
    }

    pub fn is_edge(&self) -> bool {
        self.kind == CellKind::Edge
    }

    pub fn value(&self) -> Option<&CellValue> {
        self.value.as_ref()
    }

    pub fn set_value(&mut self, value: Option<CellValue>) {
        self.value = value;
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    pub fn set_geometry(&mut self, geometry: Option<Geometry>) {
        self.geometry = geometry;
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn set_collapsed(&mut self, collapsed: bool) {
        self.collapsed = collapsed;
    }

    pub fn parent(&self) -> Option<CellId> {
        self.parent
    }

    pub fn set_parent(&mut self, parent: Option<CellId>) {
        self.parent = parent;
    }

    pub fn children(&self) -> &[CellId] {
        &self.children
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Inserts a child at the given index, clamped to the child count
    pub fn insert_child(&mut self, index: usize, child: CellId) {
        let index = index.min(self.children.len());
        self.children.insert(index, child);
    }

    /// Removes a child, returning its former index
    pub fn remove_child(&mut self, child: CellId) -> Option<usize> {
        let index = self.children.iter().position(|&c| c == child)?;
        self.children.remove(index);
        Some(index)
    }

    /// Returns the position of a child in z-order
    pub fn child_index(&self, child: CellId) -> Option<usize> {
        self.children.iter().position(|&c| c == child)
    }

    pub fn source(&self) -> Option<CellId> {
        self.source
    }

    pub fn target(&self) -> Option<CellId> {
        self.target
    }

    /// Returns the source or target terminal
    pub fn terminal(&self, is_source: bool) -> Option<CellId> {
        if is_source { self.source } else { self.target }
    }

    pub fn set_terminal(&mut self, terminal: Option<CellId>, is_source: bool) {
        if is_source {
            self.source = terminal;
        } else {
            self.target = terminal;
        }
    }

    /// Edges that reference this cell as a terminal
    pub fn edges(&self) -> &[CellId] {
        &self.edges
    }

    /// Records an edge as connected to this cell; keeps the list duplicate-free
    pub fn insert_edge(&mut self, edge: CellId) {
        if !self.edges.contains(&edge) {
            self.edges.push(edge);
        }
    }

    /// Forgets an edge previously connected to this cell
    pub fn remove_edge(&mut self, edge: CellId) {
        self.edges.retain(|&e| e != edge);
    }
}
