//! Declarative connection rules.
//!
//! A [`Multiplicity`] constrains how many edges of a kind may attach to a
//! terminal, and which neighbor types the terminal may connect to. Rules are
//! advisory: [`crate::Graph::validate_connection`] evaluates every rule and
//! returns the joined error strings, it never blocks the mutation itself.

use trellis_core::{Cell, CellId};

use crate::model::GraphModel;

/// One connection rule.
///
/// A rule applies to a prospective connection when the terminal it targets
/// (source when `source` is true, target otherwise) matches `type_name` and,
/// if set, carries the given attribute value.
#[derive(Debug, Clone)]
pub struct Multiplicity {
    source: bool,
    type_name: String,
    attr: Option<(String, String)>,
    min: u32,
    max: Option<u32>,
    valid_neighbors: Vec<String>,
    /// When false, `valid_neighbors` is a deny list instead of an allow list.
    valid_neighbors_allowed: bool,
    count_error: String,
    type_error: String,
}

impl Multiplicity {
    pub fn new(
        source: bool,
        type_name: impl Into<String>,
        min: u32,
        max: Option<u32>,
        valid_neighbors: Vec<String>,
        count_error: impl Into<String>,
        type_error: impl Into<String>,
    ) -> Self {
        Self {
            source,
            type_name: type_name.into(),
            attr: None,
            min,
            max,
            valid_neighbors,
            valid_neighbors_allowed: true,
            count_error: count_error.into(),
            type_error: type_error.into(),
        }
    }

    /// Narrows the rule to terminals carrying the given attribute value.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attr = Some((key.into(), value.into()));
        self
    }

    /// Turns the neighbor list into a deny list.
    pub fn deny_neighbors(mut self) -> Self {
        self.valid_neighbors_allowed = false;
        self
    }

    pub fn is_source_rule(&self) -> bool {
        self.source
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    fn matches_terminal(&self, cell: &Cell) -> bool {
        let Some(value) = cell.value() else {
            return false;
        };
        if !value.is_type(&self.type_name) {
            return false;
        }
        match &self.attr {
            Some((key, expected)) => value.attribute(key) == Some(expected),
            None => true,
        }
    }

    fn matches_neighbor(&self, cell: &Cell) -> bool {
        let Some(value) = cell.value() else {
            return false;
        };
        self.valid_neighbors
            .iter()
            .any(|name| value.is_type(name))
    }

    /// Evaluates the rule for a prospective source/target pair.
    ///
    /// `source_out` and `target_in` are the terminal's current directed edge
    /// counts with the connection under test already excluded. Returns the
    /// rule's error string when violated, `None` when satisfied or when the
    /// rule does not apply.
    pub fn check(
        &self,
        model: &GraphModel,
        source: CellId,
        target: CellId,
        source_out: usize,
        target_in: usize,
    ) -> Option<String> {
        let (terminal, neighbor) = if self.source {
            (source, target)
        } else {
            (target, source)
        };
        let terminal_cell = model.cell(terminal)?;
        if !self.matches_terminal(terminal_cell) {
            return None;
        }

        let mut errors = String::new();
        let count = if self.source { source_out } else { target_in };
        if self.max.is_some_and(|max| count >= max as usize) {
            errors.push_str(&self.count_error);
            errors.push('\n');
        }
        if !self.valid_neighbors.is_empty() {
            if let Some(neighbor_cell) = model.cell(neighbor) {
                if self.matches_neighbor(neighbor_cell) != self.valid_neighbors_allowed {
                    errors.push_str(&self.type_error);
                    errors.push('\n');
                }
            }
        }

        if errors.is_empty() { None } else { Some(errors) }
    }

    /// Checks the lower bound for a terminal that already exists in the
    /// model. Used by whole-graph validation rather than per-connection
    /// checks.
    pub fn check_minimum(&self, model: &GraphModel, terminal: CellId) -> Option<String> {
        let cell = model.cell(terminal)?;
        if !self.matches_terminal(cell) {
            return None;
        }
        let count = model.directed_edge_count(terminal, self.source, None);
        if count < self.min as usize {
            Some(self.count_error.clone())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::{CellValue, Style};

    fn typed_vertex(model: &mut GraphModel, type_name: &str) -> CellId {
        let id = model.create_vertex(Some(CellValue::new(type_name)), None, Style::default());
        let root = model.root();
        model.add_child(root, id, None).unwrap();
        id
    }

    fn rectangle_to_circle(max: Option<u32>) -> Multiplicity {
        Multiplicity::new(
            true,
            "rectangle",
            0,
            max,
            vec!["circle".to_owned()],
            "too many outgoing edges".to_owned(),
            "rectangles may only connect to circles".to_owned(),
        )
    }

    #[test]
    fn test_rule_ignores_other_types() {
        let mut model = GraphModel::new();
        let a = typed_vertex(&mut model, "triangle");
        let b = typed_vertex(&mut model, "circle");
        assert_eq!(rectangle_to_circle(Some(1)).check(&model, a, b, 0, 0), None);
    }

    #[test]
    fn test_max_violation() {
        let mut model = GraphModel::new();
        let a = typed_vertex(&mut model, "rectangle");
        let b = typed_vertex(&mut model, "circle");
        let rule = rectangle_to_circle(Some(2));
        assert_eq!(rule.check(&model, a, b, 1, 0), None);
        let error = rule.check(&model, a, b, 2, 0).unwrap();
        assert!(error.contains("too many outgoing edges"));
    }

    #[test]
    fn test_neighbor_allow_list() {
        let mut model = GraphModel::new();
        let a = typed_vertex(&mut model, "rectangle");
        let b = typed_vertex(&mut model, "triangle");
        let error = rectangle_to_circle(None).check(&model, a, b, 0, 0).unwrap();
        assert!(error.contains("only connect to circles"));
    }

    #[test]
    fn test_neighbor_deny_list() {
        let mut model = GraphModel::new();
        let a = typed_vertex(&mut model, "rectangle");
        let b = typed_vertex(&mut model, "circle");
        let rule = rectangle_to_circle(None).deny_neighbors();
        assert!(rule.check(&model, a, b, 0, 0).is_some());
    }

    #[test]
    fn test_attribute_scoping() {
        let mut model = GraphModel::new();
        let plain = typed_vertex(&mut model, "rectangle");
        let tagged = model.create_vertex(
            Some(CellValue::new("rectangle").with_attribute("role", "hub")),
            None,
            Style::default(),
        );
        let root = model.root();
        model.add_child(root, tagged, None).unwrap();
        let b = typed_vertex(&mut model, "triangle");

        let rule = rectangle_to_circle(None).with_attribute("role", "hub");
        assert_eq!(rule.check(&model, plain, b, 0, 0), None);
        assert!(rule.check(&model, tagged, b, 0, 0).is_some());
    }

    #[test]
    fn test_minimum_check() {
        let mut model = GraphModel::new();
        let a = typed_vertex(&mut model, "rectangle");
        let rule = Multiplicity::new(
            true,
            "rectangle",
            1,
            None,
            Vec::new(),
            "rectangle needs an outgoing edge".to_owned(),
            String::new(),
        );
        assert!(rule.check_minimum(&model, a).is_some());

        let b = typed_vertex(&mut model, "circle");
        let edge = model.create_edge(None, Style::default());
        let root = model.root();
        model.add_child(root, edge, None).unwrap();
        model.set_terminal(edge, Some(a), true).unwrap();
        model.set_terminal(edge, Some(b), false).unwrap();
        assert_eq!(rule.check_minimum(&model, a), None);
    }
}
