use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Well-known style keys understood by the model and the layout family.
pub mod keys {
    /// Shape name; cells with the value `"swimlane"` are treated as lanes.
    pub const SHAPE: &str = "shape";
    /// Orientation override for swimlanes.
    pub const HORIZONTAL: &str = "horizontal";
    /// Size of the swimlane header along its main axis.
    pub const START_SIZE: &str = "startSize";
}

/// Shape value marking a cell as a swimlane.
pub const SHAPE_SWIMLANE: &str = "swimlane";

/// A single typed style entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StyleValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl From<bool> for StyleValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// An ordered map of style keys to typed values.
///
/// Iteration order is insertion order, so rewriting a style inside a
/// transaction and undoing it restores the exact same map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Style {
    entries: IndexMap<String, StyleValue>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a style entry, replacing any previous value for the key
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<StyleValue>) -> &mut Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Builder-style variant of [`Style::set`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<StyleValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Returns the raw entry for a key
    pub fn get(&self, key: &str) -> Option<&StyleValue> {
        self.entries.get(key)
    }

    /// Returns a boolean entry, or the default if absent or not a bool
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.entries.get(key) {
            Some(StyleValue::Bool(value)) => *value,
            _ => default,
        }
    }

    /// Returns a numeric entry, or the default if absent or not a number
    pub fn get_number(&self, key: &str, default: f64) -> f64 {
        match self.entries.get(key) {
            Some(StyleValue::Number(value)) => *value,
            _ => default,
        }
    }

    /// Returns a text entry if present
    pub fn get_text(&self, key: &str) -> Option<&str> {
        match self.entries.get(key) {
            Some(StyleValue::Text(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns true if no entries are set
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}
