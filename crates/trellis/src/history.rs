//! Undo/redo stacks over committed [`Edit`]s.

use crate::change::Edit;

/// Bounded undo/redo history.
///
/// Committing a new edit clears the redo stack; once the undo stack exceeds
/// the configured depth the oldest edit is dropped.
#[derive(Debug)]
pub struct History {
    undo: Vec<Edit>,
    redo: Vec<Edit>,
    max_depth: usize,
}

impl History {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            max_depth,
        }
    }

    /// Records a freshly committed edit, invalidating any redo state
    pub fn commit(&mut self, edit: Edit) {
        self.redo.clear();
        self.undo.push(edit);
        if self.undo.len() > self.max_depth {
            self.undo.remove(0);
        }
    }

    /// Takes the most recent edit off the undo stack
    pub fn pop_undo(&mut self) -> Option<Edit> {
        self.undo.pop()
    }

    /// Parks an undone edit so it can be redone
    pub fn push_redo(&mut self, edit: Edit) {
        self.redo.push(edit);
    }

    /// Takes the most recently undone edit off the redo stack
    pub fn pop_redo(&mut self) -> Option<Edit> {
        self.redo.pop()
    }

    /// Returns a redone edit to the undo stack without clearing redo state
    pub fn push_undo(&mut self, edit: Edit) {
        self.undo.push(edit);
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(100)
    }
}
