//! Which board cells are done
//!
//! A cell is *resolved* once someone answered it correctly (directly or by
//! stealing). A cell can also be *closed* without a score when every steal
//! attempt failed and the session is configured to lock such cells. Both are
//! terminal for the rest of the session.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// (category name, board index)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellKey {
    pub category: String,
    pub index: usize,
}

impl CellKey {
    pub fn new(category: impl Into<String>, index: usize) -> Self {
        Self {
            category: category.into(),
            index,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardState {
    resolved: HashSet<CellKey>,
    closed: HashSet<CellKey>,
}

impl BoardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_resolved(&self, category: &str, index: usize) -> bool {
        self.resolved.contains(&CellKey::new(category, index))
    }

    /// Idempotent
    pub fn resolve(&mut self, category: &str, index: usize) {
        let key = CellKey::new(category, index);
        self.closed.remove(&key);
        self.resolved.insert(key);
    }

    pub fn is_closed(&self, category: &str, index: usize) -> bool {
        self.closed.contains(&CellKey::new(category, index))
    }

    /// Lock a cell without a score. No effect on a resolved cell.
    pub fn close_unscored(&mut self, category: &str, index: usize) {
        let key = CellKey::new(category, index);
        if !self.resolved.contains(&key) {
            self.closed.insert(key);
        }
    }

    /// Resolved or closed; either way it cannot be opened again
    pub fn is_locked(&self, category: &str, index: usize) -> bool {
        let key = CellKey::new(category, index);
        self.resolved.contains(&key) || self.closed.contains(&key)
    }

    pub fn resolved_count(&self) -> usize {
        self.resolved.len()
    }

    pub fn locked_count(&self) -> usize {
        self.resolved.len() + self.closed.len()
    }

    pub fn all_resolved(&self, total_questions: usize) -> bool {
        self.resolved.len() == total_questions
    }

    /// Every cell is resolved or closed
    pub fn is_complete(&self, total_questions: usize) -> bool {
        self.locked_count() == total_questions
    }
}
