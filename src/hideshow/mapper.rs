//! The hidden-index set of one axis of one layer.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::translate::{shift_for_delete, shift_for_insert};

/// Indexes a layer is suppressing on one axis.
///
/// Indexes are not validated against the layer beneath: an index that does not
/// exist there simply never matches anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexPositionMapper {
    hidden: BTreeSet<usize>,
}

impl IndexPositionMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hide `indexes`; returns the ones that were not hidden yet, ascending.
    pub fn hide(&mut self, indexes: impl IntoIterator<Item = usize>) -> Vec<usize> {
        let mut newly: Vec<usize> = indexes
            .into_iter()
            .filter(|&index| self.hidden.insert(index))
            .collect();
        newly.sort_unstable();
        newly
    }

    /// Show `indexes`; returns the ones that actually were hidden, ascending.
    pub fn show(&mut self, indexes: impl IntoIterator<Item = usize>) -> Vec<usize> {
        let mut shown: Vec<usize> = indexes
            .into_iter()
            .filter(|index| self.hidden.remove(index))
            .collect();
        shown.sort_unstable();
        shown
    }

    /// Show everything; returns what was hidden.
    pub fn show_all(&mut self) -> Vec<usize> {
        std::mem::take(&mut self.hidden).into_iter().collect()
    }

    /// Replace the whole set; returns whether it changed.
    pub fn replace(&mut self, hidden: BTreeSet<usize>) -> bool {
        if self.hidden == hidden {
            return false;
        }
        self.hidden = hidden;
        true
    }

    pub fn is_hidden(&self, index: usize) -> bool {
        self.hidden.contains(&index)
    }

    /// Hidden indexes, ascending.
    pub fn hidden_indexes(&self) -> Vec<usize> {
        self.hidden.iter().copied().collect()
    }

    pub(crate) fn hidden_set(&self) -> &BTreeSet<usize> {
        &self.hidden
    }

    pub fn has_hidden(&self) -> bool {
        !self.hidden.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hidden.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hidden.is_empty()
    }

    /// Drop deleted indexes and shift the rest down.
    pub(crate) fn apply_delete(&mut self, deleted: &[usize]) {
        self.hidden = shift_for_delete(self.hidden.iter().copied(), deleted)
            .into_iter()
            .collect();
    }

    /// Shift indexes up past inserted ones.
    pub(crate) fn apply_insert(&mut self, inserted: &[usize]) {
        self.hidden = self
            .hidden
            .iter()
            .map(|&index| shift_for_insert(index, inserted))
            .collect();
    }
}
