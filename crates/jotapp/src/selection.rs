//! Ephemeral id sets: the bulk selection, favorites and pins.
//!
//! None of these survive a restart. They are held by the
//! [`Notebook`](crate::api::Notebook), which removes a deleted note's id from all
//! of them in the same call that removes the note.

use crate::model::NoteId;
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdSet {
    ids: HashSet<NoteId>,
}

impl IdSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &NoteId) -> bool {
        self.ids.contains(id)
    }

    pub fn insert(&mut self, id: NoteId) -> bool {
        self.ids.insert(id)
    }

    pub fn remove(&mut self, id: &NoteId) -> bool {
        self.ids.remove(id)
    }

    /// Adds the id if absent, removes it if present. Returns the new membership.
    pub fn toggle(&mut self, id: &NoteId) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.clone());
            true
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NoteId> {
        self.ids.iter()
    }
}

impl FromIterator<NoteId> for IdSet {
    fn from_iter<T: IntoIterator<Item = NoteId>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// Tracks which notes are selected for bulk operations.
#[derive(Debug, Clone, Default)]
pub struct SelectionManager {
    selected: IdSet,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, id: &NoteId) -> bool {
        self.selected.toggle(id)
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Replaces the selection with exactly the given (visible) ids.
    pub fn select_all<I>(&mut self, visible: I)
    where
        I: IntoIterator<Item = NoteId>,
    {
        self.selected = visible.into_iter().collect();
    }

    pub fn remove(&mut self, id: &NoteId) -> bool {
        self.selected.remove(id)
    }

    pub fn is_selected(&self, id: &NoteId) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn ids(&self) -> Vec<NoteId> {
        self.selected.iter().cloned().collect()
    }

    pub fn as_set(&self) -> &IdSet {
        &self.selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> NoteId {
        NoteId::from(s)
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut set = IdSet::new();
        assert!(set.toggle(&id("a")));
        assert!(set.contains(&id("a")));
        assert!(!set.toggle(&id("a")));
        assert!(set.is_empty());
    }

    #[test]
    fn select_all_replaces_selection() {
        let mut selection = SelectionManager::new();
        selection.toggle(&id("old"));
        selection.select_all(vec![id("a"), id("b")]);

        assert_eq!(selection.len(), 2);
        assert!(!selection.is_selected(&id("old")));
        assert!(selection.is_selected(&id("a")));
        assert!(selection.is_selected(&id("b")));
    }

    #[test]
    fn clear_empties_selection() {
        let mut selection = SelectionManager::new();
        selection.select_all(vec![id("a")]);
        selection.clear();
        assert!(selection.is_empty());
    }
}
