//! Aggregate statistics over the whole collection.
//!
//! Statistics ignore the current view: filters, search and scope have no effect.

use crate::model::{Category, Note, Priority};
use crate::selection::IdSet;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total: usize,
    pub active: usize,
    pub archived: usize,
    /// Every category is present, zero-filled.
    pub categories: BTreeMap<Category, usize>,
    /// Every priority is present, zero-filled.
    pub priorities: BTreeMap<Priority, usize>,
    pub total_words: usize,
    pub average_length: usize,
    pub favorites: usize,
    pub pinned: usize,
}

pub fn run(notes: &[Note], favorites: &IdSet, pinned: &IdSet) -> Statistics {
    let total = notes.len();
    let archived = notes.iter().filter(|n| n.archived).count();

    let mut categories: BTreeMap<Category, usize> =
        Category::ALL.into_iter().map(|c| (c, 0)).collect();
    let mut priorities: BTreeMap<Priority, usize> =
        Priority::ALL.into_iter().map(|p| (p, 0)).collect();
    let mut total_words = 0;

    for note in notes {
        *categories.entry(note.category).or_default() += 1;
        *priorities.entry(note.priority).or_default() += 1;
        total_words += note.word_count();
    }

    Statistics {
        total,
        active: total - archived,
        archived,
        categories,
        priorities,
        total_words,
        average_length: rounded_average(total_words, total),
        favorites: favorites.len(),
        pinned: pinned.len(),
    }
}

/// `round(sum / count)` with halves rounded up; 0 when `count` is 0.
fn rounded_average(sum: usize, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    (2 * sum + count) / (2 * count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NoteDraft, NoteId};
    use chrono::Utc;

    fn note(text: &str) -> Note {
        Note::from_draft(NoteDraft::new(text), Utc::now())
    }

    #[test]
    fn empty_collection() {
        let stats = run(&[], &IdSet::new(), &IdSet::new());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.average_length, 0);
        assert_eq!(stats.categories.len(), 5);
        assert!(stats.categories.values().all(|&c| c == 0));
        assert_eq!(stats.priorities.len(), 3);
    }

    #[test]
    fn words_and_average_round_half_up() {
        let stats = run(&[note("a b c"), note("d e")], &IdSet::new(), &IdSet::new());
        assert_eq!(stats.total_words, 5);
        assert_eq!(stats.average_length, 3);
    }

    #[test]
    fn counts_partition_and_sets() {
        let mut archived = note("x");
        archived.archived = true;
        archived.category = Category::Work;
        archived.priority = Priority::High;
        let notes = vec![note("y"), archived];
        let favorites: IdSet = vec![NoteId::from("f")].into_iter().collect();
        let pinned: IdSet = vec![NoteId::from("p1"), NoteId::from("p2")]
            .into_iter()
            .collect();

        let stats = run(&notes, &favorites, &pinned);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.active, 1);
        assert_eq!(stats.archived, 1);
        assert_eq!(stats.categories[&Category::Work], 1);
        assert_eq!(stats.categories[&Category::Personal], 1);
        assert_eq!(stats.categories[&Category::Ideas], 0);
        assert_eq!(stats.priorities[&Priority::High], 1);
        assert_eq!(stats.priorities[&Priority::Medium], 1);
        assert_eq!(stats.priorities[&Priority::Low], 0);
        assert_eq!(stats.favorites, 1);
        assert_eq!(stats.pinned, 2);
    }

    #[test]
    fn rounding() {
        assert_eq!(rounded_average(5, 2), 3);
        assert_eq!(rounded_average(4, 3), 1);
        assert_eq!(rounded_average(5, 3), 2);
    }
}
