//! # View Pipeline
//!
//! A view is the filtered, sorted sequence of notes eligible for display. It is a
//! pure function of the collection, a [`ViewQuery`] and the pin set:
//!
//! 1. **Scope**: keep only active or only archived notes, never both.
//! 2. **Search**: case-insensitive substring match over text, title and tags.
//! 3. **Category** and **priority**: exact match unless the filter is `All`.
//! 4. **Sort**: pinned notes first, then the comparator of the [`SortKey`].
//!
//! Sorting is stable, so notes that compare equal keep their collection order.

use crate::error::{JotError, Result};
use crate::model::{ArchiveScope, Category, Note, Priority};
use crate::selection::IdSet;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    #[default]
    Newest,
    Oldest,
    Alphabetical,
    Priority,
    Category,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::Newest,
        SortKey::Oldest,
        SortKey::Alphabetical,
        SortKey::Priority,
        SortKey::Category,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::Oldest => "oldest",
            SortKey::Alphabetical => "alphabetical",
            SortKey::Priority => "priority",
            SortKey::Category => "category",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = JotError;

    fn from_str(s: &str) -> Result<Self> {
        SortKey::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| JotError::Validation(format!("Unknown sort key: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    fn matches(&self, note: &Note) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => note.category == *category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = JotError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(CategoryFilter::All)
        } else {
            s.parse().map(CategoryFilter::Only)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriorityFilter {
    #[default]
    All,
    Only(Priority),
}

impl PriorityFilter {
    fn matches(&self, note: &Note) -> bool {
        match self {
            PriorityFilter::All => true,
            PriorityFilter::Only(priority) => note.priority == *priority,
        }
    }
}

impl FromStr for PriorityFilter {
    type Err = JotError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(PriorityFilter::All)
        } else {
            s.parse().map(PriorityFilter::Only)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    pub scope: ArchiveScope,
    pub search: String,
    pub category: CategoryFilter,
    pub priority: PriorityFilter,
    pub sort: SortKey,
}

pub fn run<'a>(notes: &'a [Note], query: &ViewQuery, pinned: &IdSet) -> Vec<&'a Note> {
    let needle = query.search.trim().to_lowercase();

    let mut view: Vec<&Note> = notes
        .iter()
        .filter(|n| query.scope.includes(n))
        .filter(|n| needle.is_empty() || matches_search(n, &needle))
        .filter(|n| query.category.matches(n))
        .filter(|n| query.priority.matches(n))
        .collect();

    // sort_by is stable
    view.sort_by(|a, b| {
        let pin_tier = pinned.contains(&b.id).cmp(&pinned.contains(&a.id));
        pin_tier.then_with(|| compare(a, b, query.sort))
    });
    view
}

/// `needle` must already be trimmed and lower-cased.
pub fn matches_search(note: &Note, needle: &str) -> bool {
    note.text.to_lowercase().contains(needle)
        || note.title.to_lowercase().contains(needle)
        || note.tags.iter().any(|t| t.to_lowercase().contains(needle))
}

fn compare(a: &Note, b: &Note, key: SortKey) -> Ordering {
    match key {
        SortKey::Newest => b.created_at.cmp(&a.created_at),
        SortKey::Oldest => a.created_at.cmp(&b.created_at),
        SortKey::Alphabetical => collate(a.sort_title(), b.sort_title()),
        SortKey::Priority => b.priority.cmp(&a.priority),
        SortKey::Category => a.category.as_str().cmp(b.category.as_str()),
    }
}

/// Case-insensitive ordering, with the raw strings as a tie-break so that
/// strings differing only in case still order deterministically.
fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NoteDraft, NoteId};
    use chrono::{TimeZone, Utc};

    fn note(id: &str, text: &str, created_ms: i64) -> Note {
        let mut n = Note::from_draft(
            NoteDraft::new(text),
            Utc.timestamp_millis_opt(created_ms).unwrap(),
        );
        n.id = NoteId::from(id);
        n
    }

    fn ids(view: &[&Note]) -> Vec<String> {
        view.iter().map(|n| n.id.to_string()).collect()
    }

    #[test]
    fn scope_is_exclusive() {
        let mut archived = note("b", "archived", 2);
        archived.archived = true;
        let notes = vec![note("a", "active", 1), archived];

        let active = run(&notes, &ViewQuery::default(), &IdSet::new());
        assert_eq!(ids(&active), vec!["a"]);

        let query = ViewQuery {
            scope: ArchiveScope::Archived,
            ..Default::default()
        };
        assert_eq!(ids(&run(&notes, &query, &IdSet::new())), vec!["b"]);
    }

    #[test]
    fn search_matches_tags_case_insensitively() {
        let mut tagged = note("a", "buy bread", 1);
        tagged.tags = vec!["Todo".into()];
        let notes = vec![tagged, note("b", "unrelated", 2)];

        let query = ViewQuery {
            search: "  todo ".into(),
            ..Default::default()
        };
        assert_eq!(ids(&run(&notes, &query, &IdSet::new())), vec!["a"]);
    }

    #[test]
    fn search_matches_text_and_title() {
        let notes = vec![note("a", "Meeting NOTES\nagenda", 1), note("b", "other", 2)];
        let query = ViewQuery {
            search: "agenda".into(),
            ..Default::default()
        };
        assert_eq!(ids(&run(&notes, &query, &IdSet::new())), vec!["a"]);

        let query = ViewQuery {
            search: "meeting notes".into(),
            ..Default::default()
        };
        assert_eq!(ids(&run(&notes, &query, &IdSet::new())), vec!["a"]);
    }

    #[test]
    fn category_and_priority_filters() {
        let mut work = note("a", "w", 1);
        work.category = Category::Work;
        work.priority = Priority::High;
        let mut ideas = note("b", "i", 2);
        ideas.category = Category::Ideas;
        let notes = vec![work, ideas];

        let query = ViewQuery {
            category: CategoryFilter::Only(Category::Work),
            ..Default::default()
        };
        assert_eq!(ids(&run(&notes, &query, &IdSet::new())), vec!["a"]);

        let query = ViewQuery {
            priority: PriorityFilter::Only(Priority::Medium),
            ..Default::default()
        };
        assert_eq!(ids(&run(&notes, &query, &IdSet::new())), vec!["b"]);
    }

    #[test]
    fn priority_sort_orders_high_to_low() {
        let mut low = note("low", "l", 1);
        low.priority = Priority::Low;
        let mut high = note("high", "h", 2);
        high.priority = Priority::High;
        let mut medium = note("medium", "m", 3);
        medium.priority = Priority::Medium;
        let notes = vec![low, high, medium];

        let query = ViewQuery {
            sort: SortKey::Priority,
            ..Default::default()
        };
        assert_eq!(
            ids(&run(&notes, &query, &IdSet::new())),
            vec!["high", "medium", "low"]
        );
    }

    #[test]
    fn pinned_notes_lead_regardless_of_key() {
        let mut low = note("low", "l", 1);
        low.priority = Priority::Low;
        let mut high = note("high", "h", 2);
        high.priority = Priority::High;
        let notes = vec![low, high];
        let pinned: IdSet = vec![NoteId::from("low")].into_iter().collect();

        for sort in SortKey::ALL {
            let query = ViewQuery {
                sort,
                ..Default::default()
            };
            assert_eq!(run(&notes, &query, &pinned)[0].id.as_str(), "low");
        }
    }

    #[test]
    fn newest_and_oldest() {
        let notes = vec![note("a", "a", 10), note("b", "b", 30), note("c", "c", 20)];
        let query = ViewQuery::default();
        assert_eq!(ids(&run(&notes, &query, &IdSet::new())), vec!["b", "c", "a"]);

        let query = ViewQuery {
            sort: SortKey::Oldest,
            ..Default::default()
        };
        assert_eq!(ids(&run(&notes, &query, &IdSet::new())), vec!["a", "c", "b"]);
    }

    #[test]
    fn alphabetical_ignores_case_and_falls_back_to_text() {
        let mut untitled = note("c", "carrot", 1);
        untitled.title = String::new();
        let notes = vec![note("b", "Banana", 2), untitled, note("a", "apple", 3)];

        let query = ViewQuery {
            sort: SortKey::Alphabetical,
            ..Default::default()
        };
        assert_eq!(ids(&run(&notes, &query, &IdSet::new())), vec!["a", "b", "c"]);
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let mut notes = vec![note("x", "x", 1), note("y", "y", 2), note("z", "z", 3)];
        for n in notes.iter_mut() {
            n.category = Category::Work;
        }
        let query = ViewQuery {
            sort: SortKey::Category,
            ..Default::default()
        };
        assert_eq!(
            ids(&run(&notes, &query, &IdSet::new())),
            vec!["x", "y", "z"]
        );
    }

    #[test]
    fn filters_parse_all() {
        assert_eq!("all".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!(
            "todos".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::Only(Category::Todos)
        );
        assert_eq!(
            "low".parse::<PriorityFilter>().unwrap(),
            PriorityFilter::Only(Priority::Low)
        );
        assert!("later".parse::<SortKey>().is_err());
    }
}
