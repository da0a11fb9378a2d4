use crate::model::Note;
use std::collections::HashSet;

/// Every distinct tag in the collection, in the order first seen.
pub fn run(notes: &[Note]) -> Vec<String> {
    let mut seen = HashSet::new();
    notes
        .iter()
        .flat_map(|n| n.tags.iter())
        .filter(|t| seen.insert(t.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{now, NoteDraft};

    #[test]
    fn distinct_in_first_seen_order() {
        let notes = vec![
            Note::from_draft(NoteDraft::new("a").tags(["work", "home"]), now()),
            Note::from_draft(NoteDraft::new("b").tags(["home", "Work", "work"]), now()),
        ];
        assert_eq!(run(&notes), vec!["work", "home", "Work"]);
    }

    #[test]
    fn empty_collection() {
        assert!(run(&[]).is_empty());
    }
}
