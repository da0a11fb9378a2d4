//! In-progress edit of a single note.
//!
//! An [`EditSession`] is a detached copy of a note's editable fields. Changes
//! made to it touch nothing until the session is saved through the
//! [`Notebook`](crate::api::Notebook), which turns it into a [`NotePatch`].

use crate::model::{Category, Note, NoteId, NotePatch, Priority};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    id: NoteId,
    pub text: String,
    pub category: Category,
    pub priority: Priority,
    pub tags: Vec<String>,
    pub color: String,
    pub reminder: Option<DateTime<Utc>>,
}

impl EditSession {
    pub fn from_note(note: &Note) -> Self {
        Self {
            id: note.id.clone(),
            text: note.text.clone(),
            category: note.category,
            priority: note.priority,
            tags: note.tags.clone(),
            color: note.color.clone(),
            reminder: note.reminder,
        }
    }

    /// The note being edited. Fixed for the life of the session.
    pub fn id(&self) -> &NoteId {
        &self.id
    }

    pub fn to_patch(&self) -> NotePatch {
        NotePatch::default()
            .text(self.text.clone())
            .category(self.category)
            .priority(self.priority)
            .tags(self.tags.clone())
            .color(self.color.clone())
            .reminder(self.reminder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{now, NoteDraft};

    #[test]
    fn patch_carries_every_editable_field() {
        let note = Note::from_draft(
            NoteDraft::new("hello")
                .category(Category::Ideas)
                .priority(Priority::Low)
                .tags(["t"]),
            now(),
        );
        let mut session = EditSession::from_note(&note);
        assert_eq!(session.id(), &note.id);

        session.text = "changed".into();
        session.priority = Priority::High;
        let patch = session.to_patch();

        assert_eq!(patch.text.as_deref(), Some("changed"));
        assert_eq!(patch.category, Some(Category::Ideas));
        assert_eq!(patch.priority, Some(Priority::High));
        assert_eq!(patch.tags, Some(vec!["t".to_string()]));
        assert_eq!(patch.reminder, Some(None));
        assert_eq!(patch.archived, None);
    }
}
