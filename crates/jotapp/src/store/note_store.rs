use crate::error::{JotError, Result};
use crate::model::{now, Note, NoteDraft, NoteId, NotePatch, COPY_SUFFIX};
use crate::persistence::{PersistenceGateway, Snapshot};
use std::collections::HashSet;
use std::sync::Arc;

/// Owner of the canonical note collection.
///
/// The collection is kept newest-first: creation, duplication and import all
/// insert at the front. Every successful mutation hands the new snapshot to the
/// [`PersistenceGateway`]. `delete`, `bulk_delete` and `replace_all` are the
/// only ways an id leaves the collection.
pub struct NoteStore {
    notes: Vec<Note>,
    gateway: PersistenceGateway,
}

impl NoteStore {
    /// Loads the persisted collection. Missing or corrupt data opens empty.
    pub fn open(gateway: PersistenceGateway) -> Self {
        let notes = gateway.load_notes();
        tracing::debug!(notes = notes.len(), "note store opened");
        gateway.publish(Arc::new(notes.clone()));
        Self { notes, gateway }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| &n.id == id)
    }

    pub fn contains(&self, id: &NoteId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn snapshot(&self) -> Snapshot {
        Arc::new(self.notes.clone())
    }

    pub fn gateway(&self) -> &PersistenceGateway {
        &self.gateway
    }

    pub fn create(&mut self, draft: NoteDraft) -> Result<Note> {
        let text = draft.text.trim().to_string();
        if text.is_empty() {
            return Err(JotError::Validation("Note text cannot be empty".into()));
        }
        let draft = NoteDraft { text, ..draft };

        let note = Note::from_draft(draft, now());
        tracing::debug!(id = %note.id, "note created");
        self.notes.insert(0, note.clone());
        self.commit();
        Ok(note)
    }

    pub fn update(&mut self, id: &NoteId, patch: NotePatch) -> Result<Note> {
        let patch = patch.validated()?;
        let note = self.apply(id, |note| patch.apply_to(note))?;
        self.commit();
        Ok(note)
    }

    /// Removes the note. Missing ids are a no-op.
    pub fn delete(&mut self, id: &NoteId) -> Option<Note> {
        let pos = self.notes.iter().position(|n| &n.id == id)?;
        let removed = self.notes.remove(pos);
        tracing::debug!(id = %removed.id, "note deleted");
        self.commit();
        Some(removed)
    }

    pub fn toggle_archive(&mut self, id: &NoteId) -> Result<Note> {
        let note = self.apply(id, |note| note.archived = !note.archived)?;
        self.commit();
        Ok(note)
    }

    /// Creates a copy with a fresh id and timestamps, placed at the front.
    pub fn duplicate(&mut self, id: &NoteId) -> Result<Note> {
        let source = self
            .get(id)
            .ok_or_else(|| JotError::NoteNotFound(id.clone()))?;

        let now = now();
        let copy = Note {
            id: NoteId::generate(),
            text: format!("{}{}", source.text, COPY_SUFFIX),
            title: format!("{}{}", source.title, COPY_SUFFIX),
            created_at: now,
            updated_at: now,
            ..source.clone()
        };
        self.notes.insert(0, copy.clone());
        self.commit();
        Ok(copy)
    }

    /// Applies `patch` to every listed note that exists. Missing ids are skipped.
    pub fn bulk_update(&mut self, ids: &[NoteId], patch: NotePatch) -> Result<Vec<Note>> {
        let patch = patch.validated()?;
        Ok(self.apply_many(ids, |note| patch.apply_to(note)))
    }

    /// Flips `archived` on every listed note that exists.
    pub fn bulk_toggle_archive(&mut self, ids: &[NoteId]) -> Vec<Note> {
        self.apply_many(ids, |note| note.archived = !note.archived)
    }

    /// Deletes every listed note that exists and returns the removed notes.
    pub fn bulk_delete(&mut self, ids: &[NoteId]) -> Vec<Note> {
        let targets: HashSet<&NoteId> = ids.iter().collect();
        let (removed, kept): (Vec<Note>, Vec<Note>) = std::mem::take(&mut self.notes)
            .into_iter()
            .partition(|n| targets.contains(&n.id));
        self.notes = kept;

        if !removed.is_empty() {
            tracing::debug!(count = removed.len(), "notes bulk deleted");
            self.commit();
        }
        removed
    }

    /// Inserts `notes` at the front as one contiguous block, keeping their order.
    pub(crate) fn prepend(&mut self, notes: Vec<Note>) {
        if notes.is_empty() {
            return;
        }
        self.notes.splice(0..0, notes);
        self.commit();
    }

    /// Replaces the whole collection, returning the notes that were dropped.
    pub(crate) fn replace_all(&mut self, notes: Vec<Note>) -> Vec<Note> {
        let incoming: HashSet<&NoteId> = notes.iter().map(|n| &n.id).collect();
        let dropped: Vec<Note> = self
            .notes
            .iter()
            .filter(|n| !incoming.contains(&n.id))
            .cloned()
            .collect();
        self.notes = notes;
        self.commit();
        dropped
    }

    fn apply<F>(&mut self, id: &NoteId, mutate: F) -> Result<Note>
    where
        F: FnOnce(&mut Note),
    {
        let note = self
            .notes
            .iter_mut()
            .find(|n| &n.id == id)
            .ok_or_else(|| JotError::NoteNotFound(id.clone()))?;
        mutate(note);
        note.touch(now());
        Ok(note.clone())
    }

    fn apply_many<F>(&mut self, ids: &[NoteId], mutate: F) -> Vec<Note>
    where
        F: Fn(&mut Note),
    {
        let targets: HashSet<&NoteId> = ids.iter().collect();
        let now = now();
        let mut changed = Vec::new();
        for note in self.notes.iter_mut().filter(|n| targets.contains(&n.id)) {
            mutate(note);
            note.touch(now);
            changed.push(note.clone());
        }
        if !changed.is_empty() {
            self.commit();
        }
        changed
    }

    fn commit(&self) {
        self.gateway.persist_snapshot(&self.notes, now());
    }
}
