//! # API Facade
//!
//! [`Notebook`] is the single entry point for every jot operation, whatever the
//! client. It owns the [`NoteStore`] together with the state that lives beside
//! the collection but is not persisted with it: favorites, pins, the bulk
//! selection, the in-progress edit and the current [`ViewQuery`].
//!
//! ## Role and Responsibilities
//!
//! The facade:
//! - **Dispatches** to the store and the command functions
//! - **Resolves selectors** (view positions or id prefixes) to note ids
//! - **Keeps the side sets consistent** with the collection
//!
//! ## Deletion Cascade
//!
//! Every path that removes a note (`delete`, `bulk_delete`, the selection
//! variants and `restore_backup`) drops the id from the selection, favorites
//! and pins, and closes an edit of that note, before the call returns. No
//! caller can observe a dangling id.
//!
//! ## Selectors
//!
//! - **Position**: `N` is the N-th note of the current view, 1-based.
//! - **Id prefix**: anything else must be a prefix of exactly one note id.
//!
//! ## What the API Does NOT Do
//!
//! - **I/O**: no stdout, stderr or terminal concerns
//! - **Timers**: the backup and draft tasks are started by the client, see
//!   [`backup`](crate::backup) and [`draft`](crate::draft)

use crate::commands::export::{self, ExportFile, ExportFormat};
use crate::commands::import::{self, ImportOutcome, ImportSequencer, ImportTicket};
use crate::commands::stats::{self, Statistics};
use crate::commands::{tags, view, view::ViewQuery};
use crate::config::DEFAULT_TIMESTAMP_FORMAT;
use crate::edit::EditSession;
use crate::error::{JotError, Result};
use crate::model::{now, Category, Note, NoteDraft, NoteId, NotePatch, Theme};
use crate::persistence::{
    BackupEntry, GatewayStatus, PersistenceGateway, BACKUP_KEY_PREFIX, LATEST_BACKUP_KEY,
};
use crate::selection::{IdSet, SelectionManager};
use crate::store::{KeyValueStore, NoteStore};
use std::path::Path;
use std::sync::Arc;

pub struct Notebook {
    store: NoteStore,
    favorites: IdSet,
    pinned: IdSet,
    selection: SelectionManager,
    editing: Option<EditSession>,
    query: ViewQuery,
    imports: ImportSequencer,
    theme: Theme,
    timestamp_format: String,
}

impl Notebook {
    pub fn open(backend: Arc<dyn KeyValueStore>) -> Self {
        Self::with_gateway(PersistenceGateway::new(backend))
    }

    pub fn with_gateway(gateway: PersistenceGateway) -> Self {
        let theme = gateway.load_theme();
        Self {
            store: NoteStore::open(gateway),
            favorites: IdSet::new(),
            pinned: IdSet::new(),
            selection: SelectionManager::new(),
            editing: None,
            query: ViewQuery::default(),
            imports: ImportSequencer::new(),
            theme,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }

    /// `strftime` pattern used by TXT and CSV exports.
    pub fn with_timestamp_format(mut self, pattern: impl Into<String>) -> Self {
        self.timestamp_format = pattern.into();
        self
    }

    pub fn gateway(&self) -> &PersistenceGateway {
        self.store.gateway()
    }

    pub fn notes(&self) -> &[Note] {
        self.store.notes()
    }

    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.store.get(id)
    }

    // --- Collection ---

    /// Creates a note. The saved draft is left alone.
    pub fn create(&mut self, draft: NoteDraft) -> Result<Note> {
        self.store.create(draft)
    }

    /// Creates a note from the composer draft and discards the saved draft.
    /// On failure the draft is kept.
    pub fn create_from_draft(&mut self, draft: NoteDraft) -> Result<Note> {
        let note = self.store.create(draft)?;
        self.gateway().clear_draft();
        Ok(note)
    }

    pub fn update(&mut self, id: &NoteId, patch: NotePatch) -> Result<Note> {
        self.store.update(id, patch)
    }

    /// Removes the note and every reference to it. Unknown ids are a no-op.
    pub fn delete(&mut self, id: &NoteId) -> Option<Note> {
        let removed = self.store.delete(id)?;
        self.forget(&removed.id);
        Some(removed)
    }

    pub fn toggle_archive(&mut self, id: &NoteId) -> Result<Note> {
        self.store.toggle_archive(id)
    }

    pub fn duplicate(&mut self, id: &NoteId) -> Result<Note> {
        self.store.duplicate(id)
    }

    pub fn bulk_update(&mut self, ids: &[NoteId], patch: NotePatch) -> Result<Vec<Note>> {
        self.store.bulk_update(ids, patch)
    }

    pub fn bulk_toggle_archive(&mut self, ids: &[NoteId]) -> Vec<Note> {
        self.store.bulk_toggle_archive(ids)
    }

    pub fn bulk_delete(&mut self, ids: &[NoteId]) -> Vec<Note> {
        let removed = self.store.bulk_delete(ids);
        for note in &removed {
            self.forget(&note.id);
        }
        removed
    }

    pub fn bulk_delete_selected(&mut self) -> Vec<Note> {
        let ids = self.selection.ids();
        let removed = self.bulk_delete(&ids);
        self.selection.clear();
        removed
    }

    pub fn bulk_toggle_archive_selected(&mut self) -> Vec<Note> {
        let ids = self.selection.ids();
        let changed = self.store.bulk_toggle_archive(&ids);
        self.selection.clear();
        changed
    }

    pub fn bulk_set_category_selected(&mut self, category: Category) -> Result<Vec<Note>> {
        let ids = self.selection.ids();
        let changed = self
            .store
            .bulk_update(&ids, NotePatch::default().category(category))?;
        self.selection.clear();
        Ok(changed)
    }

    // --- Favorites and pins ---

    /// Returns whether the note is a favorite afterwards.
    pub fn toggle_favorite(&mut self, id: &NoteId) -> Result<bool> {
        self.require(id)?;
        Ok(self.favorites.toggle(id))
    }

    /// Returns whether the note is pinned afterwards.
    pub fn toggle_pin(&mut self, id: &NoteId) -> Result<bool> {
        self.require(id)?;
        Ok(self.pinned.toggle(id))
    }

    pub fn favorites(&self) -> &IdSet {
        &self.favorites
    }

    pub fn pinned(&self) -> &IdSet {
        &self.pinned
    }

    // --- Selection ---

    pub fn toggle_selected(&mut self, id: &NoteId) -> Result<bool> {
        self.require(id)?;
        Ok(self.selection.toggle(id))
    }

    /// Selects exactly the notes of the current view. Returns how many.
    pub fn select_all_visible(&mut self) -> usize {
        let visible: Vec<NoteId> = self.view().into_iter().map(|n| n.id.clone()).collect();
        let count = visible.len();
        self.selection.select_all(visible);
        count
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    // --- Views and aggregates ---

    pub fn query(&self) -> &ViewQuery {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut ViewQuery {
        &mut self.query
    }

    pub fn view(&self) -> Vec<&Note> {
        view::run(self.store.notes(), &self.query, &self.pinned)
    }

    pub fn statistics(&self) -> Statistics {
        stats::run(self.store.notes(), &self.favorites, &self.pinned)
    }

    pub fn all_tags(&self) -> Vec<String> {
        tags::run(self.store.notes())
    }

    /// Exports the notes of the current scope.
    pub fn export(&self, format: ExportFormat) -> Result<ExportFile> {
        export::run(
            self.store.notes(),
            self.query.scope,
            format,
            &self.timestamp_format,
        )
    }

    // --- Import ---

    /// Starts an import. Any import started earlier can no longer apply.
    pub fn begin_import(&mut self) -> ImportTicket {
        self.imports.issue()
    }

    /// Applies the file contents read for `ticket`, unless a newer import has
    /// been started since. A format error changes nothing.
    pub fn complete_import(&mut self, ticket: ImportTicket, bytes: &[u8]) -> Result<ImportOutcome> {
        if !self.imports.is_current(&ticket) {
            tracing::info!(ticket = ticket.sequence(), "stale import discarded");
            return Ok(ImportOutcome::Superseded);
        }
        let notes = import::parse(bytes, now())?;
        tracing::info!(count = notes.len(), "notes imported");
        self.store.prepend(notes.clone());
        Ok(ImportOutcome::Applied(notes))
    }

    pub async fn import_file(&mut self, path: &Path) -> Result<ImportOutcome> {
        let ticket = self.begin_import();
        let bytes = import::read_import_file(path).await?;
        self.complete_import(ticket, &bytes)
    }

    // --- Editing ---

    pub fn start_edit(&mut self, id: &NoteId) -> Result<&mut EditSession> {
        let note = self.require(id)?;
        let session = EditSession::from_note(note);
        Ok(self.editing.insert(session))
    }

    pub fn editing(&self) -> Option<&EditSession> {
        self.editing.as_ref()
    }

    pub fn editing_mut(&mut self) -> Option<&mut EditSession> {
        self.editing.as_mut()
    }

    /// Applies the edit. On a validation failure the session stays open.
    pub fn save_edit(&mut self) -> Result<Note> {
        let session = self
            .editing
            .as_ref()
            .ok_or_else(|| JotError::Validation("No edit in progress".into()))?;
        let id = session.id().clone();
        let note = self.store.update(&id, session.to_patch())?;
        self.editing = None;
        Ok(note)
    }

    pub fn cancel_edit(&mut self) -> Option<EditSession> {
        self.editing.take()
    }

    // --- Preferences and draft ---

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.gateway().save_theme(theme);
    }

    pub fn draft(&self) -> Option<String> {
        self.gateway().load_draft()
    }

    // --- Backups ---

    pub fn list_backups(&self) -> Vec<BackupEntry> {
        self.gateway().list_backups()
    }

    /// Replaces the collection with the notes of a backup. Accepts a
    /// timestamped key or `notes-backup` for the latest one.
    pub fn restore_backup(&mut self, key: &str) -> Result<usize> {
        let is_backup_key = key == LATEST_BACKUP_KEY || key.starts_with(BACKUP_KEY_PREFIX);
        let record = is_backup_key
            .then(|| self.gateway().load_backup(key))
            .flatten()
            .ok_or_else(|| JotError::BackupNotFound(key.to_string()))?;

        let count = record.notes.len();
        let dropped = self.store.replace_all(record.notes);
        for note in &dropped {
            self.forget(&note.id);
        }
        tracing::info!(key, notes = count, "backup restored");
        Ok(count)
    }

    pub fn status(&self) -> GatewayStatus {
        self.gateway().status()
    }

    // --- Selectors ---

    /// Resolves a 1-based view position or an id prefix to a note id.
    pub fn resolve(&self, selector: &str) -> Result<NoteId> {
        let selector = selector.trim();
        if let Ok(position) = selector.parse::<usize>() {
            return position
                .checked_sub(1)
                .and_then(|i| self.view().get(i).map(|n| n.id.clone()))
                .ok_or_else(|| {
                    JotError::Validation(format!("No note at position {}", position))
                });
        }

        let mut matches = self
            .store
            .notes()
            .iter()
            .filter(|n| !selector.is_empty() && n.id.as_str().starts_with(selector));
        match (matches.next(), matches.next()) {
            (Some(note), None) => Ok(note.id.clone()),
            (None, _) => Err(JotError::NoteNotFound(NoteId::from(selector))),
            (Some(_), Some(_)) => Err(JotError::Validation(format!(
                "Id prefix '{}' matches more than one note",
                selector
            ))),
        }
    }

    fn require(&self, id: &NoteId) -> Result<&Note> {
        self.store
            .get(id)
            .ok_or_else(|| JotError::NoteNotFound(id.clone()))
    }

    fn forget(&mut self, id: &NoteId) {
        self.selection.remove(id);
        self.favorites.remove(id);
        self.pinned.remove(id);
        if self.editing.as_ref().is_some_and(|e| e.id() == id) {
            self.editing = None;
        }
    }
}
