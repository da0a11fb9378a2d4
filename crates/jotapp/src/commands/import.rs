//! Import of a JSON note array.
//!
//! Every element becomes a new note with a fresh id and `now` timestamps. Any
//! `id`, `title`, `createdAt` or `updatedAt` in the file is discarded, as are
//! fields the note model does not know. Unknown categories and priorities fall
//! back to their defaults.
//!
//! The import is all or nothing: a root that is not an array, or any element
//! that is not an object with non-empty `text`, rejects the whole file.
//!
//! File reads are asynchronous, so two imports can be in flight at once. Each
//! one is issued an [`ImportTicket`] up front and only the newest ticket may
//! apply its result (see [`ImportSequencer`]).

use crate::error::{JotError, Result};
use crate::model::{Category, Note, NoteDraft, Priority, DEFAULT_COLOR};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportedNote {
    #[serde(default)]
    text: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    archived: bool,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    reminder: Option<DateTime<Utc>>,
}

impl ImportedNote {
    fn into_note(self, now: DateTime<Utc>) -> Note {
        let category = self
            .category
            .and_then(|c| c.parse::<Category>().ok())
            .unwrap_or_default();
        let priority = self
            .priority
            .and_then(|p| p.parse::<Priority>().ok())
            .unwrap_or_default();

        let draft = NoteDraft::new(self.text)
            .category(category)
            .priority(priority)
            .tags(self.tags)
            .color(self.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()))
            .reminder(self.reminder);

        let mut note = Note::from_draft(draft, now);
        note.archived = self.archived;
        note
    }
}

/// Parses `bytes` into new notes, in file order.
pub fn parse(bytes: &[u8], now: DateTime<Utc>) -> Result<Vec<Note>> {
    let root: Value = serde_json::from_slice(bytes)
        .map_err(|e| JotError::ImportFormat(format!("not valid JSON: {}", e)))?;

    let Value::Array(elements) = root else {
        return Err(JotError::ImportFormat(
            "expected a JSON array of notes".into(),
        ));
    };

    elements
        .into_iter()
        .enumerate()
        .map(|(index, element)| {
            if !element.is_object() {
                return Err(JotError::ImportFormat(format!(
                    "element {} is not an object",
                    index
                )));
            }
            let imported: ImportedNote = serde_json::from_value(element)
                .map_err(|e| JotError::ImportFormat(format!("element {}: {}", index, e)))?;
            if imported.text.trim().is_empty() {
                return Err(JotError::ImportFormat(format!(
                    "element {} has no text",
                    index
                )));
            }
            Ok(imported.into_note(now))
        })
        .collect()
}

/// Reads an import file from disk.
pub async fn read_import_file(path: &Path) -> Result<Vec<u8>> {
    let bytes = tokio::fs::read(path).await?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "import file read");
    Ok(bytes)
}

/// Proof that an import was started. Consumed when the import completes.
#[derive(Debug, PartialEq, Eq)]
pub struct ImportTicket(u64);

impl ImportTicket {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    Applied(Vec<Note>),
    /// A newer import was started before this one completed.
    Superseded,
}

/// Hands out increasing tickets. Only the most recently issued one is current.
#[derive(Debug, Default)]
pub struct ImportSequencer {
    issued: u64,
}

impl ImportSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> ImportTicket {
        self.issued += 1;
        ImportTicket(self.issued)
    }

    pub fn is_current(&self, ticket: &ImportTicket) -> bool {
        ticket.0 == self.issued
    }
}
