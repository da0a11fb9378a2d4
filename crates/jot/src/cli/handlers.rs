//! Command handlers for the jot shell.
//!
//! A [`Session`] owns the [`Notebook`] plus the shell-only state: the composer
//! text and the draft autosaver. [`Session::execute`] maps one parsed
//! [`Command`] onto the API and returns the text to print. Nothing in here
//! writes to the terminal.

use chrono::{DateTime, Utc};
use jotapp::api::Notebook;
use jotapp::commands::import::ImportOutcome;
use jotapp::draft::DraftAutosaver;
use jotapp::error::{JotError, Result};
use jotapp::model::{parse_tags, Note, NoteDraft, NoteId};
use std::path::PathBuf;

use super::render;
use super::setup::{BulkAction, Command, NoteAttrs, ScopeArg};
use jotapp::model::ArchiveScope;

#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Quit,
}

pub struct Session {
    notebook: Notebook,
    autosaver: Option<DraftAutosaver>,
    /// Text being composed for the next `add`. Seeded from the saved draft.
    composer: String,
}

impl Session {
    pub fn new(notebook: Notebook, autosaver: Option<DraftAutosaver>) -> Self {
        let composer = notebook.draft().unwrap_or_default();
        Self {
            notebook,
            autosaver,
            composer,
        }
    }

    pub fn notebook(&self) -> &Notebook {
        &self.notebook
    }

    pub async fn execute(&mut self, command: Command) -> Result<Reply> {
        let text = match command {
            Command::Add { attrs, text } => self.add(attrs, text)?,
            Command::Draft { clear, text } => self.draft(clear, text),
            Command::List => self.list(),
            Command::Show { selectors } => {
                let ids = self.resolve_all(&selectors)?;
                ids.iter()
                    .filter_map(|id| self.notebook.get(id))
                    .map(render::full_note)
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            Command::Edit {
                selector,
                attrs,
                hold,
                text,
            } => self.edit(&selector, attrs, hold, text)?,
            Command::Save => render::action("Updated", &self.notebook.save_edit()?),
            Command::Cancel => match self.notebook.cancel_edit() {
                Some(_) => "Edit discarded.\n".to_string(),
                None => "No edit in progress.\n".to_string(),
            },
            Command::Delete { selectors } => {
                let ids = self.resolve_all(&selectors)?;
                render::count("Deleted", self.notebook.bulk_delete(&ids).len())
            }
            Command::Archive { selectors } => {
                let ids = self.resolve_all(&selectors)?;
                self.notebook
                    .bulk_toggle_archive(&ids)
                    .iter()
                    .map(|n| {
                        render::action(if n.archived { "Archived" } else { "Unarchived" }, n)
                    })
                    .collect()
            }
            Command::Duplicate { selector } => {
                let id = self.notebook.resolve(&selector)?;
                render::action("Duplicated", &self.notebook.duplicate(&id)?)
            }
            Command::Favorite { selectors } => {
                self.toggle_each(&selectors, ("Favorited", "Unfavorited"), Notebook::toggle_favorite)?
            }
            Command::Pin { selectors } => {
                self.toggle_each(&selectors, ("Pinned", "Unpinned"), Notebook::toggle_pin)?
            }
            Command::Select {
                all,
                clear,
                selectors,
            } => self.select(all, clear, &selectors)?,
            Command::Bulk { action } => self.bulk(action)?,
            Command::Search { query } => {
                self.notebook.query_mut().search = query.join(" ");
                self.list()
            }
            Command::Filter { category, priority } => {
                let query = self.notebook.query_mut();
                if let Some(category) = category {
                    query.category = category;
                }
                if let Some(priority) = priority {
                    query.priority = priority;
                }
                self.list()
            }
            Command::Sort { key } => {
                self.notebook.query_mut().sort = key;
                self.list()
            }
            Command::Scope { scope } => {
                let query = self.notebook.query_mut();
                query.scope = match scope {
                    Some(ScopeArg::Active) => ArchiveScope::Active,
                    Some(ScopeArg::Archived) => ArchiveScope::Archived,
                    None => query.scope.toggled(),
                };
                self.list()
            }
            Command::Stats => render::statistics(&self.notebook.statistics()),
            Command::Tags => render::tags(&self.notebook.all_tags()),
            Command::Export {
                format,
                out,
                stdout,
            } => {
                let file = self.notebook.export(format)?;
                if stdout {
                    String::from_utf8_lossy(&file.bytes).into_owned()
                } else {
                    let path = out.unwrap_or_else(|| PathBuf::from(file.filename));
                    tokio::fs::write(&path, &file.bytes).await?;
                    tracing::info!(path = %path.display(), bytes = file.bytes.len(), "exported");
                    format!("Exported to {}\n", path.display())
                }
            }
            Command::Import { path } => match self.notebook.import_file(&path).await? {
                ImportOutcome::Applied(notes) => render::count("Imported", notes.len()),
                ImportOutcome::Superseded => "Import superseded by a newer one.\n".to_string(),
            },
            Command::Theme { theme } => {
                if let Some(theme) = theme {
                    self.notebook.set_theme(theme);
                }
                format!("Theme: {}\n", self.notebook.theme())
            }
            Command::Backups => render::backups(&self.notebook.list_backups()),
            Command::Restore { key } => render::count("Restored", self.notebook.restore_backup(&key)?),
            Command::Status => render::status(&self.notebook.status()),
            Command::Quit => return Ok(Reply::Quit),
        };
        Ok(Reply::Text(text))
    }

    /// Flushes the pending draft, if any.
    pub async fn shutdown(self) {
        if let Some(autosaver) = self.autosaver {
            autosaver.close().await;
        }
    }

    fn add(&mut self, attrs: NoteAttrs, words: Vec<String>) -> Result<String> {
        let from_composer = words.is_empty();
        let text = if from_composer {
            self.composer.clone()
        } else {
            join_text(&words)
        };

        let mut draft = NoteDraft::new(text);
        if let Some(category) = attrs.category {
            draft = draft.category(category);
        }
        if let Some(priority) = attrs.priority {
            draft = draft.priority(priority);
        }
        if let Some(tags) = &attrs.tags {
            draft = draft.tags(parse_tags(tags));
        }
        if let Some(color) = attrs.color {
            draft = draft.color(color);
        }
        if let Some(remind) = &attrs.remind {
            draft = draft.reminder(parse_reminder(remind)?);
        }

        let note = if from_composer {
            self.notebook.create_from_draft(draft)?
        } else {
            self.notebook.create(draft)?
        };
        if from_composer {
            self.composer.clear();
            if let Some(autosaver) = &self.autosaver {
                autosaver.update("");
            }
        }
        Ok(with_warning(render::action("Created", &note), &note))
    }

    fn draft(&mut self, clear: bool, words: Vec<String>) -> String {
        if clear {
            self.composer.clear();
            if let Some(autosaver) = &self.autosaver {
                autosaver.update("");
            }
            self.notebook.gateway().clear_draft();
            return "Draft cleared.\n".to_string();
        }
        if !words.is_empty() {
            self.composer = join_text(&words);
            if let Some(autosaver) = &self.autosaver {
                autosaver.update(self.composer.clone());
            }
        }
        render::draft(&self.composer)
    }

    fn list(&self) -> String {
        render::note_list(&self.notebook.view(), &self.notebook)
    }

    fn edit(
        &mut self,
        selector: &str,
        attrs: NoteAttrs,
        hold: bool,
        words: Vec<String>,
    ) -> Result<String> {
        let id = self.notebook.resolve(selector)?;
        let reminder = attrs.remind.as_deref().map(parse_reminder).transpose()?;

        let session = self.notebook.start_edit(&id)?;
        if !words.is_empty() {
            session.text = join_text(&words);
        }
        if let Some(category) = attrs.category {
            session.category = category;
        }
        if let Some(priority) = attrs.priority {
            session.priority = priority;
        }
        if let Some(tags) = &attrs.tags {
            session.tags = parse_tags(tags);
        }
        if let Some(color) = attrs.color {
            session.color = color;
        }
        if let Some(reminder) = reminder {
            session.reminder = reminder;
        }

        if hold {
            return Ok(format!(
                "Editing {}. Finish with `save` or `cancel`.\n",
                self.notebook.get(&id).map(|n| n.title.as_str()).unwrap_or_default()
            ));
        }

        match self.notebook.save_edit() {
            Ok(note) => Ok(with_warning(render::action("Updated", &note), &note)),
            Err(e) => {
                self.notebook.cancel_edit();
                Err(e)
            }
        }
    }

    fn select(&mut self, all: bool, clear: bool, selectors: &[String]) -> Result<String> {
        if all {
            let n = self.notebook.select_all_visible();
            return Ok(render::count("Selected", n));
        }
        if clear {
            self.notebook.clear_selection();
            return Ok("Selection cleared.\n".to_string());
        }
        for id in self.resolve_all(selectors)? {
            self.notebook.toggle_selected(&id)?;
        }
        Ok(format!("{} selected\n", self.notebook.selection().len()))
    }

    fn bulk(&mut self, action: BulkAction) -> Result<String> {
        if self.notebook.selection().is_empty() {
            return Err(JotError::Validation("No notes selected".into()));
        }
        let text = match action {
            BulkAction::Delete => render::count("Deleted", self.notebook.bulk_delete_selected().len()),
            BulkAction::Archive => render::count(
                "Toggled archive on",
                self.notebook.bulk_toggle_archive_selected().len(),
            ),
            BulkAction::Category { category } => render::count(
                &format!("Moved to {}:", category.label()),
                self.notebook.bulk_set_category_selected(category)?.len(),
            ),
        };
        Ok(text)
    }

    fn toggle_each(
        &mut self,
        selectors: &[String],
        (on, off): (&str, &str),
        toggle: fn(&mut Notebook, &NoteId) -> Result<bool>,
    ) -> Result<String> {
        let mut out = String::new();
        for id in self.resolve_all(selectors)? {
            let now_set = toggle(&mut self.notebook, &id)?;
            if let Some(note) = self.notebook.get(&id) {
                out.push_str(&render::action(if now_set { on } else { off }, note));
            }
        }
        Ok(out)
    }

    /// Resolves every selector up front, since positions shift once notes
    /// start moving.
    fn resolve_all(&self, selectors: &[String]) -> Result<Vec<NoteId>> {
        selectors.iter().map(|s| self.notebook.resolve(s)).collect()
    }
}

/// Joins shell words back into note text. A literal `\n` becomes a newline.
fn join_text(words: &[String]) -> String {
    words.join(" ").replace("\\n", "\n")
}

fn parse_reminder(input: &str) -> Result<Option<DateTime<Utc>>> {
    if input.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    DateTime::parse_from_rfc3339(input)
        .map(|dt| Some(dt.with_timezone(&Utc)))
        .map_err(|_| {
            JotError::Validation(format!(
                "Invalid reminder '{}', expected RFC 3339 such as 2024-05-01T09:00:00Z",
                input
            ))
        })
}

fn with_warning(mut line: String, note: &Note) -> String {
    if let Some(warning) = render::soft_limit_warning(&note.text) {
        line.push_str(&warning);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::setup::ShellLine;
    use clap::Parser;
    use jotapp::model::Category;
    use jotapp::store::mem_backend::MemBackend;
    use std::sync::Arc;

    fn session() -> Session {
        console::set_colors_enabled(false);
        Session::new(Notebook::open(Arc::new(MemBackend::new())), None)
    }

    async fn run(session: &mut Session, line: &str) -> Result<String> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let command = ShellLine::try_parse_from(words).unwrap().command;
        match session.execute(command).await? {
            Reply::Text(text) => Ok(text),
            Reply::Quit => Ok("<quit>".to_string()),
        }
    }

    #[tokio::test]
    async fn add_with_attributes() {
        let mut s = session();
        let out = run(&mut s, "add -c work -p high -t a,b Call\\nthe bank").await.unwrap();
        assert_eq!(out, "Created: Call\n");

        let note = &s.notebook().notes()[0];
        assert_eq!(note.text, "Call\nthe bank");
        assert_eq!(note.category, Category::Work);
        assert_eq!(note.tags, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn add_without_text_uses_composer() {
        let mut s = session();
        run(&mut s, "draft from the composer").await.unwrap();
        run(&mut s, "add").await.unwrap();
        assert_eq!(s.notebook().notes()[0].text, "from the composer");

        let err = run(&mut s, "add").await.unwrap_err();
        assert!(matches!(err, JotError::Validation(_)));
    }

    #[tokio::test]
    async fn add_with_text_keeps_saved_draft() {
        console::set_colors_enabled(false);
        let backend = Arc::new(MemBackend::new());
        let notebook = Notebook::open(backend.clone());
        notebook.gateway().save_draft("long unfinished thought");

        let mut s = Session::new(notebook, None);
        run(&mut s, "add quick note").await.unwrap();
        assert_eq!(s.composer, "long unfinished thought");

        let reopened = Notebook::open(backend);
        assert_eq!(reopened.draft().as_deref(), Some("long unfinished thought"));
        assert_eq!(reopened.notes()[0].text, "quick note");
    }

    #[tokio::test]
    async fn bad_reminder_is_rejected() {
        let mut s = session();
        let err = run(&mut s, "add --remind tomorrow hi").await.unwrap_err();
        assert!(matches!(err, JotError::Validation(_)));
        assert!(s.notebook().notes().is_empty());

        run(&mut s, "add --remind 2024-05-01T09:00:00Z hi").await.unwrap();
        assert!(s.notebook().notes()[0].reminder.is_some());
    }

    #[tokio::test]
    async fn positions_resolve_before_deleting() {
        let mut s = session();
        for word in ["one", "two", "three"] {
            run(&mut s, &format!("add {}", word)).await.unwrap();
        }
        // newest first: three, two, one
        let out = run(&mut s, "rm 1 2").await.unwrap();
        assert_eq!(out, "Deleted 2 notes\n");
        assert_eq!(s.notebook().notes()[0].text, "one");
    }

    #[tokio::test]
    async fn edit_applies_and_failed_edit_closes() {
        let mut s = session();
        run(&mut s, "add first").await.unwrap();
        let out = run(&mut s, "edit 1 -p low second").await.unwrap();
        assert_eq!(out, "Updated: second\n");

        let err = run(&mut s, "edit 1 --remind nope").await.unwrap_err();
        assert!(matches!(err, JotError::Validation(_)));
        assert!(s.notebook().editing().is_none());
    }

    #[tokio::test]
    async fn held_edit_waits_for_save() {
        let mut s = session();
        run(&mut s, "add first").await.unwrap();
        run(&mut s, "edit 1 --hold changed").await.unwrap();
        assert_eq!(s.notebook().notes()[0].text, "first");

        run(&mut s, "save").await.unwrap();
        assert_eq!(s.notebook().notes()[0].text, "changed");
        assert_eq!(run(&mut s, "cancel").await.unwrap(), "No edit in progress.\n");
    }

    #[tokio::test]
    async fn bulk_needs_a_selection() {
        let mut s = session();
        run(&mut s, "add one").await.unwrap();
        assert!(run(&mut s, "bulk delete").await.is_err());

        assert_eq!(run(&mut s, "select --all").await.unwrap(), "Selected 1 note\n");
        assert_eq!(run(&mut s, "bulk delete").await.unwrap(), "Deleted 1 note\n");
        assert!(s.notebook().selection().is_empty());
    }

    #[tokio::test]
    async fn scope_toggles_without_argument() {
        let mut s = session();
        run(&mut s, "add keep").await.unwrap();
        run(&mut s, "archive 1").await.unwrap();
        assert_eq!(run(&mut s, "list").await.unwrap(), "No notes.\n");

        let out = run(&mut s, "scope").await.unwrap();
        assert!(out.contains("keep"));
        assert_eq!(s.notebook().query().scope, ArchiveScope::Archived);
    }

    #[tokio::test]
    async fn quit_ends_the_session() {
        let mut s = session();
        assert_eq!(run(&mut s, "exit").await.unwrap(), "<quit>");
    }
}
