//! # Domain Model
//!
//! This module defines the core data structures of jot: [`Note`], its enumerated
//! attributes ([`Category`], [`Priority`]), the write-side shapes ([`NoteDraft`],
//! [`NotePatch`]) and the persisted [`BackupRecord`].
//!
//! ## Persisted Shape
//!
//! Notes are stored as camelCase JSON objects with millisecond epoch timestamps:
//!
//! ```text
//! {
//!   "id": "5f0c…",
//!   "text": "Buy milk\nand bread",
//!   "title": "Buy milk",
//!   "category": "todos",
//!   "priority": "medium",
//!   "tags": ["home"],
//!   "color": "#ffffff",
//!   "createdAt": 1700000000000,
//!   "updatedAt": 1700000000000,
//!   "archived": false,
//!   "reminder": null
//! }
//! ```
//!
//! ## Titles
//!
//! The title is never edited directly. It is the first line of the text, cut to
//! [`TITLE_MAX_CHARS`] characters, and is recomputed whenever the text changes
//! (see [`Note::set_text`]).
//!
//! ## Timestamps
//!
//! `updated_at >= created_at` holds for every note. [`Note::touch`] clamps to
//! `created_at` so a wall clock stepping backwards cannot break it.

use crate::error::{JotError, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Maximum number of characters kept in a derived title.
pub const TITLE_MAX_CHARS: usize = 50;

/// Soft limit for note text. Exceeding it only produces a warning.
pub const SOFT_CHAR_LIMIT: usize = 500;

/// Suffix appended to text and title by duplication.
pub const COPY_SUFFIX: &str = " (Copy)";

pub const DEFAULT_COLOR: &str = "#ffffff";

/// Version tag written into every backup record.
pub const BACKUP_VERSION: &str = "2.0";

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

/// Opaque, immutable note identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Personal,
    Work,
    Ideas,
    Todos,
    Important,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Personal,
        Category::Work,
        Category::Ideas,
        Category::Todos,
        Category::Important,
    ];

    /// Stable identifier, also used for the category sort.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Personal => "personal",
            Category::Work => "work",
            Category::Ideas => "ideas",
            Category::Todos => "todos",
            Category::Important => "important",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Personal => "Personal",
            Category::Work => "Work",
            Category::Ideas => "Ideas",
            Category::Todos => "To-Do",
            Category::Important => "Important",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = JotError;

    fn from_str(s: &str) -> Result<Self> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| JotError::Validation(format!("Unknown category: {}", s)))
    }
}

/// Note priority. Variants are declared low to high so the derived `Ord`
/// matches their rank.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = JotError;

    fn from_str(s: &str) -> Result<Self> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| JotError::Validation(format!("Unknown priority: {}", s)))
    }
}

/// Which partition of the collection is in view. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ArchiveScope {
    #[default]
    Active,
    Archived,
}

impl ArchiveScope {
    pub fn includes(&self, note: &Note) -> bool {
        match self {
            ArchiveScope::Active => !note.archived,
            ArchiveScope::Archived => note.archived,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            ArchiveScope::Active => ArchiveScope::Archived,
            ArchiveScope::Archived => ArchiveScope::Active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub text: String,
    pub title: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub reminder: Option<DateTime<Utc>>,
}

impl Note {
    /// Builds a fresh note from a draft. The caller is responsible for having
    /// validated and trimmed `draft.text`.
    pub(crate) fn from_draft(draft: NoteDraft, now: DateTime<Utc>) -> Self {
        let title = derive_title(&draft.text);
        Self {
            id: NoteId::generate(),
            text: draft.text,
            title,
            category: draft.category,
            priority: draft.priority,
            tags: normalize_tags(draft.tags),
            color: draft.color,
            created_at: now,
            updated_at: now,
            archived: false,
            reminder: draft.reminder,
        }
    }

    /// Replaces the text and re-derives the title.
    pub fn set_text(&mut self, text: String) {
        self.title = derive_title(&text);
        self.text = text;
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }

    pub fn word_count(&self) -> usize {
        word_count(&self.text)
    }

    /// Title used for display and alphabetical ordering: the title, or the
    /// text when the title is empty.
    pub fn sort_title(&self) -> &str {
        if self.title.is_empty() {
            &self.text
        } else {
            &self.title
        }
    }
}

/// Input for creating a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub text: String,
    pub category: Category,
    pub priority: Priority,
    pub tags: Vec<String>,
    pub color: String,
    pub reminder: Option<DateTime<Utc>>,
}

impl Default for NoteDraft {
    fn default() -> Self {
        Self {
            text: String::new(),
            category: Category::default(),
            priority: Priority::default(),
            tags: Vec::new(),
            color: default_color(),
            reminder: None,
        }
    }
}

impl NoteDraft {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn reminder(mut self, reminder: Option<DateTime<Utc>>) -> Self {
        self.reminder = reminder;
        self
    }
}

/// Partial update of a note. `None` leaves a field untouched.
///
/// There is deliberately no way to express a change of `id` or `created_at`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub text: Option<String>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub tags: Option<Vec<String>>,
    pub color: Option<String>,
    pub reminder: Option<Option<DateTime<Utc>>>,
    pub archived: Option<bool>,
}

impl NotePatch {
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn reminder(mut self, reminder: Option<DateTime<Utc>>) -> Self {
        self.reminder = Some(reminder);
        self
    }

    pub fn archived(mut self, archived: bool) -> Self {
        self.archived = Some(archived);
        self
    }

    /// Trims the text and rejects it when nothing is left.
    pub(crate) fn validated(mut self) -> Result<Self> {
        if let Some(text) = self.text.take() {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Err(JotError::Validation("Note text cannot be empty".into()));
            }
            self.text = Some(trimmed.to_string());
        }
        Ok(self)
    }

    pub(crate) fn apply_to(&self, note: &mut Note) {
        if let Some(text) = &self.text {
            note.set_text(text.clone());
        }
        if let Some(category) = self.category {
            note.category = category;
        }
        if let Some(priority) = self.priority {
            note.priority = priority;
        }
        if let Some(tags) = &self.tags {
            note.tags = normalize_tags(tags.clone());
        }
        if let Some(color) = &self.color {
            note.color = color.clone();
        }
        if let Some(reminder) = self.reminder {
            note.reminder = reminder;
        }
        if let Some(archived) = self.archived {
            note.archived = archived;
        }
    }
}

/// A full copy of the collection, as written to the backup keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRecord {
    pub notes: Vec<Note>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl BackupRecord {
    pub fn new(notes: Vec<Note>, timestamp: DateTime<Utc>) -> Self {
        Self {
            notes,
            timestamp,
            version: BACKUP_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Auto,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Auto => "auto",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = JotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "auto" => Ok(Theme::Auto),
            other => Err(JotError::Validation(format!("Unknown theme: {}", other))),
        }
    }
}

/// Current time at millisecond precision, the resolution notes are stored with.
pub fn now() -> DateTime<Utc> {
    let now = Utc::now();
    Utc.timestamp_millis_opt(now.timestamp_millis())
        .single()
        .unwrap_or(now)
}

/// First line of `text`, cut to [`TITLE_MAX_CHARS`] characters.
pub fn derive_title(text: &str) -> String {
    text.split('\n')
        .next()
        .unwrap_or_default()
        .chars()
        .take(TITLE_MAX_CHARS)
        .collect()
}

/// Splits a comma separated tag string, dropping blanks. Duplicates are kept.
pub fn parse_tags(input: &str) -> Vec<String> {
    normalize_tags(input.split(',').map(str::to_string))
}

pub fn normalize_tags<I>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// Characters left before the soft limit; negative once past it.
pub fn remaining_chars(text: &str) -> i64 {
    SOFT_CHAR_LIMIT as i64 - char_count(text) as i64
}

pub fn exceeds_soft_limit(text: &str) -> bool {
    char_count(text) > SOFT_CHAR_LIMIT
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn ts(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    #[test]
    fn title_is_first_line() {
        assert_eq!(derive_title("Groceries\nmilk\neggs"), "Groceries");
        assert_eq!(derive_title("single"), "single");
    }

    #[test]
    fn title_is_truncated_to_fifty_chars() {
        let long = "x".repeat(80);
        assert_eq!(derive_title(&long).chars().count(), 50);

        let accented = "é".repeat(60);
        assert_eq!(derive_title(&accented), "é".repeat(50));
    }

    #[test]
    fn set_text_recomputes_title() {
        let mut note = Note::from_draft(NoteDraft::new("old"), now());
        note.set_text("new title\nbody".into());
        assert_eq!(note.title, "new title");
    }

    #[test]
    fn parse_tags_trims_and_keeps_duplicates() {
        assert_eq!(
            parse_tags(" work , ,home,work "),
            vec!["work", "home", "work"]
        );
        assert!(parse_tags("").is_empty());
    }

    #[test]
    fn word_and_char_counts() {
        assert_eq!(word_count("  a  b\n\tc "), 3);
        assert_eq!(word_count(""), 0);
        assert_eq!(char_count("héllo"), 5);
        assert_eq!(remaining_chars("abc"), 497);
        assert!(!exceeds_soft_limit(&"a".repeat(500)));
        assert!(exceeds_soft_limit(&"a".repeat(501)));
    }

    #[test]
    fn touch_never_moves_before_creation() {
        let mut note = Note::from_draft(NoteDraft::new("a"), ts(10_000));
        note.touch(ts(5_000));
        assert_eq!(note.updated_at, note.created_at);

        note.touch(ts(10_000) + Duration::milliseconds(1));
        assert_eq!(note.updated_at, ts(10_001));
    }

    #[test]
    fn note_serializes_camel_case_millis() {
        let mut note = Note::from_draft(NoteDraft::new("hello"), ts(1_700_000_000_000));
        note.id = NoteId::from("abc");
        let json = serde_json::to_value(&note).unwrap();

        assert_eq!(json["id"], "abc");
        assert_eq!(json["createdAt"], 1_700_000_000_000i64);
        assert_eq!(json["updatedAt"], 1_700_000_000_000i64);
        assert_eq!(json["category"], "personal");
        assert_eq!(json["priority"], "medium");
        assert_eq!(json["archived"], false);
        assert!(json["reminder"].is_null());
    }

    #[test]
    fn category_and_priority_parse_case_insensitively() {
        assert_eq!("Work".parse::<Category>().unwrap(), Category::Work);
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert!("misc".parse::<Category>().is_err());
        assert!(Priority::High > Priority::Medium && Priority::Medium > Priority::Low);
    }

    #[test]
    fn theme_parses() {
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("sepia".parse::<Theme>().is_err());
        assert_eq!(Theme::default(), Theme::Light);
    }

    #[test]
    fn patch_validation_rejects_blank_text() {
        assert!(NotePatch::default().text("   ").validated().is_err());
        let patch = NotePatch::default().text("  hi  ").validated().unwrap();
        assert_eq!(patch.text.as_deref(), Some("hi"));
    }
}
