//! # Rendering Module
//!
//! Turns engine data into terminal text. Every function returns a `String`;
//! printing is left to the caller so output can be tested without a terminal.
//!
//! ## List Layout
//!
//! ```text
//!  ⚲★●  1. Groceries                         todos    high      3 minutes ago
//! ```
//!
//! - markers (3 columns): pinned, favorite, selected
//! - index (4 columns): 1-based view position, the selector for other commands
//! - title (fill): truncated to [`TITLE_WIDTH`] display columns
//! - category, priority and a relative timestamp
//!
//! Colors come from `console`, which disables them when stdout is not a terminal.

use chrono::{DateTime, Utc};
use console::style;
use jotapp::api::Notebook;
use jotapp::commands::stats::Statistics;
use jotapp::model::{self, Note};
use jotapp::persistence::{BackupEntry, GatewayStatus};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const TITLE_WIDTH: usize = 40;
pub const PIN_MARKER: &str = "⚲";
pub const FAVORITE_MARKER: &str = "★";
pub const SELECTED_MARKER: &str = "●";
const TIME_WIDTH: usize = 14;

pub fn note_list(notes: &[&Note], notebook: &Notebook) -> String {
    if notes.is_empty() {
        return "No notes.\n".to_string();
    }

    let mut out = String::new();
    for (i, note) in notes.iter().enumerate() {
        let marker = |on: bool, symbol: &str| if on { symbol.to_string() } else { " ".to_string() };
        let markers = format!(
            "{}{}{}",
            marker(notebook.pinned().contains(&note.id), PIN_MARKER),
            marker(notebook.favorites().contains(&note.id), FAVORITE_MARKER),
            marker(notebook.selection().is_selected(&note.id), SELECTED_MARKER),
        );

        let title = truncate_to_width(note.sort_title(), TITLE_WIDTH);
        let padding = TITLE_WIDTH.saturating_sub(title.width());

        out.push_str(&format!(
            " {} {:>3}. {}{} {:<9} {:<6} {}\n",
            style(markers).yellow(),
            i + 1,
            title,
            " ".repeat(padding),
            note.category.as_str(),
            note.priority.as_str(),
            style(format_time_ago(note.created_at)).dim(),
        ));
    }
    out
}

pub fn full_note(note: &Note) -> String {
    let tags = if note.tags.is_empty() {
        "-".to_string()
    } else {
        note.tags.join(", ")
    };
    let mut out = format!(
        "{}\n{} {} · {} · tags: {}{}\n{}\n{}\n",
        style(&note.title).bold(),
        style("id").dim(),
        note.id,
        note.category.label(),
        tags,
        if note.archived { " · archived" } else { "" },
        style(format!(
            "created {} · updated {}",
            format_time_ago(note.created_at).trim(),
            format_time_ago(note.updated_at).trim()
        ))
        .dim(),
        note.text,
    );
    if let Some(reminder) = note.reminder {
        out.push_str(&format!("reminder: {}\n", reminder.to_rfc3339()));
    }
    out
}

/// One line confirming a mutation, e.g. `Created: Groceries`.
pub fn action(verb: &str, note: &Note) -> String {
    format!("{}: {}\n", style(verb).green(), note.title)
}

pub fn count(verb: &str, n: usize) -> String {
    let noun = if n == 1 { "note" } else { "notes" };
    format!("{} {} {}\n", style(verb).green(), n, noun)
}

pub fn soft_limit_warning(text: &str) -> Option<String> {
    model::exceeds_soft_limit(text).then(|| {
        format!(
            "{} {} characters over the {} character limit\n",
            style("Warning:").yellow(),
            -model::remaining_chars(text),
            model::SOFT_CHAR_LIMIT
        )
    })
}

pub fn draft(text: &str) -> String {
    if text.is_empty() {
        return "Draft is empty.\n".to_string();
    }
    let remaining = model::remaining_chars(text);
    let counter = format!(
        "{} words · {} characters · {} left",
        model::word_count(text),
        model::char_count(text),
        remaining
    );
    let counter = if remaining < 0 {
        style(counter).red().to_string()
    } else {
        style(counter).dim().to_string()
    };
    format!("{}\n{}\n", text, counter)
}

pub fn statistics(stats: &Statistics) -> String {
    let mut out = format!(
        "Notes: {} ({} active, {} archived)\nWords: {} (average {} per note)\nFavorites: {}  Pinned: {}\n",
        stats.total,
        stats.active,
        stats.archived,
        stats.total_words,
        stats.average_length,
        stats.favorites,
        stats.pinned,
    );
    out.push_str("Categories:");
    for (category, n) in &stats.categories {
        out.push_str(&format!(" {}={}", category, n));
    }
    out.push_str("\nPriorities:");
    for (priority, n) in stats.priorities.iter().rev() {
        out.push_str(&format!(" {}={}", priority, n));
    }
    out.push('\n');
    out
}

pub fn tags(tags: &[String]) -> String {
    if tags.is_empty() {
        return "No tags.\n".to_string();
    }
    format!("{}\n", tags.join(", "))
}

pub fn backups(entries: &[BackupEntry]) -> String {
    if entries.is_empty() {
        return "No backups yet.\n".to_string();
    }
    entries
        .iter()
        .map(|e| {
            format!(
                "{}  {}\n",
                e.key,
                style(format_time_ago(e.timestamp).trim()).dim()
            )
        })
        .collect()
}

pub fn status(status: &GatewayStatus) -> String {
    let last_backup = status
        .last_backup
        .map(|ts| format_time_ago(ts).trim().to_string())
        .unwrap_or_else(|| "never".to_string());
    let mut out = format!("Last backup: {}\n", last_backup);
    if status.collection_unsaved {
        out.push_str(&format!(
            "{} notes are not saved to disk\n",
            style("Warning:").red()
        ));
    }
    if status.last_write_failed {
        out.push_str(&format!(
            "{} last write failed: {}\n",
            style("Warning:").yellow(),
            status.last_error.as_deref().unwrap_or("unknown error")
        ));
    }
    if status.failed_writes > 0 {
        out.push_str(&format!("Failed writes: {}\n", status.failed_writes));
    }
    out
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let formatter = timeago::Formatter::new();
    let time_str = formatter.convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_short_strings() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("exactly10!", 10), "exactly10!");
    }

    #[test]
    fn test_truncate_long_strings_with_ellipsis() {
        let out = truncate_to_width("abcdefghijkl", 6);
        assert_eq!(out, "abcde…");
        assert_eq!(out.width(), 6);
    }

    #[test]
    fn test_truncate_counts_wide_chars() {
        let out = truncate_to_width("日本語のテキスト", 7);
        assert!(out.width() <= 7);
        assert!(out.ends_with('…'));
    }

    #[test]
    fn test_count_pluralizes() {
        console::set_colors_enabled(false);
        assert_eq!(count("Deleted", 1), "Deleted 1 note\n");
        assert_eq!(count("Deleted", 3), "Deleted 3 notes\n");
    }

    #[test]
    fn test_soft_limit_warning() {
        console::set_colors_enabled(false);
        assert!(soft_limit_warning("short").is_none());
        let long = "x".repeat(510);
        let warning = soft_limit_warning(&long).unwrap();
        assert!(warning.contains("10 characters over the 500 character limit"));
    }

    #[test]
    fn test_status_warns_about_unsaved_collection() {
        console::set_colors_enabled(false);
        let healthy = GatewayStatus::default();
        assert_eq!(status(&healthy), "Last backup: never\n");

        let unsaved = GatewayStatus {
            collection_unsaved: true,
            last_write_failed: true,
            last_error: Some("quota".into()),
            failed_writes: 1,
            ..Default::default()
        };
        let out = status(&unsaved);
        assert!(out.contains("Warning: notes are not saved to disk"));
        assert!(out.contains("last write failed: quota"));
    }

    #[test]
    fn test_draft_counter() {
        console::set_colors_enabled(false);
        assert_eq!(draft(""), "Draft is empty.\n");
        assert_eq!(draft("two words"), "two words\n2 words · 9 characters · 491 left\n");
    }
}
