//! Export of the scoped collection to JSON, plain text or CSV.
//!
//! Only notes in the current [`ArchiveScope`] are exported, in collection order.

use crate::error::{JotError, Result};
use crate::model::{ArchiveScope, Note};
use chrono::{DateTime, Local, Utc};
use std::fmt::Write as _;
use std::str::FromStr;

const TXT_SEPARATOR_WIDTH: usize = 50;
const CSV_HEADER: &str = "Title,Category,Priority,Created,Updated,Tags,Text\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Txt,
    Csv,
}

impl ExportFormat {
    pub fn filename(&self) -> &'static str {
        match self {
            ExportFormat::Json => "notes.json",
            ExportFormat::Txt => "notes.txt",
            ExportFormat::Csv => "notes.csv",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Txt => "text/plain",
            ExportFormat::Csv => "text/csv",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = JotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "txt" | "text" => Ok(ExportFormat::Txt),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(JotError::Validation(format!(
                "Unknown export format: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub bytes: Vec<u8>,
    pub filename: &'static str,
    pub mime_type: &'static str,
}

/// Serializes the notes of `scope`. `timestamp_format` is a chrono
/// `strftime` pattern applied in local time for the TXT and CSV formats.
pub fn run(
    notes: &[Note],
    scope: ArchiveScope,
    format: ExportFormat,
    timestamp_format: &str,
) -> Result<ExportFile> {
    let scoped: Vec<&Note> = notes.iter().filter(|n| scope.includes(n)).collect();

    let bytes = match format {
        ExportFormat::Json => serde_json::to_string_pretty(&scoped)?.into_bytes(),
        ExportFormat::Txt => to_txt(&scoped, timestamp_format).into_bytes(),
        ExportFormat::Csv => to_csv(&scoped, timestamp_format)?,
    };

    tracing::debug!(notes = scoped.len(), format = format.filename(), "export built");
    Ok(ExportFile {
        bytes,
        filename: format.filename(),
        mime_type: format.mime_type(),
    })
}

fn to_txt(notes: &[&Note], timestamp_format: &str) -> String {
    let separator = "=".repeat(TXT_SEPARATOR_WIDTH);
    let mut out = String::new();
    for note in notes {
        let tags = if note.tags.is_empty() {
            "None".to_string()
        } else {
            note.tags.join(", ")
        };
        out.push_str(&format!(
            "Title: {}\nCategory: {}\nPriority: {}\nCreated: {}\nTags: {}\n\n{}\n\n{}\n\n",
            note.title,
            note.category,
            note.priority,
            format_timestamp(note.created_at, timestamp_format),
            tags,
            note.text,
            separator,
        ));
    }
    out
}

fn to_csv(notes: &[&Note], timestamp_format: &str) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(CSV_HEADER.as_bytes().to_vec());

    for note in notes {
        let created = format_timestamp(note.created_at, timestamp_format);
        let updated = format_timestamp(note.updated_at, timestamp_format);
        let tags = note.tags.join("; ");
        writer
            .write_record([
                note.title.as_str(),
                note.category.as_str(),
                note.priority.as_str(),
                created.as_str(),
                updated.as_str(),
                tags.as_str(),
                note.text.as_str(),
            ])
            .map_err(|e| JotError::Io(e.into()))?;
    }

    writer
        .into_inner()
        .map_err(|e| JotError::Io(e.into_error()))
}

/// Formats a timestamp in local time. Falls back to RFC 3339 when the pattern
/// is not a valid `strftime` string.
pub fn format_timestamp(ts: DateTime<Utc>, pattern: &str) -> String {
    let local = ts.with_timezone(&Local);
    let mut out = String::new();
    match write!(out, "{}", local.format(pattern)) {
        Ok(()) => out,
        Err(_) => local.to_rfc3339(),
    }
}
