use crate::model::NoteId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JotError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Note not found: {0}")]
    NoteNotFound(NoteId),

    #[error("Import format error: {0}")]
    ImportFormat(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Backup not found: {0}")]
    BackupNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, JotError>;
