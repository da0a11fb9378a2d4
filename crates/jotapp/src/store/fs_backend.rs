use super::backend::KeyValueStore;
use crate::error::{JotError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// File-per-key storage rooted at a single directory.
///
/// ```text
/// <root>/
/// ├── notes-v2                    # canonical collection
/// ├── notes-backup                # latest backup
/// ├── notes-backup-1700000000000  # timestamped backups
/// ├── draft
/// └── theme
/// ```
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(JotError::Io)?;
        }
        Ok(())
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(JotError::Storage(format!("Invalid storage key: {:?}", key)));
        }
        Ok(self.root.join(key))
    }
}

impl KeyValueStore for FsBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(JotError::Io(e)),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;
        self.ensure_dir()?;

        // Write to a temp file then rename so readers never see a partial value
        let tmp = self.root.join(format!(".{}-{}.tmp", key, Uuid::new_v4()));
        fs::write(&tmp, value).map_err(JotError::Io)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(JotError::Io(e));
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(JotError::Io(e)),
        }
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(JotError::Io)? {
            let entry = entry.map_err(JotError::Io)?;
            if !entry.path().is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if name.starts_with(prefix) && !name.starts_with('.') {
                    keys.push(name.to_string());
                }
            }
        }
        Ok(keys)
    }
}
