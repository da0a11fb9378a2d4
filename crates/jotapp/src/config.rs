//! # Configuration
//!
//! Jot configuration is loaded with [`confique`] from layered sources.
//!
//! ## Sources
//!
//! Resolved in priority order:
//! 1. **Environment variables**: `JOT_BACKUP_INTERVAL`, `JOT_BACKUP_RETENTION`, etc.
//! 2. **Config file**: `jot.toml` in the data directory. A missing file is fine.
//! 3. **Compiled defaults**: `#[config(default = ...)]` on each field.
//!
//! The data directory itself is not part of the configuration. It is the
//! platform data directory from [`default_data_dir`] unless the client
//! overrides it.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `backup_interval_minutes` | `30` | Minutes between periodic backups (5 to 1440) |
//! | `backup_retention` | `20` | Timestamped backups kept; `0` keeps all of them |
//! | `draft_debounce_ms` | `1000` | Quiet period before the draft is saved |
//! | `autosave_draft` | `true` | Save the composer text automatically |
//! | `timestamp_format` | `%-m/%-d/%Y, %-I:%M:%S %p` | `strftime` pattern for TXT and CSV exports |

use crate::backup::{BackupInterval, BackupPolicy};
use crate::error::{JotError, Result};
use crate::persistence::Retention;
use chrono::format::{Item, StrftimeItems};
use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "jot.toml";

pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Platform data directory for jot (e.g. `~/.local/share/jot` on Linux).
/// `None` when no home directory can be determined.
pub fn default_data_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "jot").map(|dirs| dirs.data_dir().to_path_buf())
}

/// Configuration for jot, stored in `jot.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct JotConfig {
    /// Minutes between periodic backups.
    #[config(env = "JOT_BACKUP_INTERVAL", default = 30)]
    pub backup_interval_minutes: u64,

    /// Number of timestamped backups to keep. 0 keeps every backup.
    #[config(env = "JOT_BACKUP_RETENTION", default = 20)]
    pub backup_retention: usize,

    #[config(env = "JOT_DRAFT_DEBOUNCE_MS", default = 1000)]
    pub draft_debounce_ms: u64,

    #[config(env = "JOT_AUTOSAVE_DRAFT", default = true)]
    pub autosave_draft: bool,

    /// chrono `strftime` pattern, applied in local time.
    #[config(env = "JOT_TIMESTAMP_FORMAT", default = "%-m/%-d/%Y, %-I:%M:%S %p")]
    pub timestamp_format: String,
}

impl Default for JotConfig {
    fn default() -> Self {
        Self {
            backup_interval_minutes: 30,
            backup_retention: 20,
            draft_debounce_ms: 1000,
            autosave_draft: true,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

impl JotConfig {
    /// Loads environment, then `<data_dir>/jot.toml`, then defaults, and
    /// validates the result.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE);
        let config = Self::builder()
            .env()
            .file(&path)
            .load()
            .map_err(|e| JotError::Config(e.to_string()))?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        BackupInterval::from_minutes(self.backup_interval_minutes)?;
        if StrftimeItems::new(&self.timestamp_format).any(|item| matches!(item, Item::Error)) {
            return Err(JotError::Config(format!(
                "invalid timestamp_format: {}",
                self.timestamp_format
            )));
        }
        Ok(())
    }

    pub fn backup_policy(&self) -> Result<BackupPolicy> {
        Ok(BackupPolicy {
            interval: BackupInterval::from_minutes(self.backup_interval_minutes)?,
            retention: Retention::from_count(self.backup_retention),
        })
    }

    pub fn draft_debounce(&self) -> Duration {
        Duration::from_millis(self.draft_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroUsize;

    #[test]
    fn test_default_config() {
        let config = JotConfig::default();
        assert_eq!(config.backup_interval_minutes, 30);
        assert_eq!(config.backup_retention, 20);
        assert!(config.autosave_draft);
        assert_eq!(config.draft_debounce(), Duration::from_millis(1000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_policy() {
        let policy = JotConfig::default().backup_policy().unwrap();
        assert_eq!(policy, BackupPolicy::default());
        assert_eq!(
            policy.retention,
            Retention::KeepLast(NonZeroUsize::new(20).unwrap())
        );
    }

    #[test]
    fn test_zero_retention_is_unbounded() {
        let config = JotConfig {
            backup_retention: 0,
            ..Default::default()
        };
        assert_eq!(
            config.backup_policy().unwrap().retention,
            Retention::Unbounded
        );
    }

    #[test]
    fn test_interval_out_of_range() {
        let config = JotConfig {
            backup_interval_minutes: 2,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(JotError::Config(_))));
        assert!(config.backup_policy().is_err());
    }

    #[test]
    fn test_bad_timestamp_format() {
        let config = JotConfig {
            timestamp_format: "%Q".into(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(JotError::Config(_))));
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = JotConfig::load(dir.path()).unwrap();
        assert_eq!(config.timestamp_format, DEFAULT_TIMESTAMP_FORMAT);
    }

    #[test]
    fn test_load_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "backup_interval_minutes = 60\nautosave_draft = false\n",
        )
        .unwrap();

        let config = JotConfig::load(dir.path()).unwrap();
        assert_eq!(config.backup_interval_minutes, 60);
        assert!(!config.autosave_draft);
        assert_eq!(config.backup_retention, 20);
    }

    #[test]
    fn test_load_rejects_invalid_file_values() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "backup_interval_minutes = 1\n").unwrap();
        assert!(matches!(
            JotConfig::load(dir.path()),
            Err(JotError::Config(_))
        ));
    }
}
