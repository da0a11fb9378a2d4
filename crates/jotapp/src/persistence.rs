//! # Persistence Gateway
//!
//! The gateway is the only component that talks to a [`KeyValueStore`]. It owns
//! the key layout and the backup policy, and it is where storage failures stop:
//! nothing in here returns a storage error to the caller.
//!
//! ## Keys
//!
//! | Key | Value |
//! |-----|-------|
//! | `notes-v2` | JSON array of notes (canonical collection) |
//! | `notes-backup` | latest [`BackupRecord`], rewritten on every mutation |
//! | `notes-backup-<ms>` | periodic [`BackupRecord`], one per timer tick |
//! | `draft` | unsaved composer text |
//! | `theme` | `light`, `dark` or `auto` |
//!
//! ## Failure Policy
//!
//! - Writes are best effort. A failed write is logged, counted and flagged in
//!   [`GatewayStatus`], then dropped.
//! - Reads of missing, unreadable or corrupt values come back as `None`, so a
//!   damaged store can never stop the engine from starting.
//!
//! ## Retention
//!
//! Timestamped backups are pruned after every periodic write according to
//! [`Retention`]. [`Retention::Unbounded`] keeps every backup ever written.

use crate::error::{JotError, Result};
use crate::model::{BackupRecord, Note, Theme};
use crate::store::KeyValueStore;
use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

pub const NOTES_KEY: &str = "notes-v2";
pub const LATEST_BACKUP_KEY: &str = "notes-backup";
pub const BACKUP_KEY_PREFIX: &str = "notes-backup-";
pub const DRAFT_KEY: &str = "draft";
pub const THEME_KEY: &str = "theme";

/// Immutable copy of the full collection at a point in time.
pub type Snapshot = Arc<Vec<Note>>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatewayStatus {
    /// When the most recent backup (latest or timestamped) was written.
    pub last_backup: Option<DateTime<Utc>>,
    /// Whether the most recent write failed. For a collection mutation this
    /// covers every write it made.
    pub last_write_failed: bool,
    /// The collection failed to save and no later save of it succeeded.
    pub collection_unsaved: bool,
    pub last_error: Option<String>,
    pub failed_writes: u64,
}

/// How many timestamped backups survive a prune.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retention {
    Unbounded,
    KeepLast(NonZeroUsize),
}

impl Retention {
    /// `0` means unbounded.
    pub fn from_count(count: usize) -> Self {
        match NonZeroUsize::new(count) {
            Some(n) => Retention::KeepLast(n),
            None => Retention::Unbounded,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupEntry {
    pub key: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone)]
pub struct PersistenceGateway {
    backend: Arc<dyn KeyValueStore>,
    status: Arc<Mutex<GatewayStatus>>,
    snapshots: Arc<watch::Sender<Snapshot>>,
}

impl PersistenceGateway {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(Vec::new()));
        Self {
            backend,
            status: Arc::new(Mutex::new(GatewayStatus::default())),
            snapshots: Arc::new(tx),
        }
    }

    // --- Raw key/value access ---

    /// Best-effort write. Returns whether the value reached the backend.
    pub fn save(&self, key: &str, value: &str) -> bool {
        let outcome = self.backend.write(key, value);
        self.record_write(key, outcome)
    }

    pub fn load(&self, key: &str) -> Option<String> {
        match self.backend.read(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "storage read failed");
                None
            }
        }
    }

    /// Loads and deserializes `key`. Corrupt values are treated as absent.
    pub fn load_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.load(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring corrupt stored value");
                None
            }
        }
    }

    pub fn remove(&self, key: &str) -> bool {
        let outcome = self.backend.remove(key);
        self.record_write(key, outcome)
    }

    // --- Collection ---

    pub fn load_notes(&self) -> Vec<Note> {
        self.load_json(NOTES_KEY).unwrap_or_default()
    }

    /// Writes the collection and the latest backup, then publishes the snapshot
    /// to subscribers. Called after every collection mutation.
    pub fn persist_snapshot(&self, notes: &[Note], now: DateTime<Utc>) {
        let collection_saved = match serde_json::to_string(notes) {
            Ok(json) => self.save(NOTES_KEY, &json),
            Err(e) => {
                self.record_failure(NOTES_KEY, JotError::Serialization(e));
                false
            }
        };

        let backup_saved = notes.is_empty() || {
            let record = BackupRecord::new(notes.to_vec(), now);
            let saved = self.save_record(LATEST_BACKUP_KEY, &record);
            if saved {
                self.lock_status().last_backup = Some(now);
            }
            saved
        };

        if !(collection_saved && backup_saved) {
            self.lock_status().last_write_failed = true;
        }

        self.publish(Arc::new(notes.to_vec()));
    }

    /// Makes `snapshot` the latest one seen by subscribers without writing it.
    pub fn publish(&self, snapshot: Snapshot) {
        self.snapshots.send_replace(snapshot);
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.subscribe()
    }

    pub fn latest_snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    // --- Backups ---

    pub fn latest_backup(&self) -> Option<BackupRecord> {
        self.load_json(LATEST_BACKUP_KEY)
    }

    pub fn load_backup(&self, key: &str) -> Option<BackupRecord> {
        self.load_json(key)
    }

    /// Writes `notes` under a fresh `notes-backup-<ms>` key and prunes old
    /// backups. Returns the key written, or `None` when nothing was written.
    pub fn write_timestamped_backup(
        &self,
        notes: &[Note],
        now: DateTime<Utc>,
        retention: Retention,
    ) -> Option<String> {
        if notes.is_empty() {
            return None;
        }

        let taken: HashSet<String> = match self.backend.keys_with_prefix(BACKUP_KEY_PREFIX) {
            Ok(keys) => keys.into_iter().collect(),
            Err(e) => {
                // without the listing a write could replace an existing backup
                self.record_failure(BACKUP_KEY_PREFIX, e);
                return None;
            }
        };
        let mut millis = now.timestamp_millis();
        while taken.contains(&backup_key(millis)) {
            millis += 1;
        }
        let key = backup_key(millis);
        let timestamp = Utc.timestamp_millis_opt(millis).single().unwrap_or(now);

        let record = BackupRecord::new(notes.to_vec(), timestamp);
        if !self.save_record(&key, &record) {
            return None;
        }
        self.lock_status().last_backup = Some(timestamp);
        tracing::info!(key = %key, notes = notes.len(), "periodic backup written");

        let pruned = self.prune_backups(retention);
        if pruned > 0 {
            tracing::debug!(pruned, "old backups removed");
        }
        Some(key)
    }

    /// Timestamped backups, newest first.
    pub fn list_backups(&self) -> Vec<BackupEntry> {
        let keys = match self.backend.keys_with_prefix(BACKUP_KEY_PREFIX) {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(error = %e, "could not list backups");
                return Vec::new();
            }
        };

        let mut entries: Vec<BackupEntry> = keys
            .into_iter()
            .filter_map(|key| {
                let millis: i64 = key.strip_prefix(BACKUP_KEY_PREFIX)?.parse().ok()?;
                let timestamp = Utc.timestamp_millis_opt(millis).single()?;
                Some(BackupEntry { key, timestamp })
            })
            .collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.key.cmp(&a.key)));
        entries
    }

    /// Removes timestamped backups beyond the retention window.
    /// Returns how many were removed.
    pub fn prune_backups(&self, retention: Retention) -> usize {
        let keep = match retention {
            Retention::Unbounded => return 0,
            Retention::KeepLast(n) => n.get(),
        };
        self.list_backups()
            .into_iter()
            .skip(keep)
            .filter(|entry| self.remove(&entry.key))
            .count()
    }

    // --- Draft & preferences ---

    pub fn save_draft(&self, text: &str) -> bool {
        self.save(DRAFT_KEY, text)
    }

    pub fn load_draft(&self) -> Option<String> {
        self.load(DRAFT_KEY).filter(|d| !d.is_empty())
    }

    pub fn clear_draft(&self) {
        self.remove(DRAFT_KEY);
    }

    pub fn save_theme(&self, theme: Theme) -> bool {
        self.save(THEME_KEY, theme.as_str())
    }

    pub fn load_theme(&self) -> Theme {
        self.load(THEME_KEY)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default()
    }

    pub fn status(&self) -> GatewayStatus {
        self.lock_status().clone()
    }

    fn save_record(&self, key: &str, record: &BackupRecord) -> bool {
        match serde_json::to_string(record) {
            Ok(json) => self.save(key, &json),
            Err(e) => {
                self.record_failure(key, JotError::Serialization(e));
                false
            }
        }
    }

    fn record_write(&self, key: &str, outcome: Result<()>) -> bool {
        match outcome {
            Ok(()) => {
                let mut status = self.lock_status();
                status.last_write_failed = false;
                if key == NOTES_KEY {
                    status.collection_unsaved = false;
                }
                true
            }
            Err(e) => {
                self.record_failure(key, e);
                false
            }
        }
    }

    fn record_failure(&self, key: &str, error: JotError) {
        tracing::warn!(key, error = %error, "storage write failed");
        let mut status = self.lock_status();
        status.last_write_failed = true;
        if key == NOTES_KEY {
            status.collection_unsaved = true;
        }
        status.last_error = Some(error.to_string());
        status.failed_writes += 1;
    }

    fn lock_status(&self) -> MutexGuard<'_, GatewayStatus> {
        self.status.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn backup_key(millis: i64) -> String {
    format!("{}{}", BACKUP_KEY_PREFIX, millis)
}
