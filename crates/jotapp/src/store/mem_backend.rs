use super::backend::KeyValueStore;
use crate::error::{JotError, Result};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

/// In-memory storage backend for testing.
///
/// Uses a `Mutex` rather than `RefCell` because the backup task may write
/// from a runtime worker thread.
#[derive(Default)]
pub struct MemBackend {
    entries: Mutex<HashMap<String, String>>,
    simulate_write_error: AtomicBool,
    failing_keys: Mutex<HashSet<String>>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.store(simulate, Ordering::SeqCst);
    }

    /// Make writes to `key` alone fail, e.g. the collection key while its
    /// backups still succeed.
    pub fn fail_writes_to(&self, key: &str) {
        if let Ok(mut keys) = self.failing_keys.lock() {
            keys.insert(key.to_string());
        }
    }

    /// Test helper to plant raw (possibly corrupt) values.
    pub fn insert_raw(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| JotError::Storage("Memory backend lock poisoned".to_string()))
    }

    fn check_writable(&self, key: &str) -> Result<()> {
        let key_fails = self
            .failing_keys
            .lock()
            .map(|keys| keys.contains(key))
            .unwrap_or(false);
        if key_fails || self.simulate_write_error.load(Ordering::SeqCst) {
            return Err(JotError::Storage("Simulated write error".to_string()));
        }
        Ok(())
    }
}

impl KeyValueStore for MemBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.check_writable(key)?;
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.check_writable(key)?;
        self.lock()?.remove(key);
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .lock()?
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}
