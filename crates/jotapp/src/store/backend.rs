use crate::error::Result;

/// Abstract interface for durable key/value storage.
///
/// This trait handles the "how" of storage (filesystem vs memory), while the
/// [`PersistenceGateway`](crate::persistence::PersistenceGateway) decides what is
/// written under which key and how failures are absorbed.
///
/// Values are opaque text. Implementations must be shareable across threads
/// because the periodic backup task writes through the same backend.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    /// Returns Ok(None) if nothing is stored there.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    /// MUST be atomic to avoid partially written values.
    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// List every stored key starting with `prefix`, in no particular order.
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;
}
