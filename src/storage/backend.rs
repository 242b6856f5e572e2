use crate::error::{StorageError, StorageResult};
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// A synchronous, string-keyed key/value store provided by the host.
///
/// This is the seam where `localStorage` plugs in. Implementations report
/// every failure as a [`StorageError`]; the accessors in this module decide
/// whether to surface or swallow it.
pub trait StorageBackend: Send + Sync {
    /// Read the raw string stored at `key`, or `None` if there is no entry.
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` at `key`, replacing any previous entry.
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete the entry at `key`. Removing a missing key succeeds.
    fn remove_item(&self, key: &str) -> StorageResult<()>;
}

/// In-memory [`StorageBackend`].
///
/// Optionally enforces a byte quota over the sum of key and value lengths,
/// mirroring the way browsers cap `localStorage`.
///
/// # Examples
///
/// ```
/// use stashcan::storage::{MemoryStorage, StorageBackend};
///
/// let store = MemoryStorage::with_quota(8);
/// assert!(store.set_item("k", "1234").is_ok());
/// assert!(store.set_item("k", "123456789").is_err());
/// assert_eq!(store.get_item("k").unwrap().as_deref(), Some("1234"));
/// ```
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    /// Create an unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding at most `bytes` of keys and values.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            quota: Some(bytes),
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Stored keys in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.entries.lock().keys().cloned().collect()
    }

    /// Copy of every entry.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries.lock().clone()
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Bytes currently used by keys and values.
    pub fn usage(&self) -> usize {
        usage(&self.entries.lock())
    }
}

fn usage(entries: &BTreeMap<String, String>) -> usize {
    entries.iter().map(|(k, v)| k.len() + v.len()).sum()
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock();

        if let Some(quota) = self.quota {
            let replaced = entries.get(key).map_or(0, |old| key.len() + old.len());
            let needed = usage(&entries) - replaced + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_owned(),
                });
            }
        }

        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}
