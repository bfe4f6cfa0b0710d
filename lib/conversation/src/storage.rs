//! Durable key-value storage seam.
//!
//! In a browser this is `localStorage`; native hosts use a directory of files.
//! Every operation may fail, and callers are expected to survive that.

use crate::error::StorageError;
use std::collections::HashMap;
use std::sync::Mutex;

/// A string-valued key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Reads a slot. `Ok(None)` means the key is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes a slot, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be written (quota, permissions, ...).
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes a slot. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be modified.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-process store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.slots.lock().map_err(|_| StorageError::Unavailable {
            reason: "memory store lock poisoned".to_string(),
        })
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots()?.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.slots()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.load("k").expect("load"), None);

        store.save("k", "v1").expect("save");
        store.save("k", "v2").expect("overwrite");
        assert_eq!(store.load("k").expect("load"), Some("v2".to_string()));

        store.remove("k").expect("remove");
        store.remove("k").expect("remove absent");
        assert_eq!(store.load("k").expect("load"), None);
    }
}
