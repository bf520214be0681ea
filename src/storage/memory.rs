use crate::error::{MetiorError, Result};
use crate::storage::KeyValueStore;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Process-local key-value store
///
/// Used by `--ephemeral` runs and by tests that do not need a real
/// persistence medium.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| MetiorError::Storage("memory store lock poisoned".into()).into())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries()?.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.entries()?.clear();
        Ok(())
    }
}
