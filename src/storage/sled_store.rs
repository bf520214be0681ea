use crate::error::{MetiorError, Result};
use crate::storage::KeyValueStore;
use sled::Db;
use std::path::Path;

/// Key-value store backed by an embedded `sled` database
///
/// Every write is flushed before returning so a completed operation is
/// on disk.
pub struct SledStore {
    db: Db,
}

impl SledStore {
    /// Open or create a store at `path`
    ///
    /// # Errors
    ///
    /// Returns `MetiorError::Storage` if the database cannot be opened
    ///
    /// # Examples
    ///
    /// ```
    /// use metior::storage::{KeyValueStore, SledStore};
    ///
    /// # fn main() -> metior::error::Result<()> {
    /// let dir = tempfile::tempdir()?;
    /// let store = SledStore::new(dir.path().join("chats.sled"))?;
    /// store.set("greeting", "hi")?;
    /// assert_eq!(store.get("greeting")?, Some("hi".to_string()));
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let db = sled::open(path)
            .map_err(|e| MetiorError::Storage(format!("Failed to open database: {}", e)))?;
        Ok(Self { db })
    }

    fn flush(&self) -> Result<()> {
        self.db
            .flush()
            .map_err(|e| MetiorError::Storage(format!("Flush failed: {}", e)))?;
        Ok(())
    }
}

impl KeyValueStore for SledStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self
            .db
            .get(key.as_bytes())
            .map_err(|e| MetiorError::Storage(format!("Get failed: {}", e)))?
        {
            Some(bytes) => {
                let value = String::from_utf8(bytes.to_vec())
                    .map_err(|e| MetiorError::Storage(format!("Value is not UTF-8: {}", e)))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.db
            .insert(key.as_bytes(), value.as_bytes())
            .map_err(|e| MetiorError::Storage(format!("Insert failed: {}", e)))?;
        self.flush()
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.db
            .remove(key.as_bytes())
            .map_err(|e| MetiorError::Storage(format!("Remove failed: {}", e)))?;
        self.flush()
    }

    fn clear(&self) -> Result<()> {
        self.db
            .clear()
            .map_err(|e| MetiorError::Storage(format!("Clear failed: {}", e)))?;
        self.flush()
    }
}
