//! Persistence for the chat snapshot and the user record
//!
//! Everything is stored as JSON strings under fixed keys in a small
//! key-value store, the way a browser keeps data in local storage. The
//! chat collection is always read and written whole.

use crate::config::{StorageBackend, StorageConfig};
use crate::error::{MetiorError, Result};
use crate::session::Chat;
use anyhow::Context;
use directories::ProjectDirs;
use std::path::PathBuf;
use std::sync::Arc;

pub mod memory;
pub mod sled_store;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sled_store::SledStore;
pub use sqlite::SqliteStore;

/// String key-value storage with local-storage semantics
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite the value stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; missing keys are not an error
    fn remove(&self, key: &str) -> Result<()>;

    /// Remove every key
    fn clear(&self) -> Result<()>;
}

/// Whole-collection persistence for chats
#[cfg_attr(test, mockall::automock)]
pub trait ChatRepository: Send + Sync {
    /// Read the persisted collection; an absent snapshot is an empty one
    fn load(&self) -> Result<Vec<Chat>>;

    /// Replace the persisted collection with `chats`
    fn save(&self, chats: &[Chat]) -> Result<()>;
}

/// Stores the chat collection as one JSON array under a single key
pub struct SnapshotRepository {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl SnapshotRepository {
    /// Create a repository writing under `key`
    ///
    /// # Examples
    ///
    /// ```
    /// use metior::storage::{ChatRepository, MemoryStore, SnapshotRepository};
    /// use std::sync::Arc;
    ///
    /// let repo = SnapshotRepository::new(Arc::new(MemoryStore::new()), "meteior-chats");
    /// assert!(repo.load().unwrap().is_empty());
    /// ```
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Key the snapshot is stored under
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl ChatRepository for SnapshotRepository {
    fn load(&self) -> Result<Vec<Chat>> {
        match self.store.get(self.key())? {
            Some(raw) => {
                let chats: Vec<Chat> = serde_json::from_str(&raw)
                    .map_err(|e| MetiorError::Storage(format!("Malformed chat snapshot: {}", e)))?;
                tracing::debug!(count = chats.len(), key = self.key(), "Loaded chat snapshot");
                Ok(chats)
            }
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, chats: &[Chat]) -> Result<()> {
        let raw = serde_json::to_string(chats)
            .map_err(|e| MetiorError::Storage(format!("Serialization failed: {}", e)))?;
        self.store.set(self.key(), &raw)?;
        tracing::debug!(count = chats.len(), key = self.key(), "Saved chat snapshot");
        Ok(())
    }
}

/// Open the configured key-value backend
///
/// # Errors
///
/// Returns `MetiorError::Storage` if the data directory cannot be
/// determined or the database cannot be opened
pub fn open_store(config: &StorageConfig) -> Result<Arc<dyn KeyValueStore>> {
    let store: Arc<dyn KeyValueStore> = match config.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::Sled => {
            let path = resolve_path(config, "chats.sled")?;
            Arc::new(SledStore::new(path)?)
        }
        StorageBackend::Sqlite => {
            let path = resolve_path(config, "chats.db")?;
            Arc::new(SqliteStore::new_with_path(path)?)
        }
    };
    tracing::debug!(backend = %config.backend, "Opened storage backend");
    Ok(store)
}

fn resolve_path(config: &StorageConfig, file_name: &str) -> Result<PathBuf> {
    if let Some(path) = &config.path {
        return Ok(path.clone());
    }

    let proj_dirs = ProjectDirs::from("com", "metior", "metior")
        .ok_or_else(|| MetiorError::Storage("Could not determine data directory".into()))?;

    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .context("Failed to create data directory")
        .map_err(|e| MetiorError::Storage(e.to_string()))?;

    Ok(data_dir.join(file_name))
}
