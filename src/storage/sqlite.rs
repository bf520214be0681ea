use crate::error::{MetiorError, Result};
use crate::storage::KeyValueStore;
use anyhow::Context;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

/// Key-value store kept in a single SQLite table
pub struct SqliteStore {
    db_path: PathBuf,
}

impl SqliteStore {
    /// Create a store that uses the specified database path
    ///
    /// The parent directory is created if needed and the schema is
    /// initialized.
    ///
    /// # Examples
    ///
    /// ```
    /// use metior::storage::SqliteStore;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let store = SqliteStore::new_with_path(dir.path().join("chats.db")).unwrap();
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(|e| MetiorError::Storage(e.to_string()))?;
        }

        let store = Self { db_path };
        store.init()?;
        Ok(store)
    }

    /// Location of the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn open(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(|e| MetiorError::Storage(e.to_string()))?;
        Ok(conn)
    }

    fn init(&self) -> Result<()> {
        let conn = self.open()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create tables")
        .map_err(|e| MetiorError::Storage(e.to_string()))?;

        Ok(())
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.open()?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()
            .context("Failed to query key")
            .map_err(|e| MetiorError::Storage(e.to_string()))?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.open()?;
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )
        .context("Failed to write key")
        .map_err(|e| MetiorError::Storage(e.to_string()))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let conn = self.open()?;
        conn.execute("DELETE FROM kv WHERE key = ?", params![key])
            .context("Failed to delete key")
            .map_err(|e| MetiorError::Storage(e.to_string()))?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let conn = self.open()?;
        conn.execute("DELETE FROM kv", [])
            .context("Failed to clear store")
            .map_err(|e| MetiorError::Storage(e.to_string()))?;
        Ok(())
    }
}
