//! Configuration management for Metior
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{MetiorError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for Metior
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Where and how the chat snapshot is persisted
    #[serde(default)]
    pub storage: StorageConfig,
    /// Chat session behavior
    #[serde(default)]
    pub session: SessionConfig,
    /// Simulated assistant settings
    #[serde(default)]
    pub responder: ResponderConfig,
}

/// Key-value backend used for persistence
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Embedded sled database
    #[default]
    Sled,
    /// Single-file SQLite database
    Sqlite,
    /// Process-local map, nothing survives exit
    Memory,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Sled => write!(f, "sled"),
            StorageBackend::Sqlite => write!(f, "sqlite"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend type
    #[serde(default)]
    pub backend: StorageBackend,

    /// Database location; defaults to the platform data directory
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Key holding the JSON array of chats
    #[serde(default = "default_chats_key")]
    pub chats_key: String,

    /// Key holding the registered user record
    #[serde(default = "default_user_key")]
    pub user_key: String,
}

fn default_chats_key() -> String {
    "meteior-chats".to_string()
}

fn default_user_key() -> String {
    "meteior-user".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: None,
            chats_key: default_chats_key(),
            user_key: default_user_key(),
        }
    }
}

/// Chat session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Title given to a chat created before any message is sent
    #[serde(default = "default_new_chat_title")]
    pub new_chat_title: String,

    /// Number of characters of the first message used as the title
    #[serde(default = "default_title_max_chars")]
    pub title_max_chars: usize,
}

fn default_new_chat_title() -> String {
    "New chat".to_string()
}

fn default_title_max_chars() -> usize {
    50
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            new_chat_title: default_new_chat_title(),
            title_max_chars: default_title_max_chars(),
        }
    }
}

/// Canned responder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponderConfig {
    /// Simulated latency before the reply lands (milliseconds)
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Fixed reply content
    #[serde(default = "default_reply")]
    pub reply: String,
}

const MAX_DELAY_MS: u64 = 60_000;

fn default_delay_ms() -> u64 {
    1000
}

fn default_reply() -> String {
    "Hi! I'm MetiorGPT, your AI assistant. I can help with programming, writing, \
     data analysis and much more. What are you interested in?"
        .to_string()
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            reply: default_reply(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| MetiorError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| MetiorError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(backend) = std::env::var("METIOR_STORAGE_BACKEND") {
            match parse_backend(&backend) {
                Some(b) => self.storage.backend = b,
                None => tracing::warn!("Invalid METIOR_STORAGE_BACKEND: {}", backend),
            }
        }

        if let Ok(path) = std::env::var("METIOR_STORAGE_PATH") {
            tracing::debug!(path = %path, "Env override: METIOR_STORAGE_PATH");
            self.storage.path = Some(PathBuf::from(path));
        }

        if let Ok(delay) = std::env::var("METIOR_REPLY_DELAY_MS") {
            if let Ok(value) = delay.parse() {
                self.responder.delay_ms = value;
            } else {
                tracing::warn!("Invalid METIOR_REPLY_DELAY_MS: {}", delay);
            }
        }

        if let Ok(reply) = std::env::var("METIOR_REPLY") {
            self.responder.reply = reply;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(path) = &cli.storage_path {
            tracing::debug!("Using storage path override from CLI: {}", path.display());
            self.storage.path = Some(path.clone());
        }

        if cli.ephemeral {
            self.storage.backend = StorageBackend::Memory;
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `MetiorError::Config` describing the first invalid field
    pub fn validate(&self) -> Result<()> {
        if self.storage.chats_key.is_empty() {
            return Err(
                MetiorError::Config("storage.chats_key cannot be empty".to_string()).into(),
            );
        }

        if self.storage.user_key.is_empty() {
            return Err(MetiorError::Config("storage.user_key cannot be empty".to_string()).into());
        }

        if self.storage.chats_key == self.storage.user_key {
            return Err(MetiorError::Config(
                "storage.chats_key and storage.user_key must differ".to_string(),
            )
            .into());
        }

        if self.session.title_max_chars == 0 {
            return Err(MetiorError::Config(
                "session.title_max_chars must be greater than 0".to_string(),
            )
            .into());
        }

        if self.responder.delay_ms > MAX_DELAY_MS {
            return Err(MetiorError::Config(format!(
                "responder.delay_ms must be less than or equal to {}",
                MAX_DELAY_MS
            ))
            .into());
        }

        Ok(())
    }
}

fn parse_backend(value: &str) -> Option<StorageBackend> {
    match value.to_lowercase().as_str() {
        "sled" => Some(StorageBackend::Sled),
        "sqlite" => Some(StorageBackend::Sqlite),
        "memory" => Some(StorageBackend::Memory),
        _ => None,
    }
}
