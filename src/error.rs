//! Error types for Metior
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Metior operations
///
/// Covers configuration loading, snapshot persistence, user input
/// validation, and the simulated reply exchange.
#[derive(Error, Debug)]
pub enum MetiorError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Snapshot storage errors (backend failures, malformed snapshots)
    #[error("Storage error: {0}")]
    Storage(String),

    /// User input rejected before any state was touched
    #[error("Validation error: {0}")]
    Validation(String),

    /// No chat with the given identifier exists in the collection
    #[error("Chat not found: {0}")]
    ChatNotFound(String),

    /// A reply is already in flight; only one exchange may be pending
    #[error("A reply is already pending for chat {0}")]
    ReplyPending(String),

    /// The responder failed to produce a reply
    #[error("Responder error: {0}")]
    Responder(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for Metior operations
///
/// Uses `anyhow::Error` so callers can attach context while still being
/// able to `downcast_ref::<MetiorError>()` for specific failures.
pub type Result<T> = anyhow::Result<T>;
