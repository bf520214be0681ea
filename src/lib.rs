//! Metior - local chat sessions with a canned assistant
//!
//! This library keeps chat sessions and their messages, persists the whole
//! collection as one JSON snapshot in a key-value store, and answers every
//! message with a fixed reply after a simulated delay.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: Chat data model and the `SessionStore` that owns the collection
//! - `storage`: Key-value backends (sled, SQLite, memory) and the snapshot repository
//! - `responder`: Reply generation behind the `Responder` trait
//! - `account`: Local registration stub
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli` / `commands`: Command-line interface and its handlers
//!
//! # Example
//!
//! ```
//! use metior::config::SessionConfig;
//! use metior::responder::CannedResponder;
//! use metior::session::{ReplyOutcome, SendOutcome, SessionStore};
//! use metior::storage::{MemoryStore, SnapshotRepository};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let repository = Arc::new(SnapshotRepository::new(Arc::new(MemoryStore::new()), "meteior-chats"));
//!     let responder = Arc::new(CannedResponder::new("Hi!", Duration::from_millis(10)));
//!     let store = SessionStore::new(repository, responder, SessionConfig::default());
//!
//!     store.create_chat()?;
//!     if let SendOutcome::Pending(reply) = store.send_message("Hello")? {
//!         assert!(matches!(reply.wait().await?, ReplyOutcome::Delivered(_)));
//!     }
//!     assert_eq!(store.chats()[0].messages.len(), 2);
//!     Ok(())
//! }
//! ```

pub mod account;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod responder;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use error::{MetiorError, Result};
pub use session::{Chat, Message, Role, SessionStore};
