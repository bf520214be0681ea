//! Chat sessions and their in-memory store
//!
//! `types` holds the persisted data model; `store` owns the authoritative
//! collection, the active chat, and the pending reply exchange.

pub mod store;
pub mod types;

pub use store::{ExchangeState, PendingReply, ReplyOutcome, SendOutcome, SessionStore};
pub use types::{derive_title, new_id, Chat, Message, Role};
