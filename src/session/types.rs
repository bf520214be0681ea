use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Typed by the person at the keyboard
    User,
    /// Produced by the responder
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single turn in a chat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// Who wrote the message
    pub role: Role,
    /// Free-form text body
    pub content: String,
    /// Creation time
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Creates a message stamped with the current time
    ///
    /// # Examples
    ///
    /// ```
    /// use metior::session::{Message, Role};
    ///
    /// let msg = Message::new(Role::User, "Hello");
    /// assert_eq!(msg.role, Role::User);
    /// assert_eq!(msg.content, "Hello");
    /// ```
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Shorthand for a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Shorthand for an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// A titled, ordered list of messages
///
/// Serialized in camelCase so the persisted snapshot keeps the
/// `lastUpdated` field name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// Display label
    pub title: String,
    /// Messages in chronological order
    pub messages: Vec<Message>,
    /// Time of the most recent mutation
    pub last_updated: DateTime<Utc>,
}

impl Chat {
    /// Creates an empty chat with the given title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            messages: Vec::new(),
            last_updated: Utc::now(),
        }
    }

    /// Appends a message and bumps `last_updated`
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.last_updated = Utc::now();
    }

    /// Number of messages in the chat
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the chat has no messages yet
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Generates a collision-resistant identifier
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Derives a chat title from the first message
///
/// Takes the first `max_chars` characters of `text` as-is (no trimming).
///
/// # Examples
///
/// ```
/// use metior::session::derive_title;
///
/// assert_eq!(derive_title("Hello", 50), "Hello");
/// assert_eq!(derive_title("abcdef", 3), "abc");
/// ```
pub fn derive_title(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
