//! Assistant reply generation
//!
//! There is no model behind the assistant: `CannedResponder` waits a fixed
//! delay and returns the same text every time. The trait keeps the seam
//! open so tests can substitute failing or instant responders.

use crate::config::ResponderConfig;
use crate::error::Result;
use crate::session::Chat;
use async_trait::async_trait;
use std::time::Duration;

/// Produces the assistant's reply to a chat
#[async_trait]
pub trait Responder: Send + Sync {
    /// Produce reply text for `chat`, whose last message is the user turn
    ///
    /// # Errors
    ///
    /// Returns an error if no reply can be produced
    async fn respond(&self, chat: &Chat) -> Result<String>;
}

/// Replies with fixed content after a fixed delay
#[derive(Debug, Clone)]
pub struct CannedResponder {
    content: String,
    delay: Duration,
}

impl CannedResponder {
    /// Create a responder
    ///
    /// # Examples
    ///
    /// ```
    /// use metior::responder::CannedResponder;
    /// use std::time::Duration;
    ///
    /// let responder = CannedResponder::new("Hi!", Duration::from_millis(10));
    /// assert_eq!(responder.delay(), Duration::from_millis(10));
    /// ```
    pub fn new(content: impl Into<String>, delay: Duration) -> Self {
        Self {
            content: content.into(),
            delay,
        }
    }

    /// Build from configuration
    pub fn from_config(config: &ResponderConfig) -> Self {
        Self::new(config.reply.clone(), Duration::from_millis(config.delay_ms))
    }

    /// Simulated latency
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Fixed reply text
    pub fn content(&self) -> &str {
        &self.content
    }
}

impl Default for CannedResponder {
    fn default() -> Self {
        Self::from_config(&ResponderConfig::default())
    }
}

#[async_trait]
impl Responder for CannedResponder {
    async fn respond(&self, chat: &Chat) -> Result<String> {
        tracing::debug!(chat_id = %chat.id, delay_ms = self.delay.as_millis() as u64, "Simulating reply latency");
        tokio::time::sleep(self.delay).await;
        Ok(self.content.clone())
    }
}
