//! Authoritative chat collection with snapshot persistence
//!
//! `SessionStore` owns the ordered list of chats, the active chat, and at
//! most one pending reply. Every create, delete and completed exchange
//! writes the whole collection through the injected `ChatRepository`
//! before the in-memory view is updated, so memory never runs ahead of
//! what was persisted.
//!
//! # Exchange lifecycle
//!
//! `send_message` records the user turn on the active chat and spawns a
//! task that asks the `Responder` for a reply. The store is in
//! `ExchangeState::AwaitingReply` until that task finishes. Each task
//! carries a `CancellationToken`; deleting the chat cancels it, and the
//! completion step re-checks the token under the lock, so a deleted chat
//! is never written back.

use crate::config::SessionConfig;
use crate::error::{MetiorError, Result};
use crate::responder::Responder;
use crate::session::types::{derive_title, Chat, Message};
use crate::storage::ChatRepository;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Whether a reply is currently in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    /// Ready to accept a message
    Idle,
    /// A user message was recorded and its reply has not landed yet
    AwaitingReply,
}

/// Result of `SessionStore::send_message`
#[derive(Debug)]
pub enum SendOutcome {
    /// The text was blank; nothing changed
    Ignored,
    /// The user turn was recorded and a reply is on its way
    Pending(PendingReply),
}

/// How a pending exchange ended
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyOutcome {
    /// The reply was appended and the collection persisted
    Delivered(Chat),
    /// The chat was deleted (or the exchange cancelled) before the reply landed
    Cancelled,
    /// The chat had left the collection by the time the reply landed
    Discarded,
}

/// Handle to an in-flight reply
#[derive(Debug)]
pub struct PendingReply {
    chat_id: String,
    handle: JoinHandle<Result<ReplyOutcome>>,
}

impl PendingReply {
    /// Chat the reply belongs to
    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    /// Wait for the exchange to finish
    ///
    /// # Errors
    ///
    /// Returns the responder's or the repository's error if the exchange
    /// failed, or `MetiorError::Responder` if the task itself died
    pub async fn wait(self) -> Result<ReplyOutcome> {
        self.handle
            .await
            .map_err(|e| MetiorError::Responder(format!("Reply task failed: {}", e)))?
    }
}

struct InFlight {
    seq: u64,
    chat_id: String,
    token: CancellationToken,
}

#[derive(Default)]
struct State {
    chats: Vec<Chat>,
    active: Option<Chat>,
    in_flight: Option<InFlight>,
    next_seq: u64,
}

/// Chat session manager
///
/// Cheap to clone; clones share the same collection.
#[derive(Clone)]
pub struct SessionStore {
    state: Arc<Mutex<State>>,
    repository: Arc<dyn ChatRepository>,
    responder: Arc<dyn Responder>,
    config: SessionConfig,
}

impl SessionStore {
    /// Create a store with an empty in-memory collection
    ///
    /// Call `load_all` to populate it from the repository.
    pub fn new(
        repository: Arc<dyn ChatRepository>,
        responder: Arc<dyn Responder>,
        config: SessionConfig,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            repository,
            responder,
            config,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the in-memory collection with the persisted snapshot
    ///
    /// # Errors
    ///
    /// Returns the repository error if the snapshot cannot be read or parsed
    pub fn load_all(&self) -> Result<Vec<Chat>> {
        let chats = self.repository.load()?;
        let mut state = self.lock();
        state.chats = chats.clone();
        tracing::debug!(count = chats.len(), "Loaded chats");
        Ok(chats)
    }

    /// Select the requested chat, falling back to the front of the collection
    ///
    /// Returns the newly active chat, or `None` when the collection is empty
    /// and nothing was requested that exists.
    pub fn select_or_default(&self, requested: Option<&str>) -> Option<Chat> {
        let mut state = self.lock();
        let selected = requested
            .and_then(|id| state.chats.iter().find(|c| c.id == id))
            .or_else(|| state.chats.first())
            .cloned();

        if let (Some(id), Some(chat)) = (requested, &selected) {
            if chat.id != id {
                tracing::debug!(requested = %id, "Requested chat not found, using front chat");
            }
        }

        state.active = selected.clone();
        selected
    }

    /// Make an existing chat active
    ///
    /// # Errors
    ///
    /// Returns `MetiorError::ChatNotFound` if no chat has this id
    pub fn select(&self, id: &str) -> Result<Chat> {
        let mut state = self.lock();
        let chat = state
            .chats
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| MetiorError::ChatNotFound(id.to_string()))?;
        state.active = Some(chat.clone());
        tracing::debug!(chat_id = %id, "Selected chat");
        Ok(chat)
    }

    /// Create an empty chat at the front of the collection and make it active
    ///
    /// # Errors
    ///
    /// Returns the repository error if the collection cannot be persisted;
    /// the in-memory state is left untouched in that case
    pub fn create_chat(&self) -> Result<Chat> {
        let chat = Chat::new(self.config.new_chat_title.clone());

        let mut state = self.lock();
        let mut next = Vec::with_capacity(state.chats.len() + 1);
        next.push(chat.clone());
        next.extend(state.chats.iter().cloned());

        self.repository.save(&next)?;
        state.chats = next;
        state.active = Some(chat.clone());

        tracing::info!(chat_id = %chat.id, "Created chat");
        Ok(chat)
    }

    /// Remove a chat and persist the reduced collection
    ///
    /// Deleting an id that does not exist is not an error. A pending reply
    /// for the chat is cancelled. If the chat was active, the new front
    /// chat becomes active, or nothing when the collection is now empty.
    ///
    /// # Errors
    ///
    /// Returns the repository error if the collection cannot be persisted
    pub fn delete_chat(&self, id: &str) -> Result<()> {
        let mut state = self.lock();
        let next: Vec<Chat> = state.chats.iter().filter(|c| c.id != id).cloned().collect();

        self.repository.save(&next)?;
        let removed = next.len() != state.chats.len();
        state.chats = next;

        if state.in_flight.as_ref().is_some_and(|f| f.chat_id == id) {
            if let Some(in_flight) = state.in_flight.take() {
                in_flight.token.cancel();
                tracing::info!(chat_id = %id, "Cancelled pending reply for deleted chat");
            }
        }

        if state.active.as_ref().is_some_and(|c| c.id == id) {
            state.active = state.chats.first().cloned();
        }

        if removed {
            tracing::info!(chat_id = %id, "Deleted chat");
        } else {
            tracing::debug!(chat_id = %id, "Delete requested for unknown chat");
        }
        Ok(())
    }

    /// Record a user message on the active chat and start the reply
    ///
    /// With no active chat, a new chat titled from `text` is started; it is
    /// held in memory only until its first reply is persisted. Must be
    /// called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `MetiorError::ReplyPending` while another reply is in flight
    pub fn send_message(&self, text: &str) -> Result<SendOutcome> {
        if text.trim().is_empty() {
            tracing::debug!("Ignoring blank message");
            return Ok(SendOutcome::Ignored);
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| MetiorError::Responder(format!("No async runtime: {}", e)))?;

        let mut state = self.lock();
        if let Some(in_flight) = &state.in_flight {
            return Err(MetiorError::ReplyPending(in_flight.chat_id.clone()).into());
        }

        let user_message = Message::user(text);
        let chat = match state.active.take() {
            Some(mut chat) => {
                if chat.is_empty() {
                    chat.title = derive_title(text, self.config.title_max_chars);
                }
                chat.push(user_message);
                chat
            }
            None => {
                let mut chat = Chat::new(derive_title(text, self.config.title_max_chars));
                chat.push(user_message);
                tracing::info!(chat_id = %chat.id, "Started chat from first message");
                chat
            }
        };
        state.active = Some(chat.clone());
        let implicit = !state.chats.iter().any(|c| c.id == chat.id);

        let seq = state.next_seq;
        state.next_seq += 1;
        let token = CancellationToken::new();
        state.in_flight = Some(InFlight {
            seq,
            chat_id: chat.id.clone(),
            token: token.clone(),
        });
        drop(state);

        let chat_id = chat.id.clone();
        let store = self.clone();
        let handle =
            runtime.spawn(async move { store.run_exchange(seq, chat, implicit, token).await });

        tracing::debug!(chat_id = %chat_id, "Awaiting reply");
        Ok(SendOutcome::Pending(PendingReply { chat_id, handle }))
    }

    async fn run_exchange(
        &self,
        seq: u64,
        chat: Chat,
        implicit: bool,
        token: CancellationToken,
    ) -> Result<ReplyOutcome> {
        let reply = tokio::select! {
            _ = token.cancelled() => return Ok(ReplyOutcome::Cancelled),
            reply = self.responder.respond(&chat) => reply,
        };

        match reply {
            Ok(content) => self.complete_exchange(seq, chat, content, implicit, &token),
            Err(e) => {
                let mut state = self.lock();
                if state.in_flight.as_ref().is_some_and(|f| f.seq == seq) {
                    state.in_flight = None;
                }
                tracing::warn!(chat_id = %chat.id, error = %e, "Responder failed");
                Err(e)
            }
        }
    }

    fn complete_exchange(
        &self,
        seq: u64,
        mut chat: Chat,
        content: String,
        implicit: bool,
        token: &CancellationToken,
    ) -> Result<ReplyOutcome> {
        let mut state = self.lock();
        if token.is_cancelled() {
            return Ok(ReplyOutcome::Cancelled);
        }
        if state.in_flight.as_ref().is_some_and(|f| f.seq == seq) {
            state.in_flight = None;
        }

        chat.push(Message::assistant(content));

        let mut next = state.chats.clone();
        match next.iter().position(|c| c.id == chat.id) {
            Some(pos) => next[pos] = chat.clone(),
            None if implicit => next.insert(0, chat.clone()),
            None => {
                tracing::warn!(chat_id = %chat.id, "Chat left the collection before its reply landed");
                return Ok(ReplyOutcome::Discarded);
            }
        }

        self.repository.save(&next)?;
        state.chats = next;
        if state.active.as_ref().is_some_and(|c| c.id == chat.id) {
            state.active = Some(chat.clone());
        }

        tracing::info!(chat_id = %chat.id, messages = chat.len(), "Reply delivered");
        Ok(ReplyOutcome::Delivered(chat))
    }

    /// Abort the in-flight reply, if any
    ///
    /// Returns the id of the chat whose reply was cancelled.
    pub fn cancel_pending(&self) -> Option<String> {
        let mut state = self.lock();
        state.in_flight.take().map(|f| {
            f.token.cancel();
            tracing::info!(chat_id = %f.chat_id, "Cancelled pending reply");
            f.chat_id
        })
    }

    /// Snapshot of the collection, front first
    pub fn chats(&self) -> Vec<Chat> {
        self.lock().chats.clone()
    }

    /// The chat currently operated on, if any
    pub fn active_chat(&self) -> Option<Chat> {
        self.lock().active.clone()
    }

    /// Current exchange state
    pub fn exchange_state(&self) -> ExchangeState {
        if self.lock().in_flight.is_some() {
            ExchangeState::AwaitingReply
        } else {
            ExchangeState::Idle
        }
    }

    /// Whether a reply is in flight
    pub fn is_awaiting_reply(&self) -> bool {
        self.exchange_state() == ExchangeState::AwaitingReply
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responder::CannedResponder;
    use crate::session::Role;
    use crate::storage::{MemoryStore, MockChatRepository, SnapshotRepository};
    use async_trait::async_trait;
    use std::time::Duration;

    const REPLY: &str = "canned reply";

    fn memory_store() -> (SessionStore, Arc<SnapshotRepository>) {
        let repo = Arc::new(SnapshotRepository::new(
            Arc::new(MemoryStore::new()),
            "meteior-chats",
        ));
        let responder = Arc::new(CannedResponder::new(REPLY, Duration::from_millis(1000)));
        let store = SessionStore::new(repo.clone(), responder, SessionConfig::default());
        (store, repo)
    }

    fn pending(outcome: SendOutcome) -> PendingReply {
        match outcome {
            SendOutcome::Pending(p) => p,
            SendOutcome::Ignored => panic!("expected a pending reply"),
        }
    }

    struct FailingResponder;

    #[async_trait]
    impl Responder for FailingResponder {
        async fn respond(&self, _chat: &Chat) -> Result<String> {
            Err(MetiorError::Responder("model offline".into()).into())
        }
    }

    #[tokio::test]
    async fn test_blank_message_is_a_noop_without_writes() {
        let mut repo = MockChatRepository::new();
        repo.expect_save().times(0);
        let store = SessionStore::new(
            Arc::new(repo),
            Arc::new(CannedResponder::default()),
            SessionConfig::default(),
        );

        for text in ["", "   ", "\n\t "] {
            assert!(matches!(
                store.send_message(text).unwrap(),
                SendOutcome::Ignored
            ));
        }
        assert!(store.active_chat().is_none());
        assert_eq!(store.exchange_state(), ExchangeState::Idle);
    }

    #[test]
    fn test_create_chat_prepends_and_persists_once() {
        let mut repo = MockChatRepository::new();
        repo.expect_save().times(2).returning(|_| Ok(()));
        let store = SessionStore::new(
            Arc::new(repo),
            Arc::new(CannedResponder::default()),
            SessionConfig::default(),
        );

        let first = store.create_chat().unwrap();
        let second = store.create_chat().unwrap();

        let chats = store.chats();
        assert_eq!(chats.len(), 2);
        assert_eq!(chats[0].id, second.id);
        assert_eq!(chats[1].id, first.id);
        assert_eq!(second.title, "New chat");
        assert!(second.is_empty());
        assert_eq!(store.active_chat().unwrap().id, second.id);
    }

    #[test]
    fn test_create_chat_save_failure_leaves_memory_untouched() {
        let mut repo = MockChatRepository::new();
        repo.expect_save()
            .returning(|_| Err(MetiorError::Storage("quota exceeded".into()).into()));
        let store = SessionStore::new(
            Arc::new(repo),
            Arc::new(CannedResponder::default()),
            SessionConfig::default(),
        );

        assert!(store.create_chat().is_err());
        assert!(store.chats().is_empty());
        assert!(store.active_chat().is_none());
    }

    #[test]
    fn test_create_then_load_has_created_chat_in_front() {
        let (store, repo) = memory_store();
        store.create_chat().unwrap();
        let created = store.create_chat().unwrap();

        let loaded = repo.load().unwrap();
        assert_eq!(loaded[0].id, created.id);
        assert_eq!(store.load_all().unwrap()[0].id, created.id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_cycle_appends_user_then_assistant() {
        let (store, repo) = memory_store();
        store.create_chat().unwrap();

        let reply = pending(store.send_message("Hello").unwrap());
        let active = store.active_chat().unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active.title, "Hello");
        assert!(store.is_awaiting_reply());

        let outcome = reply.wait().await.unwrap();
        let ReplyOutcome::Delivered(chat) = outcome else {
            panic!("expected delivery");
        };
        assert_eq!(chat.len(), 2);
        assert_eq!(chat.messages[0].role, Role::User);
        assert_eq!(chat.messages[0].content, "Hello");
        assert_eq!(chat.messages[1].role, Role::Assistant);
        assert_eq!(chat.messages[1].content, REPLY);
        assert_eq!(store.exchange_state(), ExchangeState::Idle);

        let persisted = repo.load().unwrap();
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0], chat);
        assert_eq!(store.active_chat().unwrap(), chat);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_waits_for_the_configured_delay() {
        let (store, _repo) = memory_store();
        let start = tokio::time::Instant::now();
        let reply = pending(store.send_message("hi").unwrap());
        reply.wait().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_implicit_chat_is_not_persisted_until_reply() {
        let (store, repo) = memory_store();
        let text = "x".repeat(60);

        let reply = pending(store.send_message(&text).unwrap());
        let active = store.active_chat().unwrap();
        assert_eq!(active.title, "x".repeat(50));
        assert!(repo.load().unwrap().is_empty());
        assert!(store.chats().is_empty());

        reply.wait().await.unwrap();
        let persisted = repo.load().unwrap();
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].id, active.id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_title_only_set_by_first_message() {
        let (store, _repo) = memory_store();
        store.create_chat().unwrap();

        pending(store.send_message("first").unwrap())
            .wait()
            .await
            .unwrap();
        pending(store.send_message("second").unwrap())
            .wait()
            .await
            .unwrap();

        let chat = store.active_chat().unwrap();
        assert_eq!(chat.title, "first");
        assert_eq!(chat.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_send_while_pending_is_rejected() {
        let (store, _repo) = memory_store();
        let reply = pending(store.send_message("one").unwrap());

        let err = store.send_message("two").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MetiorError>(),
            Some(MetiorError::ReplyPending(_))
        ));
        assert_eq!(store.active_chat().unwrap().len(), 1);

        reply.wait().await.unwrap();
        assert_eq!(store.active_chat().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_during_pending_reply_does_not_resurrect() {
        let (store, repo) = memory_store();
        let chat = store.create_chat().unwrap();
        let reply = pending(store.send_message("hello").unwrap());

        store.delete_chat(&chat.id).unwrap();
        assert_eq!(store.exchange_state(), ExchangeState::Idle);

        assert_eq!(reply.wait().await.unwrap(), ReplyOutcome::Cancelled);
        assert!(repo.load().unwrap().is_empty());
        assert!(store.chats().is_empty());
        assert!(store.active_chat().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_implicit_chat_during_pending_reply() {
        let (store, repo) = memory_store();
        let reply = pending(store.send_message("hello").unwrap());
        let id = reply.chat_id().to_string();

        store.delete_chat(&id).unwrap();
        assert!(store.active_chat().is_none());
        assert_eq!(reply.wait().await.unwrap(), ReplyOutcome::Cancelled);
        assert!(repo.load().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_chat_created_during_pending_reply_survives() {
        let (store, repo) = memory_store();
        let first = store.create_chat().unwrap();
        let reply = pending(store.send_message("hello").unwrap());

        let second = store.create_chat().unwrap();
        reply.wait().await.unwrap();

        let persisted = repo.load().unwrap();
        let ids: Vec<_> = persisted.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);
        assert_eq!(persisted[1].len(), 2);
        assert_eq!(store.active_chat().unwrap().id, second.id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_implicit_chat_lands_after_switching_away() {
        let (store, repo) = memory_store();
        let reply = pending(store.send_message("draft").unwrap());
        let implicit_id = reply.chat_id().to_string();

        let other = store.create_chat().unwrap();
        reply.wait().await.unwrap();

        let persisted = repo.load().unwrap();
        assert_eq!(persisted.len(), 2);
        assert_eq!(persisted[0].id, implicit_id);
        assert_eq!(persisted[1].id, other.id);
        assert_eq!(store.active_chat().unwrap().id, other.id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_for_chat_dropped_by_reload_is_discarded() {
        let (store, repo) = memory_store();
        store.create_chat().unwrap();
        let reply = pending(store.send_message("hello").unwrap());

        repo.save(&[]).unwrap();
        store.load_all().unwrap();

        assert_eq!(reply.wait().await.unwrap(), ReplyOutcome::Discarded);
        assert!(repo.load().unwrap().is_empty());
        assert_eq!(store.exchange_state(), ExchangeState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_pending_returns_to_idle() {
        let (store, repo) = memory_store();
        store.create_chat().unwrap();
        let reply = pending(store.send_message("hello").unwrap());

        assert_eq!(store.cancel_pending(), Some(reply.chat_id().to_string()));
        assert_eq!(reply.wait().await.unwrap(), ReplyOutcome::Cancelled);
        assert!(repo.load().unwrap()[0].is_empty());
        assert_eq!(store.cancel_pending(), None);
    }

    #[tokio::test]
    async fn test_responder_failure_returns_to_idle() {
        let repo = Arc::new(SnapshotRepository::new(Arc::new(MemoryStore::new()), "k"));
        let store = SessionStore::new(
            repo.clone(),
            Arc::new(FailingResponder),
            SessionConfig::default(),
        );

        let reply = pending(store.send_message("hello").unwrap());
        let err = reply.wait().await.unwrap_err();
        assert!(err.to_string().contains("model offline"));
        assert_eq!(store.exchange_state(), ExchangeState::Idle);
        assert_eq!(store.active_chat().unwrap().len(), 1);
        assert!(repo.load().unwrap().is_empty());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (store, repo) = memory_store();
        let a = store.create_chat().unwrap();
        let b = store.create_chat().unwrap();

        store.delete_chat(&a.id).unwrap();
        let once = repo.load().unwrap();
        store.delete_chat(&a.id).unwrap();
        let twice = repo.load().unwrap();

        assert_eq!(once, twice);
        assert_eq!(twice.len(), 1);
        assert_eq!(twice[0].id, b.id);
    }

    #[test]
    fn test_delete_only_active_chat_clears_selection() {
        let (store, repo) = memory_store();
        let chat = store.create_chat().unwrap();

        store.delete_chat(&chat.id).unwrap();
        assert!(store.active_chat().is_none());
        assert!(repo.load().unwrap().is_empty());
    }

    #[test]
    fn test_delete_active_selects_new_front() {
        let (store, repo) = memory_store();
        let b = store.create_chat().unwrap();
        let a = store.create_chat().unwrap();
        assert_eq!(store.active_chat().unwrap().id, a.id);

        store.delete_chat(&a.id).unwrap();
        assert_eq!(store.active_chat().unwrap().id, b.id);
        let persisted = repo.load().unwrap();
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].id, b.id);
    }

    #[test]
    fn test_delete_inactive_keeps_selection() {
        let (store, _repo) = memory_store();
        let b = store.create_chat().unwrap();
        let a = store.create_chat().unwrap();

        store.delete_chat(&b.id).unwrap();
        assert_eq!(store.active_chat().unwrap().id, a.id);
    }

    #[test]
    fn test_select_or_default() {
        let (store, _repo) = memory_store();
        assert!(store.select_or_default(None).is_none());
        assert!(store.select_or_default(Some("missing")).is_none());

        let older = store.create_chat().unwrap();
        let newer = store.create_chat().unwrap();

        assert_eq!(store.select_or_default(Some(&older.id)).unwrap().id, older.id);
        assert_eq!(store.select_or_default(None).unwrap().id, newer.id);
        assert_eq!(store.select_or_default(Some("missing")).unwrap().id, newer.id);
        assert_eq!(store.active_chat().unwrap().id, newer.id);
    }

    #[test]
    fn test_select_unknown_chat_errors() {
        let (store, _repo) = memory_store();
        let chat = store.create_chat().unwrap();
        assert_eq!(store.select(&chat.id).unwrap().id, chat.id);

        let err = store.select("nope").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MetiorError>(),
            Some(MetiorError::ChatNotFound(_))
        ));
    }

    #[test]
    fn test_load_all_propagates_parse_errors() {
        let mut repo = MockChatRepository::new();
        repo.expect_load()
            .returning(|| Err(MetiorError::Storage("Malformed chat snapshot".into()).into()));
        let store = SessionStore::new(
            Arc::new(repo),
            Arc::new(CannedResponder::default()),
            SessionConfig::default(),
        );
        assert!(store.load_all().is_err());
    }

    #[test]
    fn test_send_outside_runtime_errors() {
        let (store, _repo) = memory_store();
        assert!(store.send_message("hello").is_err());
        assert!(store.active_chat().is_none());
    }
}
