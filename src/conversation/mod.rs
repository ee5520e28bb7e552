//! Conversation state
//!
//! The ordered, append-only message list, the canned reply generator and
//! the delayed reply scheduler.

pub mod reply;
pub mod scheduler;

use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::types::{Author, ConversationUpdate, Message, MessageId};
use crate::ui::chat::RenderAdapter;

pub use reply::ReplyGenerator;
pub use scheduler::ReplyScheduler;

/// Errors raised by the conversation layer.
#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("Message text is empty")]
    InvalidMessage,
    #[error("Message already in conversation: {0}")]
    DuplicateMessage(MessageId),
    #[error("Reply catalog is empty")]
    EmptyCatalog,
    #[error("Chat session is closed")]
    SessionClosed,
}

/// Handle returned by [`ConversationStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

/// Ordered, append-only list of messages.
///
/// Render adapters subscribe to receive one [`ConversationUpdate`] per
/// successful append. Updates are delivered while the list is locked, so
/// adapters see them in append order and must not call back into the store.
pub struct ConversationStore {
    messages: Mutex<Vec<Message>>,
    subscribers: DashMap<SubscriptionId, Arc<dyn RenderAdapter>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            subscribers: DashMap::new(),
        }
    }

    /// Create a store seeded with a single system welcome message.
    ///
    /// Blank welcome text leaves the store empty.
    pub fn with_welcome(text: &str) -> Self {
        let store = Self::new();
        store.seed_welcome(text);
        store
    }

    /// Append a system welcome message if the conversation is still empty.
    ///
    /// Returns true if the message was added.
    pub fn seed_welcome(&self, text: &str) -> bool {
        if !self.is_empty() {
            return false;
        }
        match self.submit(Author::System, text) {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!("Skipping welcome message: {}", e);
                false
            }
        }
    }

    /// Append a message to the end of the conversation and return its index.
    pub fn append(&self, message: Message) -> Result<usize, ConversationError> {
        if !message.is_well_formed() {
            return Err(ConversationError::InvalidMessage);
        }

        let mut messages = self.messages.lock().expect("messages mutex poisoned");
        if messages.iter().any(|m| m.id() == message.id()) {
            return Err(ConversationError::DuplicateMessage(message.id()));
        }

        let message = match messages.last() {
            Some(last) => message.not_before(last.created_at()),
            None => message,
        };
        let position = messages.len();
        messages.push(message.clone());

        tracing::debug!(
            "Appended {:?} message {} at position {}",
            message.author(),
            message.id(),
            position
        );

        if !self.subscribers.is_empty() {
            let update = ConversationUpdate {
                position,
                message,
                snapshot: messages.clone(),
            };
            for subscriber in self.subscribers.iter() {
                subscriber.value().apply(&update);
            }
        }

        Ok(position)
    }

    /// Build a message from raw input and append it.
    ///
    /// This is the submission path: blank input is rejected without touching
    /// the conversation.
    pub fn submit(&self, author: Author, text: &str) -> Result<usize, ConversationError> {
        let message = Message::new(author, text).inspect_err(|_| {
            tracing::debug!("Ignoring blank {:?} submission", author);
        })?;
        self.append(message)
    }

    /// Snapshot of the conversation in order
    pub fn all(&self) -> Vec<Message> {
        self.messages
            .lock()
            .expect("messages mutex poisoned")
            .clone()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().expect("messages mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn last(&self) -> Option<Message> {
        self.messages
            .lock()
            .expect("messages mutex poisoned")
            .last()
            .cloned()
    }

    /// Register a render adapter for append notifications
    pub fn subscribe(&self, adapter: Arc<dyn RenderAdapter>) -> SubscriptionId {
        let id = SubscriptionId(Uuid::new_v4());
        self.subscribers.insert(id, adapter);
        tracing::debug!("Render adapter subscribed ({} total)", self.subscribers.len());
        id
    }

    /// Remove a render adapter. Returns false if it was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.subscribers.remove(&id).is_some();
        if removed {
            tracing::debug!("Render adapter unsubscribed ({} left)", self.subscribers.len());
        }
        removed
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}
