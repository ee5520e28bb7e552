//! Store-to-renderer notification payload

use serde::Serialize;

use crate::types::message::{Message, MessageId};

/// One successful append, as seen by a render adapter.
///
/// Carries both the delta and the full ordered state so an adapter can
/// either apply the insertion directly or diff against what it has drawn.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationUpdate {
    /// Index of the inserted message
    pub position: usize,
    /// The inserted message
    pub message: Message,
    /// Every message after the insert, in order
    pub snapshot: Vec<Message>,
}

impl ConversationUpdate {
    /// Ids of the snapshot in order, the identity key used for diffing
    pub fn ids(&self) -> impl Iterator<Item = MessageId> + '_ {
        self.snapshot.iter().map(Message::id)
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }
}
