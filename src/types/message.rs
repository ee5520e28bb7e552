//! Message types
//!
//! Defines chat message structures and authors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::conversation::ConversationError;

/// Stable identity of a message, used for diffing in the render layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Generate a fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    /// Typed by the person using the chat
    User,
    /// Welcome text and canned replies
    System,
}

impl Author {
    /// Short label used by the transcript printer
    pub fn label(&self) -> &'static str {
        match self {
            Author::User => "you",
            Author::System => "bot",
        }
    }
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    author: Author,
    text: String,
    created_at: DateTime<Utc>,
}

impl Message {
    /// Create a new message stamped with the current time.
    ///
    /// The text is trimmed; blank text is rejected.
    pub fn new(author: Author, text: impl AsRef<str>) -> Result<Self, ConversationError> {
        Self::at(author, text, Utc::now())
    }

    /// Create a message with an explicit timestamp
    pub fn at(
        author: Author,
        text: impl AsRef<str>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ConversationError> {
        let text = text.as_ref().trim();
        if text.is_empty() {
            return Err(ConversationError::InvalidMessage);
        }
        Ok(Self {
            id: MessageId::new(),
            author,
            text: text.to_string(),
            created_at,
        })
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn author(&self) -> Author {
        self.author
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_from_user(&self) -> bool {
        self.author == Author::User
    }

    /// Whether the text would survive the submission path
    pub(crate) fn is_well_formed(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Raise the timestamp so the conversation stays chronological
    pub(crate) fn not_before(mut self, floor: DateTime<Utc>) -> Self {
        if self.created_at < floor {
            self.created_at = floor;
        }
        self
    }
}
