//! Shared type definitions
//!
//! Message identity and the notification payload passed from the store to
//! the render layer.

pub mod message;
pub mod update;

pub use message::{Author, Message, MessageId};
pub use update::ConversationUpdate;
