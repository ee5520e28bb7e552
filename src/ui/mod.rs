//! Headless presentation layer
//!
//! Models the chat screen's list, input bar and keyboard geometry without
//! any toolkit dependency.

pub mod chat;
pub mod transcript;
pub mod viewport;
