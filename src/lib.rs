//! MockChat Library
//!
//! Headless core of a single-screen mock chat: an append-only conversation,
//! a canned auto-reply simulator and the list/scroll model a toolkit view
//! renders from.

pub mod app;
pub mod conversation;
pub mod storage;
pub mod types;
pub mod ui;
