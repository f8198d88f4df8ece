//! Session domain module.
//!
//! Conversation message types and the per-tab history log with its
//! fixed-window trimming policy.

mod history;
mod message;

pub use history::ConversationHistory;
pub use message::{ConversationMessage, MessageRole};
