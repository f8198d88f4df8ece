//! Per-tab conversation history with a fixed-window trimming policy.

use super::message::{ConversationMessage, MessageRole};
use serde::{Deserialize, Serialize};

/// How many leading entries the trim policy always preserves.
///
/// The first three messages carry the grounding: system seed, file-context
/// system message, and the first page instruction.
const PRESERVED_HEAD: usize = 3;

/// An ordered log of role-tagged messages forming the AI context window
/// for one tab.
///
/// Histories are only ever appended to or window-truncated, never
/// reordered. Each tab owns an independent log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationHistory {
    messages: Vec<ConversationMessage>,
}

impl ConversationHistory {
    /// Creates a fresh history seeded with exactly one system message.
    pub fn seed(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![ConversationMessage::system(system_prompt)],
        }
    }

    /// Appends a message to the end of the log.
    pub fn push(&mut self, message: ConversationMessage) {
        self.messages.push(message);
    }

    /// Resets the history back to a single fresh system seed, discarding
    /// all prior turns.
    pub fn reset(&mut self, system_prompt: impl Into<String>) {
        self.messages = vec![ConversationMessage::system(system_prompt)];
    }

    /// Applies the fixed-window trim policy in place.
    ///
    /// When the history exceeds `ceiling`, the first [`PRESERVED_HEAD`]
    /// entries are kept verbatim (preserving the grounding) together with
    /// the most recent `ceiling - PRESERVED_HEAD` entries; the middle is
    /// dropped. Dropped entries are never re-evaluated. Idempotent for
    /// histories at or below the ceiling.
    pub fn trim(&mut self, ceiling: usize) {
        if self.messages.len() <= ceiling {
            return;
        }
        let tail_len = ceiling.saturating_sub(PRESERVED_HEAD);
        let tail_start = self.messages.len() - tail_len;
        let mut trimmed = self.messages[..PRESERVED_HEAD].to_vec();
        trimmed.extend_from_slice(&self.messages[tail_start..]);
        self.messages = trimmed;
    }

    /// Number of messages in the log.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True when the log holds no messages. A seeded history is never empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The messages in turn order.
    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    /// Number of assistant entries in the log.
    pub fn assistant_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.role == MessageRole::Assistant)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_of(n: usize) -> ConversationHistory {
        let mut history = ConversationHistory::seed("seed");
        for i in 1..n {
            history.push(ConversationMessage::user(format!("msg {i}")));
        }
        history
    }

    #[test]
    fn test_seed_has_single_system_entry() {
        let history = ConversationHistory::seed("you are an expert");
        assert_eq!(history.len(), 1);
        assert_eq!(history.messages()[0].role, MessageRole::System);
    }

    #[test]
    fn test_trim_noop_at_or_below_ceiling() {
        let mut history = history_of(10);
        let before = history.clone();
        history.trim(10);
        assert_eq!(history, before);
    }

    #[test]
    fn test_trim_is_idempotent() {
        let mut history = history_of(25);
        history.trim(10);
        let once = history.clone();
        history.trim(10);
        assert_eq!(history, once);
    }

    #[test]
    fn test_trim_preserves_head_and_tail_order() {
        let mut history = history_of(20);
        let head: Vec<_> = history.messages()[..3].to_vec();
        let tail: Vec<_> = history.messages()[13..].to_vec();
        history.trim(10);

        assert_eq!(history.len(), 10);
        assert_eq!(&history.messages()[..3], head.as_slice());
        assert_eq!(&history.messages()[3..], tail.as_slice());
    }

    #[test]
    fn test_reset_discards_prior_turns() {
        let mut history = history_of(6);
        history.push(ConversationMessage::assistant("answer"));
        history.reset("seed");
        assert_eq!(history.len(), 1);
        assert_eq!(history.assistant_count(), 0);
    }
}
