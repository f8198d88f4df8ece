//! Tab domain model.

use crate::session::ConversationHistory;
use serde::{Deserialize, Serialize};

/// Stable identifier for a tab, unique for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TabId(String);

impl TabId {
    /// Builds the id for the `n`-th created tab.
    pub(crate) fn from_counter(n: u64) -> Self {
        Self(format!("tab_{n}"))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Edit/parse mode of a tab.
///
/// `Editing` renders as a raw editable buffer; `Parsing` renders as a
/// read-only highlighted view that enables selection-based submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabMode {
    Editing,
    Parsing,
}

impl TabMode {
    /// True in parsing mode. This is the boolean broadcast to child frames.
    pub fn is_parsing(&self) -> bool {
        matches!(self, Self::Parsing)
    }
}

/// One open document: a text buffer with its own mode, grounding context
/// and conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tab {
    /// Stable identifier.
    pub id: TabId,
    /// Display name shown in the tab bar.
    pub name: String,
    /// Current text buffer.
    pub content: String,
    /// Current edit/parse mode. Initial mode is `Editing`.
    pub mode: TabMode,
    /// Possibly-truncated snapshot of `content` used as LLM grounding.
    /// Set only on transition into `Parsing`; may differ from `content`.
    pub file_context: String,
    /// Conversation log owned by this tab.
    pub history: ConversationHistory,
    /// Timestamp when the tab was created (ISO 8601 format).
    pub created_at: String,
}

impl Tab {
    /// Creates a tab in editing mode with a freshly seeded history and
    /// `file_context` equal to the initial content.
    pub fn new(
        id: TabId,
        name: impl Into<String>,
        content: impl Into<String>,
        system_prompt: &str,
    ) -> Self {
        let content = content.into();
        Self {
            id,
            name: name.into(),
            file_context: content.clone(),
            content,
            mode: TabMode::Editing,
            history: ConversationHistory::seed(system_prompt),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
