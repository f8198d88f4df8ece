//! Per-tab edit/parse mode transitions.
//!
//! These are pure state transitions: the caller (the workbench) handles
//! request cancellation, duplicate-guard resets and frame broadcasts, and
//! the view layer re-renders from the resulting `{mode, content}`.

use super::model::{Tab, TabMode};
use crate::config::ParselConfig;
use crate::session::ConversationMessage;

/// Marker inserted where the middle of an oversized file was dropped.
pub const TRUNCATION_MARKER: &str = "\n\n... [middle section truncated] ...\n\n";

/// Template for the system message that grounds the conversation in the
/// submitted file.
pub fn file_context_message(file_context: &str) -> String {
    format!(
        "The user has submitted code for analysis. Consider this context when explaining highlighted sections:\n\n{file_context}"
    )
}

/// Transitions a tab into parsing mode.
///
/// Recomputes `file_context` from the current content (never reuses a
/// previous snapshot), appends the grounding system message to the tab's
/// history and flips the mode. The caller must have captured the live
/// buffer into `tab.content` beforehand.
pub fn enter_parsing(tab: &mut Tab, config: &ParselConfig) {
    tab.file_context = truncate_context(&tab.content, config.max_file_size);
    tab.history
        .push(ConversationMessage::system(file_context_message(
            &tab.file_context,
        )));
    tab.mode = TabMode::Parsing;
}

/// Transitions a tab back into editing mode.
///
/// The conversation history is fully reset to a single fresh seed; prior
/// question/answer turns are discarded.
pub fn enter_editing(tab: &mut Tab, system_prompt: &str) {
    tab.history.reset(system_prompt);
    tab.mode = TabMode::Editing;
}

/// Truncates file content for use as LLM grounding.
///
/// Content at or under `ceiling` characters passes through unchanged.
/// Longer content keeps the first and last `ceiling / 2` characters,
/// joined by [`TRUNCATION_MARKER`], preserving head/tail structure.
/// Counts characters (not bytes) so multi-byte input never splits a
/// boundary.
pub fn truncate_context(content: &str, ceiling: usize) -> String {
    let char_count = content.chars().count();
    if char_count <= ceiling {
        return content.to_string();
    }
    let half = ceiling / 2;
    let head: String = content.chars().take(half).collect();
    let tail: String = content
        .chars()
        .skip(char_count - half)
        .collect();
    format!("{head}{TRUNCATION_MARKER}{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tab::model::TabId;

    fn tab_with(content: &str) -> Tab {
        Tab::new(TabId::from_counter(0), "t.txt", content, "seed")
    }

    #[test]
    fn test_truncate_under_ceiling_passes_through() {
        let content = "short file";
        assert_eq!(truncate_context(content, 1000), content);
    }

    #[test]
    fn test_truncate_at_ceiling_passes_through() {
        let content = "x".repeat(100);
        assert_eq!(truncate_context(&content, 100), content);
    }

    #[test]
    fn test_truncate_keeps_head_and_tail() {
        let content: String = ('a'..='z').cycle().take(300).collect();
        let truncated = truncate_context(&content, 100);

        let head: String = content.chars().take(50).collect();
        let tail: String = content.chars().skip(250).collect();
        assert!(truncated.starts_with(&head));
        assert!(truncated.ends_with(&tail));
        assert!(truncated.contains(TRUNCATION_MARKER));
    }

    #[test]
    fn test_truncate_multibyte_safe() {
        let content = "é".repeat(50);
        let truncated = truncate_context(&content, 10);
        assert!(truncated.starts_with(&"é".repeat(5)));
        assert!(truncated.ends_with(&"é".repeat(5)));
    }

    #[test]
    fn test_enter_parsing_sets_context_and_appends_grounding() {
        let mut tab = tab_with("fn main() {}");
        enter_parsing(&mut tab, &ParselConfig::default());

        assert_eq!(tab.mode, TabMode::Parsing);
        assert_eq!(tab.file_context, "fn main() {}");
        assert_eq!(tab.history.len(), 2);
        assert!(
            tab.history.messages()[1]
                .content
                .contains("submitted code for analysis")
        );
    }

    #[test]
    fn test_parse_edit_parse_resets_and_recomputes() {
        let config = ParselConfig::default();
        let mut tab = tab_with("original content");
        enter_parsing(&mut tab, &config);
        tab.history.push(ConversationMessage::assistant("answer"));

        enter_editing(&mut tab, "seed");
        assert_eq!(tab.mode, TabMode::Editing);
        assert_eq!(tab.history.len(), 1);

        tab.content = "edited content".to_string();
        enter_parsing(&mut tab, &config);
        assert_eq!(tab.file_context, "edited content");
        assert_eq!(tab.history.len(), 2);
    }
}
