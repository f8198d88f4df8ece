//! Ordered tab collection with an active-tab pointer.

use super::model::{Tab, TabId};
use crate::error::{ParselError, Result};

/// The central collection of open tabs.
///
/// Holds the ordered tab sequence, the active-tab pointer and the
/// monotonic id counter. Two invariants hold for every sequence of
/// operations: the active id always references a tab in the sequence,
/// and the collection never becomes empty.
#[derive(Debug, Clone)]
pub struct TabRegistry {
    tabs: Vec<Tab>,
    active_tab_id: TabId,
    id_counter: u64,
    system_prompt: String,
}

impl TabRegistry {
    /// Creates a registry holding a single bootstrap tab.
    pub fn new(
        system_prompt: impl Into<String>,
        first_name: impl Into<String>,
        first_content: impl Into<String>,
    ) -> Self {
        let system_prompt = system_prompt.into();
        let first = Tab::new(
            TabId::from_counter(0),
            first_name,
            first_content,
            &system_prompt,
        );
        let active_tab_id = first.id.clone();
        Self {
            tabs: vec![first],
            active_tab_id,
            id_counter: 1,
            system_prompt,
        }
    }

    /// Allocates a new tab and appends it to the end of the sequence.
    ///
    /// The tab starts in editing mode with a freshly seeded history and
    /// `file_context` equal to its initial content. Never fails. Does not
    /// change the active tab.
    pub fn create(&mut self, name: Option<String>, content: Option<String>) -> TabId {
        let name = name.unwrap_or_else(|| format!("Untitled-{}.txt", self.id_counter));
        let tab = Tab::new(
            TabId::from_counter(self.id_counter),
            name,
            content.unwrap_or_default(),
            &self.system_prompt,
        );
        self.id_counter += 1;
        let id = tab.id.clone();
        self.tabs.push(tab);
        id
    }

    /// Moves the active pointer to `id`.
    ///
    /// No-op when `id` is already active. Returns `NotFound` for unknown
    /// ids; the caller is expected to log and carry on. Capturing the
    /// outgoing tab's live buffer and restoring the incoming tab's content
    /// is the caller's responsibility.
    pub fn switch_to(&mut self, id: &TabId) -> Result<()> {
        if *id == self.active_tab_id {
            return Ok(());
        }
        if !self.tabs.iter().any(|t| t.id == *id) {
            return Err(ParselError::not_found("tab", id.as_str()));
        }
        self.active_tab_id = id.clone();
        Ok(())
    }

    /// Removes a tab from the sequence.
    ///
    /// Refuses when only one tab remains. When the closed tab was active,
    /// the new active tab is the one now occupying `max(0, removed - 1)`:
    /// closing the last tab in the sequence activates the new last tab,
    /// closing any other tab activates its left neighbor.
    pub fn close(&mut self, id: &TabId) -> Result<()> {
        if self.tabs.len() == 1 {
            return Err(ParselError::internal("cannot close the last remaining tab"));
        }
        let index = self
            .index_of(id)
            .ok_or_else(|| ParselError::not_found("tab", id.as_str()))?;

        let was_active = *id == self.active_tab_id;
        self.tabs.remove(index);

        if was_active {
            let new_index = index.saturating_sub(1);
            self.active_tab_id = self.tabs[new_index].id.clone();
        }
        Ok(())
    }

    /// Moves the tab at `from` to position `to`. No-op when equal.
    /// Does not change which tab is active.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        if from >= self.tabs.len() || to >= self.tabs.len() {
            return Err(ParselError::internal(format!(
                "reorder out of range: {from} -> {to} with {} tabs",
                self.tabs.len()
            )));
        }
        if from == to {
            return Ok(());
        }
        let tab = self.tabs.remove(from);
        self.tabs.insert(to, tab);
        Ok(())
    }

    /// The currently active tab.
    pub fn active(&self) -> &Tab {
        self.tabs
            .iter()
            .find(|t| t.id == self.active_tab_id)
            .expect("active tab id always references a present tab")
    }

    /// Mutable access to the currently active tab.
    pub fn active_mut(&mut self) -> &mut Tab {
        let id = self.active_tab_id.clone();
        self.tabs
            .iter_mut()
            .find(|t| t.id == id)
            .expect("active tab id always references a present tab")
    }

    /// The active tab's id.
    pub fn active_id(&self) -> &TabId {
        &self.active_tab_id
    }

    /// Looks up a tab by id.
    pub fn get(&self, id: &TabId) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == *id)
    }

    /// Position of a tab in the ordered sequence.
    pub fn index_of(&self, id: &TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == *id)
    }

    /// Tabs in user-significant order.
    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    /// Number of open tabs. Always at least one.
    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    /// Never true; present for API completeness.
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// The system prompt used to seed new tab histories.
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }
}
