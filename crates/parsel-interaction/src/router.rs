//! Builds the page-specific request and classifies the model's reply.
//!
//! Explanation requests ride on the tab's persisted history; complexity
//! and visualization requests are stateless with respect to the
//! conversation. Visualization is a two-stage pipeline: algorithm
//! detection first, array extraction only when detection succeeds.

use crate::client::ChatClient;
use crate::prompts;
use parsel_core::error::Result;
use parsel_core::session::{ConversationHistory, ConversationMessage};
use parsel_core::tab::mode::file_context_message;
use std::sync::Arc;

/// Classified reply from the explanation page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplanationOutcome {
    /// Markdown to render verbatim.
    Rendered(String),
    /// The model judged the selection not to be code. A normal negative
    /// outcome, not an error; nothing is appended to history.
    MissingCode,
}

/// Classified reply from the complexity page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComplexityOutcome {
    Rendered(String),
    MissingCode,
}

/// Classified outcome of the two-stage visualization pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisualizationOutcome {
    /// Algorithm token and comma-separated integer payload for step
    /// generation downstream.
    Detected {
        algorithm: String,
        array_data: String,
    },
    /// Stage one found no sorting algorithm; stage two was never issued.
    NoAlgorithm,
}

/// Dispatches page-specific prompts to the AI collaborator and interprets
/// the replies.
///
/// The router never mutates tab state; persisting the assistant reply
/// (and trimming) is the caller's job, so a reply that arrives after its
/// submission was superseded can still be discarded.
pub struct ResultRouter {
    client: Arc<dyn ChatClient>,
    model: String,
}

impl ResultRouter {
    pub fn new(client: Arc<dyn ChatClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Explanation request, grounded in the tab's persisted history.
    ///
    /// The instruction and selection turns ride along with the history but
    /// are ephemeral. A sentinel reply maps to `MissingCode`; any other
    /// reply is returned verbatim for the caller to persist and render.
    pub async fn explanation(
        &self,
        history: &ConversationHistory,
        selection: &str,
    ) -> Result<ExplanationOutcome> {
        let mut messages = history.messages().to_vec();
        messages.push(ConversationMessage::system(prompts::EXPLANATION_PROMPT));
        messages.push(ConversationMessage::user(selection));

        let reply = self.client.complete(&messages, &self.model).await?;

        if reply == prompts::MISSING_CODE_SENTINEL {
            log::info!("explanation: model reported missing code");
            return Ok(ExplanationOutcome::MissingCode);
        }
        Ok(ExplanationOutcome::Rendered(reply))
    }

    /// Complexity request. Stateless: the tab's conversation history is
    /// neither read nor written.
    pub async fn complexity(
        &self,
        file_context: &str,
        selection: &str,
    ) -> Result<ComplexityOutcome> {
        let messages = stateless_messages(file_context, prompts::COMPLEXITY_PROMPT, selection);
        let reply = self.client.complete(&messages, &self.model).await?;

        if prompts::is_missing_code(&reply) {
            log::info!("complexity: model reported missing code");
            return Ok(ComplexityOutcome::MissingCode);
        }
        Ok(ComplexityOutcome::Rendered(reply))
    }

    /// Two-stage visualization pipeline, both stages stateless.
    ///
    /// Stage one asks for a single token from the closed algorithm set;
    /// the response is lowercased and trimmed before matching, and any
    /// token outside the set (including the "default" sentinel) stops the
    /// pipeline without issuing stage two.
    pub async fn visualization(
        &self,
        file_context: &str,
        selection: &str,
    ) -> Result<VisualizationOutcome> {
        let messages = stateless_messages(file_context, prompts::ALGORITHM_PROMPT, selection);
        let algorithm = self
            .client
            .complete(&messages, &self.model)
            .await?
            .to_lowercase()
            .trim()
            .to_string();

        if !prompts::ALGORITHM_TOKENS.contains(algorithm.as_str()) {
            log::info!("visualization: no sorting algorithm detected (got {algorithm:?})");
            return Ok(VisualizationOutcome::NoAlgorithm);
        }

        let messages = stateless_messages(file_context, prompts::ARRAY_PROMPT, selection);
        let array_data = self.client.complete(&messages, &self.model).await?;

        Ok(VisualizationOutcome::Detected {
            algorithm,
            array_data,
        })
    }
}

/// Message list for requests that do not ride on tab history: fresh seed,
/// file-context grounding, page instruction, then the selection.
fn stateless_messages(
    file_context: &str,
    instruction: &str,
    selection: &str,
) -> Vec<ConversationMessage> {
    vec![
        ConversationMessage::system(prompts::SYSTEM_PROMPT),
        ConversationMessage::system(file_context_message(file_context)),
        ConversationMessage::system(instruction),
        ConversationMessage::user(selection),
    ]
}
