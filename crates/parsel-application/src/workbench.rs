//! The parent-window orchestrator.
//!
//! Owns the tab registry, the live editor buffer, the current page
//! identity, the frame bus and the request coordinator, and wires them
//! to the result router. Every error is absorbed here and converted to a
//! displayable frame message; nothing propagates past this boundary.

use crate::bus::{ChildMessage, FrameBus, ParentMessage, ResultPayload, decode_child_message};
use crate::coordinator::{RequestCoordinator, SubmissionTicket};
use parsel_core::config::ParselConfig;
use parsel_core::error::Result;
use parsel_core::page::PageKind;
use parsel_core::session::ConversationMessage;
use parsel_core::tab::{Tab, TabId, TabRegistry, mode};
use parsel_interaction::client::ChatClient;
use parsel_interaction::prompts::SYSTEM_PROMPT;
use parsel_interaction::router::{
    ComplexityOutcome, ExplanationOutcome, ResultRouter, VisualizationOutcome,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Content of the bootstrap tab.
pub const WELCOME_CONTENT: &str = r#"// WELCOME TO PARSEL
// To get started, parse this tab and highlight a snippet!

public static void welcomePage() {
    loadInterface();
    GreetUser(yourName);
}
"#;

const STATUS_EXPLANATION: &str = "Generating response...";
const STATUS_VISUALIZATION: &str = "Detecting sorting algorithm...";
const STATUS_COMPLEXITY: &str = "Analyzing complexity...";

const WARN_NO_CODE: &str = "No analyzable code in the selection.";
const WARN_COMPLEXITY_FAILED: &str = "Failed to analyze time complexity.";
const WARN_NO_ALGORITHM: &str = "No sorting algorithm detected in the highlighted code.";

/// Outcome of one routed request, page-tagged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutedOutcome {
    Explanation(ExplanationOutcome),
    Complexity(ComplexityOutcome),
    Visualization(VisualizationOutcome),
}

/// Resolution of a spawned submission, delivered back to the workbench
/// owner for application. Stale generations are discarded on apply.
#[derive(Debug)]
pub struct Completion {
    pub generation: u64,
    pub page: PageKind,
    pub outcome: Result<RoutedOutcome>,
}

/// The workbench: one editing session with its tabs, frames and a single
/// in-flight AI request slot.
pub struct Workbench {
    session_id: Uuid,
    config: ParselConfig,
    registry: TabRegistry,
    live_buffer: String,
    page: PageKind,
    bus: FrameBus,
    coordinator: RequestCoordinator,
    router: Arc<ResultRouter>,
    completion_tx: mpsc::UnboundedSender<Completion>,
}

impl Workbench {
    /// Creates a workbench with the bootstrap welcome tab and returns the
    /// channel on which spawned submissions resolve. The owner feeds
    /// received completions back through [`Workbench::apply_completion`].
    pub fn new(
        config: ParselConfig,
        client: Arc<dyn ChatClient>,
    ) -> (Self, mpsc::UnboundedReceiver<Completion>) {
        let registry = TabRegistry::new(SYSTEM_PROMPT, "Welcome.txt", WELCOME_CONTENT);
        let live_buffer = registry.active().content.clone();
        let router = Arc::new(ResultRouter::new(client, config.model.clone()));
        let coordinator = RequestCoordinator::new(config.cooldown());
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();

        let workbench = Self {
            session_id: Uuid::new_v4(),
            config,
            registry,
            live_buffer,
            page: PageKind::Explanation,
            bus: FrameBus::new(),
            coordinator,
            router,
            completion_tx,
        };
        (workbench, completion_rx)
    }

    // ========================================================================
    // Frames
    // ========================================================================

    /// Registers a child frame and returns its message stream.
    pub fn register_frame(&mut self, page: PageKind) -> mpsc::UnboundedReceiver<ParentMessage> {
        self.bus.register(page)
    }

    /// Handles a raw child message in wire form. Unknown kinds are ignored.
    pub fn handle_child_json(&mut self, raw: &str) {
        if let Some(message) = decode_child_message(raw) {
            self.handle_child_message(message);
        }
    }

    /// Handles a decoded child message.
    ///
    /// A page-identity announcement makes that frame the current page,
    /// aborts any request that was running for the previous page, and
    /// re-broadcasts the active tab's mode so the newly focused frame can
    /// settle its placeholder state. The duplicate-submission guard is
    /// deliberately left intact across page switches.
    pub fn handle_child_message(&mut self, message: ChildMessage) {
        match message {
            ChildMessage::PageIdentity { page } => {
                tracing::info!("page changed to {page}");
                self.coordinator.cancel_in_flight();
                self.page = page;
                let parsing = self.registry.active().mode.is_parsing();
                self.bus.send(page, ParentMessage::ModeChanged { parsing });
            }
        }
    }

    // ========================================================================
    // Tabs
    // ========================================================================

    /// Creates a tab and switches to it.
    pub fn new_tab(&mut self, name: Option<String>) -> TabId {
        let id = self.registry.create(name, None);
        self.switch_tab(&id);
        id
    }

    /// Switches the active tab: captures the live buffer into the outgoing
    /// tab, aborts any in-flight request, restores the incoming tab's
    /// stored content and broadcasts its mode. Unknown ids are logged and
    /// ignored.
    pub fn switch_tab(&mut self, id: &TabId) {
        if id == self.registry.active_id() {
            return;
        }
        self.capture_live_buffer();
        self.coordinator.cancel_in_flight();
        if let Err(err) = self.registry.switch_to(id) {
            tracing::warn!("tab switch failed: {err}");
            return;
        }
        let tab = self.registry.active();
        self.live_buffer = tab.content.clone();
        self.bus.broadcast_mode(tab.mode.is_parsing());
    }

    /// Closes a tab. Refused (logged) when it is the last one. Closing the
    /// active tab activates its left neighbor, or the new first tab.
    pub fn close_tab(&mut self, id: &TabId) {
        let was_active = id == self.registry.active_id();
        if let Err(err) = self.registry.close(id) {
            tracing::warn!("tab close refused: {err}");
            return;
        }
        if was_active {
            self.coordinator.cancel_in_flight();
            let tab = self.registry.active();
            self.live_buffer = tab.content.clone();
            self.bus.broadcast_mode(tab.mode.is_parsing());
        }
    }

    /// Moves a tab within the bar. The active tab stays active.
    pub fn reorder_tabs(&mut self, from: usize, to: usize) {
        if let Err(err) = self.registry.reorder(from, to) {
            tracing::warn!("tab reorder failed: {err}");
        }
    }

    // ========================================================================
    // Buffer and mode
    // ========================================================================

    /// Replaces the live editor buffer. Ignored while the active tab is in
    /// parsing mode, where the view is read-only.
    pub fn set_buffer(&mut self, text: impl Into<String>) {
        if self.registry.active().mode.is_parsing() {
            tracing::debug!("buffer edit ignored in parsing mode");
            return;
        }
        self.live_buffer = text.into();
    }

    /// Enters parsing mode on the active tab: captures the buffer,
    /// recomputes the file context, seeds the grounding message and
    /// broadcasts the new mode.
    pub fn enter_parsing(&mut self) {
        if self.registry.active().mode.is_parsing() {
            return;
        }
        self.capture_live_buffer();
        let config = self.config.clone();
        mode::enter_parsing(self.registry.active_mut(), &config);
        self.bus.broadcast_mode(true);
    }

    /// Enters editing mode on the active tab: aborts any in-flight
    /// request, resets the conversation to a fresh seed, clears the
    /// duplicate-submission guard and broadcasts the new mode.
    pub fn enter_editing(&mut self) {
        if !self.registry.active().mode.is_parsing() {
            return;
        }
        self.coordinator.cancel_in_flight();
        self.coordinator.clear_duplicate_guard();
        let system_prompt = self.registry.system_prompt().to_string();
        let tab = self.registry.active_mut();
        mode::enter_editing(tab, &system_prompt);
        self.live_buffer = tab.content.clone();
        self.bus.broadcast_mode(false);
    }

    // ========================================================================
    // Submission
    // ========================================================================

    /// Submits a selection for analysis on the current page.
    ///
    /// Guard order: the active tab must be parsing and the selection a
    /// substring of its rendered content, then duplicate suppression,
    /// then the cooldown flag. Returns whether the submission was
    /// accepted; rejections are silent beyond a debug log.
    pub fn submit_selection(&mut self, selection: &str) -> bool {
        let tab = self.registry.active();
        if !tab.mode.is_parsing() {
            tracing::debug!("submission ignored outside parsing mode");
            return false;
        }
        let ticket = match self.coordinator.admit(selection, &tab.content) {
            Ok(ticket) => ticket,
            Err(rejection) => {
                tracing::debug!("submission rejected: {rejection:?}");
                return false;
            }
        };

        let page = self.page;
        let status = match page {
            PageKind::Explanation => STATUS_EXPLANATION,
            PageKind::Visualization => STATUS_VISUALIZATION,
            PageKind::Complexity => STATUS_COMPLEXITY,
        };
        self.bus.send(
            page,
            ParentMessage::Result {
                kind: page,
                payload: ResultPayload::status(status),
            },
        );

        self.spawn_request(page, ticket, selection.to_string());
        true
    }

    fn spawn_request(&self, page: PageKind, ticket: SubmissionTicket, selection: String) {
        let router = Arc::clone(&self.router);
        let tab = self.registry.active();
        let history = tab.history.clone();
        let file_context = tab.file_context.clone();
        let tx = self.completion_tx.clone();
        let generation = ticket.generation();

        tokio::spawn(async move {
            let outcome = match page {
                PageKind::Explanation => ticket
                    .run(router.explanation(&history, &selection))
                    .await
                    .map(RoutedOutcome::Explanation),
                PageKind::Complexity => ticket
                    .run(router.complexity(&file_context, &selection))
                    .await
                    .map(RoutedOutcome::Complexity),
                // Both visualization stages run under one ticket, so a
                // cancellation between stages aborts the pair.
                PageKind::Visualization => ticket
                    .run(router.visualization(&file_context, &selection))
                    .await
                    .map(RoutedOutcome::Visualization),
            };
            let _ = tx.send(Completion {
                generation,
                page,
                outcome,
            });
        });
    }

    /// Applies a resolved submission.
    ///
    /// Completions from superseded generations and cancelled requests are
    /// discarded without any frame traffic. Errors become distinct
    /// warnings; the explanation page is the only one that persists the
    /// assistant reply into tab history.
    pub fn apply_completion(&mut self, completion: Completion) {
        if !self.coordinator.is_current(completion.generation) {
            tracing::debug!(
                "discarding stale completion (generation {})",
                completion.generation
            );
            return;
        }
        self.coordinator.finish(completion.generation);

        let page = completion.page;
        let payload = match completion.outcome {
            Err(err) if err.is_cancelled() => return,
            Err(err) => {
                tracing::warn!("request failed: {err}");
                ResultPayload::warning(err.user_message())
            }
            Ok(RoutedOutcome::Explanation(ExplanationOutcome::Rendered(text))) => {
                let ceiling = self.config.max_history_items;
                let tab = self.registry.active_mut();
                tab.history.push(ConversationMessage::assistant(text.clone()));
                tab.history.trim(ceiling);
                ResultPayload::content(text)
            }
            Ok(RoutedOutcome::Explanation(ExplanationOutcome::MissingCode)) => {
                ResultPayload::warning(WARN_NO_CODE)
            }
            Ok(RoutedOutcome::Complexity(ComplexityOutcome::Rendered(text))) => {
                ResultPayload::content(text)
            }
            Ok(RoutedOutcome::Complexity(ComplexityOutcome::MissingCode)) => {
                ResultPayload::warning(WARN_COMPLEXITY_FAILED)
            }
            Ok(RoutedOutcome::Visualization(VisualizationOutcome::Detected {
                algorithm,
                array_data,
            })) => ResultPayload::Visualization {
                algorithm,
                array_data,
            },
            Ok(RoutedOutcome::Visualization(VisualizationOutcome::NoAlgorithm)) => {
                ResultPayload::warning(WARN_NO_ALGORITHM)
            }
        };
        self.bus.send(page, ParentMessage::Result { kind: page, payload });
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn page(&self) -> PageKind {
        self.page
    }

    pub fn registry(&self) -> &TabRegistry {
        &self.registry
    }

    pub fn active_tab(&self) -> &Tab {
        self.registry.active()
    }

    pub fn buffer(&self) -> &str {
        &self.live_buffer
    }

    fn capture_live_buffer(&mut self) {
        let buffer = self.live_buffer.clone();
        self.registry.active_mut().content = buffer;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parsel_core::error::ParselError;
    use parsel_core::tab::TabMode;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    /// ChatClient double that replays queued replies, counting calls, and
    /// optionally parks until released so cancellation can be exercised.
    struct MockChatClient {
        replies: Mutex<VecDeque<Result<String>>>,
        calls: Mutex<usize>,
        gate: Option<Arc<Notify>>,
    }

    impl MockChatClient {
        fn with_replies(replies: Vec<Result<String>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: Mutex::new(0),
                gate: None,
            })
        }

        fn gated(gate: Arc<Notify>, replies: Vec<Result<String>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: Mutex::new(0),
                gate: Some(gate),
            })
        }

        fn call_count(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl ChatClient for MockChatClient {
        async fn complete(
            &self,
            _messages: &[ConversationMessage],
            _model: &str,
        ) -> Result<String> {
            *self.calls.lock().unwrap() += 1;
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ParselError::internal("mock exhausted")))
        }
    }

    fn workbench_with(
        client: Arc<MockChatClient>,
    ) -> (Workbench, mpsc::UnboundedReceiver<Completion>) {
        Workbench::new(ParselConfig::default(), client)
    }

    /// Drives a tab into parsing mode with the given content.
    fn parse_content(workbench: &mut Workbench, content: &str) {
        workbench.set_buffer(content);
        workbench.enter_parsing();
    }

    #[tokio::test]
    async fn test_explanation_scenario() {
        let client = MockChatClient::with_replies(vec![Ok("# Fixed markdown".to_string())]);
        let (mut workbench, mut completions) = workbench_with(client.clone());
        let mut frame = workbench.register_frame(PageKind::Explanation);

        parse_content(&mut workbench, "function f(x){return x+1}");
        assert!(workbench.submit_selection("function f(x){return x+1}"));

        let completion = completions.recv().await.unwrap();
        workbench.apply_completion(completion);

        // Frame traffic: mode broadcast, transient status, final content.
        assert_eq!(
            frame.recv().await.unwrap(),
            ParentMessage::ModeChanged { parsing: true }
        );
        assert_eq!(
            frame.recv().await.unwrap(),
            ParentMessage::Result {
                kind: PageKind::Explanation,
                payload: ResultPayload::status(STATUS_EXPLANATION),
            }
        );
        assert_eq!(
            frame.recv().await.unwrap(),
            ParentMessage::Result {
                kind: PageKind::Explanation,
                payload: ResultPayload::content("# Fixed markdown"),
            }
        );

        // Exactly one assistant entry persisted.
        assert_eq!(workbench.active_tab().history.assistant_count(), 1);
    }

    #[tokio::test]
    async fn test_visualization_default_makes_single_call() {
        let client = MockChatClient::with_replies(vec![Ok("default".to_string())]);
        let (mut workbench, mut completions) = workbench_with(client.clone());
        let mut frame = workbench.register_frame(PageKind::Visualization);
        workbench.handle_child_message(ChildMessage::PageIdentity {
            page: PageKind::Visualization,
        });

        parse_content(&mut workbench, "let xs = [3, 1, 2];");
        assert!(workbench.submit_selection("let xs = [3, 1, 2];"));

        let completion = completions.recv().await.unwrap();
        workbench.apply_completion(completion);

        assert_eq!(client.call_count(), 1);

        // Skip the identity-time mode echo, the parse broadcast and the
        // status message, then expect the warning.
        let mut last = None;
        while let Ok(message) = frame.try_recv() {
            last = Some(message);
        }
        assert_eq!(
            last.unwrap(),
            ParentMessage::Result {
                kind: PageKind::Visualization,
                payload: ResultPayload::warning(WARN_NO_ALGORITHM),
            }
        );
    }

    #[tokio::test]
    async fn test_visualization_detected_sends_payload() {
        let client = MockChatClient::with_replies(vec![
            Ok("bubble".to_string()),
            Ok("5, 3, 1".to_string()),
        ]);
        let (mut workbench, mut completions) = workbench_with(client.clone());
        let mut frame = workbench.register_frame(PageKind::Visualization);
        workbench.handle_child_message(ChildMessage::PageIdentity {
            page: PageKind::Visualization,
        });

        parse_content(&mut workbench, "bubbleSort([5, 3, 1]);");
        assert!(workbench.submit_selection("bubbleSort([5, 3, 1]);"));

        let completion = completions.recv().await.unwrap();
        workbench.apply_completion(completion);

        assert_eq!(client.call_count(), 2);
        let mut last = None;
        while let Ok(message) = frame.try_recv() {
            last = Some(message);
        }
        assert_eq!(
            last.unwrap(),
            ParentMessage::Result {
                kind: PageKind::Visualization,
                payload: ResultPayload::Visualization {
                    algorithm: "bubble".to_string(),
                    array_data: "5, 3, 1".to_string(),
                },
            }
        );
    }

    #[tokio::test]
    async fn test_rapid_duplicate_submission_suppressed() {
        let client = MockChatClient::with_replies(vec![Ok("# Reply".to_string())]);
        let (mut workbench, mut completions) = workbench_with(client.clone());

        parse_content(&mut workbench, "function f(x){return x+1}");
        assert!(workbench.submit_selection("function f(x){return x+1}"));
        assert!(!workbench.submit_selection("function f(x){return x+1}"));

        let completion = completions.recv().await.unwrap();
        workbench.apply_completion(completion);
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_tab_switch_aborts_in_flight_request() {
        let gate = Arc::new(Notify::new());
        let client = MockChatClient::gated(gate.clone(), vec![Ok("# Late reply".to_string())]);
        let (mut workbench, mut completions) = workbench_with(client.clone());
        let mut frame = workbench.register_frame(PageKind::Explanation);

        parse_content(&mut workbench, "function f(x){return x+1}");
        assert!(workbench.submit_selection("function f(x){return x+1}"));

        // Drain the parse broadcast and the status message.
        assert!(matches!(
            frame.recv().await.unwrap(),
            ParentMessage::ModeChanged { parsing: true }
        ));
        assert!(matches!(
            frame.recv().await.unwrap(),
            ParentMessage::Result { .. }
        ));

        // Switch tabs while the request is parked in the client.
        let second = workbench.registry.create(None, None);
        workbench.switch_tab(&second);

        let completion = completions.recv().await.unwrap();
        assert!(matches!(
            completion.outcome,
            Err(ParselError::Cancelled)
        ));
        workbench.apply_completion(completion);
        gate.notify_waiters();

        // The frame's next message reflects the new tab's mode; the
        // abandoned request produced no result traffic.
        assert_eq!(
            frame.recv().await.unwrap(),
            ParentMessage::ModeChanged { parsing: false }
        );
        assert!(frame.try_recv().is_err());

        // The old tab's history never saw an assistant entry.
        let first_id = workbench.registry().tabs()[0].id.clone();
        let first = workbench.registry().get(&first_id).unwrap();
        assert_eq!(first.history.assistant_count(), 0);
    }

    #[tokio::test]
    async fn test_transport_error_becomes_distinct_warning() {
        let client = MockChatClient::with_replies(vec![Err(ParselError::RateLimited)]);
        let (mut workbench, mut completions) = workbench_with(client);
        let mut frame = workbench.register_frame(PageKind::Explanation);

        parse_content(&mut workbench, "code sample");
        assert!(workbench.submit_selection("code sample"));

        let completion = completions.recv().await.unwrap();
        workbench.apply_completion(completion);

        let mut last = None;
        while let Ok(message) = frame.try_recv() {
            last = Some(message);
        }
        assert_eq!(
            last.unwrap(),
            ParentMessage::Result {
                kind: PageKind::Explanation,
                payload: ResultPayload::warning(ParselError::RateLimited.user_message()),
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_enter_editing_resets_history_and_guard() {
        let client = MockChatClient::with_replies(vec![
            Ok("# First".to_string()),
            Ok("# Second".to_string()),
        ]);
        let (mut workbench, mut completions) = workbench_with(client.clone());

        parse_content(&mut workbench, "function f(x){return x+1}");
        assert!(workbench.submit_selection("function f(x){return x+1}"));
        let completion = completions.recv().await.unwrap();
        workbench.apply_completion(completion);
        assert_eq!(workbench.active_tab().history.assistant_count(), 1);

        workbench.enter_editing();
        assert_eq!(workbench.active_tab().history.len(), 1);
        assert_eq!(workbench.active_tab().mode, TabMode::Editing);

        // Same selection is admissible again after the guard reset, once
        // the cooldown expires.
        workbench.enter_parsing();
        tokio::time::sleep(std::time::Duration::from_millis(1600)).await;
        assert!(workbench.submit_selection("function f(x){return x+1}"));
        let completion = completions.recv().await.unwrap();
        workbench.apply_completion(completion);
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn test_child_json_routing() {
        let client = MockChatClient::with_replies(vec![]);
        let (mut workbench, _completions) = workbench_with(client);

        workbench.handle_child_json(r#"{"kind":"page_identity","page":"complexity"}"#);
        assert_eq!(workbench.page(), PageKind::Complexity);

        // Unknown kinds leave state untouched.
        workbench.handle_child_json(r#"{"kind":"scroll","offset":3}"#);
        assert_eq!(workbench.page(), PageKind::Complexity);
    }

    #[tokio::test]
    async fn test_buffer_capture_and_restore_across_switch() {
        let client = MockChatClient::with_replies(vec![]);
        let (mut workbench, _completions) = workbench_with(client);

        workbench.set_buffer("first tab text");
        let second = workbench.new_tab(None);
        workbench.set_buffer("second tab text");

        let first_id = workbench.registry().tabs()[0].id.clone();
        workbench.switch_tab(&first_id);
        assert_eq!(workbench.buffer(), "first tab text");
        assert_eq!(
            workbench.registry().get(&second).unwrap().content,
            "second tab text"
        );
    }
}
