//! Submission serialization: at most one AI request in flight for the
//! whole session, with explicit cancellation and a cooldown between
//! accepted submissions.

use parsel_core::error::{ParselError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Handle for one accepted submission.
///
/// Carries the cancellation token for the whole logical operation (both
/// visualization stages share one ticket) and the generation used to
/// reject results that arrive after the submission was superseded.
#[derive(Debug, Clone)]
pub struct SubmissionTicket {
    generation: u64,
    token: CancellationToken,
}

impl SubmissionTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Runs a routed request under this ticket's cancellation token.
    /// Cancellation resolves to `ParselError::Cancelled`, which callers
    /// must treat as a silent terminal state.
    pub async fn run<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::select! {
            _ = self.token.cancelled() => Err(ParselError::Cancelled),
            result = fut => result,
        }
    }
}

/// Why a submission was not admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Selection empty or not a substring of the rendered parse buffer.
    InvalidSelection,
    /// Same selection as the last accepted submission.
    Duplicate,
    /// Cooldown window still open.
    Cooldown,
}

/// Guards and sequences submissions for the session.
///
/// Guard order is fixed: selection validity against the rendered buffer,
/// then duplicate suppression, then the cooldown flag. The duplicate guard
/// is cleared only on entering editing mode, not on page switches.
pub struct RequestCoordinator {
    last_selection: Option<String>,
    cooldown: Arc<AtomicBool>,
    cooldown_duration: Duration,
    cooldown_timer: Option<JoinHandle<()>>,
    in_flight: Option<CancellationToken>,
    generation: u64,
}

impl RequestCoordinator {
    pub fn new(cooldown_duration: Duration) -> Self {
        Self {
            last_selection: None,
            cooldown: Arc::new(AtomicBool::new(false)),
            cooldown_duration,
            cooldown_timer: None,
            in_flight: None,
            generation: 0,
        }
    }

    /// Applies the submission guards and, on acceptance, claims the
    /// in-flight slot.
    ///
    /// Acceptance cancels any previous in-flight request, records the
    /// selection for duplicate suppression, raises the cooldown flag and
    /// arms the single-slot cooldown timer.
    pub fn admit(&mut self, selection: &str, rendered_buffer: &str) -> std::result::Result<SubmissionTicket, Rejection> {
        if selection.is_empty() || !rendered_buffer.contains(selection) {
            return Err(Rejection::InvalidSelection);
        }
        if self.last_selection.as_deref() == Some(selection) {
            return Err(Rejection::Duplicate);
        }
        if self.cooldown.load(Ordering::SeqCst) {
            return Err(Rejection::Cooldown);
        }

        self.cancel_in_flight();
        self.last_selection = Some(selection.to_string());
        self.start_cooldown();

        self.generation += 1;
        let token = CancellationToken::new();
        self.in_flight = Some(token.clone());
        Ok(SubmissionTicket {
            generation: self.generation,
            token,
        })
    }

    /// Aborts the in-flight request, if any. Called on mode switch, page
    /// switch and tab switch. Also bumps the generation so a late
    /// resolution of the aborted request can never be applied.
    pub fn cancel_in_flight(&mut self) {
        if let Some(token) = self.in_flight.take() {
            tracing::debug!("cancelling in-flight request (generation {})", self.generation);
            token.cancel();
            self.generation += 1;
        }
    }

    /// Clears the duplicate-suppression guard (entering editing mode).
    pub fn clear_duplicate_guard(&mut self) {
        self.last_selection = None;
    }

    /// True when a completion with this generation is still the current
    /// submission.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation && self.in_flight.is_some()
    }

    /// Releases the in-flight slot after a completion has been applied.
    pub fn finish(&mut self, generation: u64) {
        if self.generation == generation {
            self.in_flight = None;
        }
    }

    fn start_cooldown(&mut self) {
        self.cooldown.store(true, Ordering::SeqCst);
        // Single-slot timer: superseding aborts the old one.
        if let Some(timer) = self.cooldown_timer.take() {
            timer.abort();
        }
        let flag = Arc::clone(&self.cooldown);
        let duration = self.cooldown_duration;
        self.cooldown_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            flag.store(false, Ordering::SeqCst);
        }));
    }
}

impl Drop for RequestCoordinator {
    fn drop(&mut self) {
        if let Some(timer) = self.cooldown_timer.take() {
            timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUFFER: &str = "function f(x){return x+1}\nfunction g(y){return y*2}";

    fn coordinator() -> RequestCoordinator {
        RequestCoordinator::new(Duration::from_millis(1500))
    }

    #[tokio::test]
    async fn test_empty_selection_rejected() {
        let mut coordinator = coordinator();
        assert_eq!(
            coordinator.admit("", BUFFER).unwrap_err(),
            Rejection::InvalidSelection
        );
    }

    #[tokio::test]
    async fn test_foreign_selection_rejected() {
        let mut coordinator = coordinator();
        assert_eq!(
            coordinator.admit("text from another window", BUFFER).unwrap_err(),
            Rejection::InvalidSelection
        );
    }

    #[tokio::test]
    async fn test_guard_order_validity_before_duplicate() {
        let mut coordinator = coordinator();
        coordinator.admit("function f", BUFFER).unwrap();
        // A stale selection that matches the last submission is reported
        // as invalid, not duplicate, once it no longer appears in the
        // rendered buffer.
        assert_eq!(
            coordinator.admit("function f", "other buffer").unwrap_err(),
            Rejection::InvalidSelection
        );
    }

    #[tokio::test]
    async fn test_duplicate_suppressed() {
        let mut coordinator = coordinator();
        coordinator.admit("function f", BUFFER).unwrap();
        assert_eq!(
            coordinator.admit("function f", BUFFER).unwrap_err(),
            Rejection::Duplicate
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_blocks_second_submission() {
        let mut coordinator = coordinator();
        coordinator.admit("function f", BUFFER).unwrap();
        assert_eq!(
            coordinator.admit("function g", BUFFER).unwrap_err(),
            Rejection::Cooldown
        );

        tokio::time::sleep(Duration::from_millis(1600)).await;
        assert!(coordinator.admit("function g", BUFFER).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_guard_survives_cooldown_expiry() {
        let mut coordinator = coordinator();
        coordinator.admit("function f", BUFFER).unwrap();
        tokio::time::sleep(Duration::from_millis(1600)).await;
        assert_eq!(
            coordinator.admit("function f", BUFFER).unwrap_err(),
            Rejection::Duplicate
        );

        coordinator.clear_duplicate_guard();
        assert!(coordinator.admit("function f", BUFFER).is_ok());
    }

    #[tokio::test]
    async fn test_cancel_resolves_run_to_cancelled() {
        let mut coordinator = coordinator();
        let ticket = coordinator.admit("function f", BUFFER).unwrap();
        coordinator.cancel_in_flight();

        let result = ticket
            .run(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok("never".to_string())
            })
            .await;
        assert_eq!(result.unwrap_err(), ParselError::Cancelled);
    }

    #[tokio::test]
    async fn test_cancelled_generation_is_stale() {
        let mut coordinator = coordinator();
        let ticket = coordinator.admit("function f", BUFFER).unwrap();
        assert!(coordinator.is_current(ticket.generation()));

        coordinator.cancel_in_flight();
        assert!(!coordinator.is_current(ticket.generation()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_submission_supersedes_previous() {
        let mut coordinator = coordinator();
        let first = coordinator.admit("function f", BUFFER).unwrap();
        tokio::time::sleep(Duration::from_millis(1600)).await;
        let second = coordinator.admit("function g", BUFFER).unwrap();

        assert!(!coordinator.is_current(first.generation()));
        assert!(coordinator.is_current(second.generation()));
    }

    #[tokio::test]
    async fn test_finish_releases_slot() {
        let mut coordinator = coordinator();
        let ticket = coordinator.admit("function f", BUFFER).unwrap();
        coordinator.finish(ticket.generation());
        assert!(!coordinator.is_current(ticket.generation()));
    }
}
