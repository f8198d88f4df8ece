//! Cross-frame message bus.
//!
//! Bidirectional protocol between the parent workbench and the three
//! result-rendering child frames. Messages are tagged unions discriminated
//! by an explicit `kind` field; unknown kinds are ignored at the boundary
//! rather than pattern-matched on key presence. Delivery is fire-and-forget
//! over one FIFO channel per frame: a frame that has not registered (or has
//! gone away) simply misses the message, and nothing is retried.

use parsel_core::page::PageKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::mpsc;

/// Messages a child frame sends to the parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChildMessage {
    /// Announced on frame load: which logical page this frame represents.
    /// The parent records it as the current page for routing.
    PageIdentity { page: PageKind },
}

/// Messages the parent sends to a child frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParentMessage {
    /// Broadcast on every active-tab mode change and on every tab switch.
    /// `parsing == false` means "show the empty/editing placeholder",
    /// `true` means "show the parsing/awaiting placeholder"; children
    /// reset their displayed state purely from this signal.
    ModeChanged { parsing: bool },
    /// A routed analysis result for one frame.
    Result {
        #[serde(rename = "page")]
        kind: PageKind,
        payload: ResultPayload,
    },
}

/// Payload of a `Result` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResultPayload {
    /// Transient progress text shown while a request is in flight.
    Status { text: String },
    /// Warning for negative outcomes and classified errors.
    Warning { text: String },
    /// Final markdown content for the explanation and complexity frames.
    Content { markdown: String },
    /// Final payload for the visualization frame; step generation happens
    /// frame-side.
    Visualization {
        algorithm: String,
        array_data: String,
    },
}

impl ResultPayload {
    pub fn status(text: impl Into<String>) -> Self {
        Self::Status { text: text.into() }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::Warning { text: text.into() }
    }

    pub fn content(markdown: impl Into<String>) -> Self {
        Self::Content {
            markdown: markdown.into(),
        }
    }
}

/// Parent-side endpoint of the cross-frame protocol.
///
/// Each registered frame gets its own unbounded FIFO channel, so sends to
/// one frame are never reordered. Mode changes go to every registered
/// frame; results go to the frame they belong to.
#[derive(Debug, Default)]
pub struct FrameBus {
    frames: HashMap<PageKind, mpsc::UnboundedSender<ParentMessage>>,
}

impl FrameBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a frame and returns its receiving end. Registering the
    /// same page again replaces the previous channel (a reloaded frame).
    pub fn register(&mut self, page: PageKind) -> mpsc::UnboundedReceiver<ParentMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.frames.insert(page, tx);
        rx
    }

    /// Sends a message to one frame. Dropped silently when the frame is
    /// not registered or its receiver is gone.
    pub fn send(&self, page: PageKind, message: ParentMessage) {
        match self.frames.get(&page) {
            Some(tx) => {
                if tx.send(message).is_err() {
                    tracing::debug!("frame {page} is gone; message dropped");
                }
            }
            None => tracing::debug!("frame {page} not registered; message dropped"),
        }
    }

    /// Broadcasts the active tab's mode to every registered frame.
    pub fn broadcast_mode(&self, parsing: bool) {
        for page in PageKind::all() {
            self.send(page, ParentMessage::ModeChanged { parsing });
        }
    }
}

/// Decodes a child message from its JSON wire form.
///
/// Unknown kinds and malformed payloads yield `None` and are debug-logged;
/// extra fields are tolerated.
pub fn decode_child_message(raw: &str) -> Option<ChildMessage> {
    match serde_json::from_str(raw) {
        Ok(message) => Some(message),
        Err(err) => {
            tracing::debug!("ignoring unrecognized child message: {err}");
            None
        }
    }
}

/// Encodes a parent message to its JSON wire form.
pub fn encode_parent_message(message: &ParentMessage) -> String {
    serde_json::to_string(message).expect("parent messages always serialize")
}
