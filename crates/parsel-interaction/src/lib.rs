//! LLM plumbing for Parsel: the chat-completions client, the prompt
//! templates with their sentinels, and the router that builds
//! page-specific requests and classifies replies.

pub mod client;
pub mod prompts;
pub mod router;

pub use client::{ChatClient, HttpChatClient};
pub use router::{ComplexityOutcome, ExplanationOutcome, ResultRouter, VisualizationOutcome};
