//! Application configuration.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Default chat-completions proxy endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://parserpro.onrender.com/parse";

/// Default model requested from the proxy.
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Tunable limits and endpoints for a Parsel session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParselConfig {
    /// File-context ceiling in characters. Content longer than this is
    /// truncated to the first and last half-ceiling before being sent
    /// as grounding context.
    pub max_file_size: usize,
    /// Conversation history ceiling. When exceeded, the first 3 entries
    /// and the most recent `max_history_items - 3` are retained.
    pub max_history_items: usize,
    /// Cooldown between accepted submissions, in milliseconds.
    pub cooldown_ms: u64,
    /// Chat-completions proxy endpoint.
    pub endpoint: String,
    /// Model name forwarded to the proxy.
    pub model: String,
}

impl Default for ParselConfig {
    fn default() -> Self {
        Self {
            max_file_size: 1000,
            max_history_items: 10,
            cooldown_ms: 1500,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl ParselConfig {
    /// Builds a configuration from defaults, with `PARSEL_ENDPOINT` and
    /// `PARSEL_MODEL` environment variables taking precedence when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(endpoint) = env::var("PARSEL_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Ok(model) = env::var("PARSEL_MODEL") {
            config.model = model;
        }
        config
    }

    /// Cooldown as a `Duration`.
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}
