//! Error types for the Parsel application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Parsel application.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait. Transport failures carry
/// enough structure to render a distinct user-facing warning per kind.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParselError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// The AI proxy rejected the request due to rate limiting (HTTP 429)
    #[error("Rate limited by AI service")]
    RateLimited,

    /// The AI proxy rejected the credentials (HTTP 401)
    #[error("Authentication with AI service failed")]
    AuthFailed,

    /// The AI proxy reported a server-side failure (HTTP >= 500)
    #[error("AI service error (HTTP {status})")]
    Server { status: u16 },

    /// Any other non-success HTTP response from the AI proxy
    #[error("Unexpected HTTP response from AI service (HTTP {status})")]
    Http { status: u16 },

    /// The AI proxy returned a body without `choices[0].message.content`
    #[error("Invalid response structure from AI service")]
    InvalidResponse,

    /// Network/transport failure before any HTTP status was received
    #[error("Network error: {0}")]
    Network(String),

    /// The request was superseded by a user action. Not a failure: callers
    /// must discard this silently and surface nothing to the user.
    #[error("Request cancelled")]
    Cancelled,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ParselError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Classifies a non-success HTTP status from the AI proxy.
    pub fn from_status(status: u16) -> Self {
        match status {
            429 => Self::RateLimited,
            401 => Self::AuthFailed,
            s if s >= 500 => Self::Server { status: s },
            s => Self::Http { status: s },
        }
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a cancellation, which is a silent terminal state
    /// rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Check if this is a transport-layer error from the AI proxy.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::RateLimited
                | Self::AuthFailed
                | Self::Server { .. }
                | Self::Http { .. }
                | Self::InvalidResponse
                | Self::Network(_)
        )
    }

    /// Renders the human-readable warning shown to the user for this error.
    ///
    /// Each transport kind maps to a distinct message, with the underlying
    /// HTTP status visible for diagnosis. `Cancelled` has no user-facing
    /// message; callers must not ask for one.
    pub fn user_message(&self) -> String {
        match self {
            Self::RateLimited => {
                "AI service is rate limited right now. Wait a moment and resubmit.".to_string()
            }
            Self::AuthFailed => {
                "AI service rejected the request (authentication failure, HTTP 401).".to_string()
            }
            Self::Server { status } => {
                format!("AI service is having trouble (HTTP {status}). Try again shortly.")
            }
            Self::Http { status } => {
                format!("Unexpected response from AI service (HTTP {status}).")
            }
            Self::InvalidResponse => {
                "AI service returned an invalid response. Re-select the code and retry.".to_string()
            }
            Self::Network(_) => {
                "Could not reach the AI service. Check your connection and retry.".to_string()
            }
            other => format!("Something went wrong: {other}"),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ParselError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(format!("{} (kind: {:?})", err, err.kind()))
    }
}

impl From<serde_json::Error> for ParselError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for ParselError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, ParselError>`.
pub type Result<T> = std::result::Result<T, ParselError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_classification() {
        assert_eq!(ParselError::from_status(429), ParselError::RateLimited);
        assert_eq!(ParselError::from_status(401), ParselError::AuthFailed);
        assert_eq!(
            ParselError::from_status(500),
            ParselError::Server { status: 500 }
        );
        assert_eq!(
            ParselError::from_status(503),
            ParselError::Server { status: 503 }
        );
        assert_eq!(
            ParselError::from_status(404),
            ParselError::Http { status: 404 }
        );
    }

    #[test]
    fn test_user_messages_are_distinct() {
        let kinds = [
            ParselError::RateLimited,
            ParselError::AuthFailed,
            ParselError::Server { status: 502 },
            ParselError::Http { status: 418 },
            ParselError::InvalidResponse,
            ParselError::network("connection refused"),
        ];
        let messages: Vec<String> = kinds.iter().map(|e| e.user_message()).collect();
        for (i, a) in messages.iter().enumerate() {
            for b in messages.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_status_visible_in_message() {
        assert!(
            ParselError::Server { status: 503 }
                .user_message()
                .contains("503")
        );
    }

    #[test]
    fn test_cancelled_is_not_transport() {
        assert!(ParselError::Cancelled.is_cancelled());
        assert!(!ParselError::Cancelled.is_transport());
    }
}
