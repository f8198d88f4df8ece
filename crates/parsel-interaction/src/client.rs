//! Chat-completions client for the AI proxy.
//!
//! The proxy is consumed as a black box: `POST {messages, model}` in,
//! `choices[0].message.content` out. Failures are classified by HTTP
//! status into the shared error taxonomy so each kind can render a
//! distinct user-facing warning.

use async_trait::async_trait;
use parsel_core::error::{ParselError, Result};
use parsel_core::session::ConversationMessage;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// A single chat-completions call: ordered messages and a model name in,
/// assistant text out.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, messages: &[ConversationMessage], model: &str) -> Result<String>;
}

/// `ChatClient` backed by the HTTP reverse-proxy.
#[derive(Clone)]
pub struct HttpChatClient {
    client: Client,
    endpoint: String,
}

impl HttpChatClient {
    /// Creates a client targeting the given proxy endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl ChatClient for HttpChatClient {
    async fn complete(&self, messages: &[ConversationMessage], model: &str) -> Result<String> {
        let body = ChatCompletionRequest { messages, model };

        let response = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                log::error!("AI proxy request failed: {err}");
                ParselError::network(err.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("AI proxy returned HTTP {status}");
            return Err(ParselError::from_status(status.as_u16()));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|_| ParselError::InvalidResponse)?;

        extract_text_response(parsed)
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    messages: &'a [ConversationMessage],
    model: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

fn extract_text_response(response: ChatCompletionResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .ok_or(ParselError::InvalidResponse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_shape() {
        let messages = [
            ConversationMessage::system("seed"),
            ConversationMessage::user("explain this"),
        ];
        let body = ChatCompletionRequest {
            messages: &messages,
            model: "llama-3.3-70b-versatile",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "llama-3.3-70b-versatile");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "explain this");
    }

    #[test]
    fn test_extract_trims_content() {
        let response: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":"  # Title\n  "}}],"usage":{"total_tokens":5}}"#,
        )
        .unwrap();
        assert_eq!(extract_text_response(response).unwrap(), "# Title");
    }

    #[test]
    fn test_malformed_body_is_invalid_response() {
        let response: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(
            extract_text_response(response).unwrap_err(),
            ParselError::InvalidResponse
        );

        let response: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert_eq!(
            extract_text_response(response).unwrap_err(),
            ParselError::InvalidResponse
        );
    }
}
