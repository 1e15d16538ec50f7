//! Type definitions for the completion-service client
//!
//! These mirror the OpenAI-compatible chat completions wire format, which is
//! what self-hosted inference servers and most hosted providers speak.

use serde::{Deserialize, Serialize};

/// A single chat message with a role and text content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message author ("system", "user", "assistant")
    pub role: String,

    /// The text content of the message
    pub content: String,
}

impl ChatMessage {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body for a chat completion
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    /// Model identifier to run the completion against
    pub model: String,

    /// Conversation messages, system instruction first
    pub messages: Vec<ChatMessage>,

    /// Maximum number of tokens to generate
    pub max_tokens: u32,

    /// Sampling temperature; 0.0 for deterministic decoding
    pub temperature: f32,
}

/// A generated choice within a completion response
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    /// The generated message
    pub message: ChatMessage,

    /// Why generation stopped, if reported
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Token accounting reported by the service
#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    /// Tokens consumed by the prompt
    #[serde(default)]
    pub prompt_tokens: u32,

    /// Tokens generated in the completion
    #[serde(default)]
    pub completion_tokens: u32,
}

/// Response body of a chat completion
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    /// Generated choices; the first one carries the answer
    pub choices: Vec<Choice>,

    /// Token usage, when the service reports it
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl ChatCompletionResponse {
    /// Get the text of the first choice, if the service produced one
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .map(|choice| choice.message.content.as_str())
    }
}

/// A completion request as seen by pipeline components: a fixed system
/// instruction, the user content, and decoding parameters.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System instruction establishing the task
    pub system: String,

    /// User content to operate on
    pub user: String,

    /// Maximum output tokens
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        let system = ChatMessage::system("be terse");
        assert_eq!(system.role, "system");
        assert_eq!(system.content, "be terse");

        let user = ChatMessage::user("hello");
        assert_eq!(user.role, "user");
    }

    #[test]
    fn test_response_text_first_choice() {
        let response: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "first"}},
                            {"message": {"role": "assistant", "content": "second"}}]}"#,
        )
        .unwrap();
        assert_eq!(response.text(), Some("first"));
    }

    #[test]
    fn test_response_text_empty_choices() {
        let response: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert_eq!(response.text(), None);
    }
}
