//! Completion-service client
//!
//! This module provides the client for the external text-completion service
//! used by the classification, summarization, and comparison stages. The
//! service speaks the OpenAI-compatible chat completions protocol; any
//! endpoint implementing it (hosted or self-hosted) works.
//!
//! Components never talk to a global client. They receive a
//! [`CompletionModel`] instance, constructed once per run and owned by the
//! pipeline orchestrator, which keeps the collaborator swappable in tests.

mod http;
pub mod mock;
mod types;

pub use http::{HttpClient, HttpOptions};
pub use types::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Choice, CompletionRequest, Usage,
};

use crate::error::{Error, Result};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Abstraction over the completion service
///
/// One call corresponds to one request against the service; the returned
/// string is the raw completion text, unparsed.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Run a single completion request and return the generated text
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}

/// Client for an OpenAI-compatible completion service
///
/// This is the production implementation of [`CompletionModel`]. It binds the
/// transport to a model name so call sites only provide the instruction and
/// content.
#[derive(Debug, Clone)]
pub struct Client {
    http_client: HttpClient,
    model: String,
}

impl Client {
    /// Create a new client for the service at `base_url`
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http_client: HttpClient::new(base_url, api_key),
            model: model.into(),
        }
    }

    /// Create a new client with custom transport options
    pub fn with_options(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        options: HttpOptions,
    ) -> Self {
        Self {
            http_client: HttpClient::with_options(base_url, api_key, options),
            model: model.into(),
        }
    }

    /// The model name requests are issued against
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionModel for Client {
    #[instrument(skip(self, request), level = "debug")]
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(request.system),
                ChatMessage::user(request.user),
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response: ChatCompletionResponse =
            self.http_client.post("chat/completions", &body).await?;

        if let Some(usage) = &response.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "completion finished"
            );
        }

        match response.text() {
            Some(text) => Ok(text.to_string()),
            None => Err(Error::UnexpectedResponse(
                "completion response contained no choices".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn test_complete_success() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                "choices": [{
                    "message": {"role": "assistant", "content": "Generated text"},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 12, "completion_tokens": 3}
            }"#,
            )
            .create_async()
            .await;

        let client = Client::new(server.url(), "test-key", "test-model");
        let text = client
            .complete(CompletionRequest {
                system: "You are a helpful assistant.".to_string(),
                user: "Hello, world!".to_string(),
                max_tokens: 64,
                temperature: 0.0,
            })
            .await
            .unwrap();

        assert_eq!(text, "Generated text");
        mock_server.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_empty_choices_is_error() {
        let mut server = Server::new_async().await;
        let _mock_server = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let client = Client::new(server.url(), "test-key", "test-model");
        let result = client
            .complete(CompletionRequest {
                system: String::new(),
                user: "Hello".to_string(),
                max_tokens: 64,
                temperature: 0.0,
            })
            .await;

        assert!(matches!(result, Err(Error::UnexpectedResponse(_))));
    }

    #[tokio::test]
    async fn test_request_body_shape() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("POST", "/chat/completions")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "model": "test-model",
                "messages": [
                    {"role": "system", "content": "instruction"},
                    {"role": "user", "content": "content"}
                ],
                "max_tokens": 100,
                "temperature": 0.0
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"choices": [{"message": {"role": "assistant", "content": "ok"}}]}"#,
            )
            .create_async()
            .await;

        let client = Client::new(server.url(), "test-key", "test-model");
        let text = client
            .complete(CompletionRequest {
                system: "instruction".to_string(),
                user: "content".to_string(),
                max_tokens: 100,
                temperature: 0.0,
            })
            .await
            .unwrap();

        assert_eq!(text, "ok");
        mock_server.assert_async().await;
    }
}
