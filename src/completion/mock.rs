//! Mock completion model for testing
//!
//! Provides a `MockCompletion` that implements the `CompletionModel` trait
//! for use in tests. Responses are scripted up front and returned in order;
//! every request is recorded so tests can assert on the instructions and
//! content that components send.

use crate::completion::{CompletionModel, CompletionRequest};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A scripted mock of the completion service
#[derive(Debug, Clone, Default)]
pub struct MockCompletion {
    /// Queued responses, consumed front to back
    responses: Arc<Mutex<VecDeque<Result<String>>>>,

    /// Requests received so far
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockCompletion {
    /// Create a new mock with no scripted responses
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful text response
    pub async fn push_response(&self, text: impl Into<String>) {
        let mut guard = self.responses.lock().await;
        guard.push_back(Ok(text.into()));
    }

    /// Queue an error response
    pub async fn push_error(&self, message: impl Into<String>) {
        let mut guard = self.responses.lock().await;
        guard.push_back(Err(Error::Other(message.into())));
    }

    /// All requests received so far, in call order
    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl CompletionModel for MockCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        self.requests.lock().await.push(request);

        let mut guard = self.responses.lock().await;
        guard.pop_front().unwrap_or_else(|| {
            Err(Error::Other(
                "MockCompletion has no scripted response left".to_string(),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_responses_returned_in_order() {
        let mock = MockCompletion::new();
        mock.push_response("first").await;
        mock.push_response("second").await;

        let request = CompletionRequest {
            system: "sys".to_string(),
            user: "usr".to_string(),
            max_tokens: 10,
            temperature: 0.0,
        };

        assert_eq!(mock.complete(request.clone()).await.unwrap(), "first");
        assert_eq!(mock.complete(request.clone()).await.unwrap(), "second");
        assert!(mock.complete(request).await.is_err());

        let requests = mock.requests().await;
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].system, "sys");
    }
}
