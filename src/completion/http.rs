//! HTTP transport for the completion-service client
//!
//! Handles authentication, request formatting, and response parsing for an
//! OpenAI-compatible chat completions endpoint. The client can be configured
//! to automatically retry requests when rate limited (HTTP 429 responses)
//! via the `retry_on_rate_limit`, `max_retries`, and `default_retry_after_secs`
//! options in the `HttpOptions` struct.

use crate::error::{Error, Result};
use reqwest::{Client as ReqwestClient, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, instrument};
use url::Url;

/// Default timeout for completion requests in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Options controlling transport behavior
#[derive(Debug, Clone)]
pub struct HttpOptions {
    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Whether to automatically retry requests when rate limited
    pub retry_on_rate_limit: bool,

    /// Maximum number of retry attempts for rate-limited requests
    pub max_retries: u32,

    /// Default retry delay in seconds if no Retry-After header is provided
    pub default_retry_after_secs: u64,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry_on_rate_limit: true,
            max_retries: 3,
            default_retry_after_secs: 2,
        }
    }
}

/// HTTP client for making requests to the completion service
#[derive(Debug, Clone)]
pub struct HttpClient {
    /// The underlying reqwest client
    client: ReqwestClient,

    /// Base URL of the completion service
    base_url: String,

    /// Bearer token for authentication
    api_key: String,

    /// Whether to automatically retry requests when rate limited
    retry_on_rate_limit: bool,

    /// Maximum number of retry attempts for rate-limited requests
    max_retries: u32,

    /// Default retry delay in seconds if no Retry-After header is provided
    default_retry_after_secs: u64,
}

impl HttpClient {
    /// Create a new HTTP client for the given service base URL
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_options(base_url, api_key, HttpOptions::default())
    }

    /// Create a new HTTP client with custom options
    pub fn with_options(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        options: HttpOptions,
    ) -> Self {
        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            retry_on_rate_limit: options.retry_on_rate_limit,
            max_retries: options.max_retries,
            default_retry_after_secs: options.default_retry_after_secs,
        }
    }

    /// Build an absolute URL for an endpoint path
    fn build_url(&self, path: &str) -> Result<Url> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        Url::parse(&url).map_err(|e| Error::Other(format!("Invalid URL: {}", e)))
    }

    /// Prepare a POST request with a JSON body
    #[instrument(skip(self, body), level = "debug")]
    pub async fn post<T: DeserializeOwned, B: Serialize + std::fmt::Debug>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.build_url(path)?;

        let request = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body);

        debug!("Sending POST request to {}", path);
        self.execute_request(request).await
    }

    /// Execute an HTTP request and handle the response
    async fn execute_request<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let mut attempts = 0;

        loop {
            // Clone the request builder for each attempt
            let request_clone = request
                .try_clone()
                .ok_or_else(|| Error::Other("Failed to clone request for retry".to_string()))?;

            let response = request_clone.send().await.map_err(Error::Http)?;
            let status = response.status();

            // Check for rate limit response
            if status == StatusCode::TOO_MANY_REQUESTS {
                attempts += 1;

                // Extract retry-after header if available
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|h| h.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(self.default_retry_after_secs);

                let response_text = response.text().await.map_err(Error::Http)?;
                error!("API error: {} - {}", status, response_text);

                // Check if we should retry
                if self.retry_on_rate_limit && attempts <= self.max_retries {
                    // Exponential backoff: retry_after * 2^(attempts-1), capped
                    let max_delay = 60;
                    let exp_factor = u64::pow(2, attempts - 1);
                    let delay = std::cmp::min(retry_after.saturating_mul(exp_factor), max_delay);

                    debug!(
                        "Rate limited. Retrying after {} seconds (attempt {}/{})",
                        delay, attempts, self.max_retries
                    );

                    tokio::time::sleep(Duration::from_secs(delay)).await;
                    continue;
                }

                // If we're not retrying or have exceeded max retries, return the error
                return Err(Error::RateLimit {
                    retry_after_secs: retry_after,
                });
            }

            // For non-rate-limit responses, process normally
            let response_text = response.text().await.map_err(Error::Http)?;

            if status.is_success() {
                return serde_json::from_str(&response_text).map_err(|e| {
                    error!("Failed to parse response: {}", e);
                    Error::UnexpectedResponse(format!("Failed to parse response: {}", e))
                });
            } else {
                error!("API error: {} - {}", status, response_text);

                return if status == StatusCode::UNAUTHORIZED {
                    Err(Error::Auth("Invalid API key or credentials".to_string()))
                } else {
                    Err(Error::Api {
                        status_code: status.as_u16(),
                        message: response_text,
                    })
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct TestResponse {
        message: String,
    }

    #[tokio::test]
    async fn test_post_request_success() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("POST", "/echo")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": "ok"}"#)
            .create_async()
            .await;

        let client = HttpClient::new(server.url(), "test-key");
        let response: TestResponse = client.post("echo", &json!({"ping": true})).await.unwrap();

        assert_eq!(response.message, "ok");
        mock_server.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_request_api_error() {
        let mut server = Server::new_async().await;
        let _mock_server = server
            .mock("POST", "/echo")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let client = HttpClient::new(server.url(), "test-key");
        let result: Result<TestResponse> = client.post("echo", &json!({})).await;

        match result {
            Err(Error::Api {
                status_code,
                message,
            }) => {
                assert_eq!(status_code, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("Expected Api error, got {:?}", other.map(|r| r.message)),
        }
    }

    #[tokio::test]
    async fn test_post_request_auth_error() {
        let mut server = Server::new_async().await;
        let _mock_server = server
            .mock("POST", "/echo")
            .with_status(401)
            .with_body("unauthorized")
            .create_async()
            .await;

        let client = HttpClient::new(server.url(), "bad-key");
        let result: Result<TestResponse> = client.post("echo", &json!({})).await;

        assert!(matches!(result, Err(Error::Auth(_))));
    }

    #[tokio::test]
    async fn test_rate_limit_without_retry() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("POST", "/echo")
            .with_status(429)
            .with_header("retry-after", "7")
            .with_body("slow down")
            .expect(1)
            .create_async()
            .await;

        let options = HttpOptions {
            retry_on_rate_limit: false,
            ..HttpOptions::default()
        };
        let client = HttpClient::with_options(server.url(), "test-key", options);
        let result: Result<TestResponse> = client.post("echo", &json!({})).await;

        match result {
            Err(Error::RateLimit { retry_after_secs }) => assert_eq!(retry_after_secs, 7),
            other => panic!("Expected RateLimit error, got {:?}", other.map(|r| r.message)),
        }
        mock_server.assert_async().await;
    }

    #[tokio::test]
    async fn test_rate_limit_retries_exhausted() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("POST", "/echo")
            .with_status(429)
            .with_header("retry-after", "0")
            .with_body("slow down")
            .expect(2)
            .create_async()
            .await;

        let options = HttpOptions {
            max_retries: 1,
            ..HttpOptions::default()
        };
        let client = HttpClient::with_options(server.url(), "test-key", options);
        let result: Result<TestResponse> = client.post("echo", &json!({})).await;

        assert!(matches!(result, Err(Error::RateLimit { .. })));
        mock_server.assert_async().await;
    }
}
