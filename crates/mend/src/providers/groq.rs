use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::errors::{CompletionError, CompletionResult};
use crate::providers::base::{CompletionProvider, CompletionRequest};
use crate::providers::configs::GroqProviderConfig;
use crate::providers::retry::RetryPolicy;
use crate::providers::utils::{request_to_payload, response_to_text};

/// Client for a Groq/OpenAI-compatible chat completions endpoint.
///
/// Transient network failures are retried per the configured policy;
/// application-level HTTP errors are terminal and surfaced immediately.
pub struct GroqProvider {
    client: Client,
    config: GroqProviderConfig,
    retry: RetryPolicy,
}

impl GroqProvider {
    pub fn new(config: GroqProviderConfig) -> anyhow::Result<Self> {
        Self::with_retry(config, RetryPolicy::default())
    }

    pub fn with_retry(config: GroqProviderConfig, retry: RetryPolicy) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            config,
            retry,
        })
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Self::new(GroqProviderConfig::from_env()?)
    }

    async fn post(&self, payload: &Value) -> CompletionResult<String> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.host.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(payload)
            .send()
            .await
            .map_err(classify_request_error)?;

        match response.status() {
            StatusCode::OK => {
                let body: Value = response
                    .json()
                    .await
                    .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;
                response_to_text(&body)
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(CompletionError::Http {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

fn classify_request_error(error: reqwest::Error) -> CompletionError {
    if error.is_timeout() {
        CompletionError::Timeout
    } else {
        CompletionError::Network(error.to_string())
    }
}

#[async_trait]
impl CompletionProvider for GroqProvider {
    async fn send(&self, request: CompletionRequest) -> CompletionResult<String> {
        let payload = request_to_payload(&request);

        let mut attempt = 1;
        loop {
            match self.post(&payload).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_transient() && self.retry.should_retry(attempt) => {
                    let delay = self.retry.delay(attempt);
                    tracing::warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "completion request failed ({}), retrying",
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::message::Message;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_retry() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(1), 2, Duration::from_millis(10))
    }

    fn provider_for(server: &MockServer) -> GroqProvider {
        let mut config = GroqProviderConfig::new(server.uri(), "test_api_key".to_string());
        config.timeout = Duration::from_millis(250);
        GroqProvider::with_retry(config, fast_retry()).unwrap()
    }

    fn chat_request() -> CompletionRequest {
        CompletionRequest::chat(
            "llama-3.3-70b-versatile",
            vec![Message::user("My chair leg is wobbly")],
            800,
        )
    }

    #[tokio::test]
    async fn test_send_basic() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test_api_key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "role": "assistant", "content": "Tighten the bolts." } }],
                "usage": { "prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let text = provider.send(chat_request()).await.unwrap();
        assert_eq!(text, "Tighten the bolts.");
    }

    #[tokio::test]
    async fn test_http_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let err = provider.send(chat_request()).await.unwrap_err();
        match err {
            CompletionError::Http { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid api key");
            }
            other => panic!("expected Http error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let err = provider.send(chat_request()).await.unwrap_err();
        assert!(matches!(err, CompletionError::Http { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_timeout_retries_up_to_attempt_cap() {
        let server = MockServer::start().await;
        // Each response takes longer than the client timeout, so every
        // attempt times out. The expect(3) asserts the attempt cap.
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(2))
                    .set_body_json(json!({})),
            )
            .expect(3)
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let err = provider.send(chat_request()).await.unwrap_err();
        assert!(matches!(err, CompletionError::Timeout));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let config = GroqProviderConfig::new(
            "http://127.0.0.1:1".to_string(),
            "test_api_key".to_string(),
        );
        let provider = GroqProvider::with_retry(config, fast_retry()).unwrap();
        let err = provider.send(chat_request()).await.unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let err = provider.send(chat_request()).await.unwrap_err();
        assert!(matches!(err, CompletionError::MalformedResponse(_)));
    }
}
