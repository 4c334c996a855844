use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::errors::{CompletionError, CompletionResult};
use crate::providers::base::{CompletionProvider, CompletionRequest};

/// A mock provider that returns pre-configured outcomes for testing and
/// records every request it receives. Clones share the same script and
/// request log, so tests can keep a handle for assertions.
#[derive(Clone)]
pub struct MockProvider {
    responses: Arc<Mutex<Vec<CompletionResult<String>>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of outcomes
    pub fn new(responses: Vec<CompletionResult<String>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_reply(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    /// Requests seen so far, in order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    async fn send(&self, request: CompletionRequest) -> CompletionResult<String> {
        self.requests.lock().unwrap().push(request);

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Err(CompletionError::Network("no scripted response".to_string()))
        } else {
            responses.remove(0)
        }
    }
}
