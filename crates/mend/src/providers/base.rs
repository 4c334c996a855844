use async_trait::async_trait;

use crate::errors::CompletionResult;
use crate::models::message::Message;

/// A single chat-completion request. Constructed per call, discarded after.
///
/// When `image` carries a data URI, the request targets a vision-capable
/// endpoint: the final user message is sent as a multi-part content array
/// with the image attached.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub image: Option<String>,
}

impl CompletionRequest {
    pub fn chat(model: &str, messages: Vec<Message>, max_tokens: u32) -> Self {
        CompletionRequest {
            model: model.to_string(),
            messages,
            max_tokens,
            temperature: None,
            top_p: None,
            image: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_image(mut self, data_uri: String) -> Self {
        self.image = Some(data_uri);
        self
    }
}

/// Base trait for remote completion endpoints (Groq, OpenAI-compatible)
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send one completion request and return the assistant's text.
    async fn send(&self, request: CompletionRequest) -> CompletionResult<String>;
}
