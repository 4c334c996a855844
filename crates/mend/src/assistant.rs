use std::sync::Arc;

use crate::config::BotConfig;
use crate::conversation::Conversation;
use crate::errors::CompletionError;
use crate::formatter;
use crate::models::message::Message;
use crate::models::role::Role;
use crate::providers::base::{CompletionProvider, CompletionRequest};
use crate::vision::VisionRefinementLoop;

/// Canned reply for messages the relevance filter rejects.
pub const REDIRECT_REPLY: &str =
    "I'd love to help you with a repair! \u{1f60a} Let's focus on fixing something.";

const NETWORK_APOLOGY: &str =
    "Error: Could not connect to the server. Please try again later.";
const HTTP_APOLOGY: &str =
    "Oops! It looks like I ran into a small issue. Let's try again in a moment. \u{1f60a}";
const MALFORMED_APOLOGY: &str = "Error: Unexpected response format from API.";

/// Composes the conversation store, the completion provider, the response
/// formatter and the vision loop into a single "answer this message"
/// operation. Owns one conversation; callers wanting per-session history
/// hold one `Assistant` per session key.
pub struct Assistant {
    provider: Arc<dyn CompletionProvider>,
    vision: VisionRefinementLoop,
    config: BotConfig,
    conversation: Conversation,
}

impl Assistant {
    pub fn new(provider: Arc<dyn CompletionProvider>, config: BotConfig) -> Self {
        let vision = VisionRefinementLoop::new(provider.clone(), &config.vision_model);
        let conversation = Conversation::new(config.history_limit);
        Assistant {
            provider,
            vision,
            config,
            conversation,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Answer one user message, optionally grounded in an uploaded photo.
    ///
    /// Remote failures never propagate: every outcome is a user-safe
    /// string. A rejected message leaves the conversation untouched; a
    /// failed completion keeps the user turn but records no assistant
    /// turn for the failed attempt.
    pub async fn handle_message(&mut self, user_text: &str, image: Option<&[u8]>) -> String {
        // Filter before any history write or remote call, vision included.
        if !self.is_relevant(user_text) {
            tracing::info!("message rejected by relevance filter");
            return REDIRECT_REPLY.to_string();
        }

        let user_text = match image {
            Some(image) => {
                let analysis = self
                    .vision
                    .run(image, self.config.vision_iterations)
                    .await;
                format!(
                    "{}\n\nNote - analysis of the uploaded photo:\n{}",
                    user_text, analysis
                )
            }
            None => user_text.to_string(),
        };

        self.conversation.append(Message::user(user_text));

        let request = self.build_request();
        match self.provider.send(request).await {
            Ok(raw) => {
                let reply = self.format_reply(&raw);
                self.conversation.append(Message::assistant(reply.clone()));
                reply
            }
            Err(e) => apology_for(&e),
        }
    }

    /// Opening statement plus the bounded history snapshot.
    fn build_request(&self) -> CompletionRequest {
        let mut messages = vec![Message::new(
            Role::System,
            self.config.opening_statement.clone(),
        )];
        messages.extend(self.conversation.snapshot(self.config.history_limit));

        CompletionRequest::chat(&self.config.chat_model, messages, self.config.max_tokens)
    }

    /// Format before storage: template substitution first when configured,
    /// then the markup pass. The stored assistant turn is exactly what the
    /// caller receives.
    fn format_reply(&self, raw: &str) -> String {
        let text = formatter::render(raw, self.config.response_template.as_deref());
        formatter::to_presentation_markup(&text)
    }

    /// Keyword denylist gate: case-insensitive substring match.
    fn is_relevant(&self, message: &str) -> bool {
        let message = message.to_lowercase();
        !self
            .config
            .denylist
            .iter()
            .any(|keyword| message.contains(&keyword.to_lowercase()))
    }
}

fn apology_for(error: &CompletionError) -> String {
    match error {
        CompletionError::Timeout | CompletionError::Network(_) => {
            tracing::error!("completion request failed: {}", error);
            NETWORK_APOLOGY.to_string()
        }
        CompletionError::Http { status, body } => {
            tracing::error!(status = %status, "api error: {}", body);
            HTTP_APOLOGY.to_string()
        }
        CompletionError::MalformedResponse(detail) => {
            tracing::error!("unexpected response format from api: {}", detail);
            MALFORMED_APOLOGY.to_string()
        }
    }
}
