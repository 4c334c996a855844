use std::collections::HashMap;
use std::sync::Arc;

use mend::assistant::Assistant;
use mend::config::BotConfig;
use mend::providers::base::CompletionProvider;
use tokio::sync::Mutex;

pub const DEFAULT_SESSION: &str = "default";

/// Shared application state: one assistant (and therefore one bounded
/// conversation) per session key. No process-wide conversation exists;
/// sessions are isolated behind the mutex.
#[derive(Clone)]
pub struct AppState {
    provider: Arc<dyn CompletionProvider>,
    bot_config: BotConfig,
    sessions: Arc<Mutex<HashMap<String, Assistant>>>,
}

impl AppState {
    pub fn new(provider: Arc<dyn CompletionProvider>, bot_config: BotConfig) -> Self {
        AppState {
            provider,
            bot_config,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn provider(&self) -> Arc<dyn CompletionProvider> {
        self.provider.clone()
    }

    pub fn bot_config(&self) -> &BotConfig {
        &self.bot_config
    }

    /// Answer one message within the session's conversation, creating the
    /// session on first use. The mutex spans the remote call, so turns
    /// within one session are strictly serialized.
    pub async fn handle_message(
        &self,
        session_id: &str,
        text: &str,
        image: Option<&[u8]>,
    ) -> String {
        let mut sessions = self.sessions.lock().await;
        let assistant = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Assistant::new(self.provider.clone(), self.bot_config.clone()));
        assistant.handle_message(text, image).await
    }
}
