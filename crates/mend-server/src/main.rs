use std::sync::Arc;

use anyhow::Context;
use mend::config::BotConfig;
use mend::providers::configs::GroqProviderConfig;
use mend::providers::groq::GroqProvider;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

mod configuration;
mod error;
mod routes;
mod state;

use configuration::Settings;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists
    dotenv::dotenv().ok();

    tracing_subscriber::fmt::init();

    let settings = Settings::new()?;

    let bot_config = match &settings.bot_config {
        Some(path) => BotConfig::load(path)?,
        None => BotConfig::default(),
    };

    let provider_config = GroqProviderConfig::new(
        settings.provider.host.clone(),
        settings.provider.api_key.clone(),
    );
    let provider = Arc::new(GroqProvider::new(provider_config)?);

    let state = AppState::new(provider, bot_config);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::configure(state).layer(cors);

    let addr = settings.server.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
