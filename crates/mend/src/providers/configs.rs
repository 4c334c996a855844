use std::time::Duration;

use anyhow::{anyhow, Result};

pub const DEFAULT_GROQ_HOST: &str = "https://api.groq.com/openai";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct GroqProviderConfig {
    pub host: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl GroqProviderConfig {
    pub fn new(host: String, api_key: String) -> Self {
        GroqProviderConfig {
            host,
            api_key,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GROQ_API_KEY")
            .map_err(|_| anyhow!("GROQ_API_KEY is not set. Please check your .env file."))?;
        let host =
            std::env::var("GROQ_API_URL").unwrap_or_else(|_| DEFAULT_GROQ_HOST.to_string());
        Ok(Self::new(host, api_key))
    }
}
