use std::net::SocketAddr;

use config::{Config, Environment};
use mend::providers::configs::DEFAULT_GROQ_HOST;
use serde::Deserialize;

use crate::error::{to_env_var, ConfigError};

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::MissingEnvVar {
                env_var: to_env_var("server.host"),
            })
    }
}

#[derive(Debug, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_provider_host")]
    pub host: String,
    pub api_key: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub provider: ProviderSettings,
    /// Optional path to a bot config yaml overriding the built-in defaults.
    #[serde(default)]
    pub bot_config: Option<String>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // GROQ_API_KEY/GROQ_API_URL are honored for parity with the
        // classic deployment; MEND_-prefixed variables win.
        let mut builder = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port() as i64)?
            .set_default("provider.host", default_provider_host())?;

        if let Ok(api_key) = std::env::var("GROQ_API_KEY") {
            builder = builder.set_default("provider.api_key", api_key)?;
        }
        if let Ok(host) = std::env::var("GROQ_API_URL") {
            builder = builder.set_default("provider.host", host)?;
        }

        let config = builder
            .add_source(
                Environment::with_prefix("MEND")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        match config.try_deserialize::<Self>() {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("configuration error: {:?}", &err);
                let error_str = err.to_string();
                if error_str.starts_with("missing field") {
                    let field = error_str
                        .trim_start_matches("missing field `")
                        .trim_end_matches('`');
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else {
                    Err(ConfigError::Other(err))
                }
            }
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5001
}

fn default_provider_host() -> String {
    DEFAULT_GROQ_HOST.to_string()
}
