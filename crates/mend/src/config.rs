use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Static assistant configuration: the opening statement prefixed to every
/// request, the optional response template, the relevance denylist and the
/// model/loop parameters. Defaults match the shipped `config.yaml`; a YAML
/// file can override any subset of fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub opening_statement: String,
    /// Template with `{field}` placeholders matching the formatter's
    /// extracted field names. When unset, replies pass through unformatted.
    pub response_template: Option<String>,
    /// Case-insensitive substrings that mark a message as off-topic.
    pub denylist: Vec<String>,
    pub chat_model: String,
    pub vision_model: String,
    pub max_tokens: u32,
    pub history_limit: usize,
    pub vision_iterations: usize,
}

impl Default for BotConfig {
    fn default() -> Self {
        BotConfig {
            opening_statement: DEFAULT_OPENING_STATEMENT.to_string(),
            response_template: None,
            denylist: DEFAULT_DENYLIST.iter().map(|s| s.to_string()).collect(),
            chat_model: "llama-3.3-70b-versatile".to_string(),
            vision_model: "meta-llama/llama-4-scout-17b-16e-instruct".to_string(),
            max_tokens: 800,
            history_limit: 10,
            vision_iterations: 4,
        }
    }
}

impl BotConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("reading bot config from {}", path.as_ref().display()))?;
        let config: BotConfig = serde_yaml::from_str(&raw).context("parsing bot config yaml")?;
        Ok(config)
    }
}

const DEFAULT_OPENING_STATEMENT: &str = "Hello! I'm your DIY Repair Assistant. \u{1f6e0}\u{fe0f}\n\n\
I'm here to help you repair household items with step-by-step guidance based on common repair \
techniques and examples. Please note that my suggestions are general and may need some adaptation \
to fit your specific situation. Also, I only assist with **item repairs** - not medical, legal, \
or other non-repair-related topics.\n\n\
To get started, here's how you can help me help you:\n\
1. Tell me what item you're repairing (e.g., chair, faucet, phone).\n\
2. Describe the specific issue (e.g., wobbly, leaking, not turning on).\n\
3. Let me know if there's any visible damage (e.g., cracks, wear, fraying).\n\n\
You can also upload a photo of the item for more precise guidance. Let's fix it together!";

const DEFAULT_DENYLIST: &[&str] = &[
    "weather",
    "politics",
    "news",
    "movies",
    "games",
    "sports",
    "celebrities",
    "music",
    "AI",
    "programming",
    "science",
    "history",
    "relationships",
    "jokes",
];
