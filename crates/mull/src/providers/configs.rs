use std::time::Duration;

use super::ollama::{OLLAMA_HOST, OLLAMA_MODEL};

#[derive(Debug, Clone)]
pub struct OllamaProviderConfig {
    pub host: String,
    pub model: String,
    pub connect_timeout: Duration,
}

impl Default for OllamaProviderConfig {
    fn default() -> Self {
        Self {
            host: OLLAMA_HOST.to_string(),
            model: OLLAMA_MODEL.to_string(),
            connect_timeout: Duration::from_secs(10),
        }
    }
}
