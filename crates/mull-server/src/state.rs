use mull::providers::ollama::OllamaProvider;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub backend: OllamaProvider,
}

impl AppState {
    pub fn new(backend: OllamaProvider) -> Self {
        Self { backend }
    }
}
