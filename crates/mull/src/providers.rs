pub mod configs;
pub mod ollama;
