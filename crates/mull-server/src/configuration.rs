use crate::error::ConfigError;
use config::{Config, Environment, File};
use mull::providers::{
    configs::OllamaProviderConfig,
    ollama::{OLLAMA_HOST, OLLAMA_MODEL},
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[derive(Debug, Deserialize)]
pub struct BackendSettings {
    #[serde(default = "default_backend_host")]
    pub host: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            host: default_backend_host(),
            model: default_model(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl BackendSettings {
    // Convert to the provider config used by the relay
    pub fn into_config(self) -> OllamaProviderConfig {
        OllamaProviderConfig {
            host: self.host,
            model: self.model,
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub backend: BackendSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Server defaults
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            // Backend defaults
            .set_default("backend.host", default_backend_host())?
            .set_default("backend.model", default_model())?
            .set_default(
                "backend.connect_timeout_secs",
                default_connect_timeout_secs() as i64,
            )?
            // An optional mull.toml in the working directory
            .add_source(File::with_name("mull").required(false))
            // Layer on the environment variables
            .add_source(
                Environment::with_prefix("MULL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_backend_host() -> String {
    OLLAMA_HOST.to_string()
}

fn default_model() -> String {
    OLLAMA_MODEL.to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clean_env() {
        for (key, _) in env::vars() {
            if key.starts_with("MULL_") {
                env::remove_var(&key);
            }
        }
    }

    #[test]
    #[serial]
    fn test_default_settings() {
        clean_env();

        let settings = Settings::new().unwrap();
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.backend.host, "http://localhost:11434");
        assert_eq!(settings.backend.model, "qwen3");
        assert_eq!(settings.backend.connect_timeout_secs, 10);
    }

    #[test]
    #[serial]
    fn test_environment_override() {
        clean_env();
        env::set_var("MULL_SERVER__PORT", "8080");
        env::set_var("MULL_BACKEND__HOST", "http://gpu-box:11434");
        env::set_var("MULL_BACKEND__MODEL", "deepseek-r1");
        env::set_var("MULL_BACKEND__CONNECT_TIMEOUT_SECS", "3");

        let settings = Settings::new().unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.backend.host, "http://gpu-box:11434");
        assert_eq!(settings.backend.model, "deepseek-r1");

        let config = settings.backend.into_config();
        assert_eq!(config.connect_timeout, Duration::from_secs(3));

        // Clean up
        env::remove_var("MULL_SERVER__PORT");
        env::remove_var("MULL_BACKEND__HOST");
        env::remove_var("MULL_BACKEND__MODEL");
        env::remove_var("MULL_BACKEND__CONNECT_TIMEOUT_SECS");
    }

    #[test]
    #[serial]
    fn test_invalid_port() {
        clean_env();
        env::set_var("MULL_SERVER__PORT", "not-a-port");

        let result = Settings::new();
        assert!(matches!(result, Err(ConfigError::Other(_))));

        env::remove_var("MULL_SERVER__PORT");
    }

    #[test]
    fn test_socket_addr_conversion() {
        let server_settings = ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 3000,
        };
        let addr = server_settings.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn test_invalid_socket_addr() {
        let server_settings = ServerSettings {
            host: "not a host".to_string(),
            port: 3000,
        };
        assert!(matches!(
            server_settings.socket_addr(),
            Err(ConfigError::InvalidAddress(_))
        ));
    }
}
