//! Configuration module for datatrans-server.
//!
//! Handles loading configuration from the TOML file and CLI arguments.

pub mod file;

use crate::config::file::{FileConfig, WebhookConfig};
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub listen: SocketAddr,
    pub webhook: WebhookConfig,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Read the TOML file, apply CLI overrides and validate.
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        self.load_str(&config_content)
    }

    fn load_str(&self, config_content: &str) -> Result<LoadedConfig, ConfigError> {
        let mut file_config: FileConfig = toml::from_str(config_content)?;

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        validate(&file_config)?;

        Ok(LoadedConfig {
            listen: file_config.server.listen,
            webhook: file_config.webhook,
        })
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    if let Err(e) = hex::decode(&config.webhook.sign_key) {
        return Err(ConfigError::ValidationError(format!(
            "webhook.sign_key is not valid hex: {e}"
        )));
    }
    if !config.webhook.path.starts_with('/') {
        return Err(ConfigError::ValidationError(format!(
            "webhook.path {:?} must start with '/'",
            config.webhook.path
        )));
    }
    if config.webhook.body_limit == 0 {
        return Err(ConfigError::ValidationError(
            "webhook.body_limit must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
[webhook]
sign_key = "617364666173645e25405e26256661"
"#;

    #[test]
    fn test_listen_override_wins() {
        let addr: SocketAddr = "127.0.0.1:9999".parse().unwrap();
        let loader = ConfigLoader::new("unused.toml", Some(addr));
        let config = loader.load_str(VALID).unwrap();
        assert_eq!(config.listen, addr);
        assert_eq!(config.webhook.path, "/webhook/datatrans");
    }

    #[test]
    fn test_rejects_non_hex_key() {
        let loader = ConfigLoader::new("unused.toml", None);
        let result = loader.load_str("[webhook]\nsign_key = \"not-hex\"\n");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_rejects_relative_path() {
        let loader = ConfigLoader::new("unused.toml", None);
        let result = loader.load_str("[webhook]\nsign_key = \"00\"\npath = \"webhook\"\n");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_missing_file() {
        let loader = ConfigLoader::new("/nonexistent/datatrans-config.toml", None);
        assert!(matches!(loader.load(), Err(ConfigError::IoError(_))));
    }
}
