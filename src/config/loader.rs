//! Configuration loading from disk.

use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServerConfig;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Validation(String),
}

/// Loads and validates configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: ServerConfig = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Loads the config file if one was given or exists at the default
/// location; otherwise falls back to defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<ServerConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let default = Path::new("treeroute.toml");
            if default.exists() {
                load_config(default)
            } else {
                Ok(ServerConfig::default())
            }
        }
    }
}

fn validate(config: &ServerConfig) -> Result<(), ConfigError> {
    if config.routes.extensions.is_empty() {
        return Err(ConfigError::Validation(
            "routes.extensions must list at least one extension".to_string(),
        ));
    }
    if let Some(ext) = config
        .routes
        .extensions
        .iter()
        .find(|e| e.starts_with('.') || e.is_empty())
    {
        return Err(ConfigError::Validation(format!(
            "routes.extensions entries must be bare extensions, got {ext:?}"
        )));
    }
    Ok(())
}
