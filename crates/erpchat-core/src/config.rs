//! Configuration management for ERP Chat
//!
//! Handles loading and saving application configuration, including the
//! model credential. The credential is resolved from enumerated sources
//! in order (stored setting first, then environment); a missing credential
//! is a fatal configuration error at agent construction, never a silent
//! default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable consulted when no key is stored
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Model/provider settings
    #[serde(default)]
    pub model: ModelConfig,
    /// Conversation store settings
    #[serde(default)]
    pub store: StoreConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

/// Model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model to use
    pub model: String,
    /// API key (stored setting; environment is the fallback)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Sampling temperature
    pub temperature: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            temperature: 0.7,
        }
    }
}

impl ModelConfig {
    /// Resolve the API key: stored setting, then environment variable.
    /// First non-empty source wins.
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = &self.api_key {
            if !key.is_empty() {
                return Ok(key.clone());
            }
        }

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.is_empty() {
                return Ok(key);
            }
        }

        Err(Error::Config(format!(
            "OpenAI API key not configured. Set it in the config file or the {} environment variable.",
            API_KEY_ENV
        )))
    }
}

/// Conversation store settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory for session files (defaults to the platform data dir)
    pub sessions_dir: Option<PathBuf>,
}

impl StoreConfig {
    /// Resolve the sessions directory
    pub fn sessions_dir(&self) -> PathBuf {
        self.sessions_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|p| p.join("erpchat"))
                .unwrap_or_else(|| PathBuf::from(".erpchat"))
                .join("sessions")
        })
    }
}

/// Configuration manager for loading and saving config
pub struct ConfigManager {
    config_path: PathBuf,
    config: Config,
}

impl ConfigManager {
    /// Create a new config manager with the default path
    pub fn new() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Self::with_path(config_path)
    }

    /// Create a config manager with a specific path
    pub fn with_path(config_path: PathBuf) -> Result<Self> {
        let config = if config_path.exists() {
            Self::load_from_path(&config_path)?
        } else {
            Config::default()
        };

        Ok(Self { config_path, config })
    }

    /// Get the default config path
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not find config directory".to_string()))?;

        Ok(config_dir.join("erpchat").join("config.toml"))
    }

    fn load_from_path(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get mutable access to configuration
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Save the current configuration to disk
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config dir: {}", e)))?;
        }

        let content = toml::to_string_pretty(&self.config)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(&self.config_path, content)
            .map_err(|e| Error::Config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model.model, "gpt-4o-mini");
        assert!(config.model.api_key.is_none());
    }

    #[test]
    fn test_stored_key_wins_over_env() {
        let model = ModelConfig {
            api_key: Some("stored-key".to_string()),
            ..Default::default()
        };
        assert_eq!(model.resolve_api_key().unwrap(), "stored-key");
    }

    #[test]
    fn test_empty_stored_key_falls_through() {
        let model = ModelConfig {
            api_key: Some(String::new()),
            ..Default::default()
        };
        // With no env var either, resolution is a fatal config error
        if std::env::var(API_KEY_ENV).is_err() {
            assert!(matches!(model.resolve_api_key(), Err(Error::Config(_))));
        }
    }

    #[test]
    fn test_config_serialization_round_trip() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("model"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.model.model, config.model.model);
    }
}
