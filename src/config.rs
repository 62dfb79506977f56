//! Application configuration.
//!
//! Loaded from a TOML file in the platform config directory; secrets and
//! the database path can be overridden through environment variables so
//! deployments never need credentials on disk.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Database file path
    pub database_path: PathBuf,
    /// Sentiment classification settings
    pub sentiment: SentimentSettings,
    /// Step generation settings
    pub generation: GenerationSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: get_data_dir().join("kaikoon.db"),
            sentiment: SentimentSettings::default(),
            generation: GenerationSettings::default(),
        }
    }
}

/// Sentiment classification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentSettings {
    /// Inference API token; absent means rule-based fallback only
    pub api_token: Option<String>,
    /// Inference API base URL (model name is appended)
    pub base_url: String,
    /// Hard request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SentimentSettings {
    fn default() -> Self {
        Self {
            api_token: None,
            base_url: "https://api-inference.huggingface.co/models".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Step generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Chat completions API key; absent means generation is unavailable
    pub api_key: Option<String>,
    /// Chat completions API base URL
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Hard request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}

/// Get the application data directory.
pub fn get_data_dir() -> PathBuf {
    directories::ProjectDirs::from("app", "kaikoon", "Kaikoon")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the configuration file path.
pub fn get_config_path() -> PathBuf {
    directories::ProjectDirs::from("app", "kaikoon", "Kaikoon")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

/// Load application configuration from file, with env overrides applied.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let path = get_config_path();

    let mut config = if path.exists() {
        let content =
            std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?
    } else {
        AppConfig::default()
    };

    apply_env_overrides(&mut config);

    Ok(config)
}

/// Save application configuration to file.
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    let path = get_config_path();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

fn apply_env_overrides(config: &mut AppConfig) {
    if let Ok(token) = std::env::var("HUGGINGFACE_API_TOKEN") {
        if !token.is_empty() {
            if !token.starts_with("hf_") {
                tracing::warn!("HUGGINGFACE_API_TOKEN does not look like an inference token");
            }
            config.sentiment.api_token = Some(token);
        }
    }

    if let Ok(key) = std::env::var("OPENAI_API_KEY") {
        if !key.is_empty() {
            config.generation.api_key = Some(key);
        }
    }

    if let Ok(path) = std::env::var("KAIKOON_DB_PATH") {
        if !path.is_empty() {
            config.database_path = PathBuf::from(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(config.sentiment.api_token.is_none());
        assert_eq!(config.generation.model, "gpt-4o-mini");
        assert_eq!(config.sentiment.timeout_secs, 30);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [sentiment]
            timeout_secs = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.sentiment.timeout_secs, 10);
        assert_eq!(config.generation.timeout_secs, 30);
    }

    #[test]
    fn test_round_trip() {
        let config = AppConfig::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let restored: AppConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(restored.generation.base_url, config.generation.base_url);
    }
}
