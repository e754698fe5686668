use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_assistant_base_url")]
    pub assistant_base_url: String,
    #[serde(default = "default_assistant_model")]
    pub assistant_model: String,
    /// Name of the environment variable holding the assistant API key.
    #[serde(default = "default_assistant_api_key_env")]
    pub assistant_api_key_env: String,
    #[serde(default = "default_assistant_timeout_secs")]
    pub assistant_timeout_secs: u64,
}

fn default_theme() -> String {
    crate::ui::theme::DEFAULT_THEME.to_string()
}
fn default_tick_rate_ms() -> u64 {
    100
}
fn default_data_dir() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dynapsy")
        .to_string_lossy()
        .to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_assistant_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_assistant_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_assistant_api_key_env() -> String {
    "DYNAPSY_API_KEY".to_string()
}
fn default_assistant_timeout_secs() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            tick_rate_ms: default_tick_rate_ms(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            assistant_base_url: default_assistant_base_url(),
            assistant_model: default_assistant_model(),
            assistant_api_key_env: default_assistant_api_key_env(),
            assistant_timeout_secs: default_assistant_timeout_secs(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dynapsy")
            .join("config.toml")
    }

    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    /// Clamp values that would stall the event loop or the assistant worker.
    pub fn validate(&mut self) {
        self.tick_rate_ms = self.tick_rate_ms.clamp(20, 1000);
        self.assistant_timeout_secs = self.assistant_timeout_secs.clamp(5, 300);
        if self.data_dir.trim().is_empty() {
            self.data_dir = default_data_dir();
        }
    }

    /// Reads the assistant API key from the configured environment variable.
    pub fn assistant_api_key(&self) -> Option<String> {
        std::env::var(&self.assistant_api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.tick_rate_ms, 100);
        assert_eq!(config.assistant_api_key_env, "DYNAPSY_API_KEY");
        assert!(config.data_dir.contains("dynapsy"));
    }

    #[test]
    fn test_config_partial_file_keeps_other_defaults() {
        let toml_str = r#"
theme = "parchment"
assistant_model = "local-model"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.theme, "parchment");
        assert_eq!(config.assistant_model, "local-model");
        assert_eq!(config.assistant_timeout_secs, 60);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config.data_dir, deserialized.data_dir);
        assert_eq!(config.assistant_base_url, deserialized.assistant_base_url);
    }

    #[test]
    fn test_validate_clamps_values() {
        let mut config = Config::default();
        config.tick_rate_ms = 0;
        config.assistant_timeout_secs = 10_000;
        config.data_dir = "   ".to_string();
        config.validate();
        assert_eq!(config.tick_rate_ms, 20);
        assert_eq!(config.assistant_timeout_secs, 300);
        assert!(!config.data_dir.trim().is_empty());
    }
}
