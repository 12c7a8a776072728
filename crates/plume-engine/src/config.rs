//! Configuration: YAML file from the working directory or the home
//! directory, falling back to defaults.

use crate::login::LoginSelectors;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlumeConfig {
    pub cache_dir: PathBuf,
    pub session_dir: PathBuf,
    pub ai: AiConfig,
    pub runner: RunnerDefaults,
    /// Selector packs keyed by platform name. Operators add or override
    /// packs here; nothing platform-specific is hardcoded in the engine.
    pub platforms: HashMap<String, PlatformConfig>,
}

impl Default for PlumeConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            cache_dir: home.join(".plume").join("cache"),
            session_dir: home.join(".plume").join("sessions"),
            ai: AiConfig::default(),
            runner: RunnerDefaults::default(),
            platforms: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub system_prompt: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "PLUME_API_KEY".to_string(),
            system_prompt: "You write short, friendly replies to social media posts. \
                            Answer with the reply text only."
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerDefaults {
    pub refill_size: usize,
    pub max_pages: usize,
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
}

impl Default for RunnerDefaults {
    fn default() -> Self {
        Self {
            refill_size: 10,
            max_pages: 8,
            delay_min_ms: 2_000,
            delay_max_ms: 6_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub base_url: String,
    /// Search URL template; `{query}` is replaced with the encoded query.
    pub search_url: String,
    #[serde(default)]
    pub login: LoginConfig,
    pub selectors: SelectorPack,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginConfig {
    pub url: String,
    pub selectors: LoginSelectors,
    pub settle_ms: Option<u64>,
}

/// Ordered fallback selector chains for one platform's DOM. Tried first to
/// last; the first selector that matches anything wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorPack {
    pub post_links: Vec<String>,
    pub content: Vec<String>,
    pub comment_box: Vec<String>,
    pub comment_submit: Vec<String>,
    pub reply_authors: Vec<String>,
    pub like_button: Vec<String>,
    pub scroll_step: i64,
}

impl Default for SelectorPack {
    fn default() -> Self {
        Self {
            post_links: vec!["article a[href]".to_string(), "a[href*='/status/']".to_string()],
            content: vec!["article".to_string(), "[role='article']".to_string()],
            comment_box: vec![
                "textarea".to_string(),
                "[contenteditable='true']".to_string(),
            ],
            comment_submit: vec![
                "button[type='submit']".to_string(),
                "[data-testid*='reply']".to_string(),
            ],
            reply_authors: vec!["[data-testid*='User-Name']".to_string()],
            like_button: vec!["[data-testid*='like']".to_string()],
            scroll_step: 1_200,
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from default locations:
    /// 1. ./plume.yaml
    /// 2. ~/.plume/config.yaml
    /// 3. Default configuration
    pub async fn load_default() -> Result<PlumeConfig, ConfigError> {
        let local_config = PathBuf::from("./plume.yaml");
        if local_config.exists() {
            return Self::load_from(&local_config).await;
        }

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".plume").join("config.yaml");
            if home_config.exists() {
                return Self::load_from(&home_config).await;
            }
        }

        Ok(PlumeConfig::default())
    }

    pub async fn load_from(path: &Path) -> Result<PlumeConfig, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: PlumeConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_fills_in_defaults() {
        let yaml = r#"
platforms:
  testnet:
    base_url: "https://example.test"
    search_url: "https://example.test/search?q={query}"
    selectors:
      post_links: ["a.post"]
"#;
        let config: PlumeConfig = serde_yaml::from_str(yaml).unwrap();
        let platform = &config.platforms["testnet"];
        assert_eq!(platform.selectors.post_links, vec!["a.post".to_string()]);
        // Unspecified chains keep their defaults.
        assert!(!platform.selectors.comment_box.is_empty());
        assert_eq!(config.runner.refill_size, 10);
        assert_eq!(config.ai.api_key_env, "PLUME_API_KEY");
    }

    #[test]
    fn empty_config_is_all_defaults() {
        let config: PlumeConfig = serde_yaml::from_str("{}").unwrap();
        assert!(config.platforms.is_empty());
        assert_eq!(config.runner.max_pages, 8);
    }
}
