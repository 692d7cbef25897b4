//! Agent configuration loaded from a YAML file.
//!
//! Every field has a default so an absent or partial config file still
//! yields a working pipeline. The config is read once at startup and
//! shared immutably across phases.

use serde::{Deserialize, Serialize};
use std::error::Error;
use tracing::info;

/// Top-level configuration for the agent.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AgentConfig {
    pub llm: LlmConfig,
    pub extractor: ExtractorConfig,
    pub qa: QaConfig,
}

/// Connection settings for an OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Whether to attempt LLM composition at all.
    pub enabled: bool,
    /// Base URL of the API, e.g. `http://localhost:11434/v1`.
    pub base_url: String,
    /// Model name passed in the request body.
    pub model: String,
    /// Optional bearer token.
    pub api_key: Option<String>,
    /// Sampling temperature.
    pub temperature: f64,
    /// Response token budget.
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "http://localhost:11434/v1".to_string(),
            model: "llama3.2".to_string(),
            api_key: None,
            temperature: 0.7,
            max_tokens: 2000,
        }
    }
}

/// Tunables for the fact extractor.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum bullet facts per document.
    pub max_facts: usize,
    /// Word budget for the lead excerpt.
    pub excerpt_words: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_facts: 8,
            excerpt_words: 50,
        }
    }
}

/// Tunables for the QA validator.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QaConfig {
    /// Minimum acceptable article word count.
    pub min_word_count: usize,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self { min_word_count: 800 }
    }
}

/// Load configuration from a YAML file, or fall back to defaults when no
/// path is given.
pub fn load_config(path: Option<&str>) -> Result<AgentConfig, Box<dyn Error>> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            let config: AgentConfig = serde_yaml::from_str(&raw)?;
            info!(path, "Loaded configuration");
            Ok(config)
        }
        None => {
            info!("No config file given; using defaults");
            Ok(AgentConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.qa.min_word_count, 800);
        assert_eq!(config.extractor.max_facts, 8);
        assert_eq!(config.extractor.excerpt_words, 50);
        assert!(config.llm.enabled);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "qa:\n  min_word_count: 500\n";
        let config: AgentConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.qa.min_word_count, 500);
        assert_eq!(config.extractor.max_facts, 8);
        assert_eq!(config.llm.model, "llama3.2");
    }

    #[test]
    fn test_full_llm_section() {
        let yaml = r#"
llm:
  enabled: false
  base_url: "https://api.example.com/v1"
  model: "gpt-4o-mini"
  api_key: "sk-test"
  temperature: 0.2
  max_tokens: 1024
"#;
        let config: AgentConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(!config.llm.enabled);
        assert_eq!(config.llm.base_url, "https://api.example.com/v1");
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_load_config_defaults_without_path() {
        let config = load_config(None).unwrap();
        assert_eq!(config.qa.min_word_count, 800);
    }
}
