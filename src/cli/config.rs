//! Configuration management for TriageBuddy
//!
//! Provides TOML-based configuration with defaults, environment overrides
//! and validation.
//! Location: ~/.triagebuddy/config.toml

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::errors::{Result, TriageError};

/// Complete configuration for TriageBuddy
///
/// Loaded once at process start and shared read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderConfig,
    pub retrieval: RetrievalConfig,
    pub drafting: DraftingConfig,
    pub decision: DecisionConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// How classification and drafting are performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Deterministic heuristics only
    Heuristic,
    /// External model with heuristic fallback
    Model,
}

/// Generation provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub mode: Mode,
    pub model: String,
    pub host: String,
    pub port: u16,
    pub prompt_version: String,
}

/// Relevance engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub max_articles: usize,
    pub min_relevance: f64,
    pub keyword_weight: f64,
    pub semantic_weight: f64,
    /// Disable to fall back to plain keyword-occurrence counting
    pub enhanced_scoring: bool,
}

/// Draft length requirements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftingConfig {
    pub min_words: usize,
    pub max_words: usize,
}

/// Auto-close policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    pub auto_close_enabled: bool,
    pub confidence_threshold: f64,
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

/// Log output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Heuristic,
            model: "qwen2.5:7b-instruct".to_string(),
            host: "127.0.0.1".to_string(),
            port: 11434,
            prompt_version: "v2".to_string(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_articles: 3,
            min_relevance: 1.0,
            keyword_weight: 0.8,
            semantic_weight: 0.2,
            enhanced_scoring: true,
        }
    }
}

impl Default for DraftingConfig {
    fn default() -> Self {
        Self {
            min_words: 50,
            max_words: 400,
        }
    }
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            auto_close_enabled: true,
            confidence_threshold: 0.78,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:9000".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults, then apply environment overrides
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let mut config = if let Some(config_path) = path {
            Self::load_from_file(&config_path)?
        } else {
            Self::load_default()?
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| TriageError::Config(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| TriageError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load default configuration from standard location or use built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(config_path) = Self::default_path() {
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(Config::default())
    }

    /// Standard config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".triagebuddy").join("config.toml"))
    }

    /// Apply overrides from an environment lookup.
    ///
    /// Recognised keys: TRIAGE_MODE, STUB_MODE, OLLAMA_MODEL, OLLAMA_HOST,
    /// MAX_ARTICLES, AUTO_CLOSE_ENABLED, CONFIDENCE_THRESHOLD, TRIAGE_BIND.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mode) = lookup("TRIAGE_MODE") {
            self.provider.mode = match mode.trim().to_lowercase().as_str() {
                "heuristic" | "stub" => Mode::Heuristic,
                "model" => Mode::Model,
                other => {
                    return Err(TriageError::Config(format!("Invalid TRIAGE_MODE: {}", other)))
                }
            };
        }

        // STUB_MODE wins over TRIAGE_MODE when both are set
        if let Some(stub) = lookup("STUB_MODE") {
            self.provider.mode = if parse_bool("STUB_MODE", &stub)? {
                Mode::Heuristic
            } else {
                Mode::Model
            };
        }

        if let Some(model) = lookup("OLLAMA_MODEL") {
            self.provider.model = model;
        }

        if let Some(host) = lookup("OLLAMA_HOST") {
            self.provider.host = host;
        }

        if let Some(max) = lookup("MAX_ARTICLES") {
            self.retrieval.max_articles = max.trim().parse().map_err(|_| {
                TriageError::Config(format!("MAX_ARTICLES must be an integer: {}", max))
            })?;
        }

        if let Some(enabled) = lookup("AUTO_CLOSE_ENABLED") {
            self.decision.auto_close_enabled = parse_bool("AUTO_CLOSE_ENABLED", &enabled)?;
        }

        if let Some(threshold) = lookup("CONFIDENCE_THRESHOLD") {
            self.decision.confidence_threshold = threshold.trim().parse().map_err(|_| {
                TriageError::Config(format!(
                    "CONFIDENCE_THRESHOLD must be a number: {}",
                    threshold
                ))
            })?;
        }

        if let Some(bind) = lookup("TRIAGE_BIND") {
            self.server.bind = bind;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.retrieval.max_articles == 0 {
            return Err(TriageError::Config(
                "max_articles must be greater than 0".to_string()
            ));
        }

        if self.retrieval.min_relevance < 0.0 {
            return Err(TriageError::Config(
                "min_relevance must not be negative".to_string()
            ));
        }

        for (name, weight) in [
            ("keyword_weight", self.retrieval.keyword_weight),
            ("semantic_weight", self.retrieval.semantic_weight),
        ] {
            if !(0.0..=1.0).contains(&weight) {
                return Err(TriageError::Config(format!(
                    "{} must be between 0.0 and 1.0",
                    name
                )));
            }
        }

        if self.retrieval.keyword_weight == 0.0 && self.retrieval.semantic_weight == 0.0 {
            return Err(TriageError::Config(
                "keyword_weight and semantic_weight cannot both be 0".to_string()
            ));
        }

        if self.drafting.min_words > self.drafting.max_words {
            return Err(TriageError::Config(
                "min_words must not exceed max_words".to_string()
            ));
        }

        if !(0.0..=1.0).contains(&self.decision.confidence_threshold) {
            return Err(TriageError::Config(
                "confidence_threshold must be between 0.0 and 1.0".to_string()
            ));
        }

        match self.logging.level.trim().to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => return Err(TriageError::Config(
                format!("Invalid log level: {}", self.logging.level)
            )),
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = self.to_toml()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| TriageError::Config(format!("Failed to create config dir: {}", e)))?;
        }

        std::fs::write(path, contents)
            .map_err(|e| TriageError::Config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Render as pretty TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| TriageError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Whether the deterministic strategies are in use
    pub fn stub_mode(&self) -> bool {
        self.provider.mode == Mode::Heuristic
    }

    /// Get Ollama base URL
    pub fn ollama_url(&self) -> String {
        if self.provider.host.starts_with("http://") || self.provider.host.starts_with("https://") {
            self.provider.host.trim_end_matches('/').to_string()
        } else {
            format!("http://{}:{}", self.provider.host, self.provider.port)
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(TriageError::Config(format!("{} must be a boolean: {}", key, value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.provider.mode, Mode::Heuristic);
        assert_eq!(config.retrieval.max_articles, 3);
        assert_eq!(config.decision.confidence_threshold, 0.78);
        assert!(config.stub_mode());
    }

    #[test]
    fn test_config_validation_success() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_articles() {
        let mut config = Config::default();
        config.retrieval.max_articles = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_weights() {
        let mut config = Config::default();
        config.retrieval.semantic_weight = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.retrieval.keyword_weight = 0.0;
        config.retrieval.semantic_weight = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_word_range() {
        let mut config = Config::default();
        config.drafting.min_words = 500;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_log_level() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        config.logging.level = "INFO".to_string();
        assert!(config.validate().is_ok());
        config.logging.level = "Warn".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env_overrides(env(&[
                ("STUB_MODE", "false"),
                ("OLLAMA_MODEL", "llama3.1:8b"),
                ("MAX_ARTICLES", "5"),
                ("AUTO_CLOSE_ENABLED", "false"),
                ("CONFIDENCE_THRESHOLD", "0.9"),
            ]))
            .unwrap();

        assert_eq!(config.provider.mode, Mode::Model);
        assert_eq!(config.provider.model, "llama3.1:8b");
        assert_eq!(config.retrieval.max_articles, 5);
        assert!(!config.decision.auto_close_enabled);
        assert_eq!(config.decision.confidence_threshold, 0.9);
    }

    #[test]
    fn test_env_override_rejects_garbage() {
        let mut config = Config::default();
        assert!(config.apply_env_overrides(env(&[("MAX_ARTICLES", "many")])).is_err());

        let mut config = Config::default();
        assert!(config.apply_env_overrides(env(&[("TRIAGE_MODE", "magic")])).is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [retrieval]
            max_articles = 4

            [provider]
            mode = "model"
            "#,
        )
        .unwrap();

        assert_eq!(config.retrieval.max_articles, 4);
        assert_eq!(config.retrieval.min_relevance, 1.0);
        assert_eq!(config.provider.mode, Mode::Model);
        assert_eq!(config.provider.port, 11434);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.retrieval.max_articles = 2;
        config.save(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_ollama_url() {
        let mut config = Config::default();
        assert_eq!(config.ollama_url(), "http://127.0.0.1:11434");

        config.provider.host = "http://ollama.internal:8080/".to_string();
        assert_eq!(config.ollama_url(), "http://ollama.internal:8080");
    }
}
