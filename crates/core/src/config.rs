//! Pipeline configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Errors loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Value out of range
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration for an assessment run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Grammar checker settings
    #[serde(default)]
    pub grammar: LanguageToolConfig,

    /// Sentence embedder settings
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Batch runner settings
    #[serde(default)]
    pub batch: BatchConfig,
}

impl PipelineConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch.max_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "batch.max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.grammar.url.is_empty() {
            return Err(ConfigError::Invalid("grammar.url must not be empty".to_string()));
        }
        if self.embedding.ollama_url.is_empty() {
            return Err(ConfigError::Invalid(
                "embedding.ollama_url must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// LanguageTool grammar checker configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageToolConfig {
    /// LanguageTool server URL
    #[serde(default = "default_languagetool_url")]
    pub url: String,

    /// Language code
    #[serde(default = "default_language")]
    pub language: String,

    /// Request timeout in seconds
    #[serde(default = "default_grammar_timeout")]
    pub timeout_secs: u64,

    /// Rule ids whose matches count as spelling issues
    #[serde(default = "default_spelling_rules")]
    pub spelling_rules: Vec<String>,
}

fn default_languagetool_url() -> String {
    "https://api.languagetool.org".to_string()
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_grammar_timeout() -> u64 {
    30
}

fn default_spelling_rules() -> Vec<String> {
    vec!["MORFOLOGIK_RULE_EN_US".to_string()]
}

impl LanguageToolConfig {
    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for LanguageToolConfig {
    fn default() -> Self {
        Self {
            url: default_languagetool_url(),
            language: default_language(),
            timeout_secs: default_grammar_timeout(),
            spelling_rules: default_spelling_rules(),
        }
    }
}

/// Sentence embedding configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Ollama server URL
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    /// Embedding model name
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_embedding_model() -> String {
    "all-minilm".to_string() // all-MiniLM-L6-v2
}

fn default_embedding_timeout() -> u64 {
    60
}

impl EmbeddingConfig {
    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            ollama_url: default_ollama_url(),
            model: default_embedding_model(),
            timeout_secs: default_embedding_timeout(),
        }
    }
}

/// What the batch runner does when a sample fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Mark the sample failed and keep going
    #[default]
    Isolate,
    /// Stop issuing work at the first failure
    Abort,
}

/// Batch runner configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Maximum samples assessed concurrently
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Failure handling
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Overall run timeout in seconds (None = no limit)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_max_concurrency() -> usize {
    4
}

impl BatchConfig {
    /// Overall run timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            failure_policy: FailurePolicy::default(),
            timeout_secs: None,
        }
    }
}
