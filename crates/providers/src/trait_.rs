//! Metric provider abstractions.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Error type for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Errors that can occur when calling a metric provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("{service} API error (status {status}): {body}")]
    Status {
        /// Service name
        service: &'static str,
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// The provider returned a result of the wrong shape
    #[error("contract violation: {0}")]
    Contract(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Category of a grammar checker issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    /// Misspelled word
    Spelling,
    /// Grammar error
    Grammar,
    /// Punctuation error
    Punctuation,
    /// Typography (spacing, quotes, dashes)
    Typography,
    /// Style suggestion
    Style,
    /// Anything else
    Other,
}

/// One issue reported by a grammar checker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Issue category
    pub category: IssueCategory,

    /// Character offset in the checked text
    pub position: usize,

    /// Length of the flagged span
    pub length: usize,
}

impl Issue {
    /// Create an issue.
    pub fn new(category: IssueCategory, position: usize, length: usize) -> Self {
        Self {
            category,
            position,
            length,
        }
    }

    /// Whether the issue is a spelling issue.
    pub fn is_spelling(&self) -> bool {
        self.category == IssueCategory::Spelling
    }
}

/// Grammar and spelling checker.
#[async_trait]
pub trait GrammarChecker: Send + Sync {
    /// Check a text, returning issues in text order.
    async fn check(&self, text: &str) -> Result<Vec<Issue>>;
}

/// Readability formula scorer.
pub trait ReadabilityScorer: Send + Sync {
    /// Reading ease, higher is easier.
    fn reading_ease(&self, text: &str) -> Result<f64>;

    /// Grade level, higher is harder.
    fn grade_level(&self, text: &str) -> Result<f64>;
}

/// Sentence embedding model.
#[async_trait]
pub trait SentenceEmbedder: Send + Sync {
    /// Embed sentences, one vector per input in input order.
    async fn embed(&self, sentences: &[String]) -> Result<Vec<Vec<f32>>>;
}
