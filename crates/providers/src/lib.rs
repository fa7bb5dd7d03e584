//! Metric Providers
//!
//! Grammar checking, readability scoring and sentence embedding
//! capabilities consumed by the quality pipeline.

#![warn(missing_docs)]

pub mod trait_;
pub mod language_tool;
pub mod ollama;
pub mod readability;
pub mod stub;

#[cfg(test)]
mod test_server;

pub use trait_::{
    GrammarChecker, Issue, IssueCategory, ProviderError, ReadabilityScorer, Result,
    SentenceEmbedder,
};
pub use language_tool::LanguageToolClient;
pub use ollama::OllamaEmbedder;
pub use readability::{FleschScorer, TextStats};
pub use stub::{StubEmbedder, StubGrammarChecker, StubReadabilityScorer};
