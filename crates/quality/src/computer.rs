//! Metric computation for a single text.

use lexqual_core::{AssessmentError, MetricSet, ProviderKind, Result};
use lexqual_providers::{GrammarChecker, ReadabilityScorer, SentenceEmbedder};
use std::sync::Arc;
use tracing::debug;

/// Fallback `coherence_embedding` for texts without sentence units.
pub const EMPTY_COHERENCE_EMBEDDING: f64 = 0.0;

/// Fallback `coherence_lexical` for texts without sentence units.
pub const EMPTY_COHERENCE_LEXICAL: f64 = 0.0;

/// Whitespace-delimited words.
pub fn words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Sentence-like units: the text split on `.`, trimmed, blank units dropped.
pub fn sentence_units(text: &str) -> Vec<&str> {
    text.split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// `1 - issues / words`, or `1` for a text without words.
fn rate_quality(issues: usize, words: usize) -> f64 {
    if words == 0 {
        1.0
    } else {
        1.0 - issues as f64 / words as f64
    }
}

/// Calculate cosine similarity between two vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let dot_product: f64 = a.iter().zip(b.iter()).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}

/// Mean of the full pairwise cosine similarity matrix, diagonal included.
///
/// Returns `None` when there are no embeddings.
pub fn mean_similarity(embeddings: &[Vec<f32>]) -> Option<f64> {
    let n = embeddings.len();
    if n == 0 {
        return None;
    }

    let mut total = 0.0;
    for i in 0..n {
        total += cosine_similarity(&embeddings[i], &embeddings[i]);
        for j in (i + 1)..n {
            total += 2.0 * cosine_similarity(&embeddings[i], &embeddings[j]);
        }
    }
    Some(total / (n * n) as f64)
}

/// Computes the six lexical metrics of a text from the metric providers.
///
/// Provider handles are shared; cloning the computer is cheap.
#[derive(Clone)]
pub struct MetricComputer {
    grammar: Arc<dyn GrammarChecker>,
    readability: Arc<dyn ReadabilityScorer>,
    embedder: Arc<dyn SentenceEmbedder>,
}

impl MetricComputer {
    /// Create a computer over the given providers.
    pub fn new(
        grammar: Arc<dyn GrammarChecker>,
        readability: Arc<dyn ReadabilityScorer>,
        embedder: Arc<dyn SentenceEmbedder>,
    ) -> Self {
        Self {
            grammar,
            readability,
            embedder,
        }
    }

    /// Compute the metric set of one text.
    ///
    /// Any provider failure fails the whole computation; no default is
    /// substituted for a missing metric.
    pub async fn compute(&self, text: &str) -> Result<MetricSet> {
        let word_count = words(text).len();

        // A text without words has no issues; skip the remote call.
        let (issues, spelling_issues) = if word_count == 0 {
            (0, 0)
        } else {
            let issues = self
                .grammar
                .check(text)
                .await
                .map_err(|e| AssessmentError::provider(ProviderKind::Grammar, e))?;
            let spelling = issues.iter().filter(|i| i.is_spelling()).count();
            (issues.len(), spelling)
        };

        let readability = self
            .readability
            .reading_ease(text)
            .map_err(|e| AssessmentError::provider(ProviderKind::Readability, e))?;
        let complexity = self
            .readability
            .grade_level(text)
            .map_err(|e| AssessmentError::provider(ProviderKind::Readability, e))?;

        let units = sentence_units(text);
        let (coherence_embedding, coherence_lexical) = if units.is_empty() {
            let degenerate = AssessmentError::DegenerateInput("no sentence units".to_string());
            debug!("{}, using coherence fallbacks", degenerate);
            (EMPTY_COHERENCE_EMBEDDING, EMPTY_COHERENCE_LEXICAL)
        } else {
            (self.embedding_coherence(&units).await?, lexical_coherence(&units))
        };

        Ok(MetricSet {
            grammar_quality: rate_quality(issues, word_count),
            spelling_accuracy: rate_quality(spelling_issues, word_count),
            readability,
            complexity,
            coherence_embedding,
            coherence_lexical,
        })
    }

    async fn embedding_coherence(&self, units: &[&str]) -> Result<f64> {
        let sentences: Vec<String> = units.iter().map(|s| s.to_string()).collect();
        let embeddings = self
            .embedder
            .embed(&sentences)
            .await
            .map_err(|e| AssessmentError::provider(ProviderKind::Embedding, e))?;

        if embeddings.len() != sentences.len() {
            return Err(AssessmentError::provider(
                ProviderKind::Embedding,
                format!(
                    "expected {} embeddings, got {}",
                    sentences.len(),
                    embeddings.len()
                ),
            ));
        }

        Ok(mean_similarity(&embeddings).unwrap_or(EMPTY_COHERENCE_EMBEDDING))
    }
}

/// Mean words per sentence unit.
pub fn lexical_coherence(units: &[&str]) -> f64 {
    if units.is_empty() {
        return EMPTY_COHERENCE_LEXICAL;
    }
    let total: usize = units.iter().map(|u| words(u).len()).sum();
    total as f64 / units.len() as f64
}
