//! Deterministic stub providers.
//!
//! Used to exercise the pipeline without network access or models.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::trait_::{
    GrammarChecker, Issue, ProviderError, ReadabilityScorer, Result, SentenceEmbedder,
};

/// Grammar checker returning canned issues.
#[derive(Debug, Default)]
pub struct StubGrammarChecker {
    default_issues: Vec<Issue>,
    issues_by_text: HashMap<String, Vec<Issue>>,
    failing: Vec<String>,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
}

impl StubGrammarChecker {
    /// Checker that reports no issues.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues reported for texts without a specific entry.
    pub fn with_default_issues(mut self, issues: Vec<Issue>) -> Self {
        self.default_issues = issues;
        self
    }

    /// Issues reported for one text.
    pub fn with_issues(mut self, text: impl Into<String>, issues: Vec<Issue>) -> Self {
        self.issues_by_text.insert(text.into(), issues);
        self
    }

    /// Fail when checking this text.
    pub fn failing_on(mut self, text: impl Into<String>) -> Self {
        self.failing.push(text.into());
        self
    }

    /// Sleep before answering for this text.
    pub fn with_delay(mut self, text: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(text.into(), delay);
        self
    }

    /// Number of `check` calls made.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GrammarChecker for StubGrammarChecker {
    async fn check(&self, text: &str) -> Result<Vec<Issue>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(text) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.iter().any(|t| t == text) {
            return Err(ProviderError::Other("stub grammar checker failure".to_string()));
        }

        Ok(self
            .issues_by_text
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.default_issues.clone()))
    }
}

/// Readability scorer returning fixed values.
#[derive(Debug, Clone, Copy)]
pub struct StubReadabilityScorer {
    /// Value returned by `reading_ease`
    pub reading_ease: f64,
    /// Value returned by `grade_level`
    pub grade_level: f64,
}

impl StubReadabilityScorer {
    /// Create a scorer with fixed values.
    pub fn new(reading_ease: f64, grade_level: f64) -> Self {
        Self {
            reading_ease,
            grade_level,
        }
    }
}

impl Default for StubReadabilityScorer {
    fn default() -> Self {
        Self::new(80.0, 12.0)
    }
}

impl ReadabilityScorer for StubReadabilityScorer {
    fn reading_ease(&self, _text: &str) -> Result<f64> {
        Ok(self.reading_ease)
    }

    fn grade_level(&self, _text: &str) -> Result<f64> {
        Ok(self.grade_level)
    }
}

#[derive(Debug, Clone)]
enum EmbedMode {
    Constant(Vec<f32>),
    Hashed { dimension: usize },
}

/// Sentence embedder producing deterministic vectors.
#[derive(Debug)]
pub struct StubEmbedder {
    mode: EmbedMode,
    fail: bool,
    short_by: usize,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StubEmbedder {
    /// Every sentence gets the same vector.
    pub fn constant(vector: Vec<f32>) -> Self {
        Self::with_mode(EmbedMode::Constant(vector))
    }

    /// Each sentence gets a vector derived from a hash of its text.
    pub fn hashed(dimension: usize) -> Self {
        Self::with_mode(EmbedMode::Hashed { dimension })
    }

    fn with_mode(mode: EmbedMode) -> Self {
        Self {
            mode,
            fail: false,
            short_by: 0,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Fail every call.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Return `n` fewer vectors than requested.
    pub fn short_by(mut self, n: usize) -> Self {
        self.short_by = n;
        self
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `embed` calls made.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn vector_for(&self, sentence: &str) -> Vec<f32> {
        match &self.mode {
            EmbedMode::Constant(v) => v.clone(),
            EmbedMode::Hashed { dimension } => {
                // FNV-1a seeded per dimension
                (0..*dimension)
                    .map(|d| {
                        let mut hash: u64 = 0xcbf2_9ce4_8422_2325 ^ d as u64;
                        for byte in sentence.bytes() {
                            hash ^= byte as u64;
                            hash = hash.wrapping_mul(0x0100_0000_01b3);
                        }
                        (hash % 2001) as f32 / 1000.0 - 1.0
                    })
                    .collect()
            }
        }
    }
}

#[async_trait]
impl SentenceEmbedder for StubEmbedder {
    async fn embed(&self, sentences: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(ProviderError::Other("stub embedder failure".to_string()));
        }

        let keep = sentences.len().saturating_sub(self.short_by);
        Ok(sentences[..keep].iter().map(|s| self.vector_for(s)).collect())
    }
}
