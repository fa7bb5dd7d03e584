//! Assessment error taxonomy.

use serde::{Deserialize, Serialize};

use crate::id::SampleId;

/// Result type for assessment operations.
pub type Result<T> = std::result::Result<T, AssessmentError>;

/// External capability consumed by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Grammar and spelling checker
    Grammar,
    /// Readability formula scorer
    Readability,
    /// Sentence embedding model
    Embedding,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Grammar => write!(f, "grammar"),
            ProviderKind::Readability => write!(f, "readability"),
            ProviderKind::Embedding => write!(f, "embedding"),
        }
    }
}

/// Errors raised while assessing samples.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssessmentError {
    /// A metric provider call failed
    #[error("{provider} provider unavailable: {message}")]
    ProviderUnavailable {
        /// Which provider failed
        provider: ProviderKind,
        /// Provider error message
        message: String,
    },

    /// A metric or tier vote was missing when aggregating
    #[error("incomplete assessment: {0}")]
    IncompleteAssessment(String),

    /// Input too short for a metric to be defined
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    /// The batch stopped at the first failure
    #[error("batch aborted at sample {sample}: {source}")]
    BatchAborted {
        /// Sample that failed
        sample: SampleId,
        /// Failure of that sample
        source: Box<AssessmentError>,
    },
}

impl AssessmentError {
    /// Create a provider failure.
    pub fn provider(provider: ProviderKind, message: impl std::fmt::Display) -> Self {
        AssessmentError::ProviderUnavailable {
            provider,
            message: message.to_string(),
        }
    }

    /// Failure kind used in per-record markers.
    pub fn kind(&self) -> FailureKind {
        match self {
            AssessmentError::ProviderUnavailable { .. } => FailureKind::ProviderUnavailable,
            AssessmentError::IncompleteAssessment(_) => FailureKind::IncompleteAssessment,
            AssessmentError::DegenerateInput(_) => FailureKind::DegenerateInput,
            AssessmentError::BatchAborted { source, .. } => source.kind(),
        }
    }
}

/// Kind of a per-sample failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// See [`AssessmentError::ProviderUnavailable`]
    ProviderUnavailable,
    /// See [`AssessmentError::IncompleteAssessment`]
    IncompleteAssessment,
    /// See [`AssessmentError::DegenerateInput`]
    DegenerateInput,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::ProviderUnavailable => write!(f, "provider_unavailable"),
            FailureKind::IncompleteAssessment => write!(f, "incomplete_assessment"),
            FailureKind::DegenerateInput => write!(f, "degenerate_input"),
        }
    }
}
