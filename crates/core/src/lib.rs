//! LexQual core data models.
//!
//! This crate defines the data structures shared by the lexical quality
//! pipeline: metrics, tiers, assessment records, errors and configuration.

#![warn(missing_docs)]

// Identities
mod id;

// Metrics and assessments
mod metrics;
mod assessment;

// Errors and configuration
mod error;
mod config;

// Re-exports
pub use id::{RunId, SampleId};

pub use metrics::{
    MetricName, MetricSet, Thresholds, Tier, TierCounts, TierVotes, UnknownMetric,
};
pub use assessment::{AssessmentRecord, AssessmentTable, SampleFailure, SampleOutcome};

pub use error::{AssessmentError, FailureKind, ProviderKind, Result};
pub use config::{
    BatchConfig, ConfigError, EmbeddingConfig, FailurePolicy, LanguageToolConfig,
    PipelineConfig,
};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
