//! Assessment records and the assessment table.

use serde::{Deserialize, Serialize};

use crate::error::{AssessmentError, FailureKind};
use crate::id::SampleId;
use crate::metrics::{MetricSet, TierVotes};

/// Complete assessment of one text sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    /// Sample identity
    pub sample: SampleId,

    /// Original text
    pub text: String,

    /// Metric values
    pub metrics: MetricSet,

    /// Tier vote per metric
    pub votes: TierVotes,

    /// Whether the sample's lexical quality warrants review
    pub flag: bool,
}

/// Failure marker for a sample that could not be assessed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleFailure {
    /// Sample identity
    pub sample: SampleId,

    /// Failure kind
    pub kind: FailureKind,

    /// Error message
    pub message: String,
}

impl SampleFailure {
    /// Build a failure marker from an assessment error.
    pub fn new(sample: SampleId, error: &AssessmentError) -> Self {
        let message = match error {
            AssessmentError::BatchAborted { source, .. } => source.to_string(),
            other => other.to_string(),
        };
        Self {
            sample,
            kind: error.kind(),
            message,
        }
    }
}

/// Outcome of one sample: a record or a failure marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SampleOutcome {
    /// The sample was assessed
    Assessed(AssessmentRecord),
    /// The sample failed
    Failed(SampleFailure),
}

impl SampleOutcome {
    /// Identity of the sample.
    pub fn sample(&self) -> SampleId {
        match self {
            SampleOutcome::Assessed(record) => record.sample,
            SampleOutcome::Failed(failure) => failure.sample,
        }
    }
}

/// Ordered outcomes of one batch run.
///
/// Outcomes are sorted by sample identity on construction and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessmentTable {
    outcomes: Vec<SampleOutcome>,
}

impl AssessmentTable {
    /// Build a table, restoring input order.
    pub fn new(mut outcomes: Vec<SampleOutcome>) -> Self {
        outcomes.sort_by_key(SampleOutcome::sample);
        Self { outcomes }
    }

    /// All outcomes in input order.
    pub fn outcomes(&self) -> &[SampleOutcome] {
        &self.outcomes
    }

    /// Assessed records in input order.
    pub fn records(&self) -> impl Iterator<Item = &AssessmentRecord> {
        self.outcomes.iter().filter_map(|o| match o {
            SampleOutcome::Assessed(record) => Some(record),
            SampleOutcome::Failed(_) => None,
        })
    }

    /// Failure markers in input order.
    pub fn failures(&self) -> impl Iterator<Item = &SampleFailure> {
        self.outcomes.iter().filter_map(|o| match o {
            SampleOutcome::Failed(failure) => Some(failure),
            SampleOutcome::Assessed(_) => None,
        })
    }

    /// Ids of failed samples.
    pub fn failed_ids(&self) -> Vec<SampleId> {
        self.failures().map(|f| f.sample).collect()
    }

    /// Number of flagged records.
    pub fn flagged_count(&self) -> usize {
        self.records().filter(|r| r.flag).count()
    }

    /// Number of outcomes.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderKind;
    use crate::metrics::Tier;

    fn record(index: usize, flag: bool) -> SampleOutcome {
        SampleOutcome::Assessed(AssessmentRecord {
            sample: SampleId::new(index),
            text: format!("text {}", index),
            metrics: MetricSet {
                grammar_quality: 1.0,
                spelling_accuracy: 1.0,
                readability: 80.0,
                complexity: 11.0,
                coherence_embedding: 0.9,
                coherence_lexical: 80.0,
            },
            votes: TierVotes::from_fn(|_| Tier::Good),
            flag,
        })
    }

    fn failure(index: usize) -> SampleOutcome {
        let err = AssessmentError::provider(ProviderKind::Grammar, "503");
        SampleOutcome::Failed(SampleFailure::new(SampleId::new(index), &err))
    }

    #[test]
    fn test_table_restores_input_order() {
        let table = AssessmentTable::new(vec![record(2, false), failure(0), record(1, true)]);
        let order: Vec<_> = table.outcomes().iter().map(|o| o.sample().index()).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_table_partitions_records_and_failures() {
        let table = AssessmentTable::new(vec![record(0, true), failure(1), record(2, false)]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.records().count(), 2);
        assert_eq!(table.failed_ids(), vec![SampleId::new(1)]);
        assert_eq!(table.flagged_count(), 1);
    }

    #[test]
    fn test_failure_marker_from_aborted_batch_unwraps_message() {
        let inner = AssessmentError::provider(ProviderKind::Embedding, "timeout");
        let err = AssessmentError::BatchAborted {
            sample: SampleId::new(4),
            source: Box::new(inner.clone()),
        };
        let marker = SampleFailure::new(SampleId::new(4), &err);
        assert_eq!(marker.kind, FailureKind::ProviderUnavailable);
        assert_eq!(marker.message, inner.to_string());
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let value = serde_json::to_value(failure(7)).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["kind"], "provider_unavailable");
        assert_eq!(value["sample"], 7);
    }
}
