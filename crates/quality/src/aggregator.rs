//! Flag aggregation - combines tier votes into a review flag.

use lexqual_core::{AssessmentError, MetricName, Result, Tier, TierCounts, TierVotes};
use serde::{Deserialize, Serialize};

/// Why a sample was flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagReason {
    /// More poor votes than good votes
    PoorOutweighsGood,
    /// Two or more poor votes
    MultiplePoor,
    /// Two or fewer good votes
    TooFewGood,
}

/// Result of aggregating one sample's votes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagDecision {
    /// Vote counts
    pub counts: TierCounts,

    /// Whether the sample is flagged
    pub flag: bool,

    /// Every rule that triggered
    pub reasons: Vec<FlagReason>,
}

/// Apply the voting rule to vote counts.
pub fn decide(counts: TierCounts) -> FlagDecision {
    let mut reasons = Vec::new();
    if counts.poor > counts.good {
        reasons.push(FlagReason::PoorOutweighsGood);
    }
    if counts.poor >= 2 {
        reasons.push(FlagReason::MultiplePoor);
    }
    if counts.good <= 2 {
        reasons.push(FlagReason::TooFewGood);
    }

    FlagDecision {
        counts,
        flag: !reasons.is_empty(),
        reasons,
    }
}

/// Aggregate a complete set of votes.
pub fn aggregate(votes: &TierVotes) -> FlagDecision {
    decide(votes.counts())
}

/// Aggregate votes keyed by metric name.
///
/// Every metric must appear exactly once.
pub fn aggregate_named(votes: &[(MetricName, Tier)]) -> Result<FlagDecision> {
    for metric in MetricName::ALL {
        match votes.iter().filter(|(m, _)| *m == metric).count() {
            1 => {}
            0 => {
                return Err(AssessmentError::IncompleteAssessment(format!(
                    "missing tier vote for {}",
                    metric
                )))
            }
            n => {
                return Err(AssessmentError::IncompleteAssessment(format!(
                    "{} tier votes for {}",
                    n, metric
                )))
            }
        }
    }

    Ok(decide(TierCounts::tally(votes.iter().map(|(_, tier)| *tier))))
}
