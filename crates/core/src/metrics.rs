//! Metric model - the six lexical metrics, their tiers and thresholds.

use serde::{Deserialize, Serialize};

/// The closed set of lexical quality metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricName {
    /// One minus grammar issues per word
    GrammarQuality,
    /// One minus spelling issues per word
    SpellingAccuracy,
    /// Reading ease score
    Readability,
    /// Grade level
    Complexity,
    /// Mean pairwise sentence embedding similarity
    CoherenceEmbedding,
    /// Mean words per sentence
    CoherenceLexical,
}

impl MetricName {
    /// All metrics, in output column order.
    pub const ALL: [MetricName; 6] = [
        MetricName::GrammarQuality,
        MetricName::SpellingAccuracy,
        MetricName::Readability,
        MetricName::Complexity,
        MetricName::CoherenceEmbedding,
        MetricName::CoherenceLexical,
    ];

    /// Column name of the metric.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::GrammarQuality => "grammar_quality",
            MetricName::SpellingAccuracy => "spelling_accuracy",
            MetricName::Readability => "readability",
            MetricName::Complexity => "complexity",
            MetricName::CoherenceEmbedding => "coherence_embedding",
            MetricName::CoherenceLexical => "coherence_lexical",
        }
    }

    /// Fixed tier thresholds for the metric.
    pub fn thresholds(&self) -> Thresholds {
        match self {
            MetricName::GrammarQuality => Thresholds::new(0.3, 0.7),
            MetricName::SpellingAccuracy => Thresholds::new(0.3, 0.7),
            MetricName::Readability => Thresholds::new(30.0, 70.0),
            MetricName::Complexity => Thresholds::new(3.0, 10.0),
            MetricName::CoherenceEmbedding => Thresholds::new(0.3, 0.7),
            MetricName::CoherenceLexical => Thresholds::new(30.0, 70.0),
        }
    }
}

impl std::fmt::Display for MetricName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MetricName {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricName::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownMetric(s.to_string()))
    }
}

/// A metric name that is not one of the six known metrics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown metric: {0}")]
pub struct UnknownMetric(pub String);

/// Tier boundaries: poor `<= lo`, moderate in `(lo, hi]`, good `> hi`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Upper bound of the poor tier (inclusive)
    pub lo: f64,
    /// Upper bound of the moderate tier (inclusive)
    pub hi: f64,
}

impl Thresholds {
    /// Create thresholds.
    pub const fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }
}

/// Quality bucket of a single metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// At or below the low threshold
    Poor,
    /// Between the thresholds
    Moderate,
    /// Above the high threshold
    Good,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Poor => write!(f, "poor"),
            Tier::Moderate => write!(f, "moderate"),
            Tier::Good => write!(f, "good"),
        }
    }
}

/// The six metric values for one sample.
///
/// A fixed record rather than a map, so a set is always complete.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    /// Fraction of words without grammar issues
    pub grammar_quality: f64,
    /// Fraction of words without spelling issues
    pub spelling_accuracy: f64,
    /// Reading ease, higher is easier
    pub readability: f64,
    /// Grade level, higher is harder
    pub complexity: f64,
    /// Mean cosine similarity of sentence embeddings
    pub coherence_embedding: f64,
    /// Mean words per sentence
    pub coherence_lexical: f64,
}

impl MetricSet {
    /// Value of a metric.
    pub fn get(&self, metric: MetricName) -> f64 {
        match metric {
            MetricName::GrammarQuality => self.grammar_quality,
            MetricName::SpellingAccuracy => self.spelling_accuracy,
            MetricName::Readability => self.readability,
            MetricName::Complexity => self.complexity,
            MetricName::CoherenceEmbedding => self.coherence_embedding,
            MetricName::CoherenceLexical => self.coherence_lexical,
        }
    }

    /// Metric values in column order.
    pub fn iter(&self) -> impl Iterator<Item = (MetricName, f64)> + '_ {
        MetricName::ALL.into_iter().map(move |m| (m, self.get(m)))
    }
}

/// One tier vote per metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierVotes {
    /// Tier of `grammar_quality`
    pub grammar_quality: Tier,
    /// Tier of `spelling_accuracy`
    pub spelling_accuracy: Tier,
    /// Tier of `readability`
    pub readability: Tier,
    /// Tier of `complexity`
    pub complexity: Tier,
    /// Tier of `coherence_embedding`
    pub coherence_embedding: Tier,
    /// Tier of `coherence_lexical`
    pub coherence_lexical: Tier,
}

impl TierVotes {
    /// Build votes from a per-metric function.
    pub fn from_fn(mut vote: impl FnMut(MetricName) -> Tier) -> Self {
        Self {
            grammar_quality: vote(MetricName::GrammarQuality),
            spelling_accuracy: vote(MetricName::SpellingAccuracy),
            readability: vote(MetricName::Readability),
            complexity: vote(MetricName::Complexity),
            coherence_embedding: vote(MetricName::CoherenceEmbedding),
            coherence_lexical: vote(MetricName::CoherenceLexical),
        }
    }

    /// Vote for a metric.
    pub fn get(&self, metric: MetricName) -> Tier {
        match metric {
            MetricName::GrammarQuality => self.grammar_quality,
            MetricName::SpellingAccuracy => self.spelling_accuracy,
            MetricName::Readability => self.readability,
            MetricName::Complexity => self.complexity,
            MetricName::CoherenceEmbedding => self.coherence_embedding,
            MetricName::CoherenceLexical => self.coherence_lexical,
        }
    }

    /// Votes in column order.
    pub fn iter(&self) -> impl Iterator<Item = (MetricName, Tier)> + '_ {
        MetricName::ALL.into_iter().map(move |m| (m, self.get(m)))
    }

    /// Count votes per tier.
    pub fn counts(&self) -> TierCounts {
        TierCounts::tally(self.iter().map(|(_, tier)| tier))
    }
}

/// Number of votes in each tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    /// Poor votes
    pub poor: usize,
    /// Moderate votes
    pub moderate: usize,
    /// Good votes
    pub good: usize,
}

impl TierCounts {
    /// Tally a sequence of tiers.
    pub fn tally(tiers: impl IntoIterator<Item = Tier>) -> Self {
        tiers.into_iter().fold(Self::default(), |mut acc, tier| {
            match tier {
                Tier::Poor => acc.poor += 1,
                Tier::Moderate => acc.moderate += 1,
                Tier::Good => acc.good += 1,
            }
            acc
        })
    }

    /// Total number of votes.
    pub fn total(&self) -> usize {
        self.poor + self.moderate + self.good
    }
}
