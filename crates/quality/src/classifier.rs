//! Tier classification of metric values.

use lexqual_core::{MetricName, MetricSet, Thresholds, Tier, TierVotes};

/// Classify a value against thresholds.
///
/// Boundary values fall in the lower tier. `NaN` is poor.
pub fn classify_with(thresholds: Thresholds, value: f64) -> Tier {
    if value > thresholds.hi {
        Tier::Good
    } else if value > thresholds.lo {
        Tier::Moderate
    } else {
        Tier::Poor
    }
}

/// Classify one metric value using its fixed thresholds.
pub fn classify(metric: MetricName, value: f64) -> Tier {
    classify_with(metric.thresholds(), value)
}

/// Classify every metric of a set.
pub fn classify_all(metrics: &MetricSet) -> TierVotes {
    TierVotes::from_fn(|metric| classify(metric, metrics.get(metric)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_boundaries_fall_in_lower_tier() {
        assert_eq!(classify(MetricName::GrammarQuality, 0.3), Tier::Poor);
        assert_eq!(classify(MetricName::GrammarQuality, 0.7), Tier::Moderate);
        assert_eq!(classify(MetricName::Readability, 30.0), Tier::Poor);
        assert_eq!(classify(MetricName::Readability, 70.0), Tier::Moderate);
        assert_eq!(classify(MetricName::Complexity, 3.0), Tier::Poor);
        assert_eq!(classify(MetricName::Complexity, 10.0), Tier::Moderate);
        assert_eq!(classify(MetricName::CoherenceLexical, 70.0), Tier::Moderate);
    }

    #[test]
    fn test_boundaries_for_every_metric() {
        for metric in MetricName::ALL {
            let t = metric.thresholds();
            assert_eq!(classify(metric, t.lo), Tier::Poor, "{metric} at lo");
            assert_eq!(classify(metric, t.hi), Tier::Moderate, "{metric} at hi");
        }
    }

    #[test]
    fn test_tiers_between_and_beyond() {
        assert_eq!(classify(MetricName::SpellingAccuracy, 0.31), Tier::Moderate);
        assert_eq!(classify(MetricName::SpellingAccuracy, 0.71), Tier::Good);
        assert_eq!(classify(MetricName::Complexity, 5.0), Tier::Moderate);
        assert_eq!(classify(MetricName::Complexity, 12.0), Tier::Good);
        assert_eq!(classify(MetricName::CoherenceEmbedding, -0.5), Tier::Poor);
        assert_eq!(classify(MetricName::Readability, 116.0), Tier::Good);
        assert_eq!(classify(MetricName::Readability, -20.0), Tier::Poor);
    }

    #[test]
    fn test_nan_is_poor() {
        for metric in MetricName::ALL {
            assert_eq!(classify(metric, f64::NAN), Tier::Poor);
        }
    }

    #[test]
    fn test_classify_all() {
        let metrics = MetricSet {
            grammar_quality: 0.9,
            spelling_accuracy: 0.5,
            readability: 20.0,
            complexity: 10.5,
            coherence_embedding: 0.3,
            coherence_lexical: 45.0,
        };
        let votes = classify_all(&metrics);
        assert_eq!(votes.grammar_quality, Tier::Good);
        assert_eq!(votes.spelling_accuracy, Tier::Moderate);
        assert_eq!(votes.readability, Tier::Poor);
        assert_eq!(votes.complexity, Tier::Good);
        assert_eq!(votes.coherence_embedding, Tier::Poor);
        assert_eq!(votes.coherence_lexical, Tier::Moderate);
    }

    fn metric_strategy() -> impl Strategy<Value = MetricName> {
        prop::sample::select(MetricName::ALL.to_vec())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn classification_is_monotonic(
            metric in metric_strategy(),
            a in -200.0f64..200.0,
            b in -200.0f64..200.0,
        ) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(classify(metric, low) <= classify(metric, high));
        }

        #[test]
        fn classification_is_deterministic(metric in metric_strategy(), v in -200.0f64..200.0) {
            prop_assert_eq!(classify(metric, v), classify(metric, v));
        }
    }
}
