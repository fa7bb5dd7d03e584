//! Batch runner - assesses a collection of texts with bounded concurrency.

use chrono::Utc;
use lexqual_core::{
    AssessmentError, AssessmentRecord, AssessmentTable, BatchConfig, FailurePolicy, Result,
    RunId, SampleFailure, SampleId, SampleOutcome, Time,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::aggregator::aggregate;
use crate::classifier::classify_all;
use crate::computer::MetricComputer;

/// How a batch run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every sample was processed
    Completed,
    /// The cancellation token fired before every sample was issued
    Cancelled,
    /// The run timeout elapsed before every sample was issued
    TimedOut,
}

/// Result of one batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Run identifier
    pub run_id: RunId,

    /// How the run ended
    pub status: RunStatus,

    /// Outcomes of processed samples, in input order
    pub table: AssessmentTable,

    /// Samples never issued because the run stopped early
    pub pending: Vec<SampleId>,

    /// Start time
    pub started_at: Time,

    /// Finish time
    pub finished_at: Time,
}

impl BatchReport {
    /// Ids of failed samples.
    pub fn failed_ids(&self) -> Vec<SampleId> {
        self.table.failed_ids()
    }
}

/// Run the full pipeline on one text: metrics, tiers, flag.
pub async fn assess_text(
    computer: &MetricComputer,
    sample: SampleId,
    text: String,
) -> Result<AssessmentRecord> {
    let metrics = computer.compute(&text).await?;
    let votes = classify_all(&metrics);
    let decision = aggregate(&votes);

    debug!(
        "Sample {}: poor={} moderate={} good={} flag={}",
        sample, decision.counts.poor, decision.counts.moderate, decision.counts.good, decision.flag
    );

    Ok(AssessmentRecord {
        sample,
        text,
        metrics,
        votes,
        flag: decision.flag,
    })
}

/// Assesses batches of texts.
///
/// Samples are independent; up to `max_concurrency` are assessed at once and
/// the table is returned in input order regardless of completion order.
pub struct BatchRunner {
    computer: MetricComputer,
    config: BatchConfig,
}

impl BatchRunner {
    /// Create a runner with default batch settings.
    pub fn new(computer: MetricComputer) -> Self {
        Self {
            computer,
            config: BatchConfig::default(),
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: BatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Assess a batch to completion (or until the configured timeout).
    pub async fn run(&self, texts: Vec<String>) -> Result<BatchReport> {
        self.run_with_cancel(texts, CancellationToken::new()).await
    }

    /// Assess a batch, stopping early when `cancel` fires.
    ///
    /// Stopping early only prevents new samples from being issued; samples
    /// already in flight finish and are included in the table.
    pub async fn run_with_cancel(
        &self,
        texts: Vec<String>,
        cancel: CancellationToken,
    ) -> Result<BatchReport> {
        let run_id = RunId::new();
        let started_at = Utc::now();
        let total = texts.len();
        let max_concurrency = self.config.max_concurrency.max(1);
        let deadline = self.config.timeout().map(|t| Instant::now() + t);

        info!(
            "Starting run {} with {} texts (concurrency {})",
            run_id, total, max_concurrency
        );

        let semaphore = Arc::new(Semaphore::new(max_concurrency));
        // Set by a failing task before it releases its permit.
        let failed = Arc::new(AtomicBool::new(false));
        let abort_on_failure = self.config.failure_policy == FailurePolicy::Abort;
        let mut tasks: JoinSet<(SampleId, Result<AssessmentRecord>)> = JoinSet::new();
        let mut outcomes = Vec::with_capacity(total);
        let mut pending = Vec::new();
        let mut first_failure: Option<(SampleId, AssessmentError)> = None;
        let mut stopped: Option<RunStatus> = None;

        let mut inputs = texts.into_iter().enumerate();
        while let Some((index, text)) = inputs.next() {
            let sample = SampleId::new(index);

            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                _ = sleep_until(deadline) => None,
                permit = semaphore.clone().acquire_owned() => permit.ok(),
            };

            while let Some(joined) = tasks.try_join_next() {
                self.collect(joined, &mut outcomes, &mut first_failure);
            }

            if cancel.is_cancelled() {
                stopped = Some(RunStatus::Cancelled);
            } else if deadline.is_some_and(|d| Instant::now() >= d) {
                stopped = Some(RunStatus::TimedOut);
            }

            let aborting =
                abort_on_failure && (first_failure.is_some() || failed.load(Ordering::SeqCst));

            let Some(permit) = permit.filter(|_| stopped.is_none() && !aborting) else {
                pending.push(sample);
                break;
            };

            let computer = self.computer.clone();
            let failed = failed.clone();
            tasks.spawn(async move {
                let result = assess_text(&computer, sample, text).await;
                if result.is_err() {
                    failed.store(true, Ordering::SeqCst);
                }
                drop(permit);
                (sample, result)
            });
        }
        pending.extend(inputs.map(|(index, _)| SampleId::new(index)));

        while let Some(joined) = tasks.join_next().await {
            self.collect(joined, &mut outcomes, &mut first_failure);
        }

        if abort_on_failure {
            if let Some((sample, error)) = first_failure {
                warn!("Run {} aborted at sample {}: {}", run_id, sample, error);
                return Err(AssessmentError::BatchAborted {
                    sample,
                    source: Box::new(error),
                });
            }
        }

        let status = if pending.is_empty() {
            RunStatus::Completed
        } else {
            stopped.unwrap_or(RunStatus::Cancelled)
        };

        let table = AssessmentTable::new(outcomes);
        info!(
            "Finished run {}: {} assessed, {} flagged, {} failed, {} pending ({:?})",
            run_id,
            table.records().count(),
            table.flagged_count(),
            table.failures().count(),
            pending.len(),
            status
        );

        Ok(BatchReport {
            run_id,
            status,
            table,
            pending,
            started_at,
            finished_at: Utc::now(),
        })
    }

    fn collect(
        &self,
        joined: std::result::Result<(SampleId, Result<AssessmentRecord>), tokio::task::JoinError>,
        outcomes: &mut Vec<SampleOutcome>,
        first_failure: &mut Option<(SampleId, AssessmentError)>,
    ) {
        let (sample, result) = match joined {
            Ok(pair) => pair,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => {
                warn!("Assessment task cancelled: {}", e);
                return;
            }
        };

        match result {
            Ok(record) => outcomes.push(SampleOutcome::Assessed(record)),
            Err(error) => {
                warn!("Sample {} failed: {}", sample, error);
                outcomes.push(SampleOutcome::Failed(SampleFailure::new(sample, &error)));
                let earlier = first_failure.as_ref().is_some_and(|(s, _)| *s < sample);
                if !earlier {
                    *first_failure = Some((sample, error));
                }
            }
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexqual_core::{FailureKind, Tier};
    use lexqual_providers::{
        Issue, IssueCategory, StubEmbedder, StubGrammarChecker, StubReadabilityScorer,
    };
    use std::time::Duration;

    fn computer(grammar: StubGrammarChecker, embedder: StubEmbedder) -> MetricComputer {
        MetricComputer::new(
            Arc::new(grammar),
            Arc::new(StubReadabilityScorer::new(80.0, 12.0)),
            Arc::new(embedder),
        )
    }

    fn runner(grammar: StubGrammarChecker, config: BatchConfig) -> BatchRunner {
        BatchRunner::new(computer(grammar, StubEmbedder::constant(vec![1.0, 0.0])))
            .with_config(config)
    }

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn sample_order(report: &BatchReport) -> Vec<usize> {
        report.table.outcomes().iter().map(|o| o.sample().index()).collect()
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let report = runner(StubGrammarChecker::new(), BatchConfig::default())
            .run(Vec::new())
            .await
            .unwrap();
        assert_eq!(report.status, RunStatus::Completed);
        assert!(report.table.is_empty());
        assert!(report.pending.is_empty());
    }

    #[tokio::test]
    async fn test_empty_text_record() {
        let report = runner(StubGrammarChecker::new(), BatchConfig::default())
            .run(texts(&[""]))
            .await
            .unwrap();

        let record = report.table.records().next().unwrap();
        assert_eq!(record.metrics.grammar_quality, 1.0);
        assert_eq!(record.metrics.spelling_accuracy, 1.0);
        assert_eq!(record.votes.grammar_quality, Tier::Good);
        assert_eq!(record.votes.spelling_accuracy, Tier::Good);
        // readability 80 and complexity 12 are good; both coherence fallbacks are poor.
        assert_eq!(record.votes.coherence_embedding, Tier::Poor);
        assert_eq!(record.votes.coherence_lexical, Tier::Poor);
        assert!(record.flag);
    }

    #[tokio::test]
    async fn test_order_preserved_under_parallel_execution() {
        let grammar = StubGrammarChecker::new()
            .with_delay("first text.", Duration::from_millis(60))
            .with_delay("second text.", Duration::from_millis(30));
        let config = BatchConfig {
            max_concurrency: 3,
            ..Default::default()
        };

        let report = runner(grammar, config)
            .run(texts(&["first text.", "second text.", "third text."]))
            .await
            .unwrap();

        assert_eq!(sample_order(&report), vec![0, 1, 2]);
        let texts: Vec<_> = report.table.records().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["first text.", "second text.", "third text."]);
    }

    #[tokio::test]
    async fn test_runs_are_idempotent() {
        let input = texts(&["A clean sentence. Another one.", "", "Teh speling is bad."]);
        let make = || {
            let grammar = StubGrammarChecker::new().with_issues(
                "Teh speling is bad.",
                vec![
                    Issue::new(IssueCategory::Spelling, 0, 3),
                    Issue::new(IssueCategory::Spelling, 4, 7),
                ],
            );
            BatchRunner::new(computer(grammar, StubEmbedder::hashed(16))).with_config(
                BatchConfig {
                    max_concurrency: 2,
                    ..Default::default()
                },
            )
        };

        let first = make().run(input.clone()).await.unwrap();
        let second = make().run(input).await.unwrap();

        let a = serde_json::to_string(&first.table).unwrap();
        let b = serde_json::to_string(&second.table).unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_failures_are_isolated() {
        let grammar = StubGrammarChecker::new().failing_on("broken.");
        let report = runner(grammar, BatchConfig::default())
            .run(texts(&["fine.", "broken.", "also fine."]))
            .await
            .unwrap();

        assert_eq!(report.status, RunStatus::Completed);
        assert_eq!(report.table.len(), 3);
        assert_eq!(report.failed_ids(), vec![SampleId::new(1)]);
        let failure = report.table.failures().next().unwrap();
        assert_eq!(failure.kind, FailureKind::ProviderUnavailable);
        assert_eq!(report.table.records().count(), 2);
    }

    #[tokio::test]
    async fn test_abort_policy_stops_the_batch() {
        let grammar = StubGrammarChecker::new().failing_on("broken.");
        let config = BatchConfig {
            max_concurrency: 1,
            failure_policy: FailurePolicy::Abort,
            ..Default::default()
        };

        let err = runner(grammar, config)
            .run(texts(&["fine.", "broken.", "never.", "never either."]))
            .await
            .unwrap_err();

        match err {
            AssessmentError::BatchAborted { sample, source } => {
                assert_eq!(sample, SampleId::new(1));
                assert!(matches!(*source, AssessmentError::ProviderUnavailable { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_abort_policy_does_not_issue_later_samples() {
        let grammar = Arc::new(StubGrammarChecker::new().failing_on("broken."));
        let runner = BatchRunner::new(MetricComputer::new(
            grammar.clone(),
            Arc::new(StubReadabilityScorer::default()),
            Arc::new(StubEmbedder::constant(vec![1.0])),
        ))
        .with_config(BatchConfig {
            max_concurrency: 1,
            failure_policy: FailurePolicy::Abort,
            ..Default::default()
        });

        let result = runner.run(texts(&["broken.", "a.", "b.", "c."])).await;
        assert!(result.is_err());
        assert_eq!(grammar.call_count(), 1);
    }

    #[tokio::test]
    async fn test_pre_cancelled_run_returns_everything_pending() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = runner(StubGrammarChecker::new(), BatchConfig::default())
            .run_with_cancel(texts(&["a.", "b.", "c."]), cancel)
            .await
            .unwrap();

        assert_eq!(report.status, RunStatus::Cancelled);
        assert!(report.table.is_empty());
        assert_eq!(
            report.pending,
            vec![SampleId::new(0), SampleId::new(1), SampleId::new(2)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_returns_partial_results() {
        let embedder = StubEmbedder::constant(vec![1.0]).with_delay(Duration::from_millis(400));
        let runner = BatchRunner::new(computer(StubGrammarChecker::new(), embedder)).with_config(
            BatchConfig {
                max_concurrency: 1,
                timeout_secs: Some(1),
                ..Default::default()
            },
        );

        let report = runner
            .run(texts(&["a.", "b.", "c.", "d.", "e."]))
            .await
            .unwrap();

        assert_eq!(report.status, RunStatus::TimedOut);
        assert_eq!(sample_order(&report), vec![0, 1, 2]);
        assert_eq!(report.pending, vec![SampleId::new(3), SampleId::new(4)]);
    }

    #[tokio::test]
    async fn test_sequential_matches_parallel() {
        let input = texts(&["One. Two.", "Three four five.", "", "Six."]);
        let sequential = runner(
            StubGrammarChecker::new(),
            BatchConfig {
                max_concurrency: 1,
                ..Default::default()
            },
        )
        .run(input.clone())
        .await
        .unwrap();
        let parallel = runner(
            StubGrammarChecker::new(),
            BatchConfig {
                max_concurrency: 8,
                ..Default::default()
            },
        )
        .run(input)
        .await
        .unwrap();

        assert_eq!(sequential.table, parallel.table);
    }
}
