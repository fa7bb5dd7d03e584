//! Quality Assessment Pipeline
//!
//! Metric computation, tier classification, flag aggregation and batch runs.

#![warn(missing_docs)]

pub mod computer;
pub mod classifier;
pub mod aggregator;
pub mod runner;
pub mod export;

pub use computer::MetricComputer;
pub use classifier::{classify, classify_all};
pub use aggregator::{aggregate, aggregate_named, FlagDecision, FlagReason};
pub use runner::{assess_text, BatchReport, BatchRunner, RunStatus};
pub use export::{write_csv, write_json, ExportError, COLUMNS};

pub use tokio_util::sync::CancellationToken;
