//! Table export - the CSV and JSON shapes consumed downstream.
//!
//! Rows carry exactly the six metric columns followed by `text` and `flag`.
//! Failed samples never appear as rows.

use lexqual_core::{AssessmentRecord, AssessmentTable, SampleFailure, SampleId};
use serde::Serialize;
use std::io::Write;

use crate::runner::{BatchReport, RunStatus};

/// Errors writing an exported table.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Output column names, in order.
pub const COLUMNS: [&str; 8] = [
    "grammar_quality",
    "spelling_accuracy",
    "readability",
    "complexity",
    "coherence_embedding",
    "coherence_lexical",
    "text",
    "flag",
];

/// One output row.
#[derive(Debug, Serialize)]
pub struct TableRow<'a> {
    grammar_quality: f64,
    spelling_accuracy: f64,
    readability: f64,
    complexity: f64,
    coherence_embedding: f64,
    coherence_lexical: f64,
    text: &'a str,
    flag: bool,
}

impl<'a> From<&'a AssessmentRecord> for TableRow<'a> {
    fn from(record: &'a AssessmentRecord) -> Self {
        let m = &record.metrics;
        Self {
            grammar_quality: m.grammar_quality,
            spelling_accuracy: m.spelling_accuracy,
            readability: m.readability,
            complexity: m.complexity,
            coherence_embedding: m.coherence_embedding,
            coherence_lexical: m.coherence_lexical,
            text: &record.text,
            flag: record.flag,
        }
    }
}

/// Rows of a table in input order.
pub fn rows(table: &AssessmentTable) -> Vec<TableRow<'_>> {
    table.records().map(TableRow::from).collect()
}

/// Write assessed rows as CSV with a header line.
///
/// The header is written even when there are no rows.
pub fn write_csv<W: Write>(table: &AssessmentTable, writer: W) -> Result<(), ExportError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(COLUMNS)?;
    for record in table.records() {
        wtr.serialize(TableRow::from(record))?;
    }
    wtr.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct JsonExport<'a> {
    run_id: String,
    status: RunStatus,
    rows: Vec<TableRow<'a>>,
    failures: Vec<&'a SampleFailure>,
    pending: &'a [SampleId],
}

/// Write a report as pretty JSON: rows, failures and pending samples.
pub fn write_json<W: Write>(report: &BatchReport, mut writer: W) -> Result<(), ExportError> {
    let export = JsonExport {
        run_id: report.run_id.to_string(),
        status: report.status,
        rows: rows(&report.table),
        failures: report.table.failures().collect(),
        pending: &report.pending,
    };
    serde_json::to_writer_pretty(&mut writer, &export)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use lexqual_core::{
        AssessmentError, MetricSet, ProviderKind, RunId, SampleOutcome, Tier, TierVotes,
    };

    fn table() -> AssessmentTable {
        let record = AssessmentRecord {
            sample: SampleId::new(0),
            text: "Hello, world.".to_string(),
            metrics: MetricSet {
                grammar_quality: 1.0,
                spelling_accuracy: 0.5,
                readability: 77.5,
                complexity: -1.45,
                coherence_embedding: 1.0,
                coherence_lexical: 2.0,
            },
            votes: TierVotes::from_fn(|_| Tier::Good),
            flag: false,
        };
        let failure = SampleFailure::new(
            SampleId::new(1),
            &AssessmentError::provider(ProviderKind::Grammar, "timeout"),
        );
        AssessmentTable::new(vec![
            SampleOutcome::Assessed(record),
            SampleOutcome::Failed(failure),
        ])
    }

    #[test]
    fn test_csv_columns_and_rows() {
        let mut out = Vec::new();
        write_csv(&table(), &mut out).unwrap();

        let mut reader = csv::Reader::from_reader(out.as_slice());
        let headers: Vec<_> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, COLUMNS);

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row[1].parse::<f64>().unwrap(), 0.5);
        assert_eq!(row[3].parse::<f64>().unwrap(), -1.45);
        assert_eq!(&row[6], "Hello, world.");
        assert_eq!(&row[7], "false");
    }

    #[test]
    fn test_csv_of_empty_table_has_header() {
        let mut out = Vec::new();
        write_csv(&AssessmentTable::default(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().trim_end(), COLUMNS.join(","));
    }

    #[test]
    fn test_json_export() {
        let report = BatchReport {
            run_id: RunId::new(),
            status: RunStatus::TimedOut,
            table: table(),
            pending: vec![SampleId::new(2)],
            started_at: Utc::now(),
            finished_at: Utc::now(),
        };
        let mut out = Vec::new();
        write_json(&report, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["status"], "timed_out");
        let row = value["rows"][0].as_object().unwrap();
        let keys: Vec<_> = row.keys().cloned().collect();
        let mut expected: Vec<_> = COLUMNS.iter().map(|c| c.to_string()).collect();
        expected.sort();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(sorted, expected);
        assert_eq!(value["failures"][0]["sample"], 1);
        assert_eq!(value["failures"][0]["kind"], "provider_unavailable");
        assert_eq!(value["pending"][0], 2);
    }
}
