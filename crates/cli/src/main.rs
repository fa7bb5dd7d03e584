//! LexQual CLI - lexical quality assessment of text batches.

mod input;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use lexqual_core::{FailurePolicy, MetricName, PipelineConfig};
use lexqual_providers::{
    FleschScorer, LanguageToolClient, OllamaEmbedder, ReadabilityScorer, TextStats,
};
use lexqual_quality::computer::{lexical_coherence, sentence_units};
use lexqual_quality::{
    classify, write_csv, write_json, BatchRunner, CancellationToken, MetricComputer,
};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lexqual")]
#[command(about = "Flag texts whose lexical quality casts doubt on their labels", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess a batch of texts
    Assess {
        /// Input file (JSON array of strings, or one text per line)
        input: PathBuf,
        /// Configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value = "csv")]
        format: OutputFormat,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Maximum texts assessed concurrently
        #[arg(long)]
        concurrency: Option<usize>,
        /// Overall timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
        /// Stop at the first failed text
        #[arg(long)]
        fail_fast: bool,
    },
    /// Show the tier thresholds
    Thresholds,
    /// Score a text locally (readability and lexical coherence only)
    Score {
        /// Text to score
        text: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Assess {
            input,
            config,
            format,
            output,
            concurrency,
            timeout,
            fail_fast,
        } => {
            let mut config = match config {
                Some(path) => PipelineConfig::load(&path)
                    .with_context(|| format!("Failed to load config {}", path.display()))?,
                None => PipelineConfig::default(),
            };
            if let Some(n) = concurrency {
                config.batch.max_concurrency = n;
            }
            if timeout.is_some() {
                config.batch.timeout_secs = timeout;
            }
            if fail_fast {
                config.batch.failure_policy = FailurePolicy::Abort;
            }
            config.validate()?;

            let texts = input::read_texts(&input)?;
            info!("Loaded {} texts from {}", texts.len(), input.display());

            let embedder = OllamaEmbedder::new(&config.embedding);
            match embedder.health_check().await {
                Ok(true) => {}
                Ok(false) => warn!(
                    "Ollama at {} answered with an error status",
                    config.embedding.ollama_url
                ),
                Err(e) => warn!(
                    "Ollama at {} is unreachable: {}",
                    config.embedding.ollama_url, e
                ),
            }

            let computer = MetricComputer::new(
                Arc::new(LanguageToolClient::new(&config.grammar)),
                Arc::new(FleschScorer::new()),
                Arc::new(embedder),
            );
            let runner = BatchRunner::new(computer).with_config(config.batch.clone());

            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, finishing in-flight texts");
                    on_interrupt.cancel();
                }
            });

            let report = runner.run_with_cancel(texts, cancel).await?;

            let mut writer: Box<dyn Write> = match &output {
                Some(path) => Box::new(
                    std::fs::File::create(path)
                        .with_context(|| format!("Failed to create {}", path.display()))?,
                ),
                None => Box::new(std::io::stdout().lock()),
            };
            match format {
                OutputFormat::Csv => write_csv(&report.table, &mut writer)?,
                OutputFormat::Json => write_json(&report, &mut writer)?,
            }
            writer.flush()?;

            eprintln!("Run {} ({:?})", report.run_id, report.status);
            eprintln!("  Total:   {}", report.table.len() + report.pending.len());
            eprintln!("  Flagged: {}", report.table.flagged_count());
            eprintln!("  Failed:  {}", report.table.failures().count());
            for failure in report.table.failures() {
                eprintln!("    #{} {}: {}", failure.sample, failure.kind, failure.message);
            }
            eprintln!("  Pending: {}", report.pending.len());
        }
        Commands::Thresholds => {
            println!("{:<22} {:>8} {:>8}", "metric", "poor <=", "good >");
            for metric in MetricName::ALL {
                let t = metric.thresholds();
                println!("{:<22} {:>8} {:>8}", metric.as_str(), t.lo, t.hi);
            }
        }
        Commands::Score { text } => {
            let scorer = FleschScorer::new();
            let stats = TextStats::of(&text);
            let readability = scorer.reading_ease(&text)?;
            let complexity = scorer.grade_level(&text)?;
            let coherence = lexical_coherence(&sentence_units(&text));

            println!(
                "Words: {}  Sentences: {}  Syllables: {}",
                stats.words, stats.sentences, stats.syllables
            );
            for (metric, value) in [
                (MetricName::Readability, readability),
                (MetricName::Complexity, complexity),
                (MetricName::CoherenceLexical, coherence),
            ] {
                println!("  {:<20} {:>8.2}  {}", metric.as_str(), value, classify(metric, value));
            }
        }
    }

    Ok(())
}
