//! CLI entry point for the genre feature tool.
//!
//! Provides subcommands for extracting one artist's features, aggregating a
//! genre cohort, writing reports for a batch of genres, dumping every
//! artist's feature vector and scoring external genre predictions.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use genre_features::analyzers::aggregate::aggregate;
use genre_features::analyzers::analyzer::{analyze_labels, extract_all};
use genre_features::config::Settings;
use genre_features::evaluate::{evaluate, read_predictions};
use genre_features::features::extract;
use genre_features::output::{
    append_record, print_json, print_pretty, render_report, write_json, write_records,
};
use genre_features::relations::{ArtistId, Relations};
use genre_features::source::{CsvSource, RelationSource};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "genre_features")]
#[command(about = "Per-artist and per-genre features from listening and friend graphs", long_about = None)]
struct Cli {
    /// Directory containing artists.csv, user_artists.csv and user_friends.csv
    #[arg(short, long, env = "GENRE_DATA_DIR", default_value = "data", global = true)]
    data_dir: PathBuf,

    /// JSON array of genre labels to use instead of the built-in list
    #[arg(long, env = "GENRE_VOCABULARY", global = true)]
    vocabulary: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the feature vector of one artist
    Extract {
        #[arg(value_name = "ARTIST_ID")]
        artist_id: ArtistId,
    },
    /// Aggregate the features of every artist carrying a label
    Aggregate {
        #[arg(value_name = "LABEL")]
        label: String,
    },
    /// Write text reports for a batch of labels
    Report {
        /// Labels to report on (defaults to the whole vocabulary)
        #[arg(short, long, value_delimiter = ',')]
        labels: Vec<String>,

        /// Text file to write the report blocks to
        #[arg(short, long, default_value = "analysis_report.txt")]
        output: String,

        /// Optional: write the full report as JSON
        #[arg(long)]
        json: Option<String>,

        /// Optional: CSV file to append one row per cohort to
        #[arg(long)]
        csv: Option<String>,
    },
    /// Write the feature vector of every artist to a CSV file
    Features {
        #[arg(short, long, default_value = "features.csv")]
        output: String,
    },
    /// Score predicted labels against the artist labels
    Evaluate {
        /// CSV with artistID,predicted_label columns
        #[arg(value_name = "PREDICTIONS")]
        predictions: PathBuf,

        /// Optional: CSV file for per-artist outcomes
        #[arg(long)]
        details: Option<String>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/genre_features.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("genre_features.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let settings = Settings::resolve(cli.data_dir, cli.vocabulary.as_deref())?;
    let rel = CsvSource::new(&settings.data_dir).load()?;

    match cli.command {
        Commands::Extract { artist_id } => {
            let features = match extract(&rel, artist_id) {
                Ok(features) => features,
                Err(e) => {
                    error!(artist_id, error = %e, "Extraction failed");
                    return Err(e.into());
                }
            };
            print_pretty(&features);
            print_json(&features)?;
        }
        Commands::Aggregate { label } => {
            let summary = match aggregate(&rel, &label) {
                Ok(summary) => summary,
                Err(e) => {
                    warn!(label = %label, error = %e, "Aggregation failed");
                    return Err(e.into());
                }
            };
            print_json(&summary)?;
            println!("{}", render_report(&summary));
        }
        Commands::Report {
            labels,
            output,
            json,
            csv,
        } => {
            let labels = if labels.is_empty() {
                settings.vocabulary.labels().to_vec()
            } else {
                labels
            };
            write_report(&rel, &labels, &output, json.as_deref(), csv.as_deref())?;
        }
        Commands::Features { output } => {
            let vectors = extract_all(&rel);
            write_records(&output, &vectors)?;
            info!(output = %output, artists = vectors.len(), "Feature vectors written");
        }
        Commands::Evaluate {
            predictions,
            details,
        } => {
            let predictions = read_predictions(&predictions)?;
            let eval = evaluate(&rel, &predictions, &settings.vocabulary);

            info!(
                total = eval.total,
                correct = eval.correct,
                incorrect = eval.incorrect,
                unknown = eval.unknown,
                accuracy = eval.accuracy,
                coverage = eval.coverage,
                "Evaluation complete"
            );

            if let Some(path) = details {
                write_records(&path, &eval.details)?;
                info!(path = %path, "Per-artist outcomes written");
            }
        }
    }

    Ok(())
}

/// Aggregates each label and writes the text report, plus optional JSON and CSV copies.
#[tracing::instrument(skip(rel, labels), fields(label_count = labels.len()))]
fn write_report(
    rel: &Relations,
    labels: &[String],
    output: &str,
    json: Option<&str>,
    csv: Option<&str>,
) -> Result<()> {
    let report = analyze_labels(rel, labels);

    let text: String = report.cohorts.iter().map(render_report).collect::<Vec<_>>().join("\n");
    std::fs::write(output, text).with_context(|| format!("failed to write {output}"))?;

    if let Some(path) = csv {
        for cohort in &report.cohorts {
            append_record(path, cohort)?;
        }
    }

    if let Some(path) = json {
        write_json(path, &report)?;
    }

    if !report.missing.is_empty() {
        warn!(missing = ?report.missing, "Some labels had no artists");
    }

    info!(
        output,
        cohorts = report.cohorts.len(),
        unlabeled_proportion = report.unlabeled_proportion,
        "Report written"
    );
    Ok(())
}
