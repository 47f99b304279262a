//! Output formatting and persistence for feature vectors and cohort summaries.
//!
//! Supports pretty-printing, JSON files, CSV append and a plain-text cohort report.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Debug;
use std::fs::{File, OpenOptions};
use std::path::Path;
use tracing::{debug, info};

use crate::analyzers::types::CohortSummary;
use csv::WriterBuilder;

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty<T: Debug>(value: &T) {
    debug!("{:#?}", value);
}

/// Logs a value as pretty-printed JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes a value to `path` as pretty-printed JSON, replacing any existing file.
pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {path}"))?;
    serde_json::to_writer_pretty(file, value)?;
    debug!(path, "JSON written");
    Ok(())
}

/// Appends a record as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record<T: Serialize>(path: &str, record: &T) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(record)?;
    writer.flush()?;

    Ok(())
}

/// Writes all records to a fresh CSV file with a single header row.
pub fn write_records<T: Serialize>(path: &str, records: &[T]) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("failed to create {path}"))?;

    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    debug!(path, rows = records.len(), "CSV written");
    Ok(())
}

/// Renders a cohort summary as a plain-text report block.
///
/// Ratio fields are shown as percentages.
pub fn render_report(s: &CohortSummary) -> String {
    let title = format!("Genre report: {}", s.label.to_uppercase());
    let rule = "=".repeat(title.len());

    format!(
        "{title}
{rule}

Basics
------
Share of all artists: {share:.1}%
Artists aggregated: {n} of {members} ({skipped} skipped)
Avg listeners per artist: {listeners:.1}
Avg total plays per artist: {plays:.1}
Avg plays per listener: {per_listener:.1}
Avg play quantiles: p25 {p25:.1} / p50 {p50:.1} / p75 {p75:.1}
Avg max plays: {max:.1} (top user share {top:.1}%)
Avg core listener share: {core:.1}% (plays > 2x mean)

Social graph
------------
Avg friend coverage: {coverage:.1}%
Avg friends per listener: {friends:.1}
Avg potential spread: {spread:.1}
Avg clustering coefficient: {clustering:.3}
",
        share = s.genre_proportion * 100.0,
        n = s.artist_count,
        members = s.member_count,
        skipped = s.skipped,
        listeners = s.avg_listeners,
        plays = s.avg_total_plays,
        per_listener = s.avg_plays_per_listener,
        p25 = s.avg_p25,
        p50 = s.avg_p50,
        p75 = s.avg_p75,
        max = s.avg_max,
        top = s.avg_top_user_ratio * 100.0,
        core = s.avg_core_listener_ratio * 100.0,
        coverage = s.avg_friend_coverage * 100.0,
        friends = s.avg_friend_count,
        spread = s.avg_potential_spread,
        clustering = s.avg_clustering_coefficient,
    )
}
