//! Data types produced by cohort aggregation.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Mean feature values over every artist carrying one label.
///
/// Averages are taken over `artist_count`, the members whose extraction
/// succeeded. `genre_proportion` is the label's share of the whole artist
/// relation, counting every member.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct CohortSummary {
    pub label: String,
    pub member_count: usize,
    pub artist_count: usize,
    pub skipped: usize,

    pub avg_listeners: f64,
    pub avg_total_plays: f64,
    pub avg_plays_per_listener: f64,

    pub avg_p25: f64,
    pub avg_p50: f64,
    pub avg_p75: f64,
    pub avg_max: f64,
    pub avg_top_user_ratio: f64,
    pub avg_core_listener_ratio: f64,

    pub avg_friend_coverage: f64,
    pub avg_friend_count: f64,
    pub avg_potential_spread: f64,
    pub avg_clustering_coefficient: f64,

    pub genre_proportion: f64,
}

/// Result of aggregating a batch of labels.
#[derive(Debug, Serialize)]
pub struct CohortReport {
    pub generated_at: DateTime<Utc>,
    pub total_artists: usize,
    pub unlabeled_proportion: f64,
    pub cohorts: Vec<CohortSummary>,
    /// Requested labels no artist carries.
    pub missing: Vec<String>,
}
