use chrono::Utc;
use tracing::{info, warn};

use crate::analyzers::aggregate::aggregate;
use crate::analyzers::types::CohortReport;
use crate::analyzers::utility::proportion;
use crate::error::FeatureError;
use crate::features::{FeatureVector, extract};
use crate::relations::Relations;

/// Aggregates every requested label into one [`CohortReport`].
///
/// Labels no artist carries are collected in `missing` instead of failing
/// the batch.
#[tracing::instrument(skip_all, fields(label_count = labels.len()))]
pub fn analyze_labels<S: AsRef<str>>(rel: &Relations, labels: &[S]) -> CohortReport {
    let mut cohorts = Vec::with_capacity(labels.len());
    let mut missing = Vec::new();

    for label in labels {
        match aggregate(rel, label.as_ref()) {
            Ok(summary) => {
                info!(
                    label = %summary.label,
                    artists = summary.artist_count,
                    skipped = summary.skipped,
                    proportion = summary.genre_proportion,
                    "Cohort summarized"
                );
                cohorts.push(summary);
            }
            Err(FeatureError::EmptyCohort { label }) => {
                warn!(label = %label, "No artists carry label");
                missing.push(label);
            }
            Err(e) => warn!(error = %e, "Cohort aggregation failed"),
        }
    }

    CohortReport {
        generated_at: Utc::now(),
        total_artists: rel.artist_count(),
        unlabeled_proportion: proportion(rel.unlabeled_count(), rel.artist_count()),
        cohorts,
        missing,
    }
}

/// Extracts the feature vector of every artist, in artist-table order.
#[tracing::instrument(skip_all)]
pub fn extract_all(rel: &Relations) -> Vec<FeatureVector> {
    let vectors: Vec<FeatureVector> = rel
        .artists()
        .iter()
        .filter_map(|a| match extract(rel, a.id) {
            Ok(fv) => Some(fv),
            Err(e) => {
                warn!(artist_id = a.id, error = %e, "Skipping artist");
                None
            }
        })
        .collect();

    info!(artists = vectors.len(), "Feature vectors extracted");
    vectors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relations::{Artist, ListenEdge};

    fn sample() -> Relations {
        Relations::new(
            vec![
                Artist::new(1, "A", Some("rock")),
                Artist::new(2, "B", Some("pop")),
                Artist::new(3, "C", None),
                Artist::new(4, "D", Some("rock")),
            ],
            vec![ListenEdge::new(1, 1, 4), ListenEdge::new(2, 2, 8)],
            vec![],
        )
    }

    #[test]
    fn test_missing_labels_do_not_abort() {
        let rel = sample();
        let report = analyze_labels(&rel, &["rock", "metal", "pop"]);

        assert_eq!(report.total_artists, 4);
        assert_eq!(report.cohorts.len(), 2);
        assert_eq!(report.cohorts[0].label, "rock");
        assert_eq!(report.cohorts[1].label, "pop");
        assert_eq!(report.missing, vec!["metal".to_string()]);
    }

    #[test]
    fn test_report_proportions_cover_all_artists() {
        let rel = sample();
        let report = analyze_labels(&rel, rel.labels().as_slice());

        let total: f64 = report.cohorts.iter().map(|c| c.genre_proportion).sum::<f64>()
            + report.unlabeled_proportion;
        assert!((total - 1.0).abs() < 1e-9);
        assert!(report.missing.is_empty());
    }

    #[test]
    fn test_extract_all_covers_every_artist() {
        let rel = sample();
        let vectors = extract_all(&rel);

        let ids: Vec<_> = vectors.iter().map(|v| v.artist_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(vectors[2].listener_count, 0);
    }
}
