use tracing::{debug, warn};

use crate::analyzers::types::CohortSummary;
use crate::analyzers::utility::{average, proportion};
use crate::error::FeatureError;
use crate::features::{FeatureVector, extract};
use crate::relations::{ArtistId, Relations};

/// Running sums of every averaged feature field.
#[derive(Debug, Default)]
struct CohortSums {
    count: usize,
    listeners: f64,
    total_plays: f64,
    plays_per_listener: f64,
    p25: f64,
    p50: f64,
    p75: f64,
    max: f64,
    top_user_ratio: f64,
    core_listener_ratio: f64,
    friend_coverage: f64,
    friend_count: f64,
    potential_spread: f64,
    clustering_coefficient: f64,
}

impl CohortSums {
    fn add(&mut self, fv: &FeatureVector) {
        self.count += 1;
        self.listeners += fv.listener_count as f64;
        self.total_plays += fv.total_plays as f64;
        self.plays_per_listener += fv.avg_plays;
        self.p25 += fv.plays_p25;
        self.p50 += fv.plays_p50;
        self.p75 += fv.plays_p75;
        self.max += fv.plays_max;
        self.top_user_ratio += fv.top_user_ratio;
        self.core_listener_ratio += fv.core_listener_ratio;
        self.friend_coverage += fv.friend_coverage;
        self.friend_count += fv.avg_friend_count;
        self.potential_spread += fv.potential_spread as f64;
        self.clustering_coefficient += fv.clustering_coefficient;
    }

    fn finish(self, label: &str, member_count: usize, total_artists: usize) -> CohortSummary {
        let n = self.count;
        let sums = &self;

        macro_rules! avg {
            ($field:ident) => {
                average(sums.$field, n)
            };
        }

        CohortSummary {
            label: label.to_string(),
            member_count,
            artist_count: n,
            skipped: member_count - n,
            avg_listeners: avg!(listeners),
            avg_total_plays: avg!(total_plays),
            avg_plays_per_listener: avg!(plays_per_listener),
            avg_p25: avg!(p25),
            avg_p50: avg!(p50),
            avg_p75: avg!(p75),
            avg_max: avg!(max),
            avg_top_user_ratio: avg!(top_user_ratio),
            avg_core_listener_ratio: avg!(core_listener_ratio),
            avg_friend_coverage: avg!(friend_coverage),
            avg_friend_count: avg!(friend_count),
            avg_potential_spread: avg!(potential_spread),
            avg_clustering_coefficient: avg!(clustering_coefficient),
            genre_proportion: proportion(member_count, total_artists),
        }
    }
}

/// Aggregates the feature vectors of every artist labelled `label`.
///
/// Each artist counts once, so zero-listener members pull the averages down.
/// Members whose extraction fails are logged and left out of the
/// denominators; they still count towards `genre_proportion`.
///
/// # Errors
///
/// Returns [`FeatureError::EmptyCohort`] if no artist carries the label.
pub fn aggregate(rel: &Relations, label: &str) -> Result<CohortSummary, FeatureError> {
    let label = label.trim().to_lowercase();
    let members: Vec<ArtistId> = rel.artists_with_label(&label).map(|a| a.id).collect();
    aggregate_members(rel, &label, &members)
}

/// Aggregates an explicit member list under `label`.
///
/// The members are not checked against the label; ids missing from the
/// artist relation are skipped like any other extraction failure.
pub fn aggregate_members(
    rel: &Relations,
    label: &str,
    members: &[ArtistId],
) -> Result<CohortSummary, FeatureError> {
    if members.is_empty() {
        return Err(FeatureError::EmptyCohort {
            label: label.to_string(),
        });
    }

    let mut sums = CohortSums::default();
    for &artist_id in members {
        match extract(rel, artist_id) {
            Ok(fv) => sums.add(&fv),
            Err(e) => warn!(label, artist_id, error = %e, "Skipping artist"),
        }
    }

    let summary = sums.finish(label, members.len(), rel.artist_count());
    debug!(
        label,
        artists = summary.artist_count,
        skipped = summary.skipped,
        "Cohort aggregated"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relations::{Artist, FriendEdge, ListenEdge};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    fn artists() -> Vec<Artist> {
        vec![
            Artist::new(1, "One", Some("rock")),
            Artist::new(2, "Two", Some("rock")),
            Artist::new(3, "Quiet", Some("rock")),
            Artist::new(4, "Other", Some("jazz")),
            Artist::new(5, "Nobody", None),
        ]
    }

    fn listens() -> Vec<ListenEdge> {
        vec![
            ListenEdge::new(10, 1, 10),
            ListenEdge::new(11, 1, 30),
            ListenEdge::new(12, 1, 5),
            ListenEdge::new(10, 2, 100),
            ListenEdge::new(13, 4, 1),
        ]
    }

    fn friends() -> Vec<FriendEdge> {
        vec![
            FriendEdge::new(10, 11),
            FriendEdge::new(11, 12),
            FriendEdge::new(12, 13),
        ]
    }

    fn sample() -> Relations {
        Relations::new(artists(), listens(), friends())
    }

    #[test]
    fn test_unused_label_is_empty_cohort() {
        let rel = sample();
        assert_eq!(
            aggregate(&rel, "unused_label"),
            Err(FeatureError::EmptyCohort {
                label: "unused_label".to_string()
            })
        );
    }

    #[test]
    fn test_rock_cohort_means() {
        let rel = sample();
        let s = aggregate(&rel, "rock").unwrap();

        assert_eq!(s.member_count, 3);
        assert_eq!(s.artist_count, 3);
        assert_eq!(s.skipped, 0);
        // Artist 3 has no listeners and still enters the mean.
        assert!(approx(s.avg_listeners, 4.0 / 3.0));
        assert!(approx(s.avg_total_plays, 145.0 / 3.0));
        assert!(approx(s.avg_plays_per_listener, (15.0 + 100.0) / 3.0));
        assert!(approx(s.avg_max, 130.0 / 3.0));
        assert!(approx(s.avg_p75, 120.0 / 3.0));
        assert!(approx(s.avg_top_user_ratio, (1.0 / 3.0) / 3.0));
        assert!(approx(s.genre_proportion, 3.0 / 5.0));
    }

    #[test]
    fn test_label_lookup_is_normalized() {
        let rel = sample();
        assert_eq!(aggregate(&rel, " Rock "), aggregate(&rel, "rock"));
    }

    #[test]
    fn test_cohort_of_silent_artists_is_zero_but_not_empty() {
        let rel = Relations::new(
            vec![Artist::new(1, "A", Some("punk")), Artist::new(2, "B", Some("punk"))],
            vec![],
            vec![],
        );
        let s = aggregate(&rel, "punk").unwrap();

        assert_eq!(s.artist_count, 2);
        assert_eq!(s.avg_listeners, 0.0);
        assert_eq!(s.avg_clustering_coefficient, 0.0);
        assert_eq!(s.genre_proportion, 1.0);
    }

    #[test]
    fn test_failed_member_is_skipped() {
        let rel = sample();
        let s = aggregate_members(&rel, "rock", &[1, 99]).unwrap();

        assert_eq!(s.member_count, 2);
        assert_eq!(s.artist_count, 1);
        assert_eq!(s.skipped, 1);
        assert!(approx(s.avg_listeners, 3.0));
        assert!(approx(s.avg_total_plays, 45.0));
    }

    #[test]
    fn test_all_members_failing_yields_zero_averages() {
        let rel = sample();
        let s = aggregate_members(&rel, "ghost", &[98, 99]).unwrap();

        assert_eq!(s.artist_count, 0);
        assert_eq!(s.skipped, 2);
        assert_eq!(s.avg_listeners, 0.0);
    }

    #[test]
    fn test_member_order_does_not_change_summary() {
        let forward = sample();
        let mut reversed_artists = artists();
        reversed_artists.reverse();
        let mut reversed_listens = listens();
        reversed_listens.reverse();
        let backward = Relations::new(reversed_artists, reversed_listens, friends());

        let a = aggregate(&forward, "rock").unwrap();
        let b = aggregate(&backward, "rock").unwrap();

        assert!(approx(a.avg_listeners, b.avg_listeners));
        assert!(approx(a.avg_total_plays, b.avg_total_plays));
        assert!(approx(a.avg_friend_coverage, b.avg_friend_coverage));
        assert!(approx(a.avg_friend_count, b.avg_friend_count));
        assert!(approx(a.avg_clustering_coefficient, b.avg_clustering_coefficient));
        assert!(approx(a.avg_potential_spread, b.avg_potential_spread));
        assert_eq!(a.genre_proportion, b.genre_proportion);
    }

    #[test]
    fn test_proportions_sum_to_one() {
        let rel = sample();
        let labelled: f64 = rel
            .labels()
            .iter()
            .map(|l| aggregate(&rel, l).unwrap().genre_proportion)
            .sum();
        let unlabeled = proportion(rel.unlabeled_count(), rel.artist_count());

        assert!(approx(labelled + unlabeled, 1.0));
    }
}
