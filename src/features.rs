//! Per-artist feature extraction.
//!
//! [`extract`] turns one artist's listen edges and the friend graph around
//! its listeners into a fixed-shape [`FeatureVector`]. All ratios are
//! fractions in `[0, 1]`; every denominator is guarded with `max(1, ..)`.

use serde::Serialize;
use std::collections::HashSet;

use crate::error::FeatureError;
use crate::relations::{Artist, ArtistId, Relations, UserId};

/// Quantiles of an artist's play-count distribution.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct PlayDistribution {
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

impl PlayDistribution {
    /// Builds the distribution from weights sorted ascending.
    pub fn from_sorted(sorted: &[f64]) -> Self {
        PlayDistribution {
            p25: percentile(sorted, 0.25),
            p50: percentile(sorted, 0.50),
            p75: percentile(sorted, 0.75),
            max: sorted.last().copied().unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    pub artist_id: ArtistId,
    pub name: String,
    pub label: Option<String>,

    pub listener_count: usize,
    pub total_plays: u64,
    pub avg_plays: f64,

    // play distribution
    pub plays_p25: f64,
    pub plays_p50: f64,
    pub plays_p75: f64,
    pub plays_max: f64,
    pub top_user_ratio: f64,
    pub core_listener_ratio: f64,

    // friend graph
    pub friend_coverage: f64,
    pub avg_friend_count: f64,
    pub potential_spread: usize,
    pub clustering_coefficient: f64,
}

impl FeatureVector {
    /// All-zero vector for an artist, the result for an artist with no listeners.
    pub fn empty(artist: &Artist) -> Self {
        FeatureVector {
            artist_id: artist.id,
            name: artist.name.clone(),
            label: artist.label.clone(),
            ..Default::default()
        }
    }

    pub fn distribution(&self) -> PlayDistribution {
        PlayDistribution {
            p25: self.plays_p25,
            p50: self.plays_p50,
            p75: self.plays_p75,
            max: self.plays_max,
        }
    }

    fn set_distribution(&mut self, d: PlayDistribution) {
        self.plays_p25 = d.p25;
        self.plays_p50 = d.p50;
        self.plays_p75 = d.p75;
        self.plays_max = d.max;
    }

    /// `part / max(1, total)`.
    pub fn ratio(part: usize, total: usize) -> f64 {
        part as f64 / total.max(1) as f64
    }
}

/// Computes the feature vector of one artist.
///
/// # Errors
///
/// Returns [`FeatureError::EntityNotFound`] if `artist_id` is not in the artist relation.
pub fn extract(rel: &Relations, artist_id: ArtistId) -> Result<FeatureVector, FeatureError> {
    let artist = rel
        .artist(artist_id)
        .ok_or(FeatureError::EntityNotFound { artist_id })?;

    let mut fv = FeatureVector::empty(artist);

    let listens = rel.listeners_of(artist_id);
    if listens.is_empty() {
        return Ok(fv);
    }

    let n = listens.len();
    fv.listener_count = n;
    // Saturates instead of wrapping; the mean is taken over f64 weights.
    fv.total_plays = listens
        .iter()
        .fold(0u64, |acc, &(_, w)| acc.saturating_add(w));
    fv.avg_plays = listens.iter().map(|&(_, w)| w as f64).sum::<f64>() / n as f64;

    let mut weights: Vec<u64> = listens.iter().map(|&(_, w)| w).collect();
    weights.sort_unstable();
    let sorted: Vec<f64> = weights.iter().map(|&w| w as f64).collect();
    let dist = PlayDistribution::from_sorted(&sorted);
    fv.set_distribution(dist);

    // Thresholds are strict and per-artist.
    let above_p75 = sorted.iter().filter(|&&w| w > dist.p75).count();
    let core = sorted.iter().filter(|&&w| w > 2.0 * fv.avg_plays).count();
    fv.top_user_ratio = FeatureVector::ratio(above_p75, n);
    fv.core_listener_ratio = FeatureVector::ratio(core, n);

    let social = SocialStats::collect(rel, listens.iter().map(|&(user, _)| user));
    fv.friend_coverage = FeatureVector::ratio(social.friends_listening, social.distinct_friends);
    fv.avg_friend_count = social.out_degree_sum as f64 / n as f64;
    fv.potential_spread = social.distinct_friends - social.friends_listening;

    let pairs = (n as u64 * (n as u64 - 1) / 2).max(1);
    fv.clustering_coefficient = social.internal_edges as f64 / pairs as f64;

    Ok(fv)
}

/// Friend-graph counts over the edges sourced inside one listener set.
#[derive(Debug, Default)]
struct SocialStats {
    distinct_friends: usize,
    friends_listening: usize,
    out_degree_sum: usize,
    internal_edges: usize,
}

impl SocialStats {
    fn collect(rel: &Relations, listeners: impl Iterator<Item = UserId>) -> Self {
        let listeners: HashSet<UserId> = listeners.collect();
        let mut friends: HashSet<UserId> = HashSet::new();
        let mut stats = SocialStats::default();

        for &user in &listeners {
            let out = rel.friends_of(user);
            stats.out_degree_sum += out.len();
            for friend in out {
                if listeners.contains(friend) {
                    stats.internal_edges += 1;
                }
                friends.insert(*friend);
            }
        }

        stats.distinct_friends = friends.len();
        stats.friends_listening = friends.intersection(&listeners).count();
        stats
    }
}

/// Linear-interpolation percentile of ascending `sorted` values, `q` in `[0, 1]`.
///
/// Uses rank `h = (n - 1) * q` and interpolates between the neighbouring
/// order statistics. Returns 0.0 for empty input.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let h = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}
