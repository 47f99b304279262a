//! Immutable, indexed views over the three input relations.
//!
//! [`Relations`] is built once from the raw rows and then only read. It keeps
//! the artist table in input order, a listen index keyed by artist and an
//! out-adjacency index over the friend graph, so per-artist extraction never
//! scans the full edge tables.

use serde::Deserialize;
use std::collections::{HashMap, HashSet};

pub type ArtistId = u32;
pub type UserId = u32;

/// A row of the artist relation. Columns other than these are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Artist {
    #[serde(rename = "artistID")]
    pub id: ArtistId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Play-count edge between a listener and an artist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ListenEdge {
    #[serde(rename = "userID")]
    pub user_id: UserId,
    #[serde(rename = "artistID")]
    pub artist_id: ArtistId,
    pub weight: u64,
}

/// Directed friendship edge `user_id -> friend_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct FriendEdge {
    #[serde(rename = "userID")]
    pub user_id: UserId,
    #[serde(rename = "friendID")]
    pub friend_id: UserId,
}

impl Artist {
    pub fn new(id: ArtistId, name: &str, label: Option<&str>) -> Self {
        Artist {
            id,
            name: name.to_string(),
            label: label.map(str::to_string),
            url: None,
        }
    }
}

impl ListenEdge {
    pub fn new(user_id: UserId, artist_id: ArtistId, weight: u64) -> Self {
        ListenEdge {
            user_id,
            artist_id,
            weight,
        }
    }
}

impl FriendEdge {
    pub fn new(user_id: UserId, friend_id: UserId) -> Self {
        FriendEdge { user_id, friend_id }
    }
}

/// Read-only snapshot of artists, listen edges and friend edges.
#[derive(Debug, Default)]
pub struct Relations {
    artists: Vec<Artist>,
    artist_pos: HashMap<ArtistId, usize>,
    listens: HashMap<ArtistId, Vec<(UserId, u64)>>,
    friends: HashMap<UserId, Vec<UserId>>,
}

impl Relations {
    /// Indexes the raw relations.
    ///
    /// Labels are trimmed and lowercased; blank labels become `None`.
    /// Repeated `(listener, artist)` rows are merged by summing weights, so
    /// each listener appears once per artist. Friend rows are kept as-is.
    /// A repeated artist id keeps its first row.
    pub fn new(artists: Vec<Artist>, listens: Vec<ListenEdge>, friends: Vec<FriendEdge>) -> Self {
        let mut table = Vec::with_capacity(artists.len());
        let mut artist_pos = HashMap::with_capacity(artists.len());

        for mut artist in artists {
            if artist_pos.contains_key(&artist.id) {
                continue;
            }
            artist.label = artist
                .label
                .as_deref()
                .map(|l| l.trim().to_lowercase())
                .filter(|l| !l.is_empty());
            artist_pos.insert(artist.id, table.len());
            table.push(artist);
        }

        let mut by_artist: HashMap<ArtistId, Vec<(UserId, u64)>> = HashMap::new();
        for edge in listens {
            by_artist
                .entry(edge.artist_id)
                .or_default()
                .push((edge.user_id, edge.weight));
        }
        for edges in by_artist.values_mut() {
            edges.sort_by_key(|&(user, _)| user);
            edges.dedup_by(|next, kept| {
                if next.0 == kept.0 {
                    kept.1 = kept.1.saturating_add(next.1);
                    true
                } else {
                    false
                }
            });
        }

        let mut adjacency: HashMap<UserId, Vec<UserId>> = HashMap::new();
        for edge in friends {
            adjacency
                .entry(edge.user_id)
                .or_default()
                .push(edge.friend_id);
        }

        Relations {
            artists: table,
            artist_pos,
            listens: by_artist,
            friends: adjacency,
        }
    }

    pub fn artist(&self, id: ArtistId) -> Option<&Artist> {
        self.artist_pos.get(&id).map(|&pos| &self.artists[pos])
    }

    /// All artists in input order.
    pub fn artists(&self) -> &[Artist] {
        &self.artists
    }

    pub fn artist_count(&self) -> usize {
        self.artists.len()
    }

    /// `(listener, weight)` pairs for an artist, ordered by listener id.
    pub fn listeners_of(&self, id: ArtistId) -> &[(UserId, u64)] {
        self.listens.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Targets of the friend edges sourced at `user`.
    pub fn friends_of(&self, user: UserId) -> &[UserId] {
        self.friends.get(&user).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of friend edges sourced at `user`; 0 for users absent from the friend relation.
    pub fn out_degree(&self, user: UserId) -> usize {
        self.friends_of(user).len()
    }

    /// Distinct label values in first-seen order.
    pub fn labels(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.artists
            .iter()
            .filter_map(|a| a.label.as_deref())
            .filter(|l| seen.insert(*l))
            .collect()
    }

    pub fn artists_with_label<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a Artist> + 'a {
        self.artists
            .iter()
            .filter(move |a| a.label.as_deref() == Some(label))
    }

    pub fn unlabeled_count(&self) -> usize {
        self.artists.iter().filter(|a| a.label.is_none()).count()
    }

    pub fn listen_edge_count(&self) -> usize {
        self.listens.values().map(Vec::len).sum()
    }

    pub fn friend_edge_count(&self) -> usize {
        self.friends.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Relations {
        Relations::new(
            vec![
                Artist::new(1, "A", Some(" Rock ")),
                Artist::new(2, "B", Some("")),
                Artist::new(3, "C", Some("jazz")),
                Artist::new(4, "D", Some("rock")),
                Artist::new(1, "dup", Some("pop")),
            ],
            vec![
                ListenEdge::new(20, 1, 5),
                ListenEdge::new(10, 1, 3),
                ListenEdge::new(20, 1, 7),
            ],
            vec![FriendEdge::new(10, 20), FriendEdge::new(10, 30)],
        )
    }

    #[test]
    fn test_labels_are_normalized() {
        let rel = sample();
        assert_eq!(rel.artist(1).unwrap().label.as_deref(), Some("rock"));
        assert_eq!(rel.artist(2).unwrap().label, None);
        assert_eq!(rel.labels(), vec!["rock", "jazz"]);
        assert_eq!(rel.unlabeled_count(), 1);
    }

    #[test]
    fn test_duplicate_artist_keeps_first_row() {
        let rel = sample();
        assert_eq!(rel.artist_count(), 4);
        assert_eq!(rel.artist(1).unwrap().name, "A");
    }

    #[test]
    fn test_duplicate_listen_rows_are_merged() {
        let rel = sample();
        assert_eq!(rel.listeners_of(1), &[(10, 3), (20, 12)]);
        assert!(rel.listeners_of(3).is_empty());
        assert_eq!(rel.listen_edge_count(), 2);
    }

    #[test]
    fn test_duplicate_listen_rows_saturate() {
        let rel = Relations::new(
            vec![Artist::new(1, "A", None)],
            vec![
                ListenEdge::new(5, 1, u64::MAX - 2),
                ListenEdge::new(5, 1, 10),
            ],
            vec![],
        );
        assert_eq!(rel.listeners_of(1), &[(5, u64::MAX)]);
    }

    #[test]
    fn test_edge_counts() {
        let rel = sample();
        assert_eq!(rel.friend_edge_count(), 2);
    }

    #[test]
    fn test_out_degree() {
        let rel = sample();
        assert_eq!(rel.out_degree(10), 2);
        assert_eq!(rel.out_degree(20), 0);
        assert_eq!(rel.friends_of(10), &[20, 30]);
    }

    #[test]
    fn test_artists_with_label() {
        let rel = sample();
        let ids: Vec<_> = rel.artists_with_label("rock").map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 4]);
        assert_eq!(rel.artists_with_label("metal").count(), 0);
    }
}
