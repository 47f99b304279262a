//! Loading of the input relations.
//!
//! [`RelationSource`] is the seam for whatever produces the three tables.
//! [`CsvSource`] reads them from a directory laid out like the HetRec Last.fm
//! dump: `artists.csv`, `user_artists.csv` and `user_friends.csv`.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::relations::{Artist, FriendEdge, ListenEdge, Relations};

pub const ARTISTS_FILE: &str = "artists.csv";
pub const LISTENS_FILE: &str = "user_artists.csv";
pub const FRIENDS_FILE: &str = "user_friends.csv";

/// Produces an indexed [`Relations`] snapshot.
pub trait RelationSource {
    fn load(&self) -> Result<Relations>;
}

/// Reads the three relations from CSV files with header rows.
#[derive(Debug, Clone)]
pub struct CsvSource {
    dir: PathBuf,
}

impl CsvSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl RelationSource for CsvSource {
    #[tracing::instrument(skip(self), fields(dir = %self.dir.display()))]
    fn load(&self) -> Result<Relations> {
        let artists: Vec<Artist> = read_rows(&self.dir.join(ARTISTS_FILE))?;
        let listens: Vec<ListenEdge> = read_rows(&self.dir.join(LISTENS_FILE))?;
        let friends: Vec<FriendEdge> = read_rows(&self.dir.join(FRIENDS_FILE))?;

        debug!(
            artists = artists.len(),
            listen_rows = listens.len(),
            friend_rows = friends.len(),
            "Rows read"
        );

        let rel = Relations::new(artists, listens, friends);
        info!(
            artists = rel.artist_count(),
            listen_edges = rel.listen_edge_count(),
            friend_edges = rel.friend_edge_count(),
            "Relations loaded"
        );
        Ok(rel)
    }
}

pub(crate) fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);

    let mut rows = Vec::new();
    for (line, result) in rdr.deserialize().enumerate() {
        let record: T = result
            .with_context(|| format!("bad record {} in {}", line + 1, path.display()))?;
        rows.push(record);
    }

    debug!(path = %path.display(), rows = rows.len(), "CSV read");
    Ok(rows)
}
