//! Typed failures for feature extraction and cohort aggregation.

use thiserror::Error;

use crate::relations::ArtistId;

/// Recoverable failures raised by [`crate::features::extract`] and
/// [`crate::analyzers::aggregate::aggregate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeatureError {
    /// The artist is absent from the artist relation.
    #[error("artist {artist_id} not found")]
    EntityNotFound { artist_id: ArtistId },

    /// No artist carries the requested label.
    #[error("no artists labelled '{label}'")]
    EmptyCohort { label: String },
}
