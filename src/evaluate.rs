//! Scoring of externally produced genre predictions.
//!
//! Predictions are compared with the labels in the artist relation. Only
//! artists whose true label is in the vocabulary are scored.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::analyzers::utility::proportion;
use crate::config::{UNKNOWN_LABEL, Vocabulary};
use crate::relations::{ArtistId, Relations};
use crate::source::read_rows;

/// One predicted label, as read from a `artistID,predicted_label` CSV.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Prediction {
    #[serde(rename = "artistID")]
    pub artist_id: ArtistId,
    #[serde(rename = "predicted_label")]
    pub predicted: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionOutcome {
    pub artist_id: ArtistId,
    pub true_label: String,
    pub predicted_label: String,
    pub correct: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub unknown: usize,
    /// `correct / (correct + incorrect)`; unknown predictions are excluded.
    pub accuracy: f64,
    /// Share of scored predictions that were not unknown.
    pub coverage: f64,
    pub details: Vec<PredictionOutcome>,
}

/// Reads predictions from a CSV file with `artistID,predicted_label` headers.
pub fn read_predictions(path: &Path) -> Result<Vec<Prediction>> {
    let predictions: Vec<Prediction> = read_rows(path)?;
    info!(path = %path.display(), predictions = predictions.len(), "Predictions loaded");
    Ok(predictions)
}

/// Scores `predictions` against the artist labels.
///
/// A prediction outside the vocabulary counts as unknown. Predictions for
/// artists that are absent, unlabeled or labeled outside the vocabulary are
/// ignored.
pub fn evaluate(rel: &Relations, predictions: &[Prediction], vocabulary: &Vocabulary) -> Evaluation {
    let mut eval = Evaluation::default();

    for p in predictions {
        let Some(true_label) = rel
            .artist(p.artist_id)
            .and_then(|a| a.label.as_deref())
            .filter(|l| vocabulary.contains(l))
        else {
            debug!(artist_id = p.artist_id, "Prediction not scorable");
            continue;
        };

        let predicted = p.predicted.trim().to_lowercase();
        let predicted = if vocabulary.contains(&predicted) {
            predicted
        } else {
            UNKNOWN_LABEL.to_string()
        };

        let correct = predicted == true_label;
        eval.total += 1;
        if predicted == UNKNOWN_LABEL {
            eval.unknown += 1;
        } else if correct {
            eval.correct += 1;
        } else {
            eval.incorrect += 1;
        }

        eval.details.push(PredictionOutcome {
            artist_id: p.artist_id,
            true_label: true_label.to_string(),
            predicted_label: predicted,
            correct,
        });
    }

    eval.accuracy = proportion(eval.correct, eval.correct + eval.incorrect);
    eval.coverage = if eval.total == 0 {
        0.0
    } else {
        1.0 - proportion(eval.unknown, eval.total)
    };
    eval
}
