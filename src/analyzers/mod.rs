//! Cohort aggregation.
//!
//! Folds per-artist feature vectors into per-label means and collects the
//! results for a batch of labels.

pub mod aggregate;
pub mod analyzer;
pub mod types;
pub mod utility;
