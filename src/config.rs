//! Label vocabulary and runtime settings.

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Label used for predictions outside the vocabulary.
pub const UNKNOWN_LABEL: &str = "Unknown";

pub const DEFAULT_GENRES: &[&str] = &[
    "electronic",
    "rock",
    "metal",
    "pop",
    "jazz",
    "soul",
    "punk",
    "hip-hop",
    "reggae",
    "latin",
    "country",
];

/// The fixed set of genre labels.
///
/// Stored on disk as a plain JSON array:
/// ```json
/// ["rock", "jazz", "metal"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    labels: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new(DEFAULT_GENRES.iter().copied())
    }
}

impl Vocabulary {
    /// Builds a vocabulary, normalizing labels and dropping blanks and repeats.
    pub fn new<S: AsRef<str>>(labels: impl IntoIterator<Item = S>) -> Self {
        let mut out: Vec<String> = Vec::new();
        for label in labels {
            let label = label.as_ref().trim().to_lowercase();
            if !label.is_empty() && !out.contains(&label) {
                out.push(label);
            }
        }
        Self { labels: out }
    }

    /// Loads the vocabulary from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read vocabulary {path}"))?;
        let labels: Vec<String> = serde_json::from_str(&content)
            .with_context(|| format!("vocabulary {path} is not a JSON array of strings"))?;
        Ok(Self::new(labels))
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

/// Where the input relations and logs live.
#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub vocabulary: Vocabulary,
}

impl Settings {
    pub fn resolve(data_dir: PathBuf, vocabulary_path: Option<&str>) -> Result<Self> {
        let vocabulary = match vocabulary_path {
            Some(path) => Vocabulary::load(path)?,
            None => Vocabulary::default(),
        };
        Ok(Self {
            data_dir,
            vocabulary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_vocabulary() {
        let vocab = Vocabulary::default();
        assert_eq!(vocab.labels().len(), 11);
        assert!(vocab.contains("hip-hop"));
        assert!(!vocab.contains("Unknown"));
    }

    #[test]
    fn test_new_normalizes() {
        let vocab = Vocabulary::new([" Rock", "rock", "", "JAZZ"]);
        assert_eq!(vocab.labels(), &["rock".to_string(), "jazz".to_string()]);
    }

    #[test]
    fn test_load_from_json() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("genres.json");
        fs::write(&path, r#"["Folk", "classical"]"#).unwrap();

        let vocab = Vocabulary::load(path.to_str().unwrap()).unwrap();
        assert!(vocab.contains("folk"));
        assert!(vocab.contains("classical"));
        assert!(!vocab.contains("rock"));
    }

    #[test]
    fn test_load_rejects_non_array() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("genres.json");
        fs::write(&path, r#"{"rock": 1}"#).unwrap();

        assert!(Vocabulary::load(path.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_settings_default_vocabulary() {
        let settings = Settings::resolve(PathBuf::from("data"), None).unwrap();
        assert_eq!(settings.vocabulary, Vocabulary::default());
        assert_eq!(settings.data_dir, PathBuf::from("data"));
    }
}
