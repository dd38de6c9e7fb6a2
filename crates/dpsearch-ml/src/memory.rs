//! In-memory model built from fastText `.vec` files.
//!
//! The `.vec` text format is an optional `<count> <dimension>` header line
//! followed by one `<word> <f1> <f2> ...` line per word, most frequent word
//! first. Vocabulary ranks follow file order.
//!
//! Label vectors use the same format. A `__label__` prefix on label names is
//! stripped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use dpsearch_core::{Error, Result};

use crate::model::{EmbeddingModel, Prediction, cosine_similarity, mean_vector};
use crate::text::clean_string;
use crate::vocabulary::Vocabulary;

const LABEL_PREFIX: &str = "__label__";

/// Word and label vectors held in memory.
#[derive(Debug, Clone)]
pub struct InMemoryModel {
    name: String,
    vocabulary: Vocabulary,
    words: Vec<Vec<f32>>,
    labels: Vec<(String, Vec<f32>)>,
    dimension: usize,
}

impl InMemoryModel {
    /// Build from parsed word vectors and label vectors.
    ///
    /// # Errors
    ///
    /// [`Error::Model`] if the vectors don't share one dimension.
    pub fn from_vectors(
        words: Vec<(String, Vec<f32>)>,
        labels: Vec<(String, Vec<f32>)>,
    ) -> Result<Self> {
        let dimension = words
            .first()
            .or(labels.first())
            .map(|(_, v)| v.len())
            .unwrap_or(0);

        if let Some((word, v)) = words
            .iter()
            .chain(labels.iter())
            .find(|(_, v)| v.len() != dimension)
        {
            return Err(Error::model(format!(
                "vector for '{word}' has dimension {}, expected {dimension}",
                v.len()
            )));
        }

        let vocabulary = Vocabulary::from_words(words.iter().map(|(w, _)| w.clone()));
        let words = words.into_iter().map(|(_, v)| v).collect();
        let labels = labels
            .into_iter()
            .map(|(l, v)| {
                let label = l.strip_prefix(LABEL_PREFIX).map(str::to_string).unwrap_or(l);
                (label, v)
            })
            .collect();

        Ok(Self {
            name: "in-memory".to_string(),
            vocabulary,
            words,
            labels,
            dimension,
        })
    }

    /// Load word vectors and, optionally, label vectors from `.vec` files.
    pub fn load(vectors_path: &Path, labels_path: Option<&Path>) -> Result<Self> {
        let words = read_vec_file(vectors_path)?;
        let labels = match labels_path {
            Some(path) => read_vec_file(path)?,
            None => Vec::new(),
        };

        let model = Self::from_vectors(words, labels)?
            .with_name(vectors_path.display().to_string());
        log::info!(
            "Loaded model {} ({} words, {} labels, dimension {})",
            model.name,
            model.vocabulary.len(),
            model.labels.len(),
            model.dimension
        );
        Ok(model)
    }

    /// Set the name used in logs.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Number of labels.
    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    fn word_vector(&self, word: &str) -> Option<&[f32]> {
        self.vocabulary
            .rank(word)
            .and_then(|rank| self.words.get(rank))
            .map(Vec::as_slice)
    }
}

impl EmbeddingModel for InMemoryModel {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let cleaned = clean_string(text);
        let known = cleaned
            .split_whitespace()
            .filter_map(|token| self.word_vector(token));

        mean_vector(known, self.dimension)
            .ok_or_else(|| Error::model(format!("no known words in '{text}'")))
    }

    fn predict(&self, text: &str, k: usize, threshold: f32) -> Result<Vec<Prediction>> {
        if self.labels.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let vector = self.embed(text)?;
        let mut scored: Vec<Prediction> = self
            .labels
            .iter()
            .map(|(label, v)| Prediction::new(label.clone(), cosine_similarity(&vector, v)))
            .filter(|p| p.probability >= threshold)
            .collect();

        scored.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        scored.truncate(k);
        Ok(scored)
    }

    fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// .vec parsing
// ============================================================================

/// Read a `.vec` file.
pub fn read_vec_file(path: &Path) -> Result<Vec<(String, Vec<f32>)>> {
    let file = File::open(path).map_err(|e| Error::io_with_path(e, path))?;
    parse_vec(BufReader::new(file)).map_err(|e| match e {
        Error::Model { message } => Error::model(format!("{}: {message}", path.display())),
        other => other,
    })
}

/// Parse `.vec` text from a reader.
pub fn parse_vec<R: BufRead>(reader: R) -> Result<Vec<(String, Vec<f32>)>> {
    let mut entries = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| Error::model(format!("line {}: {e}", idx + 1)))?;
        let mut parts = line.split_whitespace();
        let Some(word) = parts.next() else {
            continue;
        };
        let rest: Vec<&str> = parts.collect();

        if idx == 0 && is_header(word, &rest) {
            continue;
        }

        let vector = rest
            .iter()
            .map(|x| x.parse::<f32>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::model(format!("line {}: {e}", idx + 1)))?;

        if vector.is_empty() {
            return Err(Error::model(format!("line {}: missing vector", idx + 1)));
        }
        entries.push((word.to_string(), vector));
    }

    Ok(entries)
}

fn is_header(first: &str, rest: &[&str]) -> bool {
    rest.len() == 1 && first.parse::<usize>().is_ok() && rest[0].parse::<usize>().is_ok()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const WORDS: &str = "4 3\n\
        the 0.1 0.1 0.1\n\
        inflation 1.0 0.0 0.0\n\
        prices 0.9 0.1 0.0\n\
        population 0.0 1.0 0.0\n";

    const LABELS: &str = "2 3\n\
        __label__economy 1.0 0.0 0.0\n\
        __label__people_population_and_community 0.0 1.0 0.0\n";

    fn model() -> InMemoryModel {
        let words = parse_vec(Cursor::new(WORDS)).unwrap();
        let labels = parse_vec(Cursor::new(LABELS)).unwrap();
        InMemoryModel::from_vectors(words, labels).unwrap()
    }

    #[test]
    fn test_parse_skips_header() {
        let entries = parse_vec(Cursor::new(WORDS)).unwrap();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[1].0, "inflation");
        assert_eq!(entries[1].1, vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_parse_without_header() {
        let entries = parse_vec(Cursor::new("a 1 2\nb 3 4\n")).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_parse_rejects_bad_float() {
        let err = parse_vec(Cursor::new("a 1 x\n")).unwrap_err();
        assert!(matches!(err, Error::Model { .. }));
    }

    #[test]
    fn test_dimension_mismatch() {
        let words = parse_vec(Cursor::new("a 1 2\nb 3\n")).unwrap();
        let err = InMemoryModel::from_vectors(words, Vec::new()).unwrap_err();
        assert!(err.to_string().contains("'b'"));
    }

    #[test]
    fn test_vocabulary_follows_file_order() {
        let m = model();
        assert_eq!(m.vocabulary().rank("the"), Some(0));
        assert_eq!(m.vocabulary().rank("population"), Some(3));
        assert_eq!(m.dimension(), 3);
    }

    #[test]
    fn test_embed_is_mean_of_known_words() {
        let v = model().embed("Inflation POPULATION unknownword").unwrap();
        assert_eq!(v, vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_embed_no_known_words_fails() {
        let err = model().embed("zzz qqq").unwrap_err();
        assert!(matches!(err, Error::Model { .. }));
    }

    #[test]
    fn test_predict_ranks_labels() {
        let predictions = model().predict("inflation prices", 10, 0.1).unwrap();
        assert_eq!(predictions[0].label, "economy");
        assert!(predictions[0].probability > 0.9);
        assert!(
            predictions
                .windows(2)
                .all(|w| w[0].probability >= w[1].probability)
        );
    }

    #[test]
    fn test_predict_respects_k_and_threshold() {
        let m = model();
        assert_eq!(m.predict("population", 1, 0.0).unwrap().len(), 1);
        let strict = m.predict("inflation", 10, 0.5).unwrap();
        assert_eq!(strict.len(), 1);
        assert_eq!(strict[0].label, "economy");
    }

    #[test]
    fn test_predict_without_labels_is_empty() {
        let words = parse_vec(Cursor::new(WORDS)).unwrap();
        let m = InMemoryModel::from_vectors(words, Vec::new()).unwrap();
        assert!(m.predict("inflation", 10, 0.1).unwrap().is_empty());
    }

    #[test]
    fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let words_path = dir.path().join("words.vec");
        let labels_path = dir.path().join("labels.vec");
        std::fs::write(&words_path, WORDS).unwrap();
        std::fs::write(&labels_path, LABELS).unwrap();

        let m = InMemoryModel::load(&words_path, Some(&labels_path)).unwrap();
        assert_eq!(m.vocabulary().len(), 4);
        assert_eq!(m.label_count(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let err = InMemoryModel::load(Path::new("/nonexistent/words.vec"), None).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
