//! Deterministic model for tests.

use dpsearch_core::{Error, Result};

use crate::model::{EmbeddingModel, Prediction};
use crate::text::clean_string;
use crate::vocabulary::Vocabulary;

/// A model that embeds text deterministically and returns canned
/// predictions.
///
/// Embedding succeeds for any text with at least one known word (or any
/// text at all when the vocabulary is empty). Either capability can be
/// switched to fail.
#[derive(Debug, Clone)]
pub struct MockModel {
    dimension: usize,
    vocabulary: Vocabulary,
    predictions: Vec<Prediction>,
    fail_embed: bool,
    fail_predict: bool,
}

impl MockModel {
    /// Mock with the given vector dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vocabulary: Vocabulary::new(),
            predictions: Vec::new(),
            fail_embed: false,
            fail_predict: false,
        }
    }

    /// Set the vocabulary from words in frequency order.
    pub fn with_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vocabulary = Vocabulary::from_words(words);
        self
    }

    /// Set the vocabulary.
    pub fn with_vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    /// Predictions returned (after `k` and threshold) by every call.
    pub fn with_predictions(mut self, predictions: Vec<Prediction>) -> Self {
        self.predictions = predictions;
        self
    }

    /// Make `embed` fail.
    pub fn failing_embed(mut self) -> Self {
        self.fail_embed = true;
        self
    }

    /// Make `predict` fail.
    pub fn failing_predict(mut self) -> Self {
        self.fail_predict = true;
        self
    }
}

impl EmbeddingModel for MockModel {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.fail_embed {
            return Err(Error::model("mock embedding failure"));
        }

        let cleaned = clean_string(text);
        if !self.vocabulary.is_empty()
            && !cleaned.split_whitespace().any(|w| self.vocabulary.contains(w))
        {
            return Err(Error::model(format!("no known words in '{text}'")));
        }

        let seed: u32 = cleaned.bytes().map(u32::from).sum();
        let raw: Vec<f32> = (0..self.dimension)
            .map(|i| ((seed as usize + i * 31) % 97) as f32 + 1.0)
            .collect();
        let norm = raw.iter().map(|x| x * x).sum::<f32>().sqrt();
        Ok(raw.into_iter().map(|x| x / norm).collect())
    }

    fn predict(&self, _text: &str, k: usize, threshold: f32) -> Result<Vec<Prediction>> {
        if self.fail_predict {
            return Err(Error::model("mock prediction failure"));
        }

        Ok(self
            .predictions
            .iter()
            .filter(|p| p.probability >= threshold)
            .take(k)
            .cloned()
            .collect())
    }

    fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_is_deterministic_and_normalised() {
        let model = MockModel::new(8);
        let a = model.embed("gdp growth").unwrap();
        let b = model.embed("GDP growth!").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 8);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_embed_requires_known_word_when_vocabulary_set() {
        let model = MockModel::new(4).with_words(["gdp"]);
        assert!(model.embed("gdp").is_ok());
        assert!(model.embed("unemployment").is_err());
    }

    #[test]
    fn test_predict_filters() {
        let model = MockModel::new(4).with_predictions(vec![
            Prediction::new("economy", 0.9),
            Prediction::new("business", 0.05),
            Prediction::new("people", 0.5),
        ]);
        let out = model.predict("x", 10, 0.1).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(model.predict("x", 1, 0.1).unwrap().len(), 1);
    }

    #[test]
    fn test_failures() {
        let model = MockModel::new(4).failing_embed().failing_predict();
        assert!(model.embed("x").is_err());
        assert!(model.predict("x", 1, 0.0).is_err());
    }
}
