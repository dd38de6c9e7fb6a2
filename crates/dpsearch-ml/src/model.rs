//! The embedding model capability.
//!
//! The query builder and the spell checker consume a model through the
//! [`EmbeddingModel`] trait. A model is loaded once at startup and shared
//! behind an `Arc`; every method takes `&self`.

use serde::{Deserialize, Serialize};

use dpsearch_core::Result;

use crate::vocabulary::Vocabulary;

/// A predicted topical label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Label text, without any `__label__` prefix.
    pub label: String,
    /// Confidence in `[threshold, 1]`.
    pub probability: f32,
}

impl Prediction {
    /// Create a prediction.
    pub fn new(label: impl Into<String>, probability: f32) -> Self {
        Self {
            label: label.into(),
            probability,
        }
    }
}

/// Word embedding and label prediction.
pub trait EmbeddingModel: Send + Sync {
    /// Sentence vector for `text`.
    ///
    /// # Errors
    ///
    /// [`Error::Model`](dpsearch_core::Error::Model) when no vector can be
    /// produced (for example when none of the words are known).
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Up to `k` labels for `text` with probability at least `threshold`,
    /// most probable first.
    fn predict(&self, text: &str, k: usize, threshold: f32) -> Result<Vec<Prediction>>;

    /// Word frequency ranks.
    fn vocabulary(&self) -> &Vocabulary;

    /// Vector dimension.
    fn dimension(&self) -> usize;

    /// Model name for logging.
    fn name(&self) -> &str {
        "model"
    }
}

/// Cosine similarity; 0 for mismatched, empty, or zero-norm vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Element-wise mean of equal-length vectors. `None` if there are none.
pub fn mean_vector<'a, I>(vectors: I, dimension: usize) -> Option<Vec<f32>>
where
    I: IntoIterator<Item = &'a [f32]>,
{
    let mut sum = vec![0.0f32; dimension];
    let mut count = 0usize;
    for v in vectors {
        for (acc, x) in sum.iter_mut().zip(v) {
            *acc += x;
        }
        count += 1;
    }
    if count == 0 {
        return None;
    }
    let n = count as f32;
    sum.iter_mut().for_each(|x| *x /= n);
    Some(sum)
}
