//! Word frequency ranks.

use std::collections::HashMap;

/// Mapping from word to frequency rank. Rank 0 is the most frequent word.
///
/// Built once when a model is loaded and read-only thereafter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    ranks: HashMap<String, usize>,
}

impl Vocabulary {
    /// Empty vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from words in frequency order. A repeated word keeps its first
    /// rank.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ranks = HashMap::new();
        for (rank, word) in words.into_iter().enumerate() {
            ranks.entry(word.into()).or_insert(rank);
        }
        Self { ranks }
    }

    /// Build from explicit `(word, rank)` pairs.
    pub fn from_ranks<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, usize)>,
        S: Into<String>,
    {
        Self {
            ranks: entries.into_iter().map(|(w, r)| (w.into(), r)).collect(),
        }
    }

    /// Rank of `word`, if known.
    pub fn rank(&self, word: &str) -> Option<usize> {
        self.ranks.get(word).copied()
    }

    /// Whether `word` is in the vocabulary.
    pub fn contains(&self, word: &str) -> bool {
        self.ranks.contains_key(word)
    }

    /// Number of words.
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    /// Whether the vocabulary is empty.
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// Iterate over `(word, rank)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.ranks.iter().map(|(w, r)| (w.as_str(), *r))
    }
}
