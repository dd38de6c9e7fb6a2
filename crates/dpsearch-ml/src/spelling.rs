//! Spelling correction.
//!
//! Corrections are found by edit-distance candidate generation (Norvig's
//! method) over a lowercase ASCII alphabet, ranked by the model vocabulary's
//! frequency ranks:
//!
//! ```text
//! probability(word) = n / (rank(word) + n)     n = vocabulary size
//! ```
//!
//! Unknown words have probability 0.
//!
//! Candidates for a word are the first non-empty of:
//!
//! 1. the word itself, if known
//! 2. known words one edit away
//! 3. known words two edits away
//! 4. the word unchanged
//!
//! Candidate lists keep generation order and ties on probability go to the
//! earliest candidate, so corrections are reproducible.
//!
//! Only the letters `a..=z` are inserted or substituted. Words in other
//! scripts can still be corrected by deletion and transposition.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::model::EmbeddingModel;
use crate::vocabulary::Vocabulary;

const ALPHABET: &[char] = &[
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r',
    's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// A suggested correction for one input token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellCheckSuggestion {
    /// The token as supplied.
    #[serde(rename = "input")]
    pub input_token: String,
    /// Most probable correction.
    pub correction: String,
    /// Probability of the correction.
    pub probability: f64,
}

/// Edit-distance spell checker over a model's vocabulary.
#[derive(Clone)]
pub struct SpellChecker {
    model: Arc<dyn EmbeddingModel>,
}

impl std::fmt::Debug for SpellChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpellChecker")
            .field("model", &self.model.name())
            .field("vocabulary", &self.model.vocabulary().len())
            .finish()
    }
}

impl SpellChecker {
    /// Create a spell checker reading the vocabulary of `model`.
    pub fn new(model: Arc<dyn EmbeddingModel>) -> Self {
        Self { model }
    }

    fn vocabulary(&self) -> &Vocabulary {
        self.model.vocabulary()
    }

    /// Suggestions for every distinct term whose correction differs from it
    /// (ignoring case) and is known. Output is ordered by term.
    pub fn correct_spelling<S: AsRef<str>>(&self, terms: &[S]) -> Vec<SpellCheckSuggestion> {
        let distinct: BTreeSet<&str> = terms.iter().map(AsRef::as_ref).collect();

        distinct
            .into_iter()
            .filter_map(|term| {
                let correction = self.correction(term);
                if correction.to_lowercase() == term.to_lowercase() {
                    return None;
                }
                let probability = self.probability(&correction);
                if probability == 0.0 {
                    return None;
                }
                log::debug!("Suggesting '{correction}' for '{term}' (p={probability:.4})");
                Some(SpellCheckSuggestion {
                    input_token: term.to_string(),
                    correction,
                    probability,
                })
            })
            .collect()
    }

    /// Probability that `word` is the intended spelling.
    pub fn probability(&self, word: &str) -> f64 {
        let vocabulary = self.vocabulary();
        match vocabulary.rank(word) {
            Some(rank) => {
                let n = vocabulary.len() as f64;
                n / (rank as f64 + n)
            }
            None => 0.0,
        }
    }

    /// Most probable correction for `word`.
    pub fn correction(&self, word: &str) -> String {
        let mut best: Option<(String, f64)> = None;
        for candidate in self.candidates(word) {
            let p = self.probability(&candidate);
            if best.as_ref().is_none_or(|(_, best_p)| p > *best_p) {
                best = Some((candidate, p));
            }
        }
        best.map(|(c, _)| c).unwrap_or_else(|| word.to_string())
    }

    /// Candidate corrections for `word`, in generation order.
    pub fn candidates(&self, word: &str) -> Vec<String> {
        let own = self.known(std::iter::once(word.to_string()));
        if !own.is_empty() {
            return own;
        }

        let single = self.known(single_edits(word));
        if !single.is_empty() {
            return single;
        }

        let double = self.known(double_edits(word));
        if !double.is_empty() {
            return double;
        }

        vec![word.to_string()]
    }

    /// Known words from `words`, deduplicated in first-seen order.
    pub fn known<I>(&self, words: I) -> Vec<String>
    where
        I: IntoIterator<Item = String>,
    {
        let vocabulary = self.vocabulary();
        let mut seen = HashSet::new();
        words
            .into_iter()
            .filter(|w| vocabulary.contains(w))
            .filter(|w| seen.insert(w.clone()))
            .collect()
    }
}

/// Every string one edit away from `word`: deletions, adjacent
/// transpositions, substitutions, then insertions. Deduplicated in order.
pub fn single_edits(word: &str) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    let n = chars.len();
    let join = |parts: &[&[char]]| -> String { parts.iter().flat_map(|p| p.iter()).collect() };

    let mut edits = Vec::with_capacity(n * 2 + ALPHABET.len() * (2 * n + 1));

    for i in 0..n {
        edits.push(join(&[&chars[..i], &chars[i + 1..]]));
    }
    for i in 0..n.saturating_sub(1) {
        edits.push(join(&[&chars[..i], &[chars[i + 1], chars[i]][..], &chars[i + 2..]]));
    }
    for i in 0..n {
        for c in ALPHABET {
            edits.push(join(&[&chars[..i], &[*c][..], &chars[i + 1..]]));
        }
    }
    for i in 0..=n {
        for c in ALPHABET {
            edits.push(join(&[&chars[..i], &[*c][..], &chars[i..]]));
        }
    }

    let mut seen = HashSet::with_capacity(edits.len());
    edits.retain(|e| seen.insert(e.clone()));
    edits
}

/// Every string two edits away from `word`, generated lazily and not
/// deduplicated.
pub fn double_edits(word: &str) -> impl Iterator<Item = String> {
    single_edits(word)
        .into_iter()
        .flat_map(|e1| single_edits(&e1).into_iter())
}

// ============================================================================
// Tests
// ============================================================================
