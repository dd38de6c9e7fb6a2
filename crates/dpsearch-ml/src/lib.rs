//! dpsearch ML: the embedding model capability and spell checking.
//!
//! The model is an opaque capability: the query builder asks it for sentence
//! vectors and topical labels, the spell checker reads its vocabulary. Both
//! receive it as an `Arc<dyn EmbeddingModel>` at construction.
//!
//! # Modules
//!
//! - [`model`]: The [`EmbeddingModel`] trait and vector helpers
//! - [`vocabulary`]: Word frequency ranks
//! - [`memory`]: [`InMemoryModel`] loaded from fastText `.vec` files
//! - [`mock`]: [`MockModel`] for tests
//! - [`spelling`]: [`SpellChecker`]
//! - [`text`]: Text normalisation

#![doc = include_str!("../README.md")]

pub mod memory;
pub mod mock;
pub mod model;
pub mod spelling;
pub mod text;
pub mod vocabulary;

pub use memory::InMemoryModel;
pub use mock::MockModel;
pub use model::{EmbeddingModel, Prediction, cosine_similarity};
pub use spelling::{SpellCheckSuggestion, SpellChecker};
pub use vocabulary::Vocabulary;
