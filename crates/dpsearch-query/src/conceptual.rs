//! Content query composition.
//!
//! [`ContentQueryBuilder`] wraps the lexical content query in successive
//! function score layers:
//!
//! ```text
//! lexical   = function_score(dis_max, [_score * boostFactor], replace)
//! combined  = bool(should: [lexical, label keywords])     if labels predicted
//! semantic  = function_score(combined, [vector score], multiply)
//!                                                         if the term embeds
//! decayed   = function_score(semantic, [release date decay], multiply)
//! content   = function_score(decayed, [type weights])     if type weights given
//! ```
//!
//! Without a model, or when the model can't embed the term or predict labels,
//! the corresponding layer is left out and the query stays lexical. That is
//! logged and never returned as an error.

use std::sync::Arc;

use dpsearch_core::SearchConfig;
use dpsearch_core::config::{ConceptualSection, DecaySection};
use dpsearch_ml::text::{clean_string, lowercase_tokens};
use dpsearch_ml::{EmbeddingModel, Prediction};

use crate::builders::{
    content_query, date_decay_function, lexical_boost_function, vector_script_score,
    word_vector_keywords_query,
};
use crate::dsl::{BoolQuery, BoostMode, FunctionScoreQuery, Query, ScoreFunction};

/// Builds the full content query for a search term.
#[derive(Clone)]
pub struct ContentQueryBuilder {
    model: Option<Arc<dyn EmbeddingModel>>,
    conceptual: ConceptualSection,
    decay: DecaySection,
}

impl std::fmt::Debug for ContentQueryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentQueryBuilder")
            .field("model", &self.model.as_ref().map(|m| m.name().to_string()))
            .field("conceptual", &self.conceptual)
            .field("decay", &self.decay)
            .finish()
    }
}

impl Default for ContentQueryBuilder {
    fn default() -> Self {
        Self::new(&SearchConfig::default())
    }
}

impl ContentQueryBuilder {
    /// Builder without a model.
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            model: None,
            conceptual: config.conceptual.clone(),
            decay: config.decay.clone(),
        }
    }

    /// Use `model` for semantic augmentation.
    pub fn with_model(mut self, model: Arc<dyn EmbeddingModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// The model, if one is configured.
    pub fn model(&self) -> Option<&Arc<dyn EmbeddingModel>> {
        self.model.as_ref()
    }

    fn active_model(&self) -> Option<&dyn EmbeddingModel> {
        if !self.conceptual.enabled {
            return None;
        }
        self.model.as_deref()
    }

    /// Lexical query with the boost script applied.
    pub fn lexical(&self, search_term: &str) -> Query {
        FunctionScoreQuery::new(
            content_query(search_term),
            vec![lexical_boost_function(self.conceptual.boost_factor)],
        )
        .boost_mode(BoostMode::Replace)
        .into()
    }

    /// The full content query.
    ///
    /// `filter_functions` are per-type weights; `None` leaves the decayed
    /// query as the root.
    pub fn build(&self, search_term: &str, filter_functions: Option<Vec<ScoreFunction>>) -> Query {
        let lexical = self.lexical(search_term);

        let (combined, vector) = match self.active_model() {
            Some(model) => {
                let labels = self.predict_labels(model, search_term);
                let combined = if labels.is_empty() {
                    lexical
                } else {
                    BoolQuery::new()
                        .should(lexical)
                        .should(word_vector_keywords_query(&labels))
                        .into()
                };
                (combined, self.embed(model, search_term))
            }
            None => (lexical, None),
        };

        let semantic = match vector {
            Some(vector) => FunctionScoreQuery::new(
                combined,
                vec![vector_script_score(&vector, self.conceptual.vector_weight)],
            )
            .boost_mode(BoostMode::Multiply)
            .into(),
            None => combined,
        };

        let decayed: Query =
            FunctionScoreQuery::new(semantic, vec![date_decay_function(&self.decay)])
                .boost_mode(BoostMode::Multiply)
                .into();

        match filter_functions {
            Some(functions) if !functions.is_empty() => {
                FunctionScoreQuery::new(decayed, functions).into()
            }
            _ => decayed,
        }
    }

    fn embed(&self, model: &dyn EmbeddingModel, search_term: &str) -> Option<Vec<f32>> {
        match model.embed(&clean_string(search_term)) {
            Ok(vector) => Some(vector),
            Err(e) => {
                log::warn!("Unable to embed search term '{search_term}', skipping vector score: {e}");
                None
            }
        }
    }

    fn predict_labels(&self, model: &dyn EmbeddingModel, search_term: &str) -> Vec<Prediction> {
        let vocabulary = model.vocabulary();
        let known: Vec<String> = lowercase_tokens(search_term)
            .into_iter()
            .filter(|t| vocabulary.contains(t))
            .collect();

        if known.is_empty() {
            log::debug!("No known words in query '{search_term}' for keyword generation");
            return Vec::new();
        }

        match model.predict(
            &known.join(" "),
            self.conceptual.label_k,
            self.conceptual.label_threshold,
        ) {
            Ok(labels) => labels,
            Err(e) => {
                log::warn!("Unable to generate keywords for '{search_term}': {e}");
                Vec::new()
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
