//! Query builders.
//!
//! Free functions that build the individual pieces of a search request:
//! the lexical content query, the departments query, the score functions,
//! the label keyword query, the type counts aggregation and the user rescore
//! section. [`ContentQueryBuilder`](crate::conceptual::ContentQueryBuilder)
//! assembles these into the full content query.

use serde_json::{Value, json};

use dpsearch_core::config::DecaySection;
use dpsearch_core::{ContentType, fields};
use dpsearch_ml::Prediction;

use crate::dsl::{
    BoolQuery, BoostMode, DecayFunction, DecayKind, DecayOrigin, DisMaxQuery,
    FunctionScoreQuery, MatchQuery, MatchType, MultiMatchQuery, MultiMatchType, Operator, Query,
    ScoreFunction, Script, TermQuery, TermsQuery,
};
use crate::request::{Rescore, RescoreMode};

/// Name of the type counts aggregation bucket.
pub const TYPE_COUNTS_BUCKET: &str = "docCounts";

/// Script language of the vector scoring plugin.
pub const VECTOR_SCRIPT_LANG: &str = "knn";
/// Script name of the vector scoring plugin.
pub const VECTOR_SCRIPT: &str = "binary_vector_score";

const TITLE_MSM: &str = "1<-2 3<80% 5<60%";
const TITLE_EDITION_MSM: &str = "3<80% 5<60%";
const SUMMARY_MSM: &str = "75%";
const TITLE_BOOST: f32 = 10.0;
const SEARCH_BOOST_BOOST: f32 = 100.0;

// ============================================================================
// Lexical queries
// ============================================================================

/// The lexical content query: the best of five matching strategies.
///
/// 1. Title matches (dates stripped, unstemmed, title and edition as one
///    field) with graduated minimum-should-match
/// 2. Summary and meta description, 75% of terms
/// 3. Keywords, every term
/// 4. Identifiers (series and dataset codes)
/// 5. Curated search boost terms, every term, heavily boosted
pub fn content_query(search_term: &str) -> Query {
    let title = BoolQuery::new()
        .should(
            MatchQuery::new(&fields::TITLE_NO_DATES, search_term)
                .match_type(MatchType::Boolean)
                .boost(TITLE_BOOST)
                .minimum_should_match(TITLE_MSM),
        )
        .should(
            MatchQuery::new(&fields::TITLE_NO_STEM, search_term)
                .match_type(MatchType::Boolean)
                .boost(TITLE_BOOST)
                .minimum_should_match(TITLE_MSM),
        )
        .should(
            MultiMatchQuery::new(
                [fields::TITLE.boosted_name(), fields::EDITION.boosted_name()],
                search_term,
            )
            .match_type(MultiMatchType::CrossFields)
            .minimum_should_match(TITLE_EDITION_MSM),
        );

    let summary = MultiMatchQuery::new(
        [fields::SUMMARY.name, fields::META_DESCRIPTION.name],
        search_term,
    )
    .match_type(MultiMatchType::BestFields)
    .minimum_should_match(SUMMARY_MSM);

    let keywords = MatchQuery::new(&fields::KEYWORDS, search_term)
        .match_type(MatchType::Boolean)
        .operator(Operator::And);

    let identifiers =
        MultiMatchQuery::new([fields::CDID.name, fields::DATASET_ID.name], search_term);

    let search_boost = MatchQuery::new(&fields::SEARCH_BOOST, search_term)
        .match_type(MatchType::Boolean)
        .operator(Operator::And)
        .boost(SEARCH_BOOST_BOOST);

    let strategies: [Query; 5] = [
        title.into(),
        summary.into(),
        keywords.into(),
        identifiers.into(),
        search_boost.into(),
    ];
    DisMaxQuery::new(strategies).into()
}

/// Lexical-only query against department search terms.
pub fn departments_query(search_term: &str) -> Query {
    MatchQuery::new(&fields::DEPARTMENT_TERMS, search_term)
        .match_type(MatchType::Boolean)
        .into()
}

/// Match keywords against predicted labels, each boosted by its probability.
///
/// Underscores in labels become spaces.
pub fn word_vector_keywords_query(predictions: &[Prediction]) -> Query {
    BoolQuery::new()
        .should_all(predictions.iter().map(|p| {
            Query::from(
                MatchQuery::new(&fields::KEYWORDS, p.label.replace('_', " ")).boost(p.probability),
            )
        }))
        .into()
}

/// Restrict to documents of the given content types.
pub fn type_filter_query(types: &[ContentType]) -> Query {
    TermsQuery::new(&fields::TYPE, types.iter().map(|t| t.name())).into()
}

/// Restrict `query` to the given content types, without affecting scores.
pub fn filter_by_type(query: Query, types: &[ContentType]) -> Query {
    BoolQuery::new()
        .must(query)
        .filter(type_filter_query(types))
        .into()
}

// ============================================================================
// Score functions
// ============================================================================

/// One constant-weight function per content type, applied to documents of
/// that type.
pub fn content_filter_functions(types: &[ContentType]) -> Vec<ScoreFunction> {
    types
        .iter()
        .map(|t| ScoreFunction::filtered_weight(TermQuery::new(&fields::TYPE, t.name()), t.weight()))
        .collect()
}

/// Cosine similarity between `vector` and each document's embedding.
pub fn vector_script_score(vector: &[f32], weight: f32) -> ScoreFunction {
    let script = Script::inline(VECTOR_SCRIPT)
        .lang(VECTOR_SCRIPT_LANG)
        .param("cosine", true)
        .param("field", fields::EMBEDDING_VECTOR.name)
        .param("vector", json!(vector));
    ScoreFunction::script_score(script).with_weight(weight)
}

/// `_score * boostFactor`, used to lift lexical matches above semantic-only
/// matches.
pub fn lexical_boost_function(boost_factor: f32) -> ScoreFunction {
    ScoreFunction::script_score(
        Script::inline("_score * boostFactor").param("boostFactor", boost_factor),
    )
}

/// Release date decay from now.
pub fn date_decay_function(decay: &DecaySection) -> ScoreFunction {
    let kind = DecayKind::from_name(&decay.function).unwrap_or_else(|| {
        log::warn!("Unknown decay function '{}', using exp", decay.function);
        DecayKind::Exp
    });
    ScoreFunction::decay(
        DecayFunction::new(kind, &fields::RELEASE_DATE, DecayOrigin::Now, decay.scale.clone())
            .offset(decay.offset.clone())
            .decay(decay.decay),
    )
}

// ============================================================================
// Aggregations and rescoring
// ============================================================================

/// Terms aggregation over the content type marker, one bucket per type.
pub fn type_counts_aggregation() -> Value {
    json!({
        "terms": {
            "field": fields::TYPE.name,
            "size": ContentType::ALL.len(),
        }
    })
}

/// Options for [`user_rescore`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RescoreOptions {
    /// How original and rescore scores combine.
    pub score_mode: RescoreMode,
    /// Number of top hits rescored.
    pub window_size: u32,
    /// Weight of the original score.
    pub query_weight: f32,
    /// Weight of the rescore score.
    pub rescore_query_weight: f32,
}

impl Default for RescoreOptions {
    fn default() -> Self {
        Self {
            score_mode: RescoreMode::Avg,
            window_size: 100,
            query_weight: 0.5,
            rescore_query_weight: 1.2,
        }
    }
}

/// Rescore the top hits by similarity to a user's session vector.
pub fn user_rescore(user_vector: &[f32], options: RescoreOptions) -> Rescore {
    let query = FunctionScoreQuery::new(Query::MatchAll, vec![vector_script_score(user_vector, 1.0)])
        .boost_mode(BoostMode::Replace);

    Rescore {
        window_size: options.window_size,
        query: query.into(),
        query_weight: options.query_weight,
        rescore_query_weight: options.rescore_query_weight,
        score_mode: options.score_mode,
    }
}

// ============================================================================
// Tests
// ============================================================================
