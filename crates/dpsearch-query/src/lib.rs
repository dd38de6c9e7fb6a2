//! dpsearch query: everything that goes into a backend search request.
//!
//! Queries are immutable trees built bottom-up. Canned builders cover the
//! content, department and type-count queries; [`ContentQueryBuilder`]
//! layers semantic scoring on top when an embedding model is available.
//!
//! # Modules
//!
//! - [`dsl`]: Query nodes, score functions and scripts
//! - [`builders`]: Canned queries, score functions and aggregations
//! - [`conceptual`]: [`ContentQueryBuilder`]
//! - [`request`]: [`SearchRequest`] with pagination, sort and highlighting

#![doc = include_str!("../README.md")]

pub mod builders;
pub mod conceptual;
pub mod dsl;
pub mod request;

pub use builders::{RescoreOptions, TYPE_COUNTS_BUCKET};
pub use conceptual::ContentQueryBuilder;
pub use dsl::{
    BoolQuery, BoostMode, DecayFunction, DecayKind, DecayOrigin, DisMaxQuery, FunctionScoreQuery,
    MatchQuery, MultiMatchQuery, Query, ScoreFunction, ScoreMode, Script, TermQuery, TermsQuery,
};
pub use request::{Highlight, Rescore, RescoreMode, SearchRequest, SearchType};
