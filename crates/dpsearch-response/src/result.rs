//! Client-facing search results.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use dpsearch_core::{Paginator, SortField};

/// A normalised hit: the stored document with highlights applied and the
/// content type under `_type`.
pub type Hit = Map<String, Value>;

/// A page of content hits.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentQueryResult {
    /// Total matching documents.
    pub number_of_results: u64,
    /// Backend query time in milliseconds.
    pub took: u64,
    /// Hits in backend score order.
    pub results: Vec<Hit>,
    /// Page accounting.
    pub paginator: Paginator,
    /// Sort applied by the backend.
    pub sort_by: SortField,
}

/// A page of department hits.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentsQueryResult {
    /// Total matching documents.
    pub number_of_results: u64,
    /// Backend query time in milliseconds.
    pub took: u64,
    /// Hits in backend score order.
    pub results: Vec<Hit>,
    /// Page accounting.
    pub paginator: Paginator,
}

/// Matching documents per content type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeCountsQueryResult {
    /// Count per content type name. Types without matches are absent.
    pub doc_counts: BTreeMap<String, u64>,
}

/// Result of any dpsearch query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SearchResult {
    /// Content query.
    Content(ContentQueryResult),
    /// Type counts query.
    TypeCounts(TypeCountsQueryResult),
    /// Departments query.
    Departments(DepartmentsQueryResult),
}

impl SearchResult {
    /// Total hits; for type counts, the sum of all buckets.
    pub fn number_of_results(&self) -> u64 {
        match self {
            SearchResult::Content(r) => r.number_of_results,
            SearchResult::Departments(r) => r.number_of_results,
            SearchResult::TypeCounts(r) => r.doc_counts.values().sum(),
        }
    }

    /// Hits, empty for type counts.
    pub fn hits(&self) -> &[Hit] {
        match self {
            SearchResult::Content(r) => &r.results,
            SearchResult::Departments(r) => &r.results,
            SearchResult::TypeCounts(_) => &[],
        }
    }
}

impl From<ContentQueryResult> for SearchResult {
    fn from(r: ContentQueryResult) -> Self {
        SearchResult::Content(r)
    }
}

impl From<TypeCountsQueryResult> for SearchResult {
    fn from(r: TypeCountsQueryResult) -> Self {
        SearchResult::TypeCounts(r)
    }
}

impl From<DepartmentsQueryResult> for SearchResult {
    fn from(r: DepartmentsQueryResult) -> Self {
        SearchResult::Departments(r)
    }
}

/// Content, type counts and featured result from one combined search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedSearchResult {
    /// Content page.
    pub content: ContentQueryResult,
    /// Type counts over the unfiltered query.
    pub counts: TypeCountsQueryResult,
    /// Best featured hit, if any.
    pub featured_result: ContentQueryResult,
}
