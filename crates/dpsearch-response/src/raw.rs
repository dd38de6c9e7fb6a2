//! Raw backend response model.
//!
//! Mirrors the subset of the backend's search response that dpsearch reads.
//! Unknown keys are ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use dpsearch_core::{Error, Result};

/// Response to a single search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawResponse {
    /// Milliseconds the backend spent on the query.
    #[serde(default)]
    pub took: u64,

    /// Whether the backend stopped early.
    #[serde(default)]
    pub timed_out: bool,

    /// Matching hits.
    pub hits: RawHits,

    /// Aggregation results by name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregations: Option<Map<String, Value>>,
}

impl RawResponse {
    /// Parse a backend response document.
    pub fn from_json(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Total matching documents.
    pub fn total(&self) -> u64 {
        self.hits.total.value()
    }
}

/// Hits section of a response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawHits {
    /// Total matching documents.
    #[serde(default)]
    pub total: HitsTotal,

    /// Best score in the result set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_score: Option<f64>,

    /// Hits for the requested page, in score order.
    #[serde(default)]
    pub hits: Vec<RawHit>,
}

/// Total hit count, as a bare number or as `{value, relation}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HitsTotal {
    /// Legacy integer form.
    Count(u64),
    /// Object form.
    Object {
        /// Count.
        value: u64,
        /// `eq` when exact, `gte` when a lower bound.
        #[serde(default = "default_relation")]
        relation: String,
    },
}

fn default_relation() -> String {
    "eq".to_string()
}

impl Default for HitsTotal {
    fn default() -> Self {
        HitsTotal::Count(0)
    }
}

impl HitsTotal {
    /// The count.
    pub fn value(&self) -> u64 {
        match self {
            HitsTotal::Count(n) => *n,
            HitsTotal::Object { value, .. } => *value,
        }
    }
}

/// A single hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawHit {
    /// Index the document lives in.
    #[serde(rename = "_index", default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,

    /// Document type marker.
    #[serde(rename = "_type", default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,

    /// Document id.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Relevance score; absent when sorting on other keys.
    #[serde(rename = "_score", default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    /// Stored document.
    #[serde(rename = "_source", default)]
    pub source: Map<String, Value>,

    /// Highlighted fragments by field path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<BTreeMap<String, Vec<String>>>,
}

// ============================================================================
// Multi-search
// ============================================================================

/// Error body reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendError {
    /// Error type, e.g. `parsing_exception`.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Human-readable reason.
    #[serde(default)]
    pub reason: String,
}

impl From<BackendError> for Error {
    fn from(e: BackendError) -> Self {
        Error::backend_query(e.kind, e.reason)
    }
}

/// One entry of a multi-search response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MultiSearchItem {
    /// The query failed.
    Failed {
        /// What went wrong.
        error: BackendError,
    },
    /// The query succeeded.
    Ok(RawResponse),
}

/// Multi-search response; entries match submission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMultiResponse {
    /// One entry per submitted query.
    pub responses: Vec<MultiSearchItem>,
}

impl RawMultiResponse {
    /// Parse a backend multi-search response document.
    pub fn from_json(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Per-item results, failed items as [`Error::BackendQuery`].
    pub fn into_results(self) -> Vec<Result<RawResponse>> {
        self.responses
            .into_iter()
            .map(|item| match item {
                MultiSearchItem::Ok(response) => Ok(response),
                MultiSearchItem::Failed { error } => Err(error.into()),
            })
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
