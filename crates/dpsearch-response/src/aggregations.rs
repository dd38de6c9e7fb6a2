//! Aggregation extraction.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

/// A `terms` aggregation result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TermsAggregation {
    /// Buckets in backend order.
    #[serde(default)]
    pub buckets: Vec<TermsBucket>,
}

/// One bucket of a `terms` aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TermsBucket {
    /// Bucket key.
    pub key: String,
    /// Documents in the bucket.
    pub doc_count: u64,
}

/// Counts per key from the `terms` aggregation called `name`.
///
/// Keys without a bucket are absent from the result. A missing aggregation
/// yields an empty map.
pub fn terms_counts(
    aggregations: Option<&Map<String, Value>>,
    name: &str,
) -> dpsearch_core::Result<BTreeMap<String, u64>> {
    let Some(aggregation) = aggregations.and_then(|aggs| aggs.get(name)) else {
        log::warn!("Response has no '{name}' aggregation");
        return Ok(BTreeMap::new());
    };

    let terms = TermsAggregation::deserialize(aggregation)?;
    Ok(terms
        .buckets
        .into_iter()
        .map(|b| (b.key, b.doc_count))
        .collect())
}
