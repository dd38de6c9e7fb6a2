//! In-memory search backend for tests.
//!
//! [`MockBackend`] answers from a queue of canned replies first. Once the
//! queue is empty it evaluates the request's query JSON against a small set
//! of documents:
//!
//! - `match`: `boost * matched_tokens / query_tokens` when any token matches,
//!   or every token with `operator: and`
//! - `multi_match`: best `match` score over its fields, times the field boost
//! - `term` / `terms`: `boost` on exact match
//! - `bool`: sum of `must` and matching `should` scores; `filter` and
//!   `must_not` only select
//! - `dis_max`: `max + tie_breaker * (sum - max)`
//! - `function_score`, `script_score`: the inner query's score
//! - `match_all`: 1
//!
//! Hits come back in descending score order with `from`/`size` applied, and
//! `terms` aggregations over `_type` are computed from all matches.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use dpsearch_core::{ContentType, Error, Result};
use dpsearch_query::SearchRequest;
use dpsearch_response::RawResponse;

use crate::backend::SearchBackend;

/// A stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct MockDocument {
    /// Document id.
    pub id: String,
    /// Type marker.
    pub doc_type: String,
    /// Stored fields.
    pub source: Map<String, Value>,
}

impl MockDocument {
    /// Document of `content_type` with `source` fields.
    pub fn new(id: impl Into<String>, content_type: ContentType, source: Value) -> Self {
        Self {
            id: id.into(),
            doc_type: content_type.name().to_string(),
            source: match source {
                Value::Object(map) => map,
                _ => Map::new(),
            },
        }
    }

    /// Document with a raw type marker.
    pub fn with_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = doc_type.into();
        self
    }

    fn lookup(&self, path: &str) -> Option<&Value> {
        if path == "_type" {
            return None;
        }
        let mut current: Option<&Value> = None;
        for segment in path.split('.') {
            let next = match current {
                None => self.source.get(segment),
                Some(Value::Object(map)) => map.get(segment),
                // Sub-fields of a text field index the same text.
                Some(v) => return Some(v),
            };
            current = Some(next?);
        }
        current
    }

    fn text(&self, path: &str) -> String {
        match self.lookup(path) {
            Some(Value::String(s)) => s.to_lowercase(),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase(),
            Some(other) => other.to_string().to_lowercase(),
            None => String::new(),
        }
    }

    fn value_matches(&self, path: &str, expected: &Value) -> bool {
        if path == "_type" {
            return expected.as_str() == Some(self.doc_type.as_str());
        }
        match self.lookup(path) {
            Some(Value::Array(items)) => items.contains(expected),
            Some(v) => v == expected,
            None => false,
        }
    }
}

enum MockReply {
    Response(RawResponse),
    QueryError { kind: String, reason: String },
}

/// Search backend double.
///
/// Every executed request is recorded, including those inside a batch.
#[derive(Default)]
pub struct MockBackend {
    documents: Vec<MockDocument>,
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<SearchRequest>>,
    batches: Mutex<usize>,
    unavailable: bool,
}

impl std::fmt::Debug for MockBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockBackend")
            .field("documents", &self.documents.len())
            .field("unavailable", &self.unavailable)
            .finish()
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockBackend {
    /// Backend with no documents.
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend holding `documents`.
    pub fn with_documents(documents: Vec<MockDocument>) -> Self {
        Self {
            documents,
            ..Self::default()
        }
    }

    /// Backend that fails every call as unreachable.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Queue a canned response.
    pub fn push_response(self, response: RawResponse) -> Self {
        lock(&self.replies).push_back(MockReply::Response(response));
        self
    }

    /// Queue a canned response parsed from JSON.
    pub fn push_json(self, response: Value) -> Result<Self> {
        Ok(self.push_response(RawResponse::from_json(response)?))
    }

    /// Queue a query failure.
    pub fn push_error(self, kind: impl Into<String>, reason: impl Into<String>) -> Self {
        lock(&self.replies).push_back(MockReply::QueryError {
            kind: kind.into(),
            reason: reason.into(),
        });
        self
    }

    /// Requests executed so far, in order.
    pub fn requests(&self) -> Vec<SearchRequest> {
        lock(&self.requests).clone()
    }

    /// The most recent request.
    pub fn last_request(&self) -> Option<SearchRequest> {
        lock(&self.requests).last().cloned()
    }

    /// Number of `msearch` batches received.
    pub fn batch_count(&self) -> usize {
        *lock(&self.batches)
    }

    fn answer(&self, request: &SearchRequest) -> Result<RawResponse> {
        lock(&self.requests).push(request.clone());

        match lock(&self.replies).pop_front() {
            Some(MockReply::Response(response)) => Ok(response),
            Some(MockReply::QueryError { kind, reason }) => Err(Error::backend_query(kind, reason)),
            None => RawResponse::from_json(self.evaluate(&request.to_json())),
        }
    }

    fn evaluate(&self, body: &Value) -> Value {
        let query = body.get("query").unwrap_or(&Value::Null);
        let mut scored: Vec<(&MockDocument, f64)> = self
            .documents
            .iter()
            .filter_map(|doc| score(query, doc).map(|s| (doc, s)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        let from = body.get("from").and_then(Value::as_u64).unwrap_or(0) as usize;
        let size = body.get("size").and_then(Value::as_u64).unwrap_or(10) as usize;
        let hits: Vec<Value> = scored
            .iter()
            .skip(from)
            .take(size)
            .map(|(doc, s)| {
                json!({
                    "_id": doc.id,
                    "_type": doc.doc_type,
                    "_score": s,
                    "_source": doc.source,
                })
            })
            .collect();

        let mut response = json!({
            "took": 1,
            "hits": {"total": scored.len(), "hits": hits},
        });
        if let Some(aggs) = body.get("aggs").and_then(Value::as_object) {
            let docs: Vec<&MockDocument> = scored.iter().map(|(d, _)| *d).collect();
            response["aggregations"] = type_aggregations(aggs, &docs);
        }
        response
    }
}

#[async_trait]
impl SearchBackend for MockBackend {
    async fn execute(&self, request: &SearchRequest) -> Result<RawResponse> {
        if self.unavailable {
            return Err(Error::backend_unavailable("mock backend is unavailable"));
        }
        self.answer(request)
    }

    async fn msearch(&self, requests: &[SearchRequest]) -> Result<Vec<Result<RawResponse>>> {
        if self.unavailable {
            return Err(Error::backend_unavailable("mock backend is unavailable"));
        }
        *lock(&self.batches) += 1;
        Ok(requests.iter().map(|r| self.answer(r)).collect())
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn is_ready(&self) -> bool {
        !self.unavailable
    }
}

// ============================================================================
// Query evaluation
// ============================================================================

fn single_entry(v: &Value) -> Option<(&String, &Value)> {
    v.as_object().and_then(|m| m.iter().next())
}

fn boost_of(v: &Value) -> f64 {
    v.get("boost").and_then(Value::as_f64).unwrap_or(1.0)
}

fn score(query: &Value, doc: &MockDocument) -> Option<f64> {
    let (kind, body) = single_entry(query)?;
    match kind.as_str() {
        "match_all" => Some(1.0),
        "match" => {
            let (field, params) = single_entry(body)?;
            let text = params.get("query").and_then(Value::as_str)?;
            let s = match_score(doc, field, text)?;
            let require_all = params.get("operator").and_then(Value::as_str) == Some("and");
            (!require_all || s >= 1.0).then(|| s * boost_of(params))
        }
        "multi_match" => {
            let text = body.get("query").and_then(Value::as_str)?;
            body.get("fields")?
                .as_array()?
                .iter()
                .filter_map(Value::as_str)
                .filter_map(|spec| {
                    let (field, field_boost) = match spec.split_once('^') {
                        Some((f, b)) => (f, b.parse::<f64>().unwrap_or(1.0)),
                        None => (spec, 1.0),
                    };
                    match_score(doc, field, text).map(|s| s * field_boost)
                })
                .max_by(f64::total_cmp)
                .map(|s| s * boost_of(body))
        }
        "term" => {
            let (field, params) = single_entry(body)?;
            let (value, boost) = match params.get("value") {
                Some(v) => (v, boost_of(params)),
                None => (params, 1.0),
            };
            doc.value_matches(field, value).then_some(boost)
        }
        "terms" => {
            let (field, values) = body.as_object()?.iter().find(|(k, _)| *k != "boost")?;
            values
                .as_array()?
                .iter()
                .any(|v| doc.value_matches(field, v))
                .then(|| boost_of(body))
        }
        "bool" => bool_score(body, doc),
        "dis_max" => {
            let tie = body.get("tie_breaker").and_then(Value::as_f64).unwrap_or(0.0);
            let scores: Vec<f64> = body
                .get("queries")?
                .as_array()?
                .iter()
                .filter_map(|q| score(q, doc))
                .collect();
            let max = scores.iter().copied().max_by(f64::total_cmp)?;
            let sum: f64 = scores.iter().sum();
            Some(max + tie * (sum - max))
        }
        "function_score" | "script_score" => score(body.get("query")?, doc),
        _ => None,
    }
}

fn clauses<'a>(body: &'a Value, key: &str) -> &'a [Value] {
    body.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn bool_score(body: &Value, doc: &MockDocument) -> Option<f64> {
    if clauses(body, "must_not").iter().any(|q| score(q, doc).is_some()) {
        return None;
    }
    if !clauses(body, "filter").iter().all(|q| score(q, doc).is_some()) {
        return None;
    }

    let mut total = 0.0;
    for q in clauses(body, "must") {
        total += score(q, doc)?;
    }

    let should: Vec<f64> = clauses(body, "should")
        .iter()
        .filter_map(|q| score(q, doc))
        .collect();
    let scoring_only = clauses(body, "must").is_empty() && clauses(body, "filter").is_empty();
    if scoring_only && !clauses(body, "should").is_empty() && should.is_empty() {
        return None;
    }
    total += should.iter().sum::<f64>();

    Some(total * boost_of(body))
}

fn match_score(doc: &MockDocument, field: &str, query: &str) -> Option<f64> {
    let text = doc.text(field);
    let haystack: Vec<&str> = text.split_whitespace().collect();
    let tokens: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
    if tokens.is_empty() {
        return None;
    }
    let matched = tokens
        .iter()
        .filter(|t| haystack.contains(&t.as_str()))
        .count();
    (matched > 0).then(|| matched as f64 / tokens.len() as f64)
}

fn type_aggregations(aggs: &Map<String, Value>, docs: &[&MockDocument]) -> Value {
    let mut out = Map::new();
    for (name, agg) in aggs {
        let field = agg.pointer("/terms/field").and_then(Value::as_str);
        if field != Some("_type") {
            continue;
        }
        let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
        for doc in docs {
            *counts.entry(doc.doc_type.as_str()).or_default() += 1;
        }
        let buckets: Vec<Value> = counts
            .into_iter()
            .map(|(key, doc_count)| json!({"key": key, "doc_count": doc_count}))
            .collect();
        out.insert(name.clone(), json!({"buckets": buckets}));
    }
    Value::Object(out)
}

// ============================================================================
// Tests
// ============================================================================
