//! Search requests.
//!
//! A [`SearchRequest`] pairs a query tree with everything else the backend
//! needs: the index, pagination, sort, type filter, highlighting,
//! aggregations, search type and rescoring. Like query nodes, requests are
//! immutable values; every builder method consumes the request and returns
//! a new one.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value, json};
use uuid::Uuid;

use dpsearch_core::{ContentType, Field, Index, PageRequest, SortField, SortOrder, SortTarget};

use crate::builders::filter_by_type;
use crate::dsl::Query;

// ============================================================================
// SearchType
// ============================================================================

/// How the backend distributes term statistics across shards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    /// Per-shard statistics.
    #[default]
    QueryThenFetch,
    /// Global statistics gathered before scoring.
    DfsQueryThenFetch,
}

impl SearchType {
    /// Backend name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::QueryThenFetch => "query_then_fetch",
            SearchType::DfsQueryThenFetch => "dfs_query_then_fetch",
        }
    }
}

// ============================================================================
// Highlight
// ============================================================================

/// Highlighting of matched fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    tag: String,
    fields: Vec<String>,
}

impl Highlight {
    /// Highlight `fields` with `<tag>…</tag>`, returning whole field values.
    pub fn new<I, S>(tag: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tag: tag.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Highlight every registry field flagged for highlighting.
    pub fn registry(tag: impl Into<String>) -> Self {
        Self::new(tag, dpsearch_core::fields::highlight_fields().map(|f: &Field| f.name))
    }

    /// Tag name without angle brackets.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Highlighted index field names.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Opening tag.
    pub fn pre_tag(&self) -> String {
        format!("<{}>", self.tag)
    }

    /// Closing tag.
    pub fn post_tag(&self) -> String {
        format!("</{}>", self.tag)
    }

    fn to_json(&self) -> Value {
        let fields: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.clone(), json!({"number_of_fragments": 0})))
            .collect();
        json!({
            "pre_tags": [self.pre_tag()],
            "post_tags": [self.post_tag()],
            "fields": fields,
        })
    }
}

// ============================================================================
// Rescore
// ============================================================================

/// How a rescore combines the original and rescore scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RescoreMode {
    /// Sum.
    Total,
    /// Product.
    Multiply,
    /// Average.
    Avg,
    /// Maximum.
    Max,
    /// Minimum.
    Min,
}

/// Second-pass rescoring of the top hits.
#[derive(Debug, Clone, PartialEq)]
pub struct Rescore {
    /// Number of top hits rescored.
    pub window_size: u32,
    /// Rescore query.
    pub query: Query,
    /// Weight of the original score.
    pub query_weight: f32,
    /// Weight of the rescore score.
    pub rescore_query_weight: f32,
    /// How the two scores combine.
    pub score_mode: RescoreMode,
}

impl Rescore {
    /// The backend JSON document.
    pub fn to_json(&self) -> Value {
        json!({
            "window_size": self.window_size,
            "query": {
                "rescore_query": self.query.to_json(),
                "query_weight": self.query_weight,
                "rescore_query_weight": self.rescore_query_weight,
                "score_mode": self.score_mode,
            }
        })
    }
}

// ============================================================================
// SearchRequest
// ============================================================================

/// A complete request for one search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    id: Uuid,
    index: Index,
    query: Query,
    page: PageRequest,
    sort: SortField,
    type_filter: Vec<ContentType>,
    highlight: Option<Highlight>,
    aggregations: BTreeMap<String, Value>,
    search_type: SearchType,
    rescore: Option<Rescore>,
}

impl SearchRequest {
    /// Request for `query` against `index`: a single hit, relevance order,
    /// no filter.
    pub fn new(index: Index, query: impl Into<Query>) -> Self {
        Self {
            id: Uuid::new_v4(),
            index,
            query: query.into(),
            page: PageRequest::SINGLE,
            sort: SortField::Relevance,
            type_filter: Vec::new(),
            highlight: None,
            aggregations: BTreeMap::new(),
            search_type: SearchType::default(),
            rescore: None,
        }
    }

    /// Page to fetch.
    pub fn paginate(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }

    /// Sort order.
    pub fn sort_by(mut self, sort: SortField) -> Self {
        self.sort = sort;
        self
    }

    /// Restrict hits to these content types.
    pub fn type_filter(mut self, types: impl Into<Vec<ContentType>>) -> Self {
        self.type_filter = types.into();
        self
    }

    /// Highlight matched fragments.
    pub fn highlight(mut self, highlight: Highlight) -> Self {
        self.highlight = Some(highlight);
        self
    }

    /// Add a named aggregation.
    pub fn aggregation(mut self, name: impl Into<String>, aggregation: Value) -> Self {
        self.aggregations.insert(name.into(), aggregation);
        self
    }

    /// Search type.
    pub fn search_type(mut self, search_type: SearchType) -> Self {
        self.search_type = search_type;
        self
    }

    /// Rescore the top hits.
    pub fn rescore(mut self, rescore: Rescore) -> Self {
        self.rescore = Some(rescore);
        self
    }

    /// Per-request identifier used in logs.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Target index.
    pub fn index(&self) -> Index {
        self.index
    }

    /// Query tree, before type filtering.
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Page being fetched.
    pub fn page(&self) -> PageRequest {
        self.page
    }

    /// Sort order.
    pub fn sort(&self) -> SortField {
        self.sort
    }

    /// Content types hits are restricted to. Empty means no restriction.
    pub fn type_filters(&self) -> &[ContentType] {
        &self.type_filter
    }

    /// Highlighting, if requested.
    pub fn highlighting(&self) -> Option<&Highlight> {
        self.highlight.as_ref()
    }

    /// Aggregations by name.
    pub fn aggregations(&self) -> &BTreeMap<String, Value> {
        &self.aggregations
    }

    /// Search type.
    pub fn search_type_value(&self) -> SearchType {
        self.search_type
    }

    /// Rescore section, if any.
    pub fn rescore_section(&self) -> Option<&Rescore> {
        self.rescore.as_ref()
    }

    /// Query with the type filter applied.
    pub fn effective_query(&self) -> Query {
        if self.type_filter.is_empty() {
            self.query.clone()
        } else {
            filter_by_type(self.query.clone(), &self.type_filter)
        }
    }

    /// The backend request body.
    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("query".into(), self.effective_query().to_json());
        body.insert("from".into(), json!(self.page.from()));
        body.insert("size".into(), json!(self.page.size()));

        let sort = sort_json(self.sort);
        if !sort.is_empty() {
            body.insert("sort".into(), Value::Array(sort));
        }
        if let Some(highlight) = &self.highlight {
            body.insert("highlight".into(), highlight.to_json());
        }
        if !self.aggregations.is_empty() {
            body.insert("aggs".into(), json!(self.aggregations));
        }
        if let Some(rescore) = &self.rescore {
            body.insert("rescore".into(), rescore.to_json());
        }
        Value::Object(body)
    }
}

impl Serialize for SearchRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

fn sort_json(sort: SortField) -> Vec<Value> {
    sort.clauses()
        .into_iter()
        .map(|(target, order): (SortTarget, SortOrder)| {
            let mut clause = Map::new();
            clause.insert(target.key().to_string(), json!({ "order": order }));
            Value::Object(clause)
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use dpsearch_core::PaginationPolicy;

    fn request() -> SearchRequest {
        SearchRequest::new(Index::Ons, Query::MatchAll)
    }

    #[test]
    fn test_defaults() {
        let v = request().to_json();
        assert_eq!(v["query"], json!({"match_all": {}}));
        assert_eq!(v["from"], 0);
        assert_eq!(v["size"], 1);
        assert!(v.get("sort").is_none());
        assert!(v.get("highlight").is_none());
        assert!(v.get("aggs").is_none());
    }

    #[test]
    fn test_pagination() {
        let page = PaginationPolicy::default().paginate(3, 10).unwrap();
        let v = request().paginate(page).to_json();
        assert_eq!(v["from"], 20);
        assert_eq!(v["size"], 10);
    }

    #[test]
    fn test_sort_clauses() {
        let v = request().sort_by(SortField::ReleaseDateDesc).to_json();
        assert_eq!(v["sort"][0]["description.releaseDate"]["order"], "desc");
    }

    #[test]
    fn test_type_filter_wraps_query() {
        let req = request().type_filter(vec![ContentType::Bulletin, ContentType::Article]);
        let v = req.to_json();
        assert_eq!(v["query"]["bool"]["must"][0], json!({"match_all": {}}));
        assert_eq!(
            v["query"]["bool"]["filter"][0],
            json!({"terms": {"_type": ["bulletin", "article"]}})
        );
        assert_eq!(req.query(), &Query::MatchAll);
    }

    #[test]
    fn test_highlight() {
        let v = request().highlight(Highlight::new("strong", ["description.title"])).to_json();
        assert_eq!(v["highlight"]["pre_tags"], json!(["<strong>"]));
        assert_eq!(v["highlight"]["post_tags"], json!(["</strong>"]));
        assert_eq!(
            v["highlight"]["fields"]["description.title"]["number_of_fragments"],
            0
        );
    }

    #[test]
    fn test_registry_highlight_fields() {
        let h = Highlight::registry("em");
        assert!(h.fields().iter().any(|f| f == "description.summary"));
        assert_eq!(h.pre_tag(), "<em>");
    }

    #[test]
    fn test_aggregations() {
        let v = request()
            .aggregation("docCounts", json!({"terms": {"field": "_type"}}))
            .to_json();
        assert_eq!(v["aggs"]["docCounts"]["terms"]["field"], "_type");
    }

    #[test]
    fn test_builder_returns_new_value() {
        let base = request();
        let sorted = base.clone().sort_by(SortField::TitleAsc);
        assert_eq!(base.sort(), SortField::Relevance);
        assert_eq!(sorted.sort(), SortField::TitleAsc);
        assert_eq!(base.id(), sorted.id());
    }

    #[test]
    fn test_search_type() {
        let req = request().search_type(SearchType::DfsQueryThenFetch);
        assert_eq!(req.search_type_value().as_str(), "dfs_query_then_fetch");
    }

    #[test]
    fn test_serialize_matches_to_json() {
        let req = request().sort_by(SortField::TitleDesc);
        assert_eq!(serde_json::to_value(&req).unwrap(), req.to_json());
    }
}
