//! Backend query DSL.
//!
//! A query is an immutable tree of [`Query`] nodes. Trees are built bottom-up:
//! every builder method consumes its value and returns a new one, and
//! composition wraps an existing node inside a new node. Nothing is ever
//! mutated in place, so a partially built tree can be cloned and reused
//! freely across requests.
//!
//! Every node serializes to the backend's JSON query document:
//!
//! ```rust
//! use dpsearch_core::fields;
//! use dpsearch_query::dsl::{MatchQuery, Operator, Query};
//!
//! let q: Query = MatchQuery::new(&fields::KEYWORDS, "gdp")
//!     .operator(Operator::And)
//!     .into();
//! assert_eq!(
//!     q.to_json(),
//!     serde_json::json!({"match": {"description.keywords": {"query": "gdp", "operator": "and"}}})
//! );
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value, json};

use dpsearch_core::FieldRef;

// ============================================================================
// Enumerations
// ============================================================================

/// Boolean operator between match terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    /// Any term.
    Or,
    /// Every term.
    And,
}

/// Match query type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Analysed terms combined by the operator.
    Boolean,
    /// Terms as a phrase.
    Phrase,
}

/// Multi-match query type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiMatchType {
    /// Score of the best matching field.
    BestFields,
    /// Sum of field scores.
    MostFields,
    /// Fields treated as one combined field.
    CrossFields,
    /// Phrase match on each field.
    Phrase,
}

/// How a function score combines with the query score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoostMode {
    /// Function score only.
    Replace,
    /// Query score times function score.
    Multiply,
    /// Query score plus function score.
    Sum,
    /// Average of the two.
    Avg,
    /// Larger of the two.
    Max,
    /// Smaller of the two.
    Min,
}

impl BoostMode {
    /// Backend name.
    pub fn as_str(&self) -> &'static str {
        match self {
            BoostMode::Replace => "replace",
            BoostMode::Multiply => "multiply",
            BoostMode::Sum => "sum",
            BoostMode::Avg => "avg",
            BoostMode::Max => "max",
            BoostMode::Min => "min",
        }
    }
}

/// How the functions of one function score node combine with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreMode {
    /// Product.
    Multiply,
    /// Sum.
    Sum,
    /// Average.
    Avg,
    /// First function with a matching filter.
    First,
    /// Maximum.
    Max,
    /// Minimum.
    Min,
}

/// Decay curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecayKind {
    /// Exponential.
    Exp,
    /// Gaussian.
    Gauss,
    /// Linear.
    Linear,
}

impl DecayKind {
    /// Backend name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DecayKind::Exp => "exp",
            DecayKind::Gauss => "gauss",
            DecayKind::Linear => "linear",
        }
    }

    /// Parse a backend name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "exp" => Some(DecayKind::Exp),
            "gauss" => Some(DecayKind::Gauss),
            "linear" => Some(DecayKind::Linear),
            _ => None,
        }
    }
}

// ============================================================================
// Query
// ============================================================================

/// A node of a query tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Full-text match on one field.
    Match(MatchQuery),
    /// Full-text match across fields.
    MultiMatch(MultiMatchQuery),
    /// Exact value on one field.
    Term(TermQuery),
    /// Any of several exact values on one field.
    Terms(TermsQuery),
    /// Boolean combination.
    Bool(BoolQuery),
    /// Best-scoring sub-query.
    DisMax(DisMaxQuery),
    /// Query rescored by functions.
    FunctionScore(FunctionScoreQuery),
    /// Query rescored by a single script.
    ScriptScore(ScriptScoreQuery),
    /// Every document.
    MatchAll,
    /// A caller-supplied query document, passed through untouched.
    Raw(Value),
}

impl Query {
    /// The backend JSON document for this node.
    pub fn to_json(&self) -> Value {
        match self {
            Query::Match(q) => q.to_json(),
            Query::MultiMatch(q) => q.to_json(),
            Query::Term(q) => q.to_json(),
            Query::Terms(q) => q.to_json(),
            Query::Bool(q) => q.to_json(),
            Query::DisMax(q) => q.to_json(),
            Query::FunctionScore(q) => q.to_json(),
            Query::ScriptScore(q) => q.to_json(),
            Query::MatchAll => json!({"match_all": {}}),
            Query::Raw(v) => v.clone(),
        }
    }

    /// Wrap this query in a function score node.
    pub fn function_score(self, functions: Vec<ScoreFunction>) -> FunctionScoreQuery {
        FunctionScoreQuery::new(self, functions)
    }
}

impl Serialize for Query {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Insert `value` under `key` if present.
fn put<T: Serialize>(map: &mut Map<String, Value>, key: &str, value: Option<T>) {
    if let Some(v) = value {
        map.insert(key.to_string(), json!(v));
    }
}

fn queries_json(queries: &[Query]) -> Value {
    Value::Array(queries.iter().map(Query::to_json).collect())
}

// ============================================================================
// Match / MultiMatch
// ============================================================================

/// `match` query.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchQuery {
    field: FieldRef,
    query: String,
    boost: Option<f32>,
    operator: Option<Operator>,
    match_type: Option<MatchType>,
    minimum_should_match: Option<String>,
}

impl MatchQuery {
    /// Match `query` against `field`.
    pub fn new(field: impl Into<FieldRef>, query: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            query: query.into(),
            boost: None,
            operator: None,
            match_type: None,
            minimum_should_match: None,
        }
    }

    /// Boost.
    pub fn boost(mut self, boost: f32) -> Self {
        self.boost = Some(boost);
        self
    }

    /// Term operator.
    pub fn operator(mut self, operator: Operator) -> Self {
        self.operator = Some(operator);
        self
    }

    /// Match type.
    pub fn match_type(mut self, match_type: MatchType) -> Self {
        self.match_type = Some(match_type);
        self
    }

    /// Minimum should match expression (e.g. `"75%"` or `"3<80% 5<60%"`).
    pub fn minimum_should_match(mut self, msm: impl Into<String>) -> Self {
        self.minimum_should_match = Some(msm.into());
        self
    }

    /// Field matched against.
    pub fn field(&self) -> &FieldRef {
        &self.field
    }

    /// Boost, if set.
    pub fn boost_value(&self) -> Option<f32> {
        self.boost
    }

    fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("query".into(), json!(self.query));
        put(&mut body, "type", self.match_type);
        put(&mut body, "operator", self.operator);
        put(&mut body, "minimum_should_match", self.minimum_should_match.as_ref());
        put(&mut body, "boost", self.boost);

        let mut field = Map::new();
        field.insert(self.field.index_name().to_string(), Value::Object(body));
        json!({ "match": field })
    }
}

impl From<MatchQuery> for Query {
    fn from(q: MatchQuery) -> Self {
        Query::Match(q)
    }
}

/// `multi_match` query.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiMatchQuery {
    query: String,
    fields: Vec<String>,
    match_type: Option<MultiMatchType>,
    minimum_should_match: Option<String>,
    boost: Option<f32>,
}

impl MultiMatchQuery {
    /// Match `query` against `fields`. Field names may carry `^boost`.
    pub fn new<I, S>(fields: I, query: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            query: query.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            match_type: None,
            minimum_should_match: None,
            boost: None,
        }
    }

    /// Multi-match type.
    pub fn match_type(mut self, match_type: MultiMatchType) -> Self {
        self.match_type = Some(match_type);
        self
    }

    /// Minimum should match expression.
    pub fn minimum_should_match(mut self, msm: impl Into<String>) -> Self {
        self.minimum_should_match = Some(msm.into());
        self
    }

    /// Boost.
    pub fn boost(mut self, boost: f32) -> Self {
        self.boost = Some(boost);
        self
    }

    /// Fields matched against.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("query".into(), json!(self.query));
        body.insert("fields".into(), json!(self.fields));
        put(&mut body, "type", self.match_type);
        put(&mut body, "minimum_should_match", self.minimum_should_match.as_ref());
        put(&mut body, "boost", self.boost);
        json!({ "multi_match": body })
    }
}

impl From<MultiMatchQuery> for Query {
    fn from(q: MultiMatchQuery) -> Self {
        Query::MultiMatch(q)
    }
}

// ============================================================================
// Term / Terms
// ============================================================================

/// `term` query.
#[derive(Debug, Clone, PartialEq)]
pub struct TermQuery {
    field: FieldRef,
    value: Value,
}

impl TermQuery {
    /// Exact `value` on `field`.
    pub fn new(field: impl Into<FieldRef>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    fn to_json(&self) -> Value {
        let mut field = Map::new();
        field.insert(self.field.index_name().to_string(), self.value.clone());
        json!({ "term": field })
    }
}

impl From<TermQuery> for Query {
    fn from(q: TermQuery) -> Self {
        Query::Term(q)
    }
}

/// `terms` query.
#[derive(Debug, Clone, PartialEq)]
pub struct TermsQuery {
    field: FieldRef,
    values: Vec<Value>,
}

impl TermsQuery {
    /// Any of `values` on `field`.
    pub fn new<I, V>(field: impl Into<FieldRef>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Values matched.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    fn to_json(&self) -> Value {
        let mut field = Map::new();
        field.insert(
            self.field.index_name().to_string(),
            Value::Array(self.values.clone()),
        );
        json!({ "terms": field })
    }
}

impl From<TermsQuery> for Query {
    fn from(q: TermsQuery) -> Self {
        Query::Terms(q)
    }
}

// ============================================================================
// Bool / DisMax
// ============================================================================

/// `bool` query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    must: Vec<Query>,
    should: Vec<Query>,
    must_not: Vec<Query>,
    filter: Vec<Query>,
    minimum_should_match: Option<String>,
    boost: Option<f32>,
}

impl BoolQuery {
    /// Empty bool query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required clause.
    pub fn must(mut self, query: impl Into<Query>) -> Self {
        self.must.push(query.into());
        self
    }

    /// Add an optional clause.
    pub fn should(mut self, query: impl Into<Query>) -> Self {
        self.should.push(query.into());
        self
    }

    /// Add optional clauses.
    pub fn should_all<I: IntoIterator<Item = Query>>(mut self, queries: I) -> Self {
        self.should.extend(queries);
        self
    }

    /// Add an excluding clause.
    pub fn must_not(mut self, query: impl Into<Query>) -> Self {
        self.must_not.push(query.into());
        self
    }

    /// Add a non-scoring required clause.
    pub fn filter(mut self, query: impl Into<Query>) -> Self {
        self.filter.push(query.into());
        self
    }

    /// Minimum number of should clauses that must match.
    pub fn minimum_should_match(mut self, msm: impl Into<String>) -> Self {
        self.minimum_should_match = Some(msm.into());
        self
    }

    /// Boost.
    pub fn boost(mut self, boost: f32) -> Self {
        self.boost = Some(boost);
        self
    }

    /// Required clauses.
    pub fn must_clauses(&self) -> &[Query] {
        &self.must
    }

    /// Optional clauses.
    pub fn should_clauses(&self) -> &[Query] {
        &self.should
    }

    /// Excluding clauses.
    pub fn must_not_clauses(&self) -> &[Query] {
        &self.must_not
    }

    /// Filter clauses.
    pub fn filter_clauses(&self) -> &[Query] {
        &self.filter
    }

    fn to_json(&self) -> Value {
        let mut body = Map::new();
        for (key, clauses) in [
            ("must", &self.must),
            ("should", &self.should),
            ("must_not", &self.must_not),
            ("filter", &self.filter),
        ] {
            if !clauses.is_empty() {
                body.insert(key.into(), queries_json(clauses));
            }
        }
        put(&mut body, "minimum_should_match", self.minimum_should_match.as_ref());
        put(&mut body, "boost", self.boost);
        json!({ "bool": body })
    }
}

impl From<BoolQuery> for Query {
    fn from(q: BoolQuery) -> Self {
        Query::Bool(q)
    }
}

/// `dis_max` query: the score of the best matching sub-query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisMaxQuery {
    queries: Vec<Query>,
    tie_breaker: Option<f32>,
}

impl DisMaxQuery {
    /// Disjunction over `queries`.
    pub fn new<I: IntoIterator<Item = Query>>(queries: I) -> Self {
        Self {
            queries: queries.into_iter().collect(),
            tie_breaker: None,
        }
    }

    /// Weight of non-best matches.
    pub fn tie_breaker(mut self, tie_breaker: f32) -> Self {
        self.tie_breaker = Some(tie_breaker);
        self
    }

    /// Sub-queries.
    pub fn queries(&self) -> &[Query] {
        &self.queries
    }

    fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("queries".into(), queries_json(&self.queries));
        put(&mut body, "tie_breaker", self.tie_breaker);
        json!({ "dis_max": body })
    }
}

impl From<DisMaxQuery> for Query {
    fn from(q: DisMaxQuery) -> Self {
        Query::DisMax(q)
    }
}

// ============================================================================
// Scripts and score functions
// ============================================================================

/// A backend script with parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    source: String,
    lang: Option<String>,
    params: Map<String, Value>,
}

impl Script {
    /// Inline script source.
    pub fn inline(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            lang: None,
            params: Map::new(),
        }
    }

    /// Script language.
    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    /// Add a parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Script source.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Parameter value.
    pub fn get_param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("source".into(), json!(self.source));
        put(&mut body, "lang", self.lang.as_ref());
        if !self.params.is_empty() {
            body.insert("params".into(), Value::Object(self.params.clone()));
        }
        Value::Object(body)
    }
}

/// Origin of a date decay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecayOrigin {
    /// Evaluated by the backend at query time.
    Now,
    /// A fixed date.
    Date(NaiveDate),
}

impl DecayOrigin {
    fn to_json(self) -> Value {
        match self {
            DecayOrigin::Now => json!("now"),
            DecayOrigin::Date(date) => json!(date.format("%Y-%m-%d").to_string()),
        }
    }
}

/// Decay of the score with distance from an origin.
#[derive(Debug, Clone, PartialEq)]
pub struct DecayFunction {
    kind: DecayKind,
    field: FieldRef,
    origin: DecayOrigin,
    scale: String,
    offset: Option<String>,
    decay: Option<f32>,
}

impl DecayFunction {
    /// Decay on `field` reaching `decay` at `scale` from `origin`.
    pub fn new(
        kind: DecayKind,
        field: impl Into<FieldRef>,
        origin: DecayOrigin,
        scale: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            field: field.into(),
            origin,
            scale: scale.into(),
            offset: None,
            decay: None,
        }
    }

    /// Distance before decay starts.
    pub fn offset(mut self, offset: impl Into<String>) -> Self {
        self.offset = Some(offset.into());
        self
    }

    /// Score at `scale`.
    pub fn decay(mut self, decay: f32) -> Self {
        self.decay = Some(decay);
        self
    }

    /// Curve.
    pub fn kind(&self) -> DecayKind {
        self.kind
    }

    fn body(&self) -> Value {
        let mut params = Map::new();
        params.insert("origin".into(), self.origin.to_json());
        params.insert("scale".into(), json!(self.scale));
        put(&mut params, "offset", self.offset.as_ref());
        put(&mut params, "decay", self.decay);

        let mut field = Map::new();
        field.insert(self.field.index_name().to_string(), Value::Object(params));
        Value::Object(field)
    }
}

/// What a score function computes.
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionKind {
    /// Script result.
    ScriptScore(Script),
    /// Distance decay.
    Decay(DecayFunction),
    /// Constant weight (usually with a filter).
    Weight,
}

/// One entry of a function score node.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreFunction {
    kind: FunctionKind,
    filter: Option<Query>,
    weight: Option<f32>,
}

impl ScoreFunction {
    /// Script score function.
    pub fn script_score(script: Script) -> Self {
        Self {
            kind: FunctionKind::ScriptScore(script),
            filter: None,
            weight: None,
        }
    }

    /// Decay function.
    pub fn decay(decay: DecayFunction) -> Self {
        Self {
            kind: FunctionKind::Decay(decay),
            filter: None,
            weight: None,
        }
    }

    /// Constant weight for documents matching `filter`.
    pub fn filtered_weight(filter: impl Into<Query>, weight: f32) -> Self {
        Self {
            kind: FunctionKind::Weight,
            filter: Some(filter.into()),
            weight: Some(weight),
        }
    }

    /// Restrict to documents matching `filter`.
    pub fn with_filter(mut self, filter: impl Into<Query>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Multiply the function's result by `weight`.
    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = Some(weight);
        self
    }

    /// What the function computes.
    pub fn kind(&self) -> &FunctionKind {
        &self.kind
    }

    /// Weight, if set.
    pub fn weight(&self) -> Option<f32> {
        self.weight
    }

    /// The backend JSON document for this function.
    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        match &self.kind {
            FunctionKind::ScriptScore(script) => {
                body.insert("script_score".into(), json!({ "script": script.to_json() }));
            }
            FunctionKind::Decay(decay) => {
                body.insert(decay.kind.as_str().into(), decay.body());
            }
            FunctionKind::Weight => {}
        }
        if let Some(filter) = &self.filter {
            body.insert("filter".into(), filter.to_json());
        }
        put(&mut body, "weight", self.weight);
        Value::Object(body)
    }
}

impl Serialize for ScoreFunction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

// ============================================================================
// FunctionScore / ScriptScore
// ============================================================================

/// `function_score` query.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionScoreQuery {
    query: Box<Query>,
    functions: Vec<ScoreFunction>,
    boost_mode: Option<BoostMode>,
    score_mode: Option<ScoreMode>,
    min_score: Option<f32>,
}

impl FunctionScoreQuery {
    /// Rescore `query` with `functions`.
    pub fn new(query: impl Into<Query>, functions: Vec<ScoreFunction>) -> Self {
        Self {
            query: Box::new(query.into()),
            functions,
            boost_mode: None,
            score_mode: None,
            min_score: None,
        }
    }

    /// How the function score combines with the query score.
    pub fn boost_mode(mut self, boost_mode: BoostMode) -> Self {
        self.boost_mode = Some(boost_mode);
        self
    }

    /// How the functions combine with each other.
    pub fn score_mode(mut self, score_mode: ScoreMode) -> Self {
        self.score_mode = Some(score_mode);
        self
    }

    /// Drop documents scoring below `min_score`.
    pub fn min_score(mut self, min_score: f32) -> Self {
        self.min_score = Some(min_score);
        self
    }

    /// Wrapped query.
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Functions.
    pub fn functions(&self) -> &[ScoreFunction] {
        &self.functions
    }

    /// Boost mode, if set.
    pub fn boost_mode_value(&self) -> Option<BoostMode> {
        self.boost_mode
    }

    /// The `function_score` body, without the outer key.
    pub fn body(&self) -> Value {
        let mut body = Map::new();
        body.insert("query".into(), self.query.to_json());
        body.insert(
            "functions".into(),
            Value::Array(self.functions.iter().map(ScoreFunction::to_json).collect()),
        );
        put(&mut body, "boost_mode", self.boost_mode);
        put(&mut body, "score_mode", self.score_mode);
        put(&mut body, "min_score", self.min_score);
        Value::Object(body)
    }

    fn to_json(&self) -> Value {
        json!({ "function_score": self.body() })
    }
}

impl From<FunctionScoreQuery> for Query {
    fn from(q: FunctionScoreQuery) -> Self {
        Query::FunctionScore(q)
    }
}

/// `script_score` query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptScoreQuery {
    query: Box<Query>,
    script: Script,
}

impl ScriptScoreQuery {
    /// Score documents matching `query` with `script`.
    pub fn new(query: impl Into<Query>, script: Script) -> Self {
        Self {
            query: Box::new(query.into()),
            script,
        }
    }

    fn to_json(&self) -> Value {
        json!({
            "script_score": {
                "query": self.query.to_json(),
                "script": self.script.to_json(),
            }
        })
    }
}

impl From<ScriptScoreQuery> for Query {
    fn from(q: ScriptScoreQuery) -> Self {
        Query::ScriptScore(q)
    }
}

// ============================================================================
// Tests
// ============================================================================
