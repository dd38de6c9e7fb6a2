//! Best-strategy scoring: a strong single match beats many weak ones.

use dpsearch_client::{MockBackend, MockDocument, SearchBackend, SearchParams};
use dpsearch_core::{ContentType, Index};
use dpsearch_query::{BoolQuery, DisMaxQuery, MatchQuery, Query, SearchRequest};
use serde_json::json;

use crate::common::TestHarness;

fn weak_and_strong() -> Vec<MockDocument> {
    vec![
        MockDocument::new(
            "weak",
            ContentType::Article,
            json!({"summary": "gdp", "keywords": "gdp", "edition": "gdp"}),
        ),
        MockDocument::new("strong", ContentType::Article, json!({"title": "gdp"})),
    ]
}

fn clauses() -> Vec<Query> {
    vec![
        MatchQuery::new("title", "gdp").boost(5.0).into(),
        MatchQuery::new("summary", "gdp").boost(2.0).into(),
        MatchQuery::new("keywords", "gdp").boost(2.0).into(),
        MatchQuery::new("edition", "gdp").boost(2.0).into(),
    ]
}

#[tokio::test]
async fn test_dis_max_takes_best_clause() {
    let backend = MockBackend::with_documents(weak_and_strong());
    let request = SearchRequest::new(Index::Ons, DisMaxQuery::new(clauses()))
        .paginate(dpsearch_core::PageRequest::SINGLE);

    let response = backend.execute(&request).await.unwrap();
    assert_eq!(response.hits.hits[0].id.as_deref(), Some("strong"));
    assert_eq!(response.hits.hits[0].score, Some(5.0));
}

#[tokio::test]
async fn test_bool_should_would_sum_weak_clauses() {
    let backend = MockBackend::with_documents(weak_and_strong());
    let request = SearchRequest::new(Index::Ons, BoolQuery::new().should_all(clauses()))
        .paginate(dpsearch_core::PageRequest::SINGLE);

    let response = backend.execute(&request).await.unwrap();
    assert_eq!(response.hits.hits[0].id.as_deref(), Some("weak"));
    assert_eq!(response.hits.hits[0].score, Some(6.0));
}

#[tokio::test]
async fn test_content_query_ranks_search_boost_above_text_matches() {
    let harness = TestHarness::with_backend(MockBackend::with_documents(vec![
        MockDocument::new(
            "text",
            ContentType::Bulletin,
            json!({"description": {
                "title": "Labour market overview",
                "summary": "labour market statistics",
                "keywords": ["labour", "market"]
            }}),
        ),
        MockDocument::new(
            "curated",
            ContentType::Bulletin,
            json!({"description": {"title": "Employment"}, "searchBoost": ["labour market"]}),
        ),
    ]));

    let result = harness
        .engine
        .content_query(&SearchParams::new("labour market"))
        .await
        .unwrap();
    assert_eq!(result.number_of_results, 2);
    assert_eq!(result.results[0]["searchBoost"], json!(["labour market"]));
}
