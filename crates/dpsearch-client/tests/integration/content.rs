//! Content, featured, departments and proxy queries.

use dpsearch_client::{MockBackend, MockDocument, SearchParams};
use dpsearch_core::{ContentType, Error, PageRequest, SortField};
use serde_json::json;

use crate::common::TestHarness;

#[tokio::test]
async fn test_content_query_filters_and_counts() {
    let harness = TestHarness::new();
    let params = SearchParams::new("inflation").with_type_filters(["bulletin", "article"]);

    let result = harness
        .engine
        .content_query(&params)
        .await
        .expect("content query should succeed");

    assert_eq!(result.number_of_results, 2);
    let types: Vec<_> = result.results.iter().map(|h| h["_type"].clone()).collect();
    assert!(types.contains(&json!("bulletin")));
    assert!(types.contains(&json!("article")));
    assert_eq!(result.paginator.current_page(), 1);
}

#[tokio::test]
async fn test_content_query_logs_one_request_with_highlighting() {
    let harness = TestHarness::new();
    harness
        .engine
        .content_query(&SearchParams::new("inflation"))
        .await
        .unwrap();

    let requests = harness.backend.requests();
    assert_eq!(requests.len(), 1);
    let body = requests[0].to_json();
    assert_eq!(body["highlight"]["pre_tags"], json!(["<strong>"]));
    assert_eq!(body["from"], 0);
    assert_eq!(body["size"], 10);
}

#[tokio::test]
async fn test_content_query_applies_highlights_from_backend() {
    let backend = MockBackend::new()
        .push_json(json!({
            "took": 5,
            "hits": {"total": 1, "hits": [{
                "_type": "bulletin",
                "_source": {"description": {"title": "Randy Marsh"}},
                "highlight": {"description.title": ["<strong>Randy</strong> Marsh"]}
            }]}
        }))
        .unwrap();
    let harness = TestHarness::with_backend(backend);

    let result = harness
        .engine
        .content_query(&SearchParams::new("randy"))
        .await
        .unwrap();
    assert_eq!(
        result.results[0]["description"]["title"],
        "<strong>Randy</strong> Marsh"
    );
    assert_eq!(result.took, 5);
}

#[tokio::test]
async fn test_sort_is_passed_through_not_applied() {
    let harness = TestHarness::new();
    let params = SearchParams::new("inflation").with_sort(SortField::TitleAsc);
    let result = harness.engine.content_query(&params).await.unwrap();

    assert_eq!(result.sort_by, SortField::TitleAsc);
    let body = harness.backend.last_request().unwrap().to_json();
    assert_eq!(body["sort"][0]["description.title.title_raw"]["order"], "asc");
}

#[tokio::test]
async fn test_client_errors_never_reach_backend() {
    let harness = TestHarness::new();

    let err = harness
        .engine
        .content_query(&SearchParams::new("cpi").with_type_filters(["bogus_type"]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnknownTypeFilter { ref name } if name == "bogus_type"));

    let err = harness
        .engine
        .content_query(&SearchParams::new("cpi").with_page(0))
        .await
        .unwrap_err();
    assert!(err.is_client_error());

    let err = harness
        .engine
        .content_query(&SearchParams::new("gdp").with_page_size(0))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidPageSize { size: 0 }));

    let err = harness
        .engine
        .proxy_query(json!({"match_all": {}}), &SearchParams::new("").with_page_size(0))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidPageSize { size: 0 }));

    assert!(harness.backend.requests().is_empty());
}

#[tokio::test]
async fn test_backend_unavailable_is_server_error() {
    let harness = TestHarness::with_backend(MockBackend::unavailable());
    let err = harness
        .engine
        .content_query(&SearchParams::new("cpi"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::BackendUnavailable { .. }));
    assert_eq!(err.status_code(), 500);
}

#[tokio::test]
async fn test_featured_result_is_page_one_size_one() {
    let harness = TestHarness::new();
    let result = harness
        .engine
        .featured_result_query("inflation")
        .await
        .unwrap();

    assert_eq!(result.results.len(), 1);
    assert_eq!(result.results[0]["_type"], "product_page");
    assert_eq!(result.paginator.current_page(), 1);
    assert_eq!(result.paginator.page_size(), 1);

    let request = harness.backend.last_request().unwrap();
    assert_eq!(request.page(), PageRequest::SINGLE);
}

#[tokio::test]
async fn test_type_counts() {
    let harness = TestHarness::new();
    let counts = harness.engine.type_counts_query("inflation").await.unwrap();

    assert_eq!(counts.doc_counts.get("bulletin"), Some(&1));
    assert_eq!(counts.doc_counts.get("article"), Some(&1));
    assert_eq!(counts.doc_counts.get("timeseries"), Some(&1));
    assert_eq!(counts.doc_counts.get("product_page"), Some(&1));
    assert!(!counts.doc_counts.contains_key("dataset"));

    let body = harness.backend.last_request().unwrap().to_json();
    assert_eq!(body["size"], 0);
}

#[tokio::test]
async fn test_departments_query() {
    let harness = TestHarness::with_backend(MockBackend::with_documents(vec![
        MockDocument::new(
            "hmrc",
            ContentType::StaticPage,
            json!({"title": "HM Revenue & Customs", "terms": ["tax", "vat"]}),
        )
        .with_type("departments"),
    ]));

    let result = harness
        .engine
        .departments_query("tax", 1, None)
        .await
        .unwrap();
    assert_eq!(result.number_of_results, 1);
    assert_eq!(result.results[0]["_type"], "departments");
}

#[tokio::test]
async fn test_proxy_query() {
    let harness = TestHarness::new();
    let params = SearchParams::new("").with_type_filters(["timeseries"]);
    let result = harness
        .engine
        .proxy_query(json!({"match": {"description.keywords": {"query": "inflation"}}}), &params)
        .await
        .unwrap();

    assert_eq!(result.number_of_results, 1);
    assert_eq!(result.results[0]["_type"], "timeseries");
}

#[tokio::test]
async fn test_proxy_query_rejects_large_pages() {
    let harness = TestHarness::new();
    let err = harness
        .engine
        .proxy_query(json!({"match_all": {}}), &SearchParams::new("").with_page_size(5000))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::RequestSizeExceeded { size: 5000, .. }));
}
