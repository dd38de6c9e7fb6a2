//! Combined search in a single batch.

use dpsearch_client::{MockBackend, SearchParams};
use dpsearch_core::{Error, PageRequest};
use serde_json::json;

use crate::common::{TestHarness, corpus};

#[tokio::test]
async fn test_search_all_is_one_batch() {
    let harness = TestHarness::new();
    let params = SearchParams::new("inflation").with_page_size(2);

    let result = harness
        .engine
        .search_all(&params)
        .await
        .expect("combined search should succeed");

    assert_eq!(harness.backend.batch_count(), 1);
    assert_eq!(result.content.results.len(), 2);
    // The featured-only product page is outside the default content filter.
    assert_eq!(result.content.number_of_results, 3);
    assert_eq!(result.counts.doc_counts.values().sum::<u64>(), 4);
    assert_eq!(result.featured_result.results.len(), 1);
}

#[tokio::test]
async fn test_search_all_featured_ignores_caller_pagination() {
    let harness = TestHarness::new();
    let params = SearchParams::new("inflation").with_page(2).with_page_size(2);
    let result = harness.engine.search_all(&params).await.unwrap();

    let requests = harness.backend.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].page().from(), 2);
    assert_eq!(requests[1].page(), PageRequest::EMPTY);
    assert_eq!(requests[2].page(), PageRequest::SINGLE);
    assert_eq!(result.featured_result.paginator.current_page(), 1);
    assert_eq!(result.content.paginator.current_page(), 2);
}

#[tokio::test]
async fn test_search_all_fails_on_item_error() {
    let backend = MockBackend::with_documents(corpus())
        .push_json(json!({"took": 1, "hits": {"total": 0, "hits": []}}))
        .unwrap()
        .push_error("search_phase_execution_exception", "all shards failed");
    let harness = TestHarness::with_backend(backend);

    let err = harness
        .engine
        .search_all(&SearchParams::new("inflation"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::BackendQuery { ref kind, ref reason }
            if kind == "search_phase_execution_exception" && reason == "all shards failed"
    ));
}

#[tokio::test]
async fn test_search_all_unavailable() {
    let harness = TestHarness::with_backend(MockBackend::unavailable());
    let err = harness
        .engine
        .search_all(&SearchParams::new("inflation"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::BackendUnavailable { .. }));
}
