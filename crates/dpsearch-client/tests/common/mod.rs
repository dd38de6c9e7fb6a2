//! Common test utilities for dpsearch client integration tests.

use std::sync::Arc;

use dpsearch_client::{MockBackend, MockDocument, SearchEngine};
use dpsearch_core::{ContentType, SearchConfig};
use serde_json::json;

/// Test harness holding an engine and the backend it talks to.
pub struct TestHarness {
    /// Mock backend, for inspecting recorded requests.
    pub backend: Arc<MockBackend>,
    /// Engine under test.
    pub engine: SearchEngine,
}

impl TestHarness {
    /// Harness over the standard corpus.
    pub fn new() -> Self {
        Self::with_backend(MockBackend::with_documents(corpus()))
    }

    /// Harness over a custom backend.
    pub fn with_backend(backend: MockBackend) -> Self {
        let backend = Arc::new(backend);
        let engine = SearchEngine::new(backend.clone(), SearchConfig::default());
        Self { backend, engine }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// A small published-content corpus.
pub fn corpus() -> Vec<MockDocument> {
    vec![
        MockDocument::new(
            "cpi-bulletin",
            ContentType::Bulletin,
            json!({"description": {
                "title": "Consumer price inflation",
                "summary": "Price indices, percentage changes and weights",
                "keywords": ["inflation", "cpi", "prices"]
            }}),
        ),
        MockDocument::new(
            "inflation-article",
            ContentType::Article,
            json!({"description": {
                "title": "Understanding inflation",
                "summary": "How inflation is measured",
                "keywords": ["inflation"]
            }}),
        ),
        MockDocument::new(
            "cpi-series",
            ContentType::Timeseries,
            json!({"description": {
                "title": "CPI annual rate",
                "cdid": "d7g7",
                "keywords": ["inflation"]
            }}),
        ),
        MockDocument::new(
            "inflation-topic",
            ContentType::ProductPage,
            json!({"description": {"title": "Inflation and price indices"}}),
        ),
        MockDocument::new(
            "population",
            ContentType::Bulletin,
            json!({"description": {"title": "Population estimates"}}),
        ),
    ]
}
