//! Turning raw backend responses into search results.
//!
//! Hits keep backend order; the processor never re-sorts.

use dpsearch_core::paginator::DEFAULT_MAX_VISIBLE_PAGES;
use dpsearch_core::{PageRequest, Paginator, Result, SearchConfig, SortField};

use crate::aggregations::terms_counts;
use crate::highlight::Highlighter;
use crate::raw::{RawHit, RawResponse};
use crate::result::{ContentQueryResult, DepartmentsQueryResult, Hit, TypeCountsQueryResult};

/// Key the content type is written to on every hit.
pub const TYPE_KEY: &str = "_type";

/// Builds [`SearchResult`](crate::SearchResult) values from raw responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseProcessor {
    highlighter: Highlighter,
    max_visible_pages: u64,
}

impl Default for ResponseProcessor {
    fn default() -> Self {
        Self {
            highlighter: Highlighter::default(),
            max_visible_pages: DEFAULT_MAX_VISIBLE_PAGES,
        }
    }
}

impl ResponseProcessor {
    /// Processor using the highlight tag and page window from `config`.
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            highlighter: Highlighter::new(&config.search.highlight_tag),
            max_visible_pages: config.search.max_visible_pages,
        }
    }

    /// The highlighter in use.
    pub fn highlighter(&self) -> &Highlighter {
        &self.highlighter
    }

    /// Normalise one hit: apply highlights and record its content type.
    ///
    /// The index marker from the hit metadata is the external type name:
    /// it is written to [`TYPE_KEY`] as is, replacing any `_type` in the
    /// stored source.
    pub fn process_hit(&self, hit: &RawHit) -> Result<Hit> {
        let mut document = hit.source.clone();
        document.insert(
            TYPE_KEY.to_string(),
            hit.doc_type.clone().map_or(serde_json::Value::Null, Into::into),
        );
        if let Some(highlight) = &hit.highlight {
            self.highlighter.apply(&mut document, highlight)?;
        }
        Ok(document)
    }

    /// Normalise every hit, in backend order.
    pub fn process_hits(&self, response: &RawResponse) -> Result<Vec<Hit>> {
        response
            .hits
            .hits
            .iter()
            .map(|hit| self.process_hit(hit))
            .collect()
    }

    /// Content page for `page`, sorted by `sort_by`.
    pub fn content_result(
        &self,
        response: &RawResponse,
        page: PageRequest,
        sort_by: SortField,
    ) -> Result<ContentQueryResult> {
        let total = response.total();
        Ok(ContentQueryResult {
            number_of_results: total,
            took: response.took,
            results: self.process_hits(response)?,
            paginator: Paginator::from_request(total, page, self.max_visible_pages),
            sort_by,
        })
    }

    /// Single-hit content result on page 1.
    pub fn single_result(&self, response: &RawResponse) -> Result<ContentQueryResult> {
        self.content_result(response, PageRequest::SINGLE, SortField::Relevance)
    }

    /// Featured result.
    pub fn featured_result(&self, response: &RawResponse) -> Result<ContentQueryResult> {
        self.single_result(response)
    }

    /// Departments page; always relevance ordered.
    pub fn departments_result(
        &self,
        response: &RawResponse,
        page: PageRequest,
    ) -> Result<DepartmentsQueryResult> {
        let total = response.total();
        Ok(DepartmentsQueryResult {
            number_of_results: total,
            took: response.took,
            results: self.process_hits(response)?,
            paginator: Paginator::from_request(total, page, self.max_visible_pages),
        })
    }

    /// Counts per content type from the `bucket` aggregation.
    pub fn type_counts_result(
        &self,
        response: &RawResponse,
        bucket: &str,
    ) -> Result<TypeCountsQueryResult> {
        Ok(TypeCountsQueryResult {
            doc_counts: terms_counts(response.aggregations.as_ref(), bucket)?,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use dpsearch_core::{Error, PaginationPolicy};
    use serde_json::{Value, json};

    fn response(v: Value) -> RawResponse {
        RawResponse::from_json(v).unwrap()
    }

    fn content_response() -> RawResponse {
        response(json!({
            "took": 12,
            "hits": {
                "total": 23,
                "hits": [
                    {
                        "_type": "bulletin",
                        "_score": 1.0,
                        "_source": {"description": {"title": "Randy Marsh"}},
                        "highlight": {"description.title": ["<strong>Randy</strong> Marsh"]}
                    },
                    {
                        "_type": "article",
                        "_score": 9.0,
                        "_source": {"description": {"title": "Stan Marsh"}}
                    },
                    {
                        "_type": "dataset",
                        "_score": 4.0,
                        "_source": {"description": {"title": "Sharon Marsh"}}
                    }
                ]
            }
        }))
    }

    #[test]
    fn test_content_result() {
        let page = PaginationPolicy::default().paginate(2, 10).unwrap();
        let result = ResponseProcessor::default()
            .content_result(&content_response(), page, SortField::Relevance)
            .unwrap();

        assert_eq!(result.number_of_results, 23);
        assert_eq!(result.took, 12);
        assert_eq!(result.paginator.total_pages(), 3);
        assert_eq!(result.paginator.current_page(), 2);
        assert_eq!(
            result.results[0]["description"]["title"],
            "<strong>Randy</strong> Marsh"
        );
    }

    #[test]
    fn test_hits_keep_backend_order() {
        let result = ResponseProcessor::default()
            .content_result(&content_response(), PageRequest::SINGLE, SortField::Relevance)
            .unwrap();
        let types: Vec<_> = result.results.iter().map(|h| h[TYPE_KEY].clone()).collect();
        assert_eq!(types, vec![json!("bulletin"), json!("article"), json!("dataset")]);
    }

    #[test]
    fn test_type_marker_copied_to_hit() {
        let r = response(json!({
            "hits": {"total": 1, "hits": [{"_source": {"uri": "/x"}}]}
        }));
        let hits = ResponseProcessor::default().process_hits(&r).unwrap();
        assert_eq!(hits[0][TYPE_KEY], Value::Null);
        assert_eq!(hits[0]["uri"], "/x");
    }

    #[test]
    fn test_type_marker_overrides_source() {
        let r = response(json!({
            "hits": {"total": 1, "hits": [{
                "_type": "static_adhoc",
                "_source": {"_type": "ignored", "uri": "/adhocs/001"}
            }]}
        }));
        let hits = ResponseProcessor::default().process_hits(&r).unwrap();
        assert_eq!(hits[0][TYPE_KEY], "static_adhoc");
        assert_eq!(
            hits[0][TYPE_KEY].as_str().and_then(|t| t.parse::<dpsearch_core::ContentType>().ok()),
            Some(dpsearch_core::ContentType::StaticAdhoc)
        );
    }

    #[test]
    fn test_featured_is_single_page() {
        let result = ResponseProcessor::default()
            .featured_result(&content_response())
            .unwrap();
        assert_eq!(result.paginator.current_page(), 1);
        assert_eq!(result.paginator.page_size(), 1);
        assert_eq!(result.sort_by, SortField::Relevance);
    }

    #[test]
    fn test_departments_result() {
        let r = response(json!({
            "took": 3,
            "hits": {"total": {"value": 1, "relation": "eq"}, "hits": [
                {"_type": "departments", "_source": {"terms": ["tax"], "title": "HMRC"}}
            ]}
        }));
        let result = ResponseProcessor::default()
            .departments_result(&r, PageRequest::SINGLE)
            .unwrap();
        assert_eq!(result.number_of_results, 1);
        assert_eq!(result.results[0]["title"], "HMRC");
    }

    #[test]
    fn test_type_counts_result() {
        let r = response(json!({
            "took": 2,
            "hits": {"total": 7, "hits": []},
            "aggregations": {"docCounts": {"buckets": [
                {"key": "article", "doc_count": 5},
                {"key": "dataset", "doc_count": 2}
            ]}}
        }));
        let result = ResponseProcessor::default()
            .type_counts_result(&r, "docCounts")
            .unwrap();
        assert_eq!(result.doc_counts.len(), 2);
        assert_eq!(result.doc_counts["article"], 5);
        assert_eq!(result.doc_counts["dataset"], 2);
    }

    #[test]
    fn test_bad_highlight_path_fails_processing() {
        let r = response(json!({
            "hits": {"total": 1, "hits": [{
                "_source": {"description": {"title": "GDP"}},
                "highlight": {"description.title.raw": ["<strong>GDP</strong>"]}
            }]}
        }));
        let err = ResponseProcessor::default().process_hits(&r).unwrap_err();
        assert!(matches!(err, Error::FieldMapping { .. }));
    }

    #[test]
    fn test_configured_tag() {
        let mut config = SearchConfig::default();
        config.search.highlight_tag = "em".into();
        let r = response(json!({
            "hits": {"total": 1, "hits": [{
                "_source": {"description": {"summary": "retail sales fell"}},
                "highlight": {"description.summary": ["<em>retail</em> sales fell"]}
            }]}
        }));
        let hits = ResponseProcessor::new(&config).process_hits(&r).unwrap();
        assert_eq!(hits[0]["description"]["summary"], "<em>retail</em> sales fell");
    }
}
