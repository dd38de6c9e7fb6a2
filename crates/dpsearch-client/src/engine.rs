//! Search orchestration.
//!
//! [`SearchEngine`] composes requests, sends them to a [`SearchBackend`] and
//! turns the responses into results. Request construction is exposed
//! separately (`build_*`) so callers can inspect a request without a
//! backend.

use std::sync::Arc;

use serde_json::Value;

use dpsearch_core::{
    Error, Index, PageRequest, PaginationPolicy, Result, SearchConfig, SortField, TypeFilter,
    content_types_of,
};
use dpsearch_ml::text::lowercase_tokens;
use dpsearch_ml::{EmbeddingModel, SpellCheckSuggestion, SpellChecker};
use dpsearch_query::builders::{
    RescoreOptions, content_filter_functions, departments_query, type_counts_aggregation,
    user_rescore,
};
use dpsearch_query::{
    ContentQueryBuilder, Highlight, Query, SearchRequest, SearchType, TYPE_COUNTS_BUCKET,
};
use dpsearch_response::{
    CombinedSearchResult, ContentQueryResult, DepartmentsQueryResult, RawResponse,
    ResponseProcessor, TypeCountsQueryResult,
};

use crate::backend::SearchBackend;
use crate::params::SearchParams;

/// Runs dpsearch queries against a backend.
#[derive(Clone)]
pub struct SearchEngine {
    backend: Arc<dyn SearchBackend>,
    config: SearchConfig,
    policy: PaginationPolicy,
    queries: ContentQueryBuilder,
    processor: ResponseProcessor,
    spell_checker: Option<SpellChecker>,
}

impl std::fmt::Debug for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchEngine")
            .field("backend", &self.backend.name())
            .field("policy", &self.policy)
            .field("queries", &self.queries)
            .field("spell_checker", &self.spell_checker.is_some())
            .finish()
    }
}

impl SearchEngine {
    /// Engine without a model: lexical queries, no spelling suggestions.
    pub fn new(backend: Arc<dyn SearchBackend>, config: SearchConfig) -> Self {
        Self {
            backend,
            policy: config.pagination_policy(),
            queries: ContentQueryBuilder::new(&config),
            processor: ResponseProcessor::new(&config),
            spell_checker: None,
            config,
        }
    }

    /// Use `model` for semantic scoring and spelling suggestions.
    pub fn with_model(mut self, model: Arc<dyn EmbeddingModel>) -> Self {
        self.queries = self.queries.with_model(Arc::clone(&model));
        self.spell_checker = Some(SpellChecker::new(model));
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// The backend.
    pub fn backend(&self) -> &Arc<dyn SearchBackend> {
        &self.backend
    }

    // ------------------------------------------------------------------------
    // Request construction
    // ------------------------------------------------------------------------

    fn page(&self, page: i64, page_size: Option<u64>) -> Result<PageRequest> {
        self.policy
            .paginate(page, page_size.unwrap_or(self.config.search.results_per_page))
    }

    fn type_filters(&self, params: &SearchParams) -> Result<Vec<TypeFilter>> {
        params.list_type.type_filters(params.type_filters.as_slice())
    }

    /// The content query request for `params`.
    ///
    /// # Errors
    ///
    /// Client errors for an unknown type filter or an out of range page.
    pub fn build_content_request(&self, params: &SearchParams) -> Result<SearchRequest> {
        let types = content_types_of(&self.type_filters(params)?);
        let page = self.page(params.page, params.page_size)?;
        let query = self
            .queries
            .build(&params.search_term, Some(content_filter_functions(&types)));

        let request = SearchRequest::new(Index::Ons, query)
            .paginate(page)
            .sort_by(params.sort_by)
            .type_filter(types)
            .highlight(Highlight::registry(self.config.search.highlight_tag.as_str()))
            .search_type(SearchType::DfsQueryThenFetch);

        Ok(match &params.user_vector {
            Some(vector) => request.rescore(user_rescore(vector, RescoreOptions::default())),
            None => request,
        })
    }

    /// The type counts request: unfiltered, unsorted, no hits.
    pub fn build_type_counts_request(&self, search_term: &str) -> SearchRequest {
        SearchRequest::new(Index::Ons, self.queries.build(search_term, None))
            .paginate(PageRequest::EMPTY)
            .aggregation(TYPE_COUNTS_BUCKET, type_counts_aggregation())
            .search_type(SearchType::DfsQueryThenFetch)
    }

    /// The featured result request: one hit of a featured type.
    pub fn build_featured_request(&self, search_term: &str) -> SearchRequest {
        SearchRequest::new(Index::Ons, self.queries.build(search_term, None))
            .paginate(PageRequest::SINGLE)
            .type_filter(TypeFilter::Featured.content_types())
            .search_type(SearchType::DfsQueryThenFetch)
    }

    /// The departments request.
    pub fn build_departments_request(
        &self,
        search_term: &str,
        page: i64,
        page_size: Option<u64>,
    ) -> Result<SearchRequest> {
        Ok(SearchRequest::new(Index::Departments, departments_query(search_term))
            .paginate(self.page(page, page_size)?)
            .search_type(SearchType::DfsQueryThenFetch))
    }

    /// A request for a caller-supplied query.
    ///
    /// Type filters apply only when `params` names some; the list type's
    /// defaults are not used.
    pub fn build_proxy_request(&self, query: Value, params: &SearchParams) -> Result<SearchRequest> {
        let page = self.page(params.page, params.page_size)?;
        let mut request = SearchRequest::new(Index::Ons, Query::Raw(query))
            .paginate(page)
            .sort_by(params.sort_by);
        if !params.type_filters.is_empty() {
            let filters = TypeFilter::from_names(&params.type_filters)?;
            request = request.type_filter(content_types_of(&filters));
        }
        Ok(request)
    }

    // ------------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------------

    async fn execute(&self, label: &str, request: &SearchRequest) -> Result<RawResponse> {
        log::debug!(
            "[{}] Executing {label} query on '{}': {}",
            request.id(),
            request.index().name(),
            request.to_json()
        );
        self.backend.execute(request).await.inspect_err(|e| {
            log::error!("[{}] Unable to perform {label} query: {e}", request.id());
        })
    }

    /// Run the content query.
    pub async fn content_query(&self, params: &SearchParams) -> Result<ContentQueryResult> {
        let request = self.build_content_request(params)?;
        let response = self.execute("content", &request).await?;
        self.processor
            .content_result(&response, request.page(), params.sort_by)
    }

    /// Count matching documents per content type.
    pub async fn type_counts_query(&self, search_term: &str) -> Result<TypeCountsQueryResult> {
        let request = self.build_type_counts_request(search_term);
        let response = self.execute("type counts", &request).await?;
        self.processor
            .type_counts_result(&response, TYPE_COUNTS_BUCKET)
    }

    /// The best featured hit, on a single-hit page.
    pub async fn featured_result_query(&self, search_term: &str) -> Result<ContentQueryResult> {
        let request = self.build_featured_request(search_term);
        let response = self.execute("featured result", &request).await?;
        self.processor.featured_result(&response)
    }

    /// Search government departments.
    pub async fn departments_query(
        &self,
        search_term: &str,
        page: i64,
        page_size: Option<u64>,
    ) -> Result<DepartmentsQueryResult> {
        let request = self.build_departments_request(search_term, page, page_size)?;
        let response = self.execute("departments", &request).await?;
        self.processor.departments_result(&response, request.page())
    }

    /// Run a caller-supplied query with dpsearch pagination and filtering.
    pub async fn proxy_query(&self, query: Value, params: &SearchParams) -> Result<ContentQueryResult> {
        let request = self.build_proxy_request(query, params)?;
        let response = self.execute("proxy", &request).await?;
        self.processor
            .content_result(&response, request.page(), params.sort_by)
    }

    /// Content, type counts and featured result in one batch.
    ///
    /// # Errors
    ///
    /// Fails if the batch fails or if any of its three queries fails.
    pub async fn search_all(&self, params: &SearchParams) -> Result<CombinedSearchResult> {
        let requests = [
            self.build_content_request(params)?,
            self.build_type_counts_request(&params.search_term),
            self.build_featured_request(&params.search_term),
        ];
        for request in &requests {
            log::debug!("[{}] Batching query: {}", request.id(), request.to_json());
        }

        let responses = self.backend.msearch(&requests).await.inspect_err(|e| {
            log::error!("Unable to perform combined search for '{}': {e}", params.search_term);
        })?;

        let [content, counts, featured]: [Result<RawResponse>; 3] =
            responses.try_into().map_err(|r: Vec<_>| {
                Error::backend_query(
                    "msearch",
                    format!("expected 3 responses, received {}", r.len()),
                )
            })?;
        let [content, counts, featured] = [content, counts, featured].map(|r| {
            r.inspect_err(|e| log::warn!("Combined search item failed: {e}"))
        });

        Ok(CombinedSearchResult {
            content: self
                .processor
                .content_result(&content?, requests[0].page(), params.sort_by)?,
            counts: self
                .processor
                .type_counts_result(&counts?, TYPE_COUNTS_BUCKET)?,
            featured_result: self.processor.featured_result(&featured?)?,
        })
    }

    /// Spelling suggestions for the words of `search_term`.
    ///
    /// Empty when no model is configured.
    pub fn spelling_suggestions(&self, search_term: &str) -> Vec<SpellCheckSuggestion> {
        match &self.spell_checker {
            Some(checker) => checker.correct_spelling(&lowercase_tokens(search_term)),
            None => {
                log::debug!("No model configured, skipping spell check");
                Vec::new()
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
