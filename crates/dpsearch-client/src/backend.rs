//! Search backend capability.
//!
//! The backend executes fully composed [`SearchRequest`]s. Its wire protocol
//! and transport live behind this trait; dpsearch never sees them.

use async_trait::async_trait;
use futures::future::join_all;

use dpsearch_core::Result;
use dpsearch_query::SearchRequest;
use dpsearch_response::RawResponse;

/// Executes search requests against an index.
///
/// # Async
///
/// Both calls are the only suspension points in a search. A failed
/// connection is reported as [`Error::BackendUnavailable`]; a query the
/// backend rejects is [`Error::BackendQuery`]. Neither is retried here.
///
/// [`Error::BackendUnavailable`]: dpsearch_core::Error::BackendUnavailable
/// [`Error::BackendQuery`]: dpsearch_core::Error::BackendQuery
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Execute one request.
    async fn execute(&self, request: &SearchRequest) -> Result<RawResponse>;

    /// Execute several requests as one batch.
    ///
    /// The outer `Result` fails when the batch itself could not be sent.
    /// Inner results match `requests` one to one, in order.
    ///
    /// The default runs one [`execute`](Self::execute) per request
    /// concurrently, so it costs N round trips. Only backends that override
    /// it with a native multi-search send the batch as a single round trip.
    async fn msearch(&self, requests: &[SearchRequest]) -> Result<Vec<Result<RawResponse>>> {
        Ok(join_all(requests.iter().map(|r| self.execute(r))).await)
    }

    /// Backend name for diagnostics.
    fn name(&self) -> &str;

    /// Whether the backend can take queries.
    fn is_ready(&self) -> bool {
        true
    }
}
