//! dpsearch response: from raw backend responses to client results.
//!
//! # Modules
//!
//! - [`raw`]: Serde model of backend search and multi-search responses
//! - [`highlight`]: Splicing highlighted fragments into stored documents
//! - [`aggregations`]: Terms aggregation extraction
//! - [`result`]: [`SearchResult`] variants returned to clients
//! - [`processor`]: [`ResponseProcessor`]

#![doc = include_str!("../README.md")]

pub mod aggregations;
pub mod highlight;
pub mod processor;
pub mod raw;
pub mod result;

pub use highlight::Highlighter;
pub use processor::ResponseProcessor;
pub use raw::{BackendError, HitsTotal, RawHit, RawHits, RawMultiResponse, RawResponse};
pub use result::{
    CombinedSearchResult, ContentQueryResult, DepartmentsQueryResult, Hit, SearchResult,
    TypeCountsQueryResult,
};
