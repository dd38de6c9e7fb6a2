//! dpsearch conceptual search front-end: umbrella crate.
//!
//! This crate re-exports all dpsearch components for convenience.
//! Enable the `cli` feature for the command-line handlers.

#![doc = include_str!("../README.md")]

pub use dpsearch_client as client;
pub use dpsearch_core as core;
pub use dpsearch_ml as ml;
pub use dpsearch_query as query;
pub use dpsearch_response as response;

#[cfg(feature = "cli")]
pub use dpsearch_cli as cli;

pub use dpsearch_client::{SearchBackend, SearchEngine, SearchParams};
pub use dpsearch_core::{Error, Result, SearchConfig};
