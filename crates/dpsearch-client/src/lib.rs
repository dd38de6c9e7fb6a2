//! dpsearch client: running searches against a backend.
//!
//! # Modules
//!
//! - [`backend`]: The [`SearchBackend`] capability (`execute`, `msearch`)
//! - [`engine`]: [`SearchEngine`], which composes, executes and processes
//! - [`params`]: [`SearchParams`] supplied by callers
//! - [`mock`]: [`MockBackend`] for tests

#![doc = include_str!("../README.md")]

pub mod backend;
pub mod engine;
pub mod mock;
pub mod params;

pub use backend::SearchBackend;
pub use engine::SearchEngine;
pub use mock::{MockBackend, MockDocument};
pub use params::SearchParams;
