//! dpsearch Core: registries, pagination, errors, and configuration.
//!
//! This crate provides the foundational types used across all dpsearch
//! crates. It has no internal dpsearch dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`fields`]: Field registry (logical names, index names, boosts)
//! - [`content_type`]: Content types and their boost weights
//! - [`type_filter`]: Named groups of content types
//! - [`list_type`]: List types and their default filters
//! - [`sort`]: Sort options
//! - [`index`]: Backend indices
//! - [`paginator`]: Page bounds and page-link windows
//! - [`config`]: TOML configuration

#![doc = include_str!("../README.md")]

pub mod config;
pub mod content_type;
pub mod error;
pub mod fields;
pub mod index;
pub mod list_type;
pub mod paginator;
pub mod sort;
pub mod type_filter;

// Re-export key types at crate root for convenience
pub use config::SearchConfig;
pub use content_type::ContentType;
pub use error::{Error, Result};
pub use fields::{Field, FieldRef};
pub use index::Index;
pub use list_type::ListType;
pub use paginator::{PageRequest, PaginationPolicy, Paginator};
pub use sort::{SortField, SortOrder, SortTarget};
pub use type_filter::{TypeFilter, content_types_of};
