//! Error types for dpsearch.
//!
//! Every failure the query pipeline can surface is a variant of [`Error`].
//! Variants fall into two groups:
//!
//! - **Client errors** are caused by the request itself (page size, page
//!   number, result window, unknown filter/sort/list names). They always carry
//!   the offending value and map to a 400 response.
//! - **Server errors** come from the backend, the model, configuration, or a
//!   mismatch between highlight fields and the document layout. They map to a
//!   500 response.

use std::path::{Path, PathBuf};

/// Result type alias for dpsearch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, executing, or interpreting queries.
///
/// Marked `#[non_exhaustive]` so new variants can be added without breaking
/// downstream matches.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Requested page size is larger than the configured ceiling.
    #[error("Requested page size exceeds max allowed: '{size}' (max {max})")]
    RequestSizeExceeded {
        /// The page size that was requested.
        size: u64,
        /// The configured maximum.
        max: u64,
    },

    /// A page must hold at least one hit.
    #[error("Invalid page size: '{size}' (must be at least 1)")]
    InvalidPageSize {
        /// The page size that was requested.
        size: u64,
    },

    /// Page numbers are 1-based; zero or negative pages are rejected.
    #[error("Invalid page number: '{page}' (pages start at 1)")]
    InvalidPage {
        /// The page number that was requested.
        page: i64,
    },

    /// The requested page lies beyond the backend's result window.
    #[error("Result window exceeded: from {from} + size {size} is larger than {max_window}")]
    ResultWindowExceeded {
        /// Computed offset of the first hit.
        from: u64,
        /// Requested page size.
        size: u64,
        /// Configured maximum result window.
        max_window: u64,
    },

    /// A type filter name did not match any known filter group.
    #[error("Received unknown type filter: '{name}'")]
    UnknownTypeFilter {
        /// The unrecognised filter name.
        name: String,
    },

    /// A sort option did not match any known sort field.
    #[error("Received unknown sort field: '{name}'")]
    UnknownSortField {
        /// The unrecognised sort name.
        name: String,
    },

    /// A list type did not match any known list type.
    #[error("Received unknown list type: '{name}'")]
    UnknownListType {
        /// The unrecognised list type.
        name: String,
    },

    /// The backend could not be reached (connection or transport failure).
    #[error("Search backend unavailable: {message}")]
    BackendUnavailable {
        /// Human-readable description.
        message: String,
        /// Underlying transport error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The backend accepted the connection but failed the query.
    #[error("Search backend rejected query ({kind}): {reason}")]
    BackendQuery {
        /// Backend-reported error type.
        kind: String,
        /// Backend-reported reason.
        reason: String,
    },

    /// Highlight substitution addressed a field path the document can't hold.
    #[error("Unable to set highlighted field '{field}': {message}")]
    FieldMapping {
        /// The highlight field path.
        field: String,
        /// What went wrong.
        message: String,
    },

    /// Embedding or label prediction failed.
    #[error("Model error: {message}")]
    Model {
        /// What went wrong.
        message: String,
    },

    /// Invalid or unreadable configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic.
        message: String,
    },

    /// I/O error with the path that caused it.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns whether this error was caused by the request and should be
    /// reported to the caller as a client error.
    pub fn is_client_error(&self) -> bool {
        match self {
            Error::RequestSizeExceeded { .. }
            | Error::InvalidPageSize { .. }
            | Error::InvalidPage { .. }
            | Error::ResultWindowExceeded { .. }
            | Error::UnknownTypeFilter { .. }
            | Error::UnknownSortField { .. }
            | Error::UnknownListType { .. } => true,
            Error::BackendUnavailable { .. }
            | Error::BackendQuery { .. }
            | Error::FieldMapping { .. }
            | Error::Model { .. }
            | Error::Config { .. }
            | Error::Io { .. }
            | Error::Json(_) => false,
        }
    }

    /// HTTP status code the routing layer should answer with.
    pub fn status_code(&self) -> u16 {
        if self.is_client_error() { 400 } else { 500 }
    }

    /// Creates a backend-unavailable error with a message.
    pub fn backend_unavailable<S: Into<String>>(message: S) -> Self {
        Error::BackendUnavailable {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a backend-unavailable error with a message and source error.
    pub fn backend_unavailable_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::BackendUnavailable {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a backend query error from the backend's error type and reason.
    pub fn backend_query<K, R>(kind: K, reason: R) -> Self
    where
        K: Into<String>,
        R: Into<String>,
    {
        Error::BackendQuery {
            kind: kind.into(),
            reason: reason.into(),
        }
    }

    /// Creates a field mapping error.
    pub fn field_mapping<F, M>(field: F, message: M) -> Self
    where
        F: Into<String>,
        M: Into<String>,
    {
        Error::FieldMapping {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a model error.
    pub fn model<S: Into<String>>(message: S) -> Self {
        Error::Model {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Wraps an I/O error with the path that caused it.
    pub fn io_with_path(source: std::io::Error, path: &Path) -> Self {
        Error::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Creates an unknown type filter error.
    pub fn unknown_type_filter<S: Into<String>>(name: S) -> Self {
        Error::UnknownTypeFilter { name: name.into() }
    }
}
