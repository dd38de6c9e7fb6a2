//! Search parameters supplied by callers.

use serde::{Deserialize, Serialize};

use dpsearch_core::{ListType, SortField};

/// What a caller asks for in a content, proxy or combined search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Free-text search term.
    pub search_term: String,

    /// 1-based page.
    #[serde(default = "default_page")]
    pub page: i64,

    /// Hits per page; the configured default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u64>,

    /// Sort order.
    #[serde(default)]
    pub sort_by: SortField,

    /// Type filter names. Empty means the list type's defaults.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_filters: Vec<String>,

    /// Listing the search runs for.
    #[serde(default)]
    pub list_type: ListType,

    /// Session vector of the user; when set the content query rescores its
    /// top hits by similarity to it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_vector: Option<Vec<f32>>,
}

fn default_page() -> i64 {
    1
}

impl SearchParams {
    /// First page of `search_term`, relevance ordered, default filters.
    pub fn new(search_term: impl Into<String>) -> Self {
        Self {
            search_term: search_term.into(),
            page: default_page(),
            page_size: None,
            sort_by: SortField::Relevance,
            type_filters: Vec::new(),
            list_type: ListType::Ons,
            user_vector: None,
        }
    }

    /// Set the page.
    pub fn with_page(mut self, page: i64) -> Self {
        self.page = page;
        self
    }

    /// Set the page size.
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Set the sort order.
    pub fn with_sort(mut self, sort_by: SortField) -> Self {
        self.sort_by = sort_by;
        self
    }

    /// Set the type filter names.
    pub fn with_type_filters<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.type_filters = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the list type.
    pub fn with_list_type(mut self, list_type: ListType) -> Self {
        self.list_type = list_type;
        self
    }

    /// Set the user's session vector.
    pub fn with_user_vector(mut self, user_vector: Vec<f32>) -> Self {
        self.user_vector = Some(user_vector);
        self
    }
}
