//! Pagination bounds.
//!
//! Two pieces live here:
//!
//! - [`PaginationPolicy`] validates a request's `(page, size)` against the
//!   configured ceilings and yields a [`PageRequest`] carrying the backend
//!   offset.
//! - [`Paginator`] combines a page request with the total hit count from the
//!   backend and computes the page-link window shown to clients.
//!
//! Offsets are computed with saturating arithmetic. Any page whose
//! `from + size` would exceed `max_result_window` is rejected, so the largest
//! reachable offset is bounded by `max_result_window - size`.

use serde::Serialize;

use crate::error::{Error, Result};

/// Default number of results on a page.
pub const DEFAULT_RESULTS_PER_PAGE: u64 = 10;
/// Default ceiling on a requested page size.
pub const DEFAULT_MAX_REQUEST_SIZE: u64 = 250;
/// Default backend result window.
pub const DEFAULT_MAX_RESULT_WINDOW: u64 = 10_000;
/// Default number of page links in a paginator window.
pub const DEFAULT_MAX_VISIBLE_PAGES: u64 = 5;

// ============================================================================
// PaginationPolicy
// ============================================================================

/// Ceilings applied to every paginated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationPolicy {
    /// Largest page size a caller may request.
    pub max_page_size: u64,
    /// Largest `from + size` the backend will serve.
    pub max_result_window: u64,
    /// Number of page links in the paginator window.
    pub max_visible_pages: u64,
}

impl Default for PaginationPolicy {
    fn default() -> Self {
        Self {
            max_page_size: DEFAULT_MAX_REQUEST_SIZE,
            max_result_window: DEFAULT_MAX_RESULT_WINDOW,
            max_visible_pages: DEFAULT_MAX_VISIBLE_PAGES,
        }
    }
}

impl PaginationPolicy {
    /// Validate a 1-based page number and page size.
    ///
    /// # Errors
    ///
    /// - [`Error::RequestSizeExceeded`] if `page_size > max_page_size`
    /// - [`Error::InvalidPageSize`] if `page_size == 0`
    /// - [`Error::InvalidPage`] if `current_page < 1`
    /// - [`Error::ResultWindowExceeded`] if the page ends beyond the window
    pub fn paginate(&self, current_page: i64, page_size: u64) -> Result<PageRequest> {
        if page_size > self.max_page_size {
            return Err(Error::RequestSizeExceeded {
                size: page_size,
                max: self.max_page_size,
            });
        }
        if page_size == 0 {
            return Err(Error::InvalidPageSize { size: page_size });
        }

        if current_page < 1 {
            return Err(Error::InvalidPage { page: current_page });
        }

        let page = current_page as u64;
        let from = (page - 1).saturating_mul(page_size);
        if from.saturating_add(page_size) > self.max_result_window {
            return Err(Error::ResultWindowExceeded {
                from,
                size: page_size,
                max_window: self.max_result_window,
            });
        }

        Ok(PageRequest {
            page,
            size: page_size,
        })
    }
}

// ============================================================================
// PageRequest
// ============================================================================

/// A validated page of results to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    size: u64,
}

impl PageRequest {
    /// The first page with a single hit.
    pub const SINGLE: PageRequest = PageRequest { page: 1, size: 1 };

    /// First page with no hits. Used when only aggregations matter.
    pub const EMPTY: PageRequest = PageRequest { page: 1, size: 0 };

    /// 1-based page number.
    pub fn page(&self) -> u64 {
        self.page
    }

    /// Number of hits on the page.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Offset of the first hit.
    pub fn from(&self) -> u64 {
        (self.page - 1).saturating_mul(self.size)
    }
}

// ============================================================================
// Paginator
// ============================================================================

/// Page accounting for a result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginator {
    total_hits: u64,
    current_page: u64,
    page_size: u64,
    number_of_pages: u64,
    start: u64,
    end: u64,
    pages: Vec<u64>,
}

impl Paginator {
    /// Build a paginator, checking `page_size <= max_page_size`.
    ///
    /// # Errors
    ///
    /// [`Error::RequestSizeExceeded`], [`Error::InvalidPageSize`] or
    /// [`Error::InvalidPage`] when the page falls outside the policy. The
    /// size is reported, never clamped.
    pub fn new(
        total_hits: u64,
        current_page: i64,
        page_size: u64,
        max_page_size: u64,
    ) -> Result<Self> {
        if page_size > max_page_size {
            return Err(Error::RequestSizeExceeded {
                size: page_size,
                max: max_page_size,
            });
        }
        if page_size == 0 {
            return Err(Error::InvalidPageSize { size: page_size });
        }
        if current_page < 1 {
            return Err(Error::InvalidPage { page: current_page });
        }

        Ok(Self::from_request(
            total_hits,
            PageRequest {
                page: current_page as u64,
                size: page_size,
            },
            DEFAULT_MAX_VISIBLE_PAGES,
        ))
    }

    /// Build a paginator from an already validated request.
    pub fn from_request(total_hits: u64, request: PageRequest, max_visible_pages: u64) -> Self {
        let number_of_pages = if request.size == 0 {
            0
        } else {
            total_hits.div_ceil(request.size)
        };

        let (start, end) = page_window(request.page, number_of_pages, max_visible_pages);

        Self {
            total_hits,
            current_page: request.page,
            page_size: request.size,
            number_of_pages,
            start,
            end,
            pages: (start..=end).collect(),
        }
    }

    /// Total hits reported by the backend.
    pub fn total_hits(&self) -> u64 {
        self.total_hits
    }

    /// 1-based current page.
    pub fn current_page(&self) -> u64 {
        self.current_page
    }

    /// Hits per page.
    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Offset of the first hit on the current page.
    pub fn offset(&self) -> u64 {
        (self.current_page - 1).saturating_mul(self.page_size)
    }

    /// `ceil(total_hits / page_size)`; zero when the page size is zero.
    pub fn total_pages(&self) -> u64 {
        self.number_of_pages
    }

    /// First page link in the window.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Last page link in the window.
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Page links in the window.
    pub fn pages(&self) -> &[u64] {
        &self.pages
    }
}

/// Window of page links centred on `current`, at most `visible` wide.
fn page_window(current: u64, number_of_pages: u64, visible: u64) -> (u64, u64) {
    if number_of_pages == 0 || visible == 0 {
        return (1, 0);
    }
    if number_of_pages <= visible {
        return (1, number_of_pages);
    }

    let current = current.min(number_of_pages);
    let mut start = current.saturating_sub(visible / 2).max(1);
    let mut end = start + visible - 1;
    if end > number_of_pages {
        end = number_of_pages;
        start = end - visible + 1;
    }
    (start, end)
}

// ============================================================================
// Tests
// ============================================================================
