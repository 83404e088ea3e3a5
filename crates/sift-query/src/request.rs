//! Search requests and pagination.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use sift_core::{FacetSort, SearchOptions};

use crate::builder::{DEFAULT_QUERY_FIELDS, DEFAULT_SORT, FacetPage};

/// Offset of the first result on `page` (pages start at 1).
pub fn page_offset(page: usize, limit: usize) -> usize {
    page.max(1).saturating_sub(1).saturating_mul(limit)
}

/// A parsed search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Raw query text.
    pub q: String,
    /// Facet filter clause, e.g. `tag:"maps"`.
    pub facet: Option<String>,
    /// Result ordering.
    pub sort: String,
    /// Result page, starting at 1.
    pub page: usize,
    /// Results per page.
    pub limit: usize,
    /// Facet paging directive.
    pub facet_page: FacetPage,
    /// Current facet offset.
    pub facet_offset: usize,
    /// Facet value ordering.
    pub facet_sort: FacetSort,
    /// Relevance field scope.
    pub qf: String,
}

impl SearchRequest {
    /// A first-page request for `q` with option defaults.
    pub fn new(q: impl Into<String>, options: &SearchOptions) -> Self {
        Self {
            q: q.into(),
            facet: None,
            sort: DEFAULT_SORT.to_string(),
            page: 1,
            limit: options.per_page,
            facet_page: FacetPage::Stay,
            facet_offset: 0,
            facet_sort: options.facet_sort,
            qf: DEFAULT_QUERY_FIELDS.to_string(),
        }
    }

    /// Set the facet filter (builder style).
    pub fn with_facet(mut self, facet: impl Into<String>) -> Self {
        self.facet = Some(facet.into());
        self
    }

    /// Set the page (builder style).
    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page.max(1);
        self
    }

    /// Read a request from query-string parameters.
    ///
    /// Missing, empty, zero, or unparseable values take their defaults.
    pub fn from_params(params: &BTreeMap<String, String>, options: &SearchOptions) -> Self {
        let text = |key: &str| {
            params
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };
        let number = |key: &str| {
            text(key).and_then(|v| match v.parse::<usize>() {
                Ok(0) => None,
                Ok(n) => Some(n),
                Err(_) => {
                    log::debug!("Ignoring invalid '{key}' parameter: {v}");
                    None
                }
            })
        };

        let defaults = Self::new("", options);
        Self {
            q: params.get("q").cloned().unwrap_or_default(),
            facet: text("facet").map(str::to_string),
            sort: text("sort").map_or(defaults.sort, str::to_string),
            page: number("page").unwrap_or(defaults.page),
            limit: number("limit").unwrap_or(defaults.limit),
            facet_page: text("facet_page").map_or(FacetPage::Stay, FacetPage::from_param),
            facet_offset: number("facet_offset").unwrap_or(0),
            facet_sort: text("facet_sort")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.facet_sort),
            qf: text("qf").map_or(defaults.qf, str::to_string),
        }
    }

    /// Offset of the first result.
    pub fn offset(&self) -> usize {
        page_offset(self.page, self.limit)
    }
}

/// Pagination summary for a result page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Current page, starting at 1.
    pub page: usize,
    /// Total matches.
    pub total_results: usize,
    /// Results per page.
    pub per_page: usize,
}

impl Pagination {
    /// Create a pagination summary.
    pub fn new(page: usize, total_results: usize, per_page: usize) -> Self {
        Self {
            page: page.max(1),
            total_results,
            per_page,
        }
    }

    /// Number of pages (at least 1).
    pub fn total_pages(&self) -> usize {
        if self.per_page == 0 {
            return 1;
        }
        self.total_results.div_ceil(self.per_page).max(1)
    }

    /// Whether a later page exists.
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Whether an earlier page exists.
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}
