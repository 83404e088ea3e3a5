//! Query and parameter construction.
//!
//! The user's query text is made safe for the engine's query parser by
//! replacing field separators, an empty query becomes match-all, and the
//! facet filter is conjoined onto it. Engine parameters are derived from
//! the facet registry and the host options.

use std::str::FromStr;

use sift_core::{FacetSort, Highlighting, MATCH_ALL, ParameterSet, QueryExpression, SearchOptions};

use crate::facets::FacetRegistry;

/// Query parser requested from the engine.
pub const DEF_TYPE: &str = "edismax";

/// Fields highlighted in results.
pub const HIGHLIGHT_FIELDS: &str = "*_t";

/// Minimum count for a facet value to be listed.
pub const FACET_MINCOUNT: usize = 1;

/// Relevance field scope when none is requested.
pub const DEFAULT_QUERY_FIELDS: &str = "text";

/// Result ordering when none is requested.
pub const DEFAULT_SORT: &str = "score desc";

/// A facet paging directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FacetPage {
    /// Advance one facet page.
    Next,
    /// Go back one facet page.
    Prev,
    /// Keep the current offset.
    #[default]
    Stay,
}

impl FacetPage {
    /// Read a directive; anything other than `next`/`prev` is `Stay`.
    pub fn from_param(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "next" => FacetPage::Next,
            "prev" => FacetPage::Prev,
            _ => FacetPage::Stay,
        }
    }

    /// Apply the directive to an offset, stepping by `page_size`.
    ///
    /// `Prev` below one page leaves the offset as it is.
    pub fn apply(self, offset: usize, page_size: usize) -> usize {
        match self {
            FacetPage::Next => offset.saturating_add(page_size),
            FacetPage::Prev if offset >= page_size => offset - page_size,
            FacetPage::Prev | FacetPage::Stay => offset,
        }
    }
}

impl FromStr for FacetPage {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_param(s))
    }
}

/// Build the engine query from the raw query text and facet filter.
///
/// ```
/// use sift_query::build_query;
///
/// assert_eq!(build_query("", None).as_str(), "*:*");
/// assert_eq!(build_query("a:b", None).as_str(), "a b");
/// assert_eq!(build_query("x", Some("tag:foo")).as_str(), "x AND tag:foo");
/// ```
pub fn build_query(raw: &str, facet: Option<&str>) -> QueryExpression {
    let mut query = if raw.trim().is_empty() {
        MATCH_ALL.to_string()
    } else {
        raw.replace(':', " ")
    };

    if let Some(facet) = facet.map(str::trim).filter(|f| !f.is_empty()) {
        query.push_str(" AND ");
        query.push_str(facet);
    }

    QueryExpression::new(query)
}

/// Builds queries and parameter sets against a facet registry.
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder<'a> {
    options: &'a SearchOptions,
    registry: &'a FacetRegistry,
}

impl<'a> QueryBuilder<'a> {
    /// Create a builder.
    pub fn new(options: &'a SearchOptions, registry: &'a FacetRegistry) -> Self {
        Self { options, registry }
    }

    /// See [`build_query`].
    pub fn build_query(&self, raw: &str, facet: Option<&str>) -> QueryExpression {
        build_query(raw, facet)
    }

    /// The facet offset after applying `facet_page`.
    pub fn facet_offset(&self, facet_page: FacetPage, facet_offset: usize) -> usize {
        facet_page.apply(facet_offset, self.options.facet_page_size)
    }

    /// Build the engine parameters.
    pub fn build_parameters(
        &self,
        facet_page: FacetPage,
        facet_offset: usize,
        facet_sort: FacetSort,
        sort: &str,
        query_fields: &str,
    ) -> ParameterSet {
        let sort = if sort.trim().is_empty() {
            DEFAULT_SORT
        } else {
            sort
        };
        let query_fields = if query_fields.trim().is_empty() {
            DEFAULT_QUERY_FIELDS
        } else {
            query_fields
        };

        ParameterSet {
            def_type: DEF_TYPE.to_string(),
            q_alt: MATCH_ALL.to_string(),
            query_fields: query_fields.to_string(),
            facet: true,
            facet_fields: self.registry.active_facet_keys(),
            facet_offset: self.facet_offset(facet_page, facet_offset),
            facet_mincount: FACET_MINCOUNT,
            facet_limit: self.options.facet_limit,
            facet_sort,
            highlighting: Highlighting {
                enabled: self.options.highlight,
                snippets: self.options.highlight_snippets,
                fragsize: self.options.highlight_fragsize,
                fields: HIGHLIGHT_FIELDS.to_string(),
            },
            sort: sort.to_string(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
