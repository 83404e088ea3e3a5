//! Query expressions and engine-level search parameters.
//!
//! These are the values that cross the boundary between the query builder
//! and a search client. They are plain data; construction rules live in
//! `sift-query`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::options::FacetSort;

/// The match-all expression.
pub const MATCH_ALL: &str = "*:*";

/// A query string in engine syntax.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryExpression(String);

impl QueryExpression {
    /// Wrap an engine query string.
    pub fn new(expr: impl Into<String>) -> Self {
        Self(expr.into())
    }

    /// The match-all expression.
    pub fn match_all() -> Self {
        Self(MATCH_ALL.to_string())
    }

    /// Whether this is the match-all expression.
    pub fn is_match_all(&self) -> bool {
        self.0 == MATCH_ALL
    }

    /// The raw expression text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Highlighting settings sent with a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlighting {
    /// Whether highlighting is requested at all.
    pub enabled: bool,
    /// Snippets per field.
    pub snippets: usize,
    /// Fragment size in characters.
    pub fragsize: usize,
    /// Field glob to highlight.
    pub fields: String,
}

/// Engine-level parameters for a faceted query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSet {
    /// Query parser (`defType`).
    pub def_type: String,
    /// Alternate query used when the main query is empty (`q.alt`).
    pub q_alt: String,
    /// Relevance query-field scope (`qf`).
    pub query_fields: String,
    /// Whether faceting is enabled.
    pub facet: bool,
    /// Fields to facet on.
    pub facet_fields: Vec<String>,
    /// Offset into each facet's value list.
    pub facet_offset: usize,
    /// Minimum count for a facet value to be returned.
    pub facet_mincount: usize,
    /// Facet values returned per field.
    pub facet_limit: usize,
    /// Ordering of facet values.
    pub facet_sort: FacetSort,
    /// Highlighting settings.
    pub highlighting: Highlighting,
    /// Result ordering, e.g. `score desc`.
    pub sort: String,
}

impl ParameterSet {
    /// Flatten into ordered request parameters.
    ///
    /// `facet.field` is repeated once per facet field.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = vec![
            ("defType".into(), self.def_type.clone()),
            ("q.alt".into(), self.q_alt.clone()),
            ("qf".into(), self.query_fields.clone()),
            ("facet".into(), self.facet.to_string()),
        ];
        for field in &self.facet_fields {
            pairs.push(("facet.field".into(), field.clone()));
        }
        pairs.extend([
            ("facet.offset".into(), self.facet_offset.to_string()),
            ("facet.mincount".into(), self.facet_mincount.to_string()),
            ("facet.limit".into(), self.facet_limit.to_string()),
            ("facet.sort".into(), self.facet_sort.to_string()),
            ("hl".into(), self.highlighting.enabled.to_string()),
            ("hl.snippets".into(), self.highlighting.snippets.to_string()),
            ("hl.fragsize".into(), self.highlighting.fragsize.to_string()),
            ("hl.fl".into(), self.highlighting.fields.clone()),
            ("sort".into(), self.sort.clone()),
        ]);
        pairs
    }
}
