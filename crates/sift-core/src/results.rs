//! Result sets returned by search clients.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::document::Document;

/// One facet value and the number of matching documents carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCount {
    /// The facet value.
    pub value: String,
    /// Number of matching documents.
    pub count: usize,
}

impl FacetCount {
    /// Create a facet count.
    pub fn new(value: impl Into<String>, count: usize) -> Self {
        Self {
            value: value.into(),
            count,
        }
    }
}

/// Outcome of one search request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    /// The page of matched documents.
    pub documents: Vec<Document>,
    /// Total matches reported by the engine (may exceed `documents.len()`).
    pub num_found: usize,
    /// Facet value window per active facet field.
    pub facet_counts: BTreeMap<String, Vec<FacetCount>>,
    /// Highlight snippets keyed by document id, then field.
    pub highlighting: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl ResultSet {
    /// An empty result set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Facet values for one field (empty if the field was not faceted).
    pub fn facet(&self, field: &str) -> &[FacetCount] {
        self.facet_counts
            .get(field)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Highlight snippets for one document and field.
    pub fn snippets(&self, doc_id: &str, field: &str) -> &[String] {
        self.highlighting
            .get(doc_id)
            .and_then(|fields| fields.get(field))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
