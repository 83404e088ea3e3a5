//! Sift Core: shared types, options, and errors.
//!
//! This crate provides the foundational types used across all Sift crates.
//! It has no internal Sift dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`options`]: Host-provided search options
//! - [`record`]: Host records and attribute path lookup
//! - [`document`]: Engine documents and document identifiers
//! - [`query`]: Query expressions and engine parameters
//! - [`results`]: Result sets and facet counts

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod document;
pub mod error;
pub mod options;
pub mod query;
pub mod record;
pub mod results;

// Re-export key types at crate root for convenience
pub use document::{Document, document_id, parse_document_id};
pub use error::{Error, Result};
pub use options::{FacetSort, SearchOptions};
pub use query::{Highlighting, MATCH_ALL, ParameterSet, QueryExpression};
pub use record::Record;
pub use results::{FacetCount, ResultSet};
