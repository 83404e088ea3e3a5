//! Faceted search for Sift.
//!
//! This crate turns a user's search request into an engine query plus
//! parameters, executes it through a [`sift_client::SearchClient`], and
//! paginates the result.
//!
//! # Modules
//!
//! - [`facets`]: The facet registry and its persistence
//! - [`builder`]: Query text and engine parameter construction
//! - [`request`]: Search requests and pagination
//! - [`service`]: Request execution and the search-box interceptor

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod builder;
pub mod facets;
pub mod request;
pub mod service;

// Re-export key types at crate root for convenience
pub use builder::{FacetPage, QueryBuilder, build_query};
pub use facets::{FacetDefinition, FacetRegistry, FacetUpdate, IndexableField};
pub use request::{Pagination, SearchRequest, page_offset};
pub use service::{ResultsService, SearchResponse, interceptor_url};
