//! Sift: addon-driven indexing and faceted search for a CMS.
//!
//! Host records are mapped to search documents by declarative addon
//! descriptors, pushed to a search engine on save and delete, and queried
//! through a faceted results service.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sift::{AddonManager, FacetRegistry, MemoryEngine, SearchOptions, SearchPlugin};
//!
//! let mut plugin = SearchPlugin::new(
//!     Arc::new(MemoryEngine::new()),
//!     AddonManager::new("addons"),
//!     FacetRegistry::open("facets.json")?,
//!     SearchOptions::default(),
//! );
//! plugin.on_install(&fields)?;
//! plugin.on_record_saved(&record).await?;
//! ```
//!
//! # Crates
//!
//! - `sift-core`: records, documents, options, errors
//! - `sift-addon`: descriptors, loading, and record indexing
//! - `sift-client`: engine adapters
//! - `sift-query`: facets, query building, and pagination

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod plugin;

pub use plugin::SearchPlugin;

pub use sift_addon::{
    AddonManager, Descriptor, FieldRole, FieldSpec, MemoryRecordSource, RecordDisposition,
    RecordSource,
};
pub use sift_client::{EngineCall, MemoryEngine, SearchClient, SolrClient, create_search_client};
pub use sift_core::{
    Document, Error, FacetSort, ParameterSet, QueryExpression, Record, Result, ResultSet,
    SearchOptions, document_id,
};
pub use sift_query::{
    FacetDefinition, FacetPage, FacetRegistry, FacetUpdate, IndexableField, Pagination,
    SearchRequest, SearchResponse, build_query, interceptor_url,
};
