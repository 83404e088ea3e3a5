//! The search client trait and factory.
//!
//! This module defines the `SearchClient` trait that every engine adapter
//! must satisfy. The indexing hooks and the results service talk to the
//! engine only through it.
//!
//! # Clients
//!
//! - `SolrClient`: HTTP adapter for a Solr core
//! - `MemoryEngine`: in-process engine for tests and dry runs
//!
//! # Example
//!
//! ```rust,ignore
//! use sift_client::{create_search_client, SearchClient};
//! use sift_core::{QueryExpression, SearchOptions};
//!
//! let client = create_search_client(&SearchOptions::default(), false)?;
//! client.add_documents(&docs).await?;
//! client.commit().await?;
//! let results = client.search(&QueryExpression::match_all(), 0, 10, &params).await?;
//! ```

use async_trait::async_trait;
use sift_core::{Document, ParameterSet, QueryExpression, Result, ResultSet, SearchOptions};

use crate::memory::MemoryEngine;
use crate::solr::SolrClient;

/// Abstract search engine adapter.
///
/// Writes are not visible to `search` until `commit` succeeds. All failures
/// surface as [`sift_core::Error::Engine`].
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Add or replace documents, keyed by document id.
    async fn add_documents(&self, docs: &[Document]) -> Result<()>;

    /// Delete the document with this id. Unknown ids are not an error.
    async fn delete_by_id(&self, id: &str) -> Result<()>;

    /// Delete every document matching `query`.
    async fn delete_by_query(&self, query: &str) -> Result<()>;

    /// Make pending writes visible.
    async fn commit(&self) -> Result<()>;

    /// Compact the index.
    async fn optimize(&self) -> Result<()>;

    /// Run a query, returning `limit` documents starting at `offset`.
    async fn search(
        &self,
        query: &QueryExpression,
        offset: usize,
        limit: usize,
        params: &ParameterSet,
    ) -> Result<ResultSet>;

    /// Client name for diagnostics.
    fn name(&self) -> &str;
}

/// Create a search client for the configured engine.
///
/// With `in_memory` set, an empty [`MemoryEngine`] is returned instead of an
/// HTTP client.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn create_search_client(
    options: &SearchOptions,
    in_memory: bool,
) -> Result<Box<dyn SearchClient>> {
    if in_memory {
        log::debug!("Using in-memory search engine");
        return Ok(Box::new(MemoryEngine::new()));
    }
    let client = SolrClient::new(options)?;
    log::debug!("Using Solr at {}", client.base_url());
    Ok(Box::new(client))
}
