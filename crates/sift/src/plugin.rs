//! Host lifecycle hooks.
//!
//! [`SearchPlugin`] is what the host calls into: install and uninstall,
//! record saves and deletes, the admin reindex and facet edit, and search.
//!
//! Save and delete hooks run inside the host's own write path, so any
//! failure there is logged and ignored. Uninstall ignores an unavailable
//! engine. The admin reindex and search surface failures to the caller.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use sift_addon::{AddonManager, RecordDisposition, RecordSource};
use sift_client::SearchClient;
use sift_core::{Document, MATCH_ALL, Record, Result, SearchOptions};
use sift_query::{
    FacetRegistry, FacetUpdate, IndexableField, ResultsService, SearchRequest, SearchResponse,
};

/// The search plugin as seen by the host.
pub struct SearchPlugin {
    client: Arc<dyn SearchClient>,
    addons: AddonManager,
    facets: FacetRegistry,
    options: SearchOptions,
    options_path: Option<PathBuf>,
}

impl SearchPlugin {
    /// Assemble a plugin from its parts.
    pub fn new(
        client: Arc<dyn SearchClient>,
        addons: AddonManager,
        facets: FacetRegistry,
        options: SearchOptions,
    ) -> Self {
        Self {
            client,
            addons,
            facets,
            options,
            options_path: None,
        }
    }

    /// Persist options to `path` on install and remove them on uninstall.
    pub fn with_options_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.options_path = Some(path.into());
        self
    }

    /// Current options.
    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// The facet registry.
    pub fn facets(&self) -> &FacetRegistry {
        &self.facets
    }

    /// The addon manager.
    pub fn addons_mut(&mut self) -> &mut AddonManager {
        &mut self.addons
    }

    /// The search client.
    pub fn client(&self) -> &dyn SearchClient {
        self.client.as_ref()
    }

    // ------------------------------------------------------------------------
    // Install / uninstall
    // ------------------------------------------------------------------------

    /// Seed the facet registry and write the options.
    pub fn on_install(&mut self, fields: &[IndexableField]) -> Result<()> {
        self.facets.install_defaults(fields);
        self.facets.save()?;
        if let Some(path) = &self.options_path {
            self.options.save(path)?;
            log::info!("Wrote search options to {}", path.display());
        }
        Ok(())
    }

    /// Drop the facet table, clear the index, and remove the options.
    ///
    /// An unreachable engine does not stop the uninstall.
    pub async fn on_uninstall(&mut self) -> Result<()> {
        self.facets.drop_table()?;

        let cleared = async {
            self.client.delete_by_query(MATCH_ALL).await?;
            self.client.commit().await?;
            self.client.optimize().await
        }
        .await;
        suppress_engine_error("clearing the index", cleared)?;

        if let Some(path) = &self.options_path {
            SearchOptions::remove(path)?;
        }
        log::info!("Search plugin uninstalled");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Record hooks
    // ------------------------------------------------------------------------

    /// Index a saved record, or remove its stale document if it is no
    /// longer eligible.
    ///
    /// Never fails the host's save: every error is logged and dropped.
    pub async fn on_record_saved(&mut self, record: &Record) -> Result<()> {
        let disposition = match self.addons.dispose(record) {
            Ok(disposition) => disposition,
            Err(e) => return contain_hook_error("resolving the addon for a saved record", Err(e)),
        };
        match disposition {
            RecordDisposition::Unhandled => Ok(()),
            RecordDisposition::Indexed(doc) => {
                log::debug!("Indexing {}", doc.id());
                let result = self.add_and_commit(std::slice::from_ref(&doc)).await;
                contain_hook_error("indexing a saved record", result)
            }
            RecordDisposition::Skipped { id } => {
                log::debug!("{id} is not indexable, removing any stale copy");
                let result = self.delete_and_commit(&id).await;
                contain_hook_error("removing a stale document", result)
            }
        }
    }

    /// Remove a deleted record's document.
    ///
    /// Never fails the host's delete: every error is logged and dropped.
    pub async fn on_record_deleted(&mut self, record: &Record) -> Result<()> {
        let id = match self.addons.get_id(record) {
            Ok(Some(id)) => id,
            Ok(None) => return Ok(()),
            Err(e) => {
                return contain_hook_error("resolving the addon for a deleted record", Err(e));
            }
        };
        log::debug!("Removing {id}");
        let result = self.delete_and_commit(&id).await;
        contain_hook_error("removing a deleted record", result)
    }

    // ------------------------------------------------------------------------
    // Admin operations
    // ------------------------------------------------------------------------

    /// Rebuild the whole index from `source`.
    ///
    /// Descriptors are reloaded first. Returns the number of documents
    /// indexed. Every failure is returned.
    pub async fn reindex(&mut self, source: &dyn RecordSource) -> Result<usize> {
        let docs = self.addons.reindex_all(source)?;
        log::info!("Reindexing {} document(s)", docs.len());

        self.client.delete_by_query(MATCH_ALL).await?;
        self.add_and_commit(&docs).await?;
        Ok(docs.len())
    }

    /// Apply admin facet edits and persist them.
    pub fn update_facets(&mut self, updates: &[FacetUpdate]) -> Result<usize> {
        let updated = self.facets.bulk_update(updates)?;
        self.facets.save()?;
        Ok(updated)
    }

    // ------------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------------

    /// Execute a search request.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        ResultsService::new(self.client.as_ref(), &self.facets, &self.options)
            .search(request)
            .await
    }

    /// Execute a search from query-string parameters.
    pub async fn search_params(&self, params: &BTreeMap<String, String>) -> Result<SearchResponse> {
        let request = SearchRequest::from_params(params, &self.options);
        self.search(&request).await
    }

    async fn add_and_commit(&self, docs: &[Document]) -> Result<()> {
        self.client.add_documents(docs).await?;
        self.client.commit().await?;
        self.client.optimize().await
    }

    async fn delete_and_commit(&self, id: &str) -> Result<()> {
        self.client.delete_by_id(id).await?;
        self.client.commit().await?;
        self.client.optimize().await
    }
}

impl std::fmt::Debug for SearchPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchPlugin")
            .field("client", &self.client.name())
            .field("facets", &self.facets.len())
            .field("options_path", &self.options_path)
            .finish()
    }
}

/// Log and drop engine errors; anything else is returned.
fn suppress_engine_error(context: &str, result: Result<()>) -> Result<()> {
    match result {
        Err(e) if e.is_engine_unavailable() => {
            log::warn!("Search engine error while {context}: {e}");
            Ok(())
        }
        other => other,
    }
}

/// Log any error from a record hook and report success to the host.
fn contain_hook_error(context: &str, result: Result<()>) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.is_engine_unavailable() => {
            log::warn!("Search engine error while {context}: {e}");
            Ok(())
        }
        Err(e) => {
            log::error!("Failed {context}: {e}");
            Ok(())
        }
    }
}
