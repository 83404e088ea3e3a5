//! Descriptor cache and record-type dispatch.
//!
//! The [`AddonManager`] owns the loaded descriptors. It loads them lazily on
//! first use, keeps them until [`AddonManager::reload`] is called, and
//! dispatches each record to the first descriptor registered for its type.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use sift_core::{Document, Record, Result, document_id};

use crate::descriptor::Descriptor;
use crate::indexer;
use crate::loader;
use crate::source::RecordSource;

/// What indexing a single record amounts to.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordDisposition {
    /// No descriptor handles this record type.
    Unhandled,
    /// A descriptor matched but produced no document (ineligible record or
    /// a descriptor without fields). Any indexed copy under `id` is stale.
    Skipped {
        /// Document id the record would have.
        id: String,
    },
    /// The record maps to this document.
    Indexed(Document),
}

impl RecordDisposition {
    /// The document, if one was produced.
    pub fn into_document(self) -> Option<Document> {
        match self {
            RecordDisposition::Indexed(doc) => Some(doc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct AddonRegistry {
    descriptors: Vec<Descriptor>,
    by_record_type: HashMap<String, usize>,
}

impl AddonRegistry {
    /// Merge descriptors in; an addon with an existing name replaces it.
    fn merge(&mut self, descriptors: Vec<Descriptor>) {
        for descriptor in descriptors {
            match self
                .descriptors
                .iter_mut()
                .find(|existing| existing.name == descriptor.name)
            {
                Some(existing) => *existing = descriptor,
                None => self.descriptors.push(descriptor),
            }
        }
        self.rebuild_index();
    }

    fn rebuild_index(&mut self) {
        self.by_record_type.clear();
        for (i, descriptor) in self.descriptors.iter().enumerate() {
            self.by_record_type
                .entry(descriptor.record_type.clone())
                .or_insert(i);
        }
    }

    /// The descriptor that dispatch selects for each record type, in
    /// registry order.
    fn active(&self) -> Vec<Descriptor> {
        self.descriptors
            .iter()
            .enumerate()
            .filter(|(i, d)| self.by_record_type.get(&d.record_type) == Some(i))
            .map(|(_, d)| d.clone())
            .collect()
    }

    fn find(&self, record_type: &str) -> Option<&Descriptor> {
        self.by_record_type
            .get(record_type)
            .map(|&i| &self.descriptors[i])
    }
}

/// Loads, caches, and dispatches addon descriptors.
#[derive(Debug, Clone, Default)]
pub struct AddonManager {
    addon_dir: Option<PathBuf>,
    registry: Option<AddonRegistry>,
}

impl AddonManager {
    /// A manager that loads descriptors from `addon_dir` on first use.
    pub fn new(addon_dir: impl Into<PathBuf>) -> Self {
        Self {
            addon_dir: Some(addon_dir.into()),
            registry: None,
        }
    }

    /// A manager over a fixed set of descriptors.
    pub fn with_descriptors(descriptors: Vec<Descriptor>) -> Self {
        let mut registry = AddonRegistry::default();
        registry.merge(descriptors);
        Self {
            addon_dir: None,
            registry: Some(registry),
        }
    }

    /// The descriptor directory, if any.
    pub fn addon_dir(&self) -> Option<&Path> {
        self.addon_dir.as_deref()
    }

    /// Whether descriptors have been loaded.
    pub fn is_loaded(&self) -> bool {
        self.registry.is_some()
    }

    /// Register one descriptor programmatically.
    pub fn register(&mut self, descriptor: Descriptor) -> Result<()> {
        self.ensure_loaded()?;
        self.registry
            .get_or_insert_with(AddonRegistry::default)
            .merge(vec![descriptor]);
        Ok(())
    }

    /// Load the descriptor directory and merge it onto the cached set.
    ///
    /// Returns the number of descriptors now cached.
    pub fn parse_all(&mut self) -> Result<usize> {
        let registry = match &self.addon_dir {
            Some(dir) => {
                let loaded = loader::load_dir(dir)?;
                let registry = self.registry.get_or_insert_with(AddonRegistry::default);
                registry.merge(loaded.descriptors);
                registry
            }
            None => self.registry.get_or_insert_with(AddonRegistry::default),
        };
        Ok(registry.descriptors.len())
    }

    /// Drop the cache and load from disk again.
    ///
    /// Managers built from a fixed descriptor set keep their descriptors.
    pub fn reload(&mut self) -> Result<usize> {
        if self.addon_dir.is_some() {
            log::debug!("Reloading addon descriptors");
            self.registry = None;
        }
        self.parse_all()
    }

    /// All cached descriptors in load order, loading if needed.
    pub fn descriptors(&mut self) -> Result<&[Descriptor]> {
        Ok(&self.registry()?.descriptors)
    }

    /// The descriptor handling this record's type.
    pub fn find_addon_for_record(&mut self, record: &Record) -> Result<Option<&Descriptor>> {
        Ok(self.registry()?.find(&record.record_type))
    }

    /// Classify a record against its descriptor.
    pub fn dispose(&mut self, record: &Record) -> Result<RecordDisposition> {
        let Some(descriptor) = self.find_addon_for_record(record)? else {
            return Ok(RecordDisposition::Unhandled);
        };
        if indexer::should_index(record, descriptor)
            && let Some(doc) = indexer::index_record(record, descriptor)
        {
            return Ok(RecordDisposition::Indexed(doc));
        }
        Ok(RecordDisposition::Skipped {
            id: document_id(&record.record_type, record.id),
        })
    }

    /// Map a record to a document, `None` when unhandled or ineligible.
    pub fn index_record(&mut self, record: &Record) -> Result<Option<Document>> {
        Ok(self.dispose(record)?.into_document())
    }

    /// The record's document id, `None` when no descriptor handles it.
    pub fn get_id(&mut self, record: &Record) -> Result<Option<String>> {
        Ok(self
            .find_addon_for_record(record)?
            .map(|_| document_id(&record.record_type, record.id)))
    }

    /// Reload descriptors and map every eligible record from `source`.
    ///
    /// Each record type goes through the same descriptor that
    /// [`AddonManager::dispose`] would pick.
    pub fn reindex_all(&mut self, source: &dyn RecordSource) -> Result<Vec<Document>> {
        self.reload()?;
        let active = self.registry()?.active();
        indexer::index_all(&active, source)
    }

    fn ensure_loaded(&mut self) -> Result<()> {
        if self.registry.is_none() {
            self.parse_all()?;
        }
        Ok(())
    }

    fn registry(&mut self) -> Result<&AddonRegistry> {
        self.ensure_loaded()?;
        Ok(self.registry.get_or_insert_with(AddonRegistry::default))
    }
}

// ============================================================================
// Tests
// ============================================================================
