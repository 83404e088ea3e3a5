//! Common test utilities and harness for Sift integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use sift::{
    AddonManager, Document, Error, FacetRegistry, IndexableField, MemoryEngine, ParameterSet,
    QueryExpression, Record, Result, ResultSet, SearchClient, SearchOptions, SearchPlugin,
};
use tempfile::TempDir;

/// Descriptor file used by most tests.
pub const ADDONS_JSON: &str = r#"{
    "items": {
        "record_type": "Item",
        "flag": "public",
        "tagged": true,
        "fields": [
            {"name": "title", "path": "title"},
            {"name": "50", "path": "elements.50", "role": "facet"},
            {"name": "collection", "path": "collection.name", "role": "display"},
            {"name": "itemtype", "literal": "Still Image", "role": "display"}
        ]
    },
    "exhibits": {
        "record_type": "Exhibit",
        "result_type": "Exhibit",
        "flag": "public",
        "fields": ["title"]
    }
}"#;

/// Test harness: a plugin over an in-memory engine in a scratch directory.
pub struct TestHarness {
    /// Scratch directory holding addons, facets, and options.
    pub dir: TempDir,
    /// The engine, shared with the plugin.
    pub engine: Arc<MemoryEngine>,
    /// The plugin under test.
    pub plugin: SearchPlugin,
}

impl TestHarness {
    /// A harness with the standard descriptors, not yet installed.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        write_addons(&dir.path().join("addons"), "items.json", ADDONS_JSON);
        let engine = Arc::new(MemoryEngine::new());
        let plugin = build_plugin(dir.path(), engine.clone());
        Self { dir, engine, plugin }
    }

    /// A harness that has also run the install hook.
    pub fn installed() -> Self {
        let mut harness = Self::new();
        harness.plugin.on_install(&fields()).unwrap();
        harness
    }

    /// Path of a file in the scratch directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// Build a plugin rooted at `root` around any client.
pub fn build_plugin(root: &Path, client: Arc<dyn SearchClient>) -> SearchPlugin {
    SearchPlugin::new(
        client,
        AddonManager::new(root.join("addons")),
        FacetRegistry::open(root.join("facets.json")).unwrap(),
        SearchOptions::default(),
    )
    .with_options_path(root.join("sift.toml"))
}

/// Write one descriptor file.
pub fn write_addons(dir: &Path, name: &str, content: &str) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join(name), content).unwrap();
}

/// The host's indexable fields.
pub fn fields() -> Vec<IndexableField> {
    vec![
        IndexableField::new(50, "Title", "Dublin Core"),
        IndexableField::new(41, "Description", "Dublin Core"),
    ]
}

/// A public item titled `title` with the given tags.
pub fn public_item(id: u64, title: &str, tags: &[&str]) -> Record {
    Record::new("Item", id)
        .with_attribute("public", json!(true))
        .with_attribute("title", json!(title))
        .with_attribute("elements", json!({"50": [title]}))
        .with_attribute("collection", json!({"name": "Atlases"}))
        .with_tags(tags.iter().copied())
}

/// A private item.
pub fn private_item(id: u64) -> Record {
    Record::new("Item", id)
        .with_attribute("public", json!(false))
        .with_attribute("title", json!("Hidden"))
}

/// A client whose every call fails as an unreachable engine would.
#[derive(Debug, Default)]
pub struct UnreachableEngine;

#[async_trait]
impl SearchClient for UnreachableEngine {
    async fn add_documents(&self, _docs: &[Document]) -> Result<()> {
        Err(Error::engine("connection refused"))
    }

    async fn delete_by_id(&self, _id: &str) -> Result<()> {
        Err(Error::engine("connection refused"))
    }

    async fn delete_by_query(&self, _query: &str) -> Result<()> {
        Err(Error::engine("connection refused"))
    }

    async fn commit(&self) -> Result<()> {
        Err(Error::engine("connection refused"))
    }

    async fn optimize(&self) -> Result<()> {
        Err(Error::engine("connection refused"))
    }

    async fn search(
        &self,
        _query: &QueryExpression,
        _offset: usize,
        _limit: usize,
        _params: &ParameterSet,
    ) -> Result<ResultSet> {
        Err(Error::engine("connection refused"))
    }

    fn name(&self) -> &str {
        "unreachable"
    }
}
