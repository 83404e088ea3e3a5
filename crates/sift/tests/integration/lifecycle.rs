//! Integration tests for install, uninstall, reindex, and facet edits.

use std::sync::Arc;

use sift::{EngineCall, FacetRegistry, FacetUpdate, MemoryRecordSource, SearchOptions};

use crate::common::{TestHarness, UnreachableEngine, build_plugin, fields, private_item, public_item};

#[test]
fn test_install_seeds_facets_and_options() {
    let harness = TestHarness::installed();

    let facets = harness.plugin.facets();
    assert_eq!(facets.len(), 4 + fields().len());
    assert!(facets.all().iter().all(|f| f.is_displayed && f.is_facet));
    for name in ["tag", "collection", "itemtype", "resulttype", "50_s", "41_s"] {
        assert!(facets.by_name(name).is_some(), "missing facet {name}");
    }

    let persisted = FacetRegistry::open(harness.path("facets.json")).unwrap();
    assert_eq!(persisted.all(), facets.all());

    let options = SearchOptions::from_file(&harness.path("sift.toml")).unwrap();
    assert_eq!(options, SearchOptions::default());
}

#[tokio::test]
async fn test_uninstall_clears_everything() {
    let mut harness = TestHarness::installed();
    harness
        .plugin
        .on_record_saved(&public_item(1, "Map", &[]))
        .await
        .unwrap();

    harness.plugin.on_uninstall().await.unwrap();

    assert!(harness.plugin.facets().is_empty());
    assert!(!harness.path("facets.json").exists());
    assert!(!harness.path("sift.toml").exists());
    assert!(harness.engine.is_empty());

    let calls = harness.engine.calls();
    assert_eq!(
        calls[calls.len() - 3..],
        [
            EngineCall::DeleteByQuery("*:*".into()),
            EngineCall::Commit,
            EngineCall::Optimize,
        ]
    );
}

#[tokio::test]
async fn test_uninstall_tolerates_unreachable_engine() {
    let harness = TestHarness::new();
    let mut plugin = build_plugin(harness.dir.path(), Arc::new(UnreachableEngine));
    plugin.on_install(&fields()).unwrap();

    plugin.on_uninstall().await.unwrap();
    assert!(!harness.path("facets.json").exists());
    assert!(!harness.path("sift.toml").exists());
}

#[tokio::test]
async fn test_write_hooks_tolerate_unreachable_engine() {
    let harness = TestHarness::new();
    let mut plugin = build_plugin(harness.dir.path(), Arc::new(UnreachableEngine));
    plugin.on_install(&fields()).unwrap();

    plugin
        .on_record_saved(&public_item(1, "Map", &[]))
        .await
        .unwrap();
    plugin.on_record_saved(&private_item(2)).await.unwrap();
    plugin
        .on_record_deleted(&public_item(1, "Map", &[]))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_reindex_replaces_index() {
    let mut harness = TestHarness::installed();
    harness
        .plugin
        .on_record_saved(&public_item(99, "Orphan", &[]))
        .await
        .unwrap();

    let source = MemoryRecordSource::new(vec![
        public_item(1, "Map", &["maps"]),
        private_item(2),
        public_item(3, "Chart", &[]),
    ]);
    let count = harness.plugin.reindex(&source).await.unwrap();

    assert_eq!(count, 2);
    assert_eq!(harness.engine.ids(), vec!["Item_1", "Item_3"]);
}

#[tokio::test]
async fn test_reindex_surfaces_engine_errors() {
    let harness = TestHarness::new();
    let mut plugin = build_plugin(harness.dir.path(), Arc::new(UnreachableEngine));
    let source = MemoryRecordSource::new(vec![public_item(1, "Map", &[])]);

    let err = plugin.reindex(&source).await.unwrap_err();
    assert!(err.is_engine_unavailable());
}

#[test]
fn test_update_facets_persists() {
    let mut harness = TestHarness::installed();
    let tag = harness.plugin.facets().by_name("tag").unwrap().id;

    let updated = harness
        .plugin
        .update_facets(&[FacetUpdate::new(tag, "Keyword", true, false)])
        .unwrap();
    assert_eq!(updated, 1);

    let persisted = FacetRegistry::open(harness.path("facets.json")).unwrap();
    let facet = persisted.get(tag).unwrap();
    assert_eq!(facet.label, "Keyword");
    assert_eq!(facet.original_label, "Tag");
    assert!(!facet.is_facet);
    assert!(!persisted.active_facet_keys().contains(&"tag".to_string()));
}

#[test]
fn test_update_facets_rejects_unknown_id() {
    let mut harness = TestHarness::installed();
    assert!(
        harness
            .plugin
            .update_facets(&[FacetUpdate::new(4242, "Nope", true, true)])
            .is_err()
    );
}
