//! Integration tests for the record save and delete hooks.

use serde_json::json;
use sift::{EngineCall, Record};

use crate::common::{TestHarness, private_item, public_item, write_addons};

#[tokio::test]
async fn test_saved_public_record_is_indexed() {
    let mut harness = TestHarness::installed();
    let record = public_item(12, "Map of Albemarle", &["maps", "virginia"]);

    harness.plugin.on_record_saved(&record).await.unwrap();

    let doc = harness.engine.get("Item_12").expect("document indexed");
    assert_eq!(doc.first("model"), Some("Item"));
    assert_eq!(doc.first("modelid"), Some("12"));
    assert_eq!(doc.first("resulttype"), Some("Item"));
    assert_eq!(doc.first("title_t"), Some("Map of Albemarle"));
    assert_eq!(doc.first("50_s"), Some("Map of Albemarle"));
    assert_eq!(doc.first("collection"), Some("Atlases"));
    assert_eq!(doc.first("itemtype"), Some("Still Image"));
    assert_eq!(doc.values("tag"), ["maps", "virginia"]);

    assert_eq!(
        harness.engine.calls(),
        vec![
            EngineCall::AddDocuments(vec!["Item_12".into()]),
            EngineCall::Commit,
            EngineCall::Optimize,
        ]
    );
}

#[tokio::test]
async fn test_resave_upserts() {
    let mut harness = TestHarness::installed();
    harness
        .plugin
        .on_record_saved(&public_item(1, "Draft title", &[]))
        .await
        .unwrap();
    harness
        .plugin
        .on_record_saved(&public_item(1, "Final title", &[]))
        .await
        .unwrap();

    assert_eq!(harness.engine.len(), 1);
    let doc = harness.engine.get("Item_1").unwrap();
    assert_eq!(doc.first("title_t"), Some("Final title"));
}

#[tokio::test]
async fn test_private_record_is_not_indexed_but_has_id() {
    let mut harness = TestHarness::installed();
    let record = private_item(5);

    assert!(harness.plugin.addons_mut().index_record(&record).unwrap().is_none());
    assert_eq!(
        harness.plugin.addons_mut().get_id(&record).unwrap().as_deref(),
        Some("Item_5")
    );

    harness.plugin.on_record_saved(&record).await.unwrap();
    assert!(harness.engine.is_empty());
}

#[tokio::test]
async fn test_saving_ineligible_record_removes_stale_document() {
    let mut harness = TestHarness::installed();
    harness
        .plugin
        .on_record_saved(&public_item(3, "Public map", &[]))
        .await
        .unwrap();
    assert!(harness.engine.contains("Item_3"));

    // The same record made private.
    let record = public_item(3, "Public map", &[]).with_attribute("public", json!(false));
    harness.plugin.on_record_saved(&record).await.unwrap();

    assert!(!harness.engine.contains("Item_3"));
    assert!(
        harness
            .engine
            .calls()
            .contains(&EngineCall::DeleteById("Item_3".into()))
    );
}

#[tokio::test]
async fn test_unhandled_record_type_is_ignored() {
    let mut harness = TestHarness::installed();
    let record = Record::new("Collection", 1).with_attribute("public", json!(true));

    harness.plugin.on_record_saved(&record).await.unwrap();
    harness.plugin.on_record_deleted(&record).await.unwrap();

    assert!(harness.engine.calls().is_empty());
    assert!(harness.plugin.addons_mut().get_id(&record).unwrap().is_none());
}

#[tokio::test]
async fn test_index_then_delete_leaves_no_document() {
    let mut harness = TestHarness::installed();
    let record = public_item(8, "Survey", &["surveys"]);

    harness.plugin.on_record_saved(&record).await.unwrap();
    assert!(harness.engine.contains("Item_8"));

    harness.plugin.on_record_deleted(&record).await.unwrap();
    assert!(!harness.engine.contains("Item_8"));
    assert!(harness.engine.is_empty());
}

#[tokio::test]
async fn test_ids_are_distinct_across_record_types() {
    let mut harness = TestHarness::installed();
    let item = public_item(1, "Map", &[]);
    let exhibit = Record::new("Exhibit", 1)
        .with_attribute("public", json!(1))
        .with_attribute("title", json!("Maps of Virginia"));

    harness.plugin.on_record_saved(&item).await.unwrap();
    harness.plugin.on_record_saved(&exhibit).await.unwrap();

    assert_eq!(harness.engine.ids(), vec!["Exhibit_1", "Item_1"]);
    assert_eq!(
        harness.engine.get("Exhibit_1").unwrap().first("resulttype"),
        Some("Exhibit")
    );
}

#[tokio::test]
async fn test_malformed_descriptor_file_is_skipped() {
    let mut harness = TestHarness::installed();
    write_addons(&harness.path("addons"), "00-broken.json", "{ \"pages\": [");
    harness.plugin.addons_mut().reload().unwrap();

    harness
        .plugin
        .on_record_saved(&public_item(2, "Still indexed", &[]))
        .await
        .unwrap();
    assert!(harness.engine.contains("Item_2"));
}

#[tokio::test]
async fn test_missing_addon_directory_does_not_fail_hooks() {
    let mut harness = TestHarness::installed();
    std::fs::remove_dir_all(harness.path("addons")).unwrap();

    let record = public_item(1, "Map", &[]);
    harness.plugin.on_record_saved(&record).await.unwrap();
    harness.plugin.on_record_deleted(&record).await.unwrap();

    assert!(harness.engine.calls().is_empty());
    assert!(harness.plugin.addons_mut().index_record(&record).is_err());
}
