//! Integration tests for the results path.

use std::collections::BTreeMap;
use std::sync::Arc;

use sift::{FacetPage, FacetUpdate, MemoryRecordSource, SearchRequest, interceptor_url};

use crate::common::{TestHarness, UnreachableEngine, build_plugin, public_item};

fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

async fn indexed_harness() -> TestHarness {
    let mut harness = TestHarness::installed();
    let mut records = Vec::new();
    for id in 1..=15 {
        let tags: &[&str] = if id % 3 == 0 { &["maps", "virginia"] } else { &["letters"] };
        records.push(public_item(id, &format!("Document {id} of Albemarle"), tags));
    }
    harness
        .plugin
        .reindex(&MemoryRecordSource::new(records))
        .await
        .unwrap();
    harness
}

#[tokio::test]
async fn test_empty_query_matches_everything() {
    let harness = indexed_harness().await;
    let response = harness.plugin.search_params(&BTreeMap::new()).await.unwrap();

    assert_eq!(response.query.as_str(), "*:*");
    assert_eq!(response.results.num_found, 15);
    assert_eq!(response.results.documents.len(), 10);
    assert_eq!(response.pagination.total_pages(), 2);
}

#[tokio::test]
async fn test_second_page() {
    let harness = indexed_harness().await;
    let response = harness
        .plugin
        .search_params(&params(&[("page", "2")]))
        .await
        .unwrap();
    assert_eq!(response.results.documents.len(), 5);
    assert!(!response.pagination.has_next());
}

#[tokio::test]
async fn test_colons_in_query_are_neutralized() {
    let harness = indexed_harness().await;
    let response = harness
        .plugin
        .search_params(&params(&[("q", "title_t:albemarle")]))
        .await
        .unwrap();
    assert_eq!(response.query.as_str(), "title_t albemarle");
}

#[tokio::test]
async fn test_facet_filter_and_counts() {
    let harness = indexed_harness().await;
    let response = harness
        .plugin
        .search_params(&params(&[("q", "albemarle"), ("facet", "tag:\"virginia\"")]))
        .await
        .unwrap();

    assert_eq!(response.query.as_str(), "albemarle AND tag:\"virginia\"");
    assert_eq!(response.results.num_found, 5);

    let tags = response.results.facet("tag");
    assert_eq!(tags[0].value, "maps");
    assert_eq!(tags[0].count, 5);
    assert_eq!(response.results.facet("collection")[0].count, 5);
}

#[tokio::test]
async fn test_highlighting() {
    let harness = indexed_harness().await;
    let response = harness
        .plugin
        .search_params(&params(&[("q", "albemarle"), ("limit", "1")]))
        .await
        .unwrap();

    let doc_id = response.results.documents[0].id().to_string();
    let snippets = response.results.snippets(&doc_id, "title_t");
    assert_eq!(snippets.len(), 1);
    assert!(snippets[0].contains("<em>Albemarle</em>"));
}

#[tokio::test]
async fn test_disabled_facet_is_not_counted() {
    let mut harness = indexed_harness().await;
    let tag = harness.plugin.facets().by_name("tag").unwrap().id;
    harness
        .plugin
        .update_facets(&[FacetUpdate::new(tag, "Tag", true, false)])
        .unwrap();

    let response = harness.plugin.search_params(&BTreeMap::new()).await.unwrap();
    assert!(!response.results.facet_counts.contains_key("tag"));
    assert!(response.results.facet_counts.contains_key("resulttype"));
}

#[tokio::test]
async fn test_facet_paging() {
    let harness = indexed_harness().await;
    let options = harness.plugin.options().clone();

    let mut request = SearchRequest::new("", &options);
    request.facet_page = FacetPage::Next;
    assert_eq!(harness.plugin.search(&request).await.unwrap().facet_offset, 10);

    request.facet_page = FacetPage::Prev;
    request.facet_offset = 10;
    assert_eq!(harness.plugin.search(&request).await.unwrap().facet_offset, 0);

    request.facet_offset = 0;
    assert_eq!(harness.plugin.search(&request).await.unwrap().facet_offset, 0);
}

#[tokio::test]
async fn test_search_surfaces_engine_errors() {
    let harness = TestHarness::new();
    let plugin = build_plugin(harness.dir.path(), Arc::new(UnreachableEngine));
    let err = plugin.search_params(&BTreeMap::new()).await.unwrap_err();
    assert!(err.is_engine_unavailable());
}

#[test]
fn test_interceptor_redirect() {
    assert_eq!(interceptor_url("civil war"), "solr-search?q=civil+war");
}
