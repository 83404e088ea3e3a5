//! The results service: request in, page of results out.

use sift_client::SearchClient;
use sift_core::{QueryExpression, Result, ResultSet, SearchOptions};

use crate::builder::QueryBuilder;
use crate::facets::FacetRegistry;
use crate::request::{Pagination, SearchRequest};

/// Path of the results page.
pub const RESULTS_PATH: &str = "solr-search";

/// The results page URL for a query typed into the host's simple search box.
pub fn interceptor_url(query: &str) -> String {
    let encoded = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("q", query)
        .finish();
    format!("{RESULTS_PATH}?{encoded}")
}

/// One executed search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResponse {
    /// The query sent to the engine.
    pub query: QueryExpression,
    /// Engine results.
    pub results: ResultSet,
    /// Pagination summary.
    pub pagination: Pagination,
    /// Facet offset the results were fetched with.
    pub facet_offset: usize,
}

/// Executes search requests against a client.
pub struct ResultsService<'a> {
    client: &'a dyn SearchClient,
    builder: QueryBuilder<'a>,
}

impl<'a> ResultsService<'a> {
    /// Create a service.
    pub fn new(
        client: &'a dyn SearchClient,
        registry: &'a FacetRegistry,
        options: &'a SearchOptions,
    ) -> Self {
        Self {
            client,
            builder: QueryBuilder::new(options, registry),
        }
    }

    /// Build, execute, and paginate a request.
    ///
    /// Engine failures are returned to the caller.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let query = self.builder.build_query(&request.q, request.facet.as_deref());
        let params = self.builder.build_parameters(
            request.facet_page,
            request.facet_offset,
            request.facet_sort,
            &request.sort,
            &request.qf,
        );

        log::debug!(
            "Searching {} for '{}' (page {}, facet offset {})",
            self.client.name(),
            query,
            request.page,
            params.facet_offset
        );

        let results = self
            .client
            .search(&query, request.offset(), request.limit, &params)
            .await?;

        Ok(SearchResponse {
            pagination: Pagination::new(request.page, results.num_found, request.limit),
            facet_offset: params.facet_offset,
            query,
            results,
        })
    }
}

impl std::fmt::Debug for ResultsService<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultsService")
            .field("client", &self.client.name())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::FacetPage;
    use crate::facets::IndexableField;
    use async_trait::async_trait;
    use sift_client::MemoryEngine;
    use sift_core::{Document, Error, ParameterSet};

    fn corpus() -> MemoryEngine {
        let docs = (1..=12).map(|i| {
            let mut doc = Document::for_record("Item", i);
            doc.add_value("title_t", format!("Map number {i}"));
            doc.add_value("text", format!("Map number {i}"));
            doc.add_value("tag", if i % 2 == 0 { "even" } else { "odd" });
            doc.add_value("resulttype", "Item");
            doc
        });
        MemoryEngine::with_documents(docs)
    }

    fn registry() -> FacetRegistry {
        let mut registry = FacetRegistry::new();
        registry.install_defaults(&[IndexableField::new(50, "Title", "Dublin Core")]);
        registry
    }

    #[test]
    fn test_interceptor_url() {
        assert_eq!(interceptor_url("map"), "solr-search?q=map");
        assert_eq!(
            interceptor_url("old maps & charts"),
            "solr-search?q=old+maps+%26+charts"
        );
        assert_eq!(interceptor_url(""), "solr-search?q=");
    }

    #[tokio::test]
    async fn test_search_paginates() {
        let engine = corpus();
        let registry = registry();
        let options = SearchOptions::default();
        let service = ResultsService::new(&engine, &registry, &options);

        let request = SearchRequest::new("map", &options).with_page(2);
        let response = service.search(&request).await.unwrap();

        assert_eq!(response.query.as_str(), "map");
        assert_eq!(response.results.num_found, 12);
        assert_eq!(response.results.documents.len(), 2);
        assert_eq!(response.pagination, Pagination::new(2, 12, 10));
        assert_eq!(response.pagination.total_pages(), 2);
    }

    #[tokio::test]
    async fn test_search_applies_facet_filter_and_counts() {
        let engine = corpus();
        let registry = registry();
        let options = SearchOptions::default();
        let service = ResultsService::new(&engine, &registry, &options);

        let request = SearchRequest::new("", &options).with_facet("tag:even");
        let response = service.search(&request).await.unwrap();
        assert_eq!(response.query.as_str(), "*:* AND tag:even");
        assert_eq!(response.results.num_found, 6);
        assert_eq!(response.results.facet("tag")[0].value, "even");
    }

    #[tokio::test]
    async fn test_search_reports_facet_offset() {
        let engine = corpus();
        let registry = registry();
        let options = SearchOptions::default();
        let service = ResultsService::new(&engine, &registry, &options);

        let mut request = SearchRequest::new("", &options);
        request.facet_page = FacetPage::Next;
        let response = service.search(&request).await.unwrap();
        assert_eq!(response.facet_offset, 10);
        assert!(response.results.facet("tag").is_empty());
    }

    #[tokio::test]
    async fn test_search_with_max_facet_offset() {
        let engine = corpus();
        let registry = registry();
        let options = SearchOptions::default();
        let service = ResultsService::new(&engine, &registry, &options);

        let params = [
            ("facet_offset".to_string(), usize::MAX.to_string()),
            ("facet_page".to_string(), "next".to_string()),
        ]
        .into_iter()
        .collect();
        let request = SearchRequest::from_params(&params, &options);
        let response = service.search(&request).await.unwrap();
        assert_eq!(response.facet_offset, usize::MAX);
        assert!(response.results.facet("tag").is_empty());
        assert_eq!(response.results.num_found, 12);
    }

    #[tokio::test]
    async fn test_search_propagates_engine_errors() {
        struct Down;

        #[async_trait]
        impl SearchClient for Down {
            async fn add_documents(&self, _: &[Document]) -> Result<()> {
                Err(Error::engine("down"))
            }
            async fn delete_by_id(&self, _: &str) -> Result<()> {
                Err(Error::engine("down"))
            }
            async fn delete_by_query(&self, _: &str) -> Result<()> {
                Err(Error::engine("down"))
            }
            async fn commit(&self) -> Result<()> {
                Err(Error::engine("down"))
            }
            async fn optimize(&self) -> Result<()> {
                Err(Error::engine("down"))
            }
            async fn search(
                &self,
                _: &QueryExpression,
                _: usize,
                _: usize,
                _: &ParameterSet,
            ) -> Result<ResultSet> {
                Err(Error::engine("down"))
            }
            fn name(&self) -> &str {
                "down"
            }
        }

        let registry = registry();
        let options = SearchOptions::default();
        let service = ResultsService::new(&Down, &registry, &options);
        let err = service
            .search(&SearchRequest::new("map", &options))
            .await
            .unwrap_err();
        assert!(err.is_engine_unavailable());
    }
}
