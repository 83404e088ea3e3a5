//! HTTP adapter for a Solr core.
//!
//! Writes go to `{base}update/json` as JSON update commands; queries go to
//! `{base}select` with `wt=json`. Every request carries the configured
//! timeout so an unreachable engine fails fast instead of stalling the host.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::{Value, json};

use sift_core::{
    Document, Error, FacetCount, ParameterSet, QueryExpression, Result, ResultSet, SearchOptions,
};

use crate::client::SearchClient;

/// Solr [`SearchClient`].
#[derive(Debug, Clone)]
pub struct SolrClient {
    http: reqwest::Client,
    base: Url,
}

impl SolrClient {
    /// Build a client for the core described by `options`.
    pub fn new(options: &SearchOptions) -> Result<Self> {
        let base = Url::parse(&options.base_url())
            .map_err(|e| Error::config(format!("invalid engine URL: {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(options.request_timeout_secs))
            .build()
            .map_err(|e| Error::engine_with_source("failed to build HTTP client", e))?;
        Ok(Self { http, base })
    }

    /// The core's base URL.
    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| Error::config(format!("invalid engine endpoint '{path}': {e}")))
    }

    async fn update(&self, body: Value) -> Result<()> {
        let mut url = self.endpoint("update/json")?;
        url.query_pairs_mut().append_pair("wt", "json");

        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::engine_with_source("engine update request failed", e))?;
        check_status(response).await?;
        Ok(())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::engine(format!(
        "engine returned HTTP {status}: {}",
        body.trim()
    )))
}

#[async_trait]
impl SearchClient for SolrClient {
    async fn add_documents(&self, docs: &[Document]) -> Result<()> {
        if docs.is_empty() {
            return Ok(());
        }
        log::debug!("Solr: adding {} document(s)", docs.len());
        let body = Value::Array(docs.iter().map(Document::to_json).collect());
        self.update(body).await
    }

    async fn delete_by_id(&self, id: &str) -> Result<()> {
        log::debug!("Solr: deleting {id}");
        self.update(json!({"delete": {"id": id}})).await
    }

    async fn delete_by_query(&self, query: &str) -> Result<()> {
        if query.trim().is_empty() {
            return Err(Error::operation("delete query must not be empty"));
        }
        log::debug!("Solr: deleting by query '{query}'");
        self.update(json!({"delete": {"query": query}})).await
    }

    async fn commit(&self) -> Result<()> {
        self.update(json!({"commit": {}})).await
    }

    async fn optimize(&self) -> Result<()> {
        self.update(json!({"optimize": {}})).await
    }

    async fn search(
        &self,
        query: &QueryExpression,
        offset: usize,
        limit: usize,
        params: &ParameterSet,
    ) -> Result<ResultSet> {
        let mut url = self.endpoint("select")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("q", query.as_str())
                .append_pair("start", &offset.to_string())
                .append_pair("rows", &limit.to_string())
                .append_pair("wt", "json");
            for (key, value) in params.to_pairs() {
                pairs.append_pair(&key, &value);
            }
        }
        log::debug!("Solr: select {url}");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::engine_with_source("engine search request failed", e))?;
        let body: Value = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| Error::engine_with_source("engine returned invalid JSON", e))?;
        parse_select_response(&body)
    }

    fn name(&self) -> &str {
        "solr"
    }
}

// ----------------------------------------------------------------------------
// Response decoding
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SelectResponse {
    response: ResponseBody,
    #[serde(default)]
    facet_counts: Option<FacetCounts>,
    #[serde(default)]
    highlighting: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Deserialize)]
struct ResponseBody {
    #[serde(rename = "numFound")]
    num_found: usize,
    #[serde(default)]
    docs: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct FacetCounts {
    #[serde(default)]
    facet_fields: BTreeMap<String, Vec<Value>>,
}

/// Decode a `select` response body.
///
/// Facet fields arrive as flat `[value, count, value, count, ...]` lists.
pub fn parse_select_response(body: &Value) -> Result<ResultSet> {
    let parsed: SelectResponse = serde_json::from_value(body.clone())
        .map_err(|e| Error::engine_with_source("unexpected engine response shape", e))?;

    let documents = parsed
        .response
        .docs
        .iter()
        .map(Document::from_json)
        .collect::<Result<Vec<_>>>()?;

    let mut facet_counts = BTreeMap::new();
    if let Some(counts) = parsed.facet_counts {
        for (field, flat) in counts.facet_fields {
            let values = flat
                .chunks(2)
                .filter_map(|pair| match pair {
                    [Value::String(value), count] => count
                        .as_u64()
                        .map(|c| FacetCount::new(value.clone(), c as usize)),
                    _ => None,
                })
                .collect();
            facet_counts.insert(field, values);
        }
    }

    Ok(ResultSet {
        documents,
        num_found: parsed.response.num_found,
        facet_counts,
        highlighting: parsed.highlighting,
    })
}

// ============================================================================
// Tests
// ============================================================================
