//! In-process search engine.
//!
//! `MemoryEngine` implements [`SearchClient`] over a map of documents. It
//! follows the engine contract closely enough to stand in for Solr in tests
//! and dry runs:
//!
//! - documents upsert by id;
//! - writes are staged and only become visible on `commit`;
//! - queries are ` AND `-joined clauses of `*:*`, `field:value`, or bare
//!   terms matched against the `qf` fields;
//! - facet counts honor mincount, offset, limit, and sort.
//!
//! # Limitations
//!
//! - O(n) search time
//! - No stemming, no phrase or boolean operators other than `AND`
//! - Substring matching for text fields

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use sift_core::{
    Document, Error, FacetCount, FacetSort, MATCH_ALL, ParameterSet, QueryExpression, Result,
    ResultSet,
};

use crate::client::SearchClient;

/// Default search field when no `qf` is given.
const DEFAULT_QUERY_FIELD: &str = "text";

/// A call made against the engine, recorded in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    /// `add_documents` with these ids.
    AddDocuments(Vec<String>),
    /// `delete_by_id`.
    DeleteById(String),
    /// `delete_by_query`.
    DeleteByQuery(String),
    /// `commit`.
    Commit,
    /// `optimize`.
    Optimize,
    /// `search` with this query.
    Search(String),
}

#[derive(Debug, Clone)]
enum PendingWrite {
    Add(Document),
    DeleteId(String),
    DeleteQuery(ParsedQuery),
}

#[derive(Debug, Default)]
struct EngineState {
    committed: BTreeMap<String, Document>,
    pending: Vec<PendingWrite>,
    calls: Vec<EngineCall>,
}

/// In-memory [`SearchClient`].
#[derive(Debug, Default)]
pub struct MemoryEngine {
    state: Mutex<EngineState>,
}

impl MemoryEngine {
    /// An empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine with `docs` already committed.
    pub fn with_documents(docs: impl IntoIterator<Item = Document>) -> Self {
        let engine = Self::new();
        {
            let mut state = engine.inspect();
            for doc in docs {
                state.committed.insert(doc.id().to_string(), doc);
            }
        }
        engine
    }

    /// Number of committed documents.
    pub fn len(&self) -> usize {
        self.inspect().committed.len()
    }

    /// Whether no documents are committed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of staged, uncommitted writes.
    pub fn pending_len(&self) -> usize {
        self.inspect().pending.len()
    }

    /// Whether a committed document has this id.
    pub fn contains(&self, id: &str) -> bool {
        self.inspect().committed.contains_key(id)
    }

    /// A committed document by id.
    pub fn get(&self, id: &str) -> Option<Document> {
        self.inspect().committed.get(id).cloned()
    }

    /// Ids of all committed documents, sorted.
    pub fn ids(&self) -> Vec<String> {
        self.inspect().committed.keys().cloned().collect()
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<EngineCall> {
        self.inspect().calls.clone()
    }

    // Poisoning is ignored for read-only inspection.
    fn inspect(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock(&self) -> Result<MutexGuard<'_, EngineState>> {
        self.state
            .lock()
            .map_err(|_| Error::engine("memory engine state is poisoned"))
    }
}

#[async_trait]
impl SearchClient for MemoryEngine {
    async fn add_documents(&self, docs: &[Document]) -> Result<()> {
        let mut state = self.lock()?;
        state.calls.push(EngineCall::AddDocuments(
            docs.iter().map(|d| d.id().to_string()).collect(),
        ));
        state
            .pending
            .extend(docs.iter().cloned().map(PendingWrite::Add));
        Ok(())
    }

    async fn delete_by_id(&self, id: &str) -> Result<()> {
        let mut state = self.lock()?;
        state.calls.push(EngineCall::DeleteById(id.to_string()));
        state.pending.push(PendingWrite::DeleteId(id.to_string()));
        Ok(())
    }

    async fn delete_by_query(&self, query: &str) -> Result<()> {
        if query.trim().is_empty() {
            return Err(Error::operation("delete query must not be empty"));
        }
        let mut state = self.lock()?;
        state.calls.push(EngineCall::DeleteByQuery(query.to_string()));
        state
            .pending
            .push(PendingWrite::DeleteQuery(ParsedQuery::parse(query)));
        Ok(())
    }

    async fn commit(&self) -> Result<()> {
        let mut state = self.lock()?;
        state.calls.push(EngineCall::Commit);
        let pending = std::mem::take(&mut state.pending);
        let query_fields = vec![DEFAULT_QUERY_FIELD.to_string()];
        for write in pending {
            match write {
                PendingWrite::Add(doc) => {
                    state.committed.insert(doc.id().to_string(), doc);
                }
                PendingWrite::DeleteId(id) => {
                    state.committed.remove(&id);
                }
                PendingWrite::DeleteQuery(query) => {
                    state
                        .committed
                        .retain(|_, doc| query.score(doc, &query_fields).is_none());
                }
            }
        }
        log::debug!("MemoryEngine: committed, {} document(s)", state.committed.len());
        Ok(())
    }

    async fn optimize(&self) -> Result<()> {
        self.lock()?.calls.push(EngineCall::Optimize);
        Ok(())
    }

    async fn search(
        &self,
        query: &QueryExpression,
        offset: usize,
        limit: usize,
        params: &ParameterSet,
    ) -> Result<ResultSet> {
        let mut state = self.lock()?;
        state.calls.push(EngineCall::Search(query.to_string()));

        let raw = if query.as_str().trim().is_empty() {
            params.q_alt.as_str()
        } else {
            query.as_str()
        };
        let parsed = ParsedQuery::parse(raw);
        let query_fields = parse_query_fields(&params.query_fields);

        let mut matched: Vec<(&Document, usize)> = state
            .committed
            .values()
            .filter_map(|doc| parsed.score(doc, &query_fields).map(|score| (doc, score)))
            .collect();
        sort_matches(&mut matched, &params.sort);

        let mut results = ResultSet {
            num_found: matched.len(),
            ..ResultSet::empty()
        };

        if params.facet {
            for field in &params.facet_fields {
                let docs = matched.iter().map(|(doc, _)| *doc);
                results
                    .facet_counts
                    .insert(field.clone(), count_facet(docs, field, params));
            }
        }

        let terms = parsed.terms();
        for (doc, _) in matched.into_iter().skip(offset).take(limit) {
            if params.highlighting.enabled && !terms.is_empty() {
                let snippets = highlight_document(doc, &terms, params);
                if !snippets.is_empty() {
                    results.highlighting.insert(doc.id().to_string(), snippets);
                }
            }
            results.documents.push(doc.clone());
        }

        log::debug!(
            "MemoryEngine: query='{}' found={} returned={}",
            raw,
            results.num_found,
            results.documents.len()
        );
        Ok(results)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

// ----------------------------------------------------------------------------
// Query parsing and matching
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Clause {
    MatchAll,
    Field { field: String, value: String },
    Terms(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ParsedQuery {
    clauses: Vec<Clause>,
}

impl ParsedQuery {
    fn parse(raw: &str) -> Self {
        let clauses = raw
            .split(" AND ")
            .map(|part| part.trim().trim_start_matches('(').trim_end_matches(')').trim())
            .filter(|part| !part.is_empty())
            .map(parse_clause)
            .collect();
        Self { clauses }
    }

    /// Lower-cased bare terms, used for highlighting.
    fn terms(&self) -> Vec<String> {
        self.clauses
            .iter()
            .filter_map(|c| match c {
                Clause::Terms(terms) => Some(terms.iter().cloned()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// `None` if the document does not match, otherwise a relevance score.
    fn score(&self, doc: &Document, query_fields: &[String]) -> Option<usize> {
        if self.clauses.is_empty() {
            return None;
        }
        let mut score = 0;
        for clause in &self.clauses {
            match clause {
                Clause::MatchAll => {}
                Clause::Field { field, value } => {
                    if !field_matches(doc, field, value) {
                        return None;
                    }
                    score += 1;
                }
                Clause::Terms(terms) => {
                    for term in terms {
                        let hits = term_hits(doc, term, query_fields);
                        if hits == 0 {
                            return None;
                        }
                        score += hits;
                    }
                }
            }
        }
        Some(score)
    }
}

fn parse_clause(part: &str) -> Clause {
    if part == MATCH_ALL {
        return Clause::MatchAll;
    }
    if let Some((field, value)) = part.split_once(':') {
        let field = field.trim();
        if !field.is_empty() && !field.contains(char::is_whitespace) {
            let value = value.trim().trim_matches('"').to_string();
            return Clause::Field {
                field: field.to_string(),
                value,
            };
        }
    }
    Clause::Terms(
        part.split_whitespace()
            .map(|t| t.trim_matches('"').to_ascii_lowercase())
            .filter(|t| !t.is_empty())
            .collect(),
    )
}

fn is_text_field(field: &str) -> bool {
    field == DEFAULT_QUERY_FIELD || field.ends_with("_t")
}

fn field_matches(doc: &Document, field: &str, value: &str) -> bool {
    if field == sift_core::document::ID_FIELD {
        return value == "*" || doc.id() == value;
    }
    if value == "*" {
        return doc.has_field(field);
    }
    let needle = value.to_ascii_lowercase();
    doc.values(field).iter().any(|v| {
        v == value || (is_text_field(field) && v.to_ascii_lowercase().contains(&needle))
    })
}

fn term_hits(doc: &Document, term: &str, query_fields: &[String]) -> usize {
    query_fields
        .iter()
        .flat_map(|field| doc.values(field))
        .filter(|v| v.to_ascii_lowercase().contains(term))
        .count()
}

/// `qf` is a whitespace-separated field list with optional `^boost`.
fn parse_query_fields(qf: &str) -> Vec<String> {
    let fields: Vec<String> = qf
        .split_whitespace()
        .map(|f| f.split('^').next().unwrap_or(f).to_string())
        .filter(|f| !f.is_empty())
        .collect();
    if fields.is_empty() {
        vec![DEFAULT_QUERY_FIELD.to_string()]
    } else {
        fields
    }
}

// ----------------------------------------------------------------------------
// Sorting
// ----------------------------------------------------------------------------

fn sort_matches(matched: &mut [(&Document, usize)], sort: &str) {
    let keys: Vec<(String, bool)> = sort
        .split(',')
        .filter_map(|spec| {
            let mut parts = spec.split_whitespace();
            let field = parts.next()?.to_string();
            let descending = parts
                .next()
                .is_some_and(|dir| dir.eq_ignore_ascii_case("desc"));
            Some((field, descending))
        })
        .collect();

    matched.sort_by(|(a, a_score), (b, b_score)| {
        for (field, descending) in &keys {
            let ordering = if field == "score" {
                a_score.cmp(b_score)
            } else {
                a.first(field).cmp(&b.first(field))
            };
            let ordering = if *descending {
                ordering.reverse()
            } else {
                ordering
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        a.id().cmp(b.id())
    });
}

// ----------------------------------------------------------------------------
// Facets
// ----------------------------------------------------------------------------

fn count_facet<'a>(
    docs: impl Iterator<Item = &'a Document>,
    field: &str,
    params: &ParameterSet,
) -> Vec<FacetCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for doc in docs {
        let distinct: HashSet<&str> = doc.values(field).iter().map(String::as_str).collect();
        for value in distinct {
            *counts.entry(value).or_default() += 1;
        }
    }

    let mut facet: Vec<FacetCount> = counts
        .into_iter()
        .filter(|(_, count)| *count >= params.facet_mincount)
        .map(|(value, count)| FacetCount::new(value, count))
        .collect();

    match params.facet_sort {
        FacetSort::Count => facet.sort_by(|a, b| b.count.cmp(&a.count).then(a.value.cmp(&b.value))),
        FacetSort::Index => facet.sort_by(|a, b| a.value.cmp(&b.value)),
    }

    facet
        .into_iter()
        .skip(params.facet_offset)
        .take(params.facet_limit)
        .collect()
}

// ----------------------------------------------------------------------------
// Highlighting
// ----------------------------------------------------------------------------

fn highlight_document(
    doc: &Document,
    terms: &[String],
    params: &ParameterSet,
) -> BTreeMap<String, Vec<String>> {
    let hl = &params.highlighting;
    let mut out = BTreeMap::new();
    for (field, values) in doc.fields() {
        if !field_glob_matches(&hl.fields, field) {
            continue;
        }
        let snippets: Vec<String> = values
            .iter()
            .filter_map(|v| highlight_value(v, terms, hl.fragsize))
            .take(hl.snippets)
            .collect();
        if !snippets.is_empty() {
            out.insert(field.to_string(), snippets);
        }
    }
    out
}

fn field_glob_matches(patterns: &str, field: &str) -> bool {
    patterns
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .any(|pattern| {
            if pattern == "*" {
                true
            } else if let Some(suffix) = pattern.strip_prefix('*') {
                field.ends_with(suffix)
            } else if let Some(prefix) = pattern.strip_suffix('*') {
                field.starts_with(prefix)
            } else {
                pattern == field
            }
        })
}

/// Wrap term occurrences in `<em>` within a window of `fragsize` bytes
/// around the first match. `None` if no term occurs.
fn highlight_value(value: &str, terms: &[String], fragsize: usize) -> Option<String> {
    // ASCII lowercasing keeps byte offsets aligned with `value`.
    let lower = value.to_ascii_lowercase();
    let first = terms
        .iter()
        .filter(|t| !t.is_empty())
        .filter_map(|t| lower.find(t.as_str()))
        .min()?;

    let mut start = first.saturating_sub(fragsize / 2);
    while !value.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (start + fragsize.max(1)).min(value.len());
    while !value.is_char_boundary(end) {
        end += 1;
    }

    let window = &value[start..end];
    let window_lower = &lower[start..end];
    let mut out = String::with_capacity(window.len() + 16);
    let mut pos = 0;
    while pos < window.len() {
        let next = terms
            .iter()
            .filter(|t| !t.is_empty())
            .filter_map(|t| window_lower[pos..].find(t.as_str()).map(|i| (pos + i, t.len())))
            .min_by_key(|&(i, len)| (i, std::cmp::Reverse(len)));
        match next {
            Some((i, len)) if i + len <= window.len() => {
                out.push_str(&window[pos..i]);
                out.push_str("<em>");
                out.push_str(&window[i..i + len]);
                out.push_str("</em>");
                pos = i + len;
            }
            _ => {
                out.push_str(&window[pos..]);
                break;
            }
        }
    }
    Some(out)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use sift_core::Highlighting;

    fn params() -> ParameterSet {
        ParameterSet {
            def_type: "edismax".into(),
            q_alt: MATCH_ALL.into(),
            query_fields: "text".into(),
            facet: true,
            facet_fields: vec!["tag".into(), "resulttype".into()],
            facet_offset: 0,
            facet_mincount: 1,
            facet_limit: 25,
            facet_sort: FacetSort::Count,
            highlighting: Highlighting {
                enabled: true,
                snippets: 1,
                fragsize: 250,
                fields: "*_t".into(),
            },
            sort: "score desc".into(),
        }
    }

    fn doc(id: &str, title: &str, tags: &[&str]) -> Document {
        let mut doc = Document::new(id);
        doc.add_value("title_t", title);
        doc.add_value("text", title);
        doc.add_values("tag", tags.iter().copied());
        doc.add_value("text", tags.join(" "));
        doc.add_value("resulttype", "Item");
        doc
    }

    fn corpus() -> MemoryEngine {
        MemoryEngine::with_documents([
            doc("Item_1", "Map of Albemarle", &["maps", "virginia"]),
            doc("Item_2", "Letter from Monticello", &["letters", "virginia"]),
            doc("Item_3", "Map of Boston harbor", &["maps"]),
        ])
    }

    async fn search(engine: &MemoryEngine, q: &str) -> ResultSet {
        engine
            .search(&QueryExpression::new(q), 0, 10, &params())
            .await
            .unwrap()
    }

    // ------------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_writes_visible_after_commit() {
        let engine = MemoryEngine::new();
        engine
            .add_documents(&[doc("Item_1", "Map", &[])])
            .await
            .unwrap();
        assert_eq!(engine.len(), 0);
        assert_eq!(engine.pending_len(), 1);
        assert_eq!(search(&engine, MATCH_ALL).await.num_found, 0);

        engine.commit().await.unwrap();
        assert!(engine.contains("Item_1"));
        assert_eq!(engine.pending_len(), 0);
    }

    #[tokio::test]
    async fn test_add_upserts_by_id() {
        let engine = corpus();
        engine
            .add_documents(&[doc("Item_1", "Revised map", &[])])
            .await
            .unwrap();
        engine.commit().await.unwrap();
        assert_eq!(engine.len(), 3);
        assert_eq!(
            engine.get("Item_1").unwrap().first("title_t"),
            Some("Revised map")
        );
    }

    #[tokio::test]
    async fn test_delete_by_id() {
        let engine = corpus();
        engine.delete_by_id("Item_2").await.unwrap();
        engine.delete_by_id("Item_99").await.unwrap();
        assert!(engine.contains("Item_2"));
        engine.commit().await.unwrap();
        assert!(!engine.contains("Item_2"));
        assert_eq!(engine.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_by_query() {
        let engine = corpus();
        engine.delete_by_query("tag:maps").await.unwrap();
        engine.commit().await.unwrap();
        assert_eq!(engine.ids(), vec!["Item_2"]);

        engine.delete_by_query(MATCH_ALL).await.unwrap();
        engine.commit().await.unwrap();
        assert!(engine.is_empty());
    }

    #[tokio::test]
    async fn test_blank_delete_query_is_rejected() {
        let engine = corpus();
        for query in ["", "   "] {
            let err = engine.delete_by_query(query).await.unwrap_err();
            assert!(matches!(err, Error::Operation(_)));
            assert!(!err.is_engine_unavailable());
        }
        engine.commit().await.unwrap();
        assert_eq!(engine.len(), 3);
        assert!(!engine.calls().iter().any(|c| matches!(c, EngineCall::DeleteByQuery(_))));
    }

    #[tokio::test]
    async fn test_calls_recorded_in_order() {
        let engine = MemoryEngine::new();
        engine.delete_by_query(MATCH_ALL).await.unwrap();
        engine.commit().await.unwrap();
        engine.optimize().await.unwrap();
        assert_eq!(
            engine.calls(),
            vec![
                EngineCall::DeleteByQuery(MATCH_ALL.into()),
                EngineCall::Commit,
                EngineCall::Optimize,
            ]
        );
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_match_all() {
        let results = search(&corpus(), MATCH_ALL).await;
        assert_eq!(results.num_found, 3);
    }

    #[tokio::test]
    async fn test_empty_query_uses_q_alt() {
        let results = search(&corpus(), "  ").await;
        assert_eq!(results.num_found, 3);
    }

    #[tokio::test]
    async fn test_terms_and_facet_clause() {
        let engine = corpus();
        assert_eq!(search(&engine, "map").await.num_found, 2);
        assert_eq!(search(&engine, "map virginia").await.num_found, 1);
        assert_eq!(search(&engine, "map AND tag:virginia").await.num_found, 1);
        assert_eq!(search(&engine, "*:* AND tag:\"letters\"").await.num_found, 1);
        assert_eq!(search(&engine, "nothing").await.num_found, 0);
    }

    #[tokio::test]
    async fn test_paging() {
        let engine = corpus();
        let page = engine
            .search(&QueryExpression::match_all(), 2, 10, &params())
            .await
            .unwrap();
        assert_eq!(page.num_found, 3);
        assert_eq!(page.documents.len(), 1);
    }

    #[tokio::test]
    async fn test_sort_by_field() {
        let engine = corpus();
        let mut p = params();
        p.sort = "title_t desc".into();
        let results = engine
            .search(&QueryExpression::match_all(), 0, 10, &p)
            .await
            .unwrap();
        let ids: Vec<&str> = results.documents.iter().map(|d| d.id()).collect();
        assert_eq!(ids, vec!["Item_3", "Item_1", "Item_2"]);
    }

    // ------------------------------------------------------------------------
    // Facets and highlighting
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_facet_counts() {
        let results = search(&corpus(), MATCH_ALL).await;
        assert_eq!(
            results.facet("tag"),
            [
                FacetCount::new("maps", 2),
                FacetCount::new("virginia", 2),
                FacetCount::new("letters", 1),
            ]
        );
        assert_eq!(results.facet("resulttype"), [FacetCount::new("Item", 3)]);
    }

    #[tokio::test]
    async fn test_facet_offset_limit_sort() {
        let engine = corpus();
        let mut p = params();
        p.facet_sort = FacetSort::Index;
        p.facet_offset = 1;
        p.facet_limit = 1;
        let results = engine
            .search(&QueryExpression::match_all(), 0, 10, &p)
            .await
            .unwrap();
        assert_eq!(results.facet("tag"), [FacetCount::new("maps", 2)]);
    }

    #[tokio::test]
    async fn test_facet_mincount() {
        let engine = corpus();
        let mut p = params();
        p.facet_mincount = 2;
        let results = engine
            .search(&QueryExpression::match_all(), 0, 10, &p)
            .await
            .unwrap();
        assert_eq!(results.facet("tag").len(), 2);
    }

    #[tokio::test]
    async fn test_facets_disabled() {
        let engine = corpus();
        let mut p = params();
        p.facet = false;
        let results = engine
            .search(&QueryExpression::match_all(), 0, 10, &p)
            .await
            .unwrap();
        assert!(results.facet_counts.is_empty());
    }

    #[tokio::test]
    async fn test_highlighting() {
        let results = search(&corpus(), "albemarle").await;
        assert_eq!(
            results.snippets("Item_1", "title_t"),
            ["Map of <em>Albemarle</em>"]
        );
        // Only fields matching hl.fl are highlighted.
        assert!(results.snippets("Item_1", "text").is_empty());
    }

    #[test]
    fn test_highlight_value_window() {
        let value = "aaaa bbbb target cccc dddd";
        let snippet = highlight_value(value, &["target".into()], 12).unwrap();
        assert!(snippet.contains("<em>target</em>"));
        assert!(!snippet.contains("aaaa"));
        assert!(highlight_value(value, &["zzz".into()], 12).is_none());
    }

    #[test]
    fn test_parse_clause() {
        assert_eq!(parse_clause("*:*"), Clause::MatchAll);
        assert_eq!(
            parse_clause("50_s:\"Maps\""),
            Clause::Field {
                field: "50_s".into(),
                value: "Maps".into()
            }
        );
        assert_eq!(
            parse_clause("Map Of"),
            Clause::Terms(vec!["map".into(), "of".into()])
        );
    }

    #[test]
    fn test_parse_query_fields() {
        assert_eq!(parse_query_fields("title_t^2 text"), vec!["title_t", "text"]);
        assert_eq!(parse_query_fields(""), vec!["text"]);
    }
}
