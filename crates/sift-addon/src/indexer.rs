//! Record → document mapping driven by descriptors.
//!
//! The indexer never fails on a single record: unresolvable fields are left
//! out of the document and records that do not meet a descriptor's
//! eligibility rules are filtered, not reported.

use serde_json::Value;

use sift_core::record::{is_truthy, scalar_text};
use sift_core::{Document, Record, Result};

use crate::descriptor::{CATCH_ALL_FIELD, Condition, Descriptor, FieldSpec, ValueSource};
use crate::source::RecordSource;

/// Bookkeeping field: the record type.
pub const MODEL_FIELD: &str = "model";
/// Bookkeeping field: the record id.
pub const MODEL_ID_FIELD: &str = "modelid";
/// Bookkeeping field: the descriptor's result type label.
pub const RESULT_TYPE_FIELD: &str = "resulttype";
/// Tag names.
pub const TAG_FIELD: &str = "tag";

/// Whether the record passes the descriptor's flag and conditions.
pub fn should_index(record: &Record, descriptor: &Descriptor) -> bool {
    if let Some(flag) = &descriptor.flag {
        let flagged = record.lookup(flag).into_iter().any(is_truthy);
        if !flagged {
            return false;
        }
    }
    descriptor
        .conditions
        .iter()
        .all(|condition| condition_holds(record, condition))
}

fn condition_holds(record: &Record, condition: &Condition) -> bool {
    let values = record.lookup(&condition.path);
    match &condition.equals {
        None => values.into_iter().any(is_truthy),
        Some(expected) => values.into_iter().any(|v| values_match(v, expected)),
    }
}

// `1` matches `"1"`, `true` matches `"true"`.
fn values_match(actual: &Value, expected: &Value) -> bool {
    actual == expected
        || matches!(
            (scalar_text(actual), scalar_text(expected)),
            (Some(a), Some(b)) if a == b
        )
}

/// Map one record to a document.
///
/// Returns `None` when the descriptor declares no fields. Eligibility is not
/// checked here; see [`should_index`].
pub fn index_record(record: &Record, descriptor: &Descriptor) -> Option<Document> {
    if !descriptor.has_fields() {
        return None;
    }

    let mut doc = Document::for_record(&record.record_type, record.id);
    doc.add_value(MODEL_FIELD, record.record_type.as_str());
    doc.add_value(MODEL_ID_FIELD, record.id.to_string());
    doc.add_value(RESULT_TYPE_FIELD, descriptor.result_type.as_str());

    for field in &descriptor.fields {
        let values = resolve(record, field);
        if values.is_empty() {
            continue;
        }
        for target in field.role.target_fields(&field.name) {
            doc.add_values(&target, values.iter().cloned());
        }
        if field.role.is_searchable() {
            doc.add_values(CATCH_ALL_FIELD, values);
        }
    }

    if descriptor.tagged {
        let tags: Vec<&str> = record
            .tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();
        doc.add_values(TAG_FIELD, tags.iter().copied());
        doc.add_values(CATCH_ALL_FIELD, tags);
    }

    Some(doc)
}

fn resolve(record: &Record, field: &FieldSpec) -> Vec<String> {
    match &field.source {
        ValueSource::Literal(value) => {
            let value = value.trim();
            if value.is_empty() {
                Vec::new()
            } else {
                vec![value.to_string()]
            }
        }
        ValueSource::Path(path) => record
            .lookup(path)
            .into_iter()
            .filter_map(scalar_text)
            .collect(),
    }
}

/// Map every eligible record of every descriptor's type.
///
/// Records are fetched per descriptor through `source`; a source failure
/// aborts the whole run.
pub fn index_all(descriptors: &[Descriptor], source: &dyn RecordSource) -> Result<Vec<Document>> {
    let mut docs = Vec::new();

    for descriptor in descriptors {
        let records = source.records_of(&descriptor.record_type)?;
        let before = docs.len();
        let mut skipped = 0usize;

        for record in &records {
            if !should_index(record, descriptor) {
                skipped += 1;
                continue;
            }
            if let Some(doc) = index_record(record, descriptor) {
                docs.push(doc);
            }
        }

        log::debug!(
            "Addon '{}': {} document(s) from {} record(s), {} ineligible",
            descriptor.name,
            docs.len() - before,
            records.len(),
            skipped
        );
    }

    Ok(docs)
}

// ============================================================================
// Tests
// ============================================================================
