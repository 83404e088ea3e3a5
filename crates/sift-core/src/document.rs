//! Search document representation.
//!
//! A [`Document`] is the engine-side picture of one host record: a
//! mandatory identifier of the form `{recordType}_{recordId}` plus a map of
//! field names to one or more values. Documents are produced transiently by
//! the indexer, handed to a search client, and dropped; the engine is the
//! system of record.
//!
//! ```rust
//! use sift_core::Document;
//!
//! let mut doc = Document::for_record("Item", 12);
//! doc.add_value("title_t", "Map of Albemarle");
//! doc.add_value("tag", "maps");
//! doc.add_value("tag", "virginia");
//!
//! assert_eq!(doc.id(), "Item_12");
//! assert_eq!(doc.values("tag").len(), 2);
//! ```

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Name of the identifier field.
pub const ID_FIELD: &str = "id";

/// Build the canonical document identifier for a record.
pub fn document_id(record_type: &str, record_id: u64) -> String {
    format!("{record_type}_{record_id}")
}

/// Split a document identifier back into `(record_type, record_id)`.
///
/// The record id is numeric, so splitting at the last underscore is
/// unambiguous even when the record type itself contains underscores.
pub fn parse_document_id(id: &str) -> Option<(&str, u64)> {
    let (record_type, record_id) = id.rsplit_once('_')?;
    if record_type.is_empty() {
        return None;
    }
    let record_id = record_id.parse().ok()?;
    Some((record_type, record_id))
}

/// A document to be indexed and searched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    id: String,
    fields: BTreeMap<String, Vec<String>>,
}

impl Document {
    /// Create an empty document with the given identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Create an empty document for `(record_type, record_id)`.
    pub fn for_record(record_type: &str, record_id: u64) -> Self {
        Self::new(document_id(record_type, record_id))
    }

    /// The document identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Append one value to a field. Empty values are ignored.
    pub fn add_value(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            return;
        }
        self.fields.entry(field.into()).or_default().push(value);
    }

    /// Append several values to a field. Nothing is stored if all are empty.
    pub fn add_values<I, S>(&mut self, field: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for value in values {
            self.add_value(field, value);
        }
    }

    /// All values of a field (empty slice if absent).
    pub fn values(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First value of a field.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.values(field).first().map(String::as_str)
    }

    /// Whether a field is present.
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Iterate over `(field, values)` pairs in field-name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of distinct fields (excluding the identifier).
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Encode as the engine's JSON document shape.
    ///
    /// Single-valued fields become scalars, multi-valued fields arrays.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert(ID_FIELD.to_string(), Value::String(self.id.clone()));
        for (field, values) in &self.fields {
            let value = match values.as_slice() {
                [single] => Value::String(single.clone()),
                many => Value::Array(many.iter().cloned().map(Value::String).collect()),
            };
            map.insert(field.clone(), value);
        }
        Value::Object(map)
    }

    /// Decode a document returned by the engine.
    ///
    /// Scalars of any JSON type are rendered as text; nested objects are
    /// dropped.
    pub fn from_json(value: &Value) -> Result<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| Error::parse("Engine document is not a JSON object"))?;
        let id = map
            .get(ID_FIELD)
            .and_then(json_text)
            .ok_or_else(|| Error::parse("Engine document has no id"))?;

        let mut doc = Document::new(id);
        for (field, value) in map {
            if field == ID_FIELD {
                continue;
            }
            match value {
                Value::Array(items) => doc.add_values(field, items.iter().filter_map(json_text)),
                other => {
                    if let Some(text) = json_text(other) {
                        doc.add_value(field.as_str(), text);
                    }
                }
            }
        }
        Ok(doc)
    }
}

fn json_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
