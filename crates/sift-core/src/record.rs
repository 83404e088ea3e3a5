//! Host records as seen by the indexing pipeline.
//!
//! A [`Record`] is whatever the host CMS hands over on save/delete or when
//! enumerating storage for a full reindex: a stable record-type id, a numeric
//! id, its tags, and a JSON object of attributes. Related entities
//! (collection, item type, element texts, ...) are nested objects or arrays
//! inside the attributes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One host record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Stable record-kind identifier, e.g. `"Item"` or `"Exhibit"`.
    pub record_type: String,
    /// Host-assigned numeric id.
    pub id: u64,
    /// Tag names attached to the record.
    #[serde(default)]
    pub tags: Vec<String>,
    /// The record's attributes and related entities.
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl Record {
    /// Create a record with no tags or attributes.
    pub fn new(record_type: impl Into<String>, id: u64) -> Self {
        Self {
            record_type: record_type.into(),
            id,
            tags: Vec::new(),
            attributes: Map::new(),
        }
    }

    /// Set an attribute (builder style).
    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Set the tags (builder style).
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Resolve a dotted accessor path against the attributes.
    ///
    /// Each segment selects a key of the current object. Arrays met along
    /// the way fan out: the remaining path is applied to every element, and
    /// an array at the end of the path contributes all of its elements.
    /// Missing keys contribute nothing, so an unresolvable path yields an
    /// empty vector.
    ///
    /// ```
    /// use serde_json::json;
    /// use sift_core::Record;
    ///
    /// let record = Record::new("Item", 7)
    ///     .with_attribute("collection", json!({"name": "Maps"}))
    ///     .with_attribute("files", json!([{"name": "a.jpg"}, {"name": "b.jpg"}]));
    ///
    /// assert_eq!(record.lookup("collection.name"), vec![&json!("Maps")]);
    /// assert_eq!(record.lookup("files.name").len(), 2);
    /// assert!(record.lookup("collection.missing").is_empty());
    /// ```
    pub fn lookup(&self, path: &str) -> Vec<&Value> {
        let mut segments = path.split('.').filter(|s| !s.is_empty());
        let Some(first) = segments.next() else {
            return Vec::new();
        };
        let rest: Vec<&str> = segments.collect();

        let mut out = Vec::new();
        if let Some(value) = self.attributes.get(first) {
            collect_path(value, &rest, &mut out);
        }
        out
    }

    /// Look up a single top-level attribute.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

fn collect_path<'a>(value: &'a Value, path: &[&str], out: &mut Vec<&'a Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_path(item, path, out);
            }
        }
        _ if path.is_empty() => {
            if !value.is_null() {
                out.push(value);
            }
        }
        Value::Object(map) => {
            if let Some(next) = map.get(path[0]) {
                collect_path(next, &path[1..], out);
            }
        }
        _ => {}
    }
}

/// Returns whether a JSON value counts as "set" for eligibility flags.
///
/// `true`, non-zero numbers, and non-empty strings other than `"0"` and
/// `"false"` are truthy. Everything else, including null, is not.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => {
            let s = s.trim();
            !s.is_empty() && s != "0" && !s.eq_ignore_ascii_case("false")
        }
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Null => false,
    }
}

/// Render a scalar JSON value as document text.
///
/// Objects and null yield `None`; arrays are expected to be fanned out by
/// the caller.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Object(_) | Value::Array(_) => None,
    }
}
