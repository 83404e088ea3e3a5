//! Addon descriptors: declarative record-type → document mappings.
//!
//! A descriptor names the host record type it applies to, the conditions a
//! record must meet to be indexed, and an ordered list of field
//! specifications. Descriptors are pure data; the [`crate::indexer`] module
//! gives them meaning.
//!
//! # File format
//!
//! Descriptor files hold a map of addon name to descriptor. JSON example:
//!
//! ```json
//! {
//!   "exhibits": {
//!     "record_type": "Exhibit",
//!     "result_type": "Exhibit",
//!     "flag": "public",
//!     "tagged": true,
//!     "fields": [
//!       "title",
//!       {"name": "description", "path": "description"},
//!       {"name": "collection", "path": "collection.name", "role": "display"},
//!       {"name": "itemtype", "literal": "Neatline Exhibit", "role": "display"}
//!     ]
//!   }
//! }
//! ```
//!
//! A bare string field is shorthand for `{"name": s, "path": s}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use sift_core::{Error, Result};

/// Suffix for tokenized text fields.
pub const TEXT_SUFFIX: &str = "_t";

/// Suffix for exact-string facet fields.
pub const FACET_SUFFIX: &str = "_s";

/// Catch-all field that receives every searchable value.
pub const CATCH_ALL_FIELD: &str = "text";

/// How a field contributes to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRole {
    /// Full-text searchable, stored as `{name}_t`.
    #[default]
    Text,
    /// Facet key, stored as `{name}_s` and also `{name}_t`.
    Facet,
    /// Display only, stored as `{name}` and not searched.
    Display,
}

impl FieldRole {
    /// Engine field names a value with this role is written to.
    pub fn target_fields(&self, name: &str) -> Vec<String> {
        match self {
            FieldRole::Text => vec![format!("{name}{TEXT_SUFFIX}")],
            FieldRole::Facet => vec![
                format!("{name}{FACET_SUFFIX}"),
                format!("{name}{TEXT_SUFFIX}"),
            ],
            FieldRole::Display => vec![name.to_string()],
        }
    }

    /// Whether values are copied into the catch-all search field.
    pub fn is_searchable(&self) -> bool {
        !matches!(self, FieldRole::Display)
    }
}

/// Where a field's values come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// A constant value.
    Literal(String),
    /// A dotted accessor path into the record's attributes.
    Path(String),
}

/// One document field produced from a record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawFieldSpec")]
pub struct FieldSpec {
    /// Target document field name.
    pub name: String,
    /// Value source.
    pub source: ValueSource,
    /// Contribution to search/facet/display.
    pub role: FieldRole,
}

impl FieldSpec {
    /// A text field read from `path`.
    pub fn path(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: ValueSource::Path(path.into()),
            role: FieldRole::Text,
        }
    }

    /// A text field with a constant value.
    pub fn literal(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: ValueSource::Literal(value.into()),
            role: FieldRole::Text,
        }
    }

    /// Change the role (builder style).
    pub fn with_role(mut self, role: FieldRole) -> Self {
        self.role = role;
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFieldSpec {
    Short(String),
    Full {
        name: String,
        #[serde(default)]
        path: Option<String>,
        #[serde(default)]
        literal: Option<String>,
        #[serde(default)]
        role: FieldRole,
    },
}

impl TryFrom<RawFieldSpec> for FieldSpec {
    type Error = String;

    fn try_from(raw: RawFieldSpec) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawFieldSpec::Short(name) => {
                if name.trim().is_empty() {
                    return Err("field name must not be empty".to_string());
                }
                Ok(FieldSpec::path(name.clone(), name))
            }
            RawFieldSpec::Full {
                name,
                path,
                literal,
                role,
            } => {
                if name.trim().is_empty() {
                    return Err("field name must not be empty".to_string());
                }
                let source = match (path, literal) {
                    (Some(_), Some(_)) => {
                        return Err(format!(
                            "field '{name}' sets both 'path' and 'literal'"
                        ));
                    }
                    (None, Some(value)) => ValueSource::Literal(value),
                    (Some(path), None) => ValueSource::Path(path),
                    (None, None) => ValueSource::Path(name.clone()),
                };
                Ok(FieldSpec { name, source, role })
            }
        }
    }
}

/// A condition a record must meet to be indexed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Condition {
    /// Accessor path into the record.
    pub path: String,
    /// Required value. When absent, the path only has to resolve to a
    /// truthy value.
    #[serde(default)]
    pub equals: Option<Value>,
}

/// Declarative mapping from one record type to document fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
    /// Addon name (the key in the descriptor file).
    pub name: String,
    /// Host record type this descriptor applies to.
    pub record_type: String,
    /// Label emitted into the `resulttype` field.
    pub result_type: String,
    /// Attribute whose truthiness gates eligibility.
    pub flag: Option<String>,
    /// Additional eligibility conditions (all must hold).
    pub conditions: Vec<Condition>,
    /// Whether the record's tags are indexed.
    pub tagged: bool,
    /// Ordered field specifications.
    pub fields: Vec<FieldSpec>,
}

impl Descriptor {
    /// Create a descriptor with no fields or conditions.
    pub fn new(name: impl Into<String>, record_type: impl Into<String>) -> Self {
        let record_type = record_type.into();
        Self {
            name: name.into(),
            result_type: record_type.clone(),
            record_type,
            flag: None,
            conditions: Vec::new(),
            tagged: false,
            fields: Vec::new(),
        }
    }

    /// Add a field (builder style).
    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Set the eligibility flag (builder style).
    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flag = Some(flag.into());
        self
    }

    /// Add an eligibility condition (builder style).
    pub fn with_condition(mut self, path: impl Into<String>, equals: Option<Value>) -> Self {
        self.conditions.push(Condition {
            path: path.into(),
            equals,
        });
        self
    }

    /// Index tags (builder style).
    pub fn tagged(mut self) -> Self {
        self.tagged = true;
        self
    }

    /// Set the result type label (builder style).
    pub fn with_result_type(mut self, result_type: impl Into<String>) -> Self {
        self.result_type = result_type.into();
        self
    }

    /// Whether this descriptor produces documents at all.
    pub fn has_fields(&self) -> bool {
        !self.fields.is_empty()
    }

    /// Build a descriptor from its file representation.
    pub(crate) fn from_raw(name: String, raw: RawDescriptor) -> Result<Self> {
        if raw.record_type.trim().is_empty() {
            return Err(Error::config(format!(
                "addon '{name}' has an empty record_type"
            )));
        }
        Ok(Self {
            result_type: raw.result_type.unwrap_or_else(|| raw.record_type.clone()),
            record_type: raw.record_type,
            name,
            flag: raw.flag,
            conditions: raw.conditions,
            tagged: raw.tagged,
            fields: raw.fields,
        })
    }
}

/// File representation of a descriptor (the addon name is the map key).
#[derive(Debug, Deserialize)]
pub(crate) struct RawDescriptor {
    #[serde(alias = "table")]
    record_type: String,
    #[serde(default)]
    result_type: Option<String>,
    #[serde(default)]
    flag: Option<String>,
    #[serde(default)]
    conditions: Vec<Condition>,
    #[serde(default)]
    tagged: bool,
    #[serde(default)]
    fields: Vec<FieldSpec>,
}

// ============================================================================
// Tests
// ============================================================================
