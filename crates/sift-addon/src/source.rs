//! Host record enumeration.

use sift_core::{Error, Record, Result};

/// Supplies host records by type for bulk (re)indexing.
///
/// The host owns its storage; this trait is the only way the indexing
/// pipeline reads from it in bulk.
pub trait RecordSource {
    /// All records of the given type.
    fn records_of(&self, record_type: &str) -> Result<Vec<Record>>;
}

/// A [`RecordSource`] over an in-memory record list.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordSource {
    records: Vec<Record>,
}

impl MemoryRecordSource {
    /// Wrap a list of records.
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Parse a JSON array of records.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let records: Vec<Record> = serde_json::from_str(content)
            .map_err(|e| Error::parse(format!("invalid record list: {e}")))?;
        Ok(Self::new(records))
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no records are held.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordSource for MemoryRecordSource {
    fn records_of(&self, record_type: &str) -> Result<Vec<Record>> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.record_type == record_type)
            .cloned()
            .collect())
    }
}
