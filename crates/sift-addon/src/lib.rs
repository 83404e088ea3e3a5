//! Addon-driven indexing for Sift.
//!
//! Addons are declarative descriptors that map one host record type to
//! search documents. This crate parses them from a directory, caches them,
//! and turns records into [`sift_core::Document`]s.
//!
//! # Modules
//!
//! - [`descriptor`]: Descriptor and field specification types
//! - [`loader`]: Descriptor file discovery and parsing
//! - [`indexer`]: Eligibility rules and record → document mapping
//! - [`manager`]: Descriptor cache and record-type dispatch
//! - [`source`]: Host record enumeration

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod descriptor;
pub mod indexer;
pub mod loader;
pub mod manager;
pub mod source;

// Re-export key types at crate root for convenience
pub use descriptor::{Condition, Descriptor, FieldRole, FieldSpec, ValueSource};
pub use indexer::{index_all, index_record, should_index};
pub use loader::{DescriptorFormat, LoadStats, LoadedAddons, load_dir, parse_dir};
pub use manager::{AddonManager, RecordDisposition};
pub use source::{MemoryRecordSource, RecordSource};
