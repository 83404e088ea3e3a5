//! Search engine adapters for Sift.
//!
//! The [`SearchClient`] trait is the only boundary between Sift and a search
//! engine. [`SolrClient`] speaks to a Solr core over HTTP; [`MemoryEngine`]
//! is an in-process engine with the same visible behavior.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod memory;
pub mod solr;

pub use client::{SearchClient, create_search_client};
pub use memory::{EngineCall, MemoryEngine};
pub use solr::{SolrClient, parse_select_response};
