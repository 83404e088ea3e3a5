//! Error types for sift-core

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias for Sift operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur across the Sift crates.
///
/// The variants follow the three failure families of the system:
/// configuration problems (`Config`, `Parse`, `Io`), an unreachable or
/// failing search engine (`Engine`), and everything else (`NotFound`,
/// `Operation`). Mapping errors never surface here; an unresolvable field
/// is simply left out of the document.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// I/O error tied to a specific path.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path that was being read or written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Malformed input (descriptor files, option files, wire bodies).
    #[error("Parse error: {0}")]
    Parse(String),

    /// Missing or invalid configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },

    /// A named entity could not be found.
    #[error("{kind} not found: {name}")]
    NotFound {
        /// Name or id that was looked up
        name: String,
        /// What kind of entity it was
        kind: String,
    },

    /// The search engine rejected a request or could not be reached.
    #[error("Engine error: {message}")]
    Engine {
        /// Human-readable error message
        message: String,
        /// Source error if available
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Generic operation failure.
    #[error("Operation failed: {0}")]
    Operation(String),
}

impl Error {
    /// Creates an I/O error carrying the offending path.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates a parse error.
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Error::Parse(message.into())
    }

    /// Creates a configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Creates a not-found error.
    pub fn not_found<N: Into<String>, K: Into<String>>(name: N, kind: K) -> Self {
        Error::NotFound {
            name: name.into(),
            kind: kind.into(),
        }
    }

    /// Creates an engine error with a message.
    pub fn engine<S: Into<String>>(message: S) -> Self {
        Error::Engine {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an engine error with a message and source error.
    pub fn engine_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Engine {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a generic operation error.
    pub fn operation<S: Into<String>>(message: S) -> Self {
        Error::Operation(message.into())
    }

    /// Returns whether this error came from the search engine boundary.
    ///
    /// Write-path hooks swallow these; the query path surfaces them.
    pub fn is_engine_unavailable(&self) -> bool {
        matches!(self, Error::Engine { .. })
    }
}
