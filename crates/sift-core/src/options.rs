//! Host-provided search options.
//!
//! `SearchOptions` is the explicit configuration struct threaded through
//! the query builder, the results service and the HTTP engine. It is read
//! from a TOML file, overlaid with `SIFT_*` environment variables, and
//! validated before use.
//!
//! ```toml
//! server_host = "localhost"
//! server_port = 8080
//! core_path = "/solr/collection1/"
//! per_page = 10
//! facet_limit = 25
//! facet_page_size = 10
//! highlight = true
//! highlight_snippets = 1
//! highlight_fragsize = 250
//! facet_sort = "count"
//! request_timeout_secs = 10
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "SIFT_";

/// Ordering of facet values returned by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetSort {
    /// Most frequent values first.
    #[default]
    Count,
    /// Alphabetical (index) order.
    Index,
}

impl FacetSort {
    /// Engine-level name of the ordering.
    pub fn as_str(&self) -> &'static str {
        match self {
            FacetSort::Count => "count",
            FacetSort::Index => "index",
        }
    }
}

impl fmt::Display for FacetSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FacetSort {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "count" => Ok(FacetSort::Count),
            "index" => Ok(FacetSort::Index),
            other => Err(Error::config(format!("Unknown facet sort: {other}"))),
        }
    }
}

/// Search options owned by the host application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Engine host name.
    pub server_host: String,
    /// Engine port.
    pub server_port: u16,
    /// Core/collection path, e.g. `/solr/collection1/`.
    pub core_path: String,
    /// Default results per page.
    pub per_page: usize,
    /// Facet values returned per facet field (`facet.limit`).
    pub facet_limit: usize,
    /// Step applied to the facet offset when paging facet values.
    pub facet_page_size: usize,
    /// Whether hit highlighting is requested.
    pub highlight: bool,
    /// Highlight snippets per field.
    pub highlight_snippets: usize,
    /// Highlight fragment size in characters.
    pub highlight_fragsize: usize,
    /// Default facet value ordering.
    pub facet_sort: FacetSort,
    /// Upper bound on a single engine request.
    pub request_timeout_secs: u64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            server_host: "localhost".to_string(),
            server_port: 8080,
            core_path: "/solr/collection1/".to_string(),
            per_page: 10,
            facet_limit: 25,
            facet_page_size: 10,
            highlight: true,
            highlight_snippets: 1,
            highlight_fragsize: 250,
            facet_sort: FacetSort::Count,
            request_timeout_secs: 10,
        }
    }
}

impl SearchOptions {
    /// Load options from a TOML file, apply environment overrides, and
    /// validate the result.
    ///
    /// A missing file yields the defaults (still subject to overrides).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut options = match path {
            Some(p) if p.exists() => Self::from_file(p)?,
            Some(p) => {
                log::debug!("Options file {} not found, using defaults", p.display());
                Self::default()
            }
            None => Self::default(),
        };

        options.apply_env_overrides(|key| std::env::var(key).ok())?;
        options.validate()?;
        Ok(options)
    }

    /// Parse options from a TOML file without overrides or validation.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::parse(format!("Failed to parse {}: {e}", path.display())))
    }

    /// Parse options from TOML text; unspecified keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::parse(e.to_string()))
    }

    /// Serialize options as pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::operation(e.to_string()))
    }

    /// Write options to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
        }
        let content = self.to_toml_string()?;
        std::fs::write(path, content).map_err(|e| Error::io_with_path(e, path))
    }

    /// Delete the options file at `path`. Missing files are not an error.
    pub fn remove(path: &Path) -> Result<()> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io_with_path(e, path)),
        }
    }

    /// Overlay values from `SIFT_*` variables resolved through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(host) = var("SERVER_HOST") {
            self.server_host = host;
        }
        if let Some(port) = var("SERVER_PORT") {
            self.server_port = parse_env("SERVER_PORT", &port)?;
        }
        if let Some(core) = var("CORE_PATH") {
            self.core_path = core;
        }
        if let Some(per_page) = var("PER_PAGE") {
            self.per_page = parse_env("PER_PAGE", &per_page)?;
        }
        if let Some(limit) = var("FACET_LIMIT") {
            self.facet_limit = parse_env("FACET_LIMIT", &limit)?;
        }
        if let Some(size) = var("FACET_PAGE_SIZE") {
            self.facet_page_size = parse_env("FACET_PAGE_SIZE", &size)?;
        }
        if let Some(highlight) = var("HIGHLIGHT") {
            self.highlight = parse_env("HIGHLIGHT", &highlight)?;
        }
        if let Some(snippets) = var("HIGHLIGHT_SNIPPETS") {
            self.highlight_snippets = parse_env("HIGHLIGHT_SNIPPETS", &snippets)?;
        }
        if let Some(fragsize) = var("HIGHLIGHT_FRAGSIZE") {
            self.highlight_fragsize = parse_env("HIGHLIGHT_FRAGSIZE", &fragsize)?;
        }
        if let Some(sort) = var("FACET_SORT") {
            self.facet_sort = sort.parse()?;
        }
        if let Some(timeout) = var("REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_env("REQUEST_TIMEOUT_SECS", &timeout)?;
        }
        Ok(())
    }

    /// Validate options the way the host's server form does.
    pub fn validate(&self) -> Result<()> {
        if self.server_host.trim().is_empty() {
            return Err(Error::config("server_host must not be empty"));
        }
        if self.server_port == 0 {
            return Err(Error::config("server_port must be a non-zero integer"));
        }
        if !is_core_path(&self.core_path) {
            return Err(Error::config(format!(
                "Invalid core path '{}': expected the form /path/",
                self.core_path
            )));
        }
        if self.per_page == 0 {
            return Err(Error::config("per_page must be positive"));
        }
        if self.facet_limit == 0 {
            return Err(Error::config("facet_limit must be positive"));
        }
        if self.facet_page_size == 0 {
            return Err(Error::config("facet_page_size must be positive"));
        }
        Ok(())
    }

    /// Base URL of the engine core, always ending in `/`.
    pub fn base_url(&self) -> String {
        format!(
            "http://{}:{}{}",
            self.server_host, self.server_port, self.core_path
        )
    }

    /// Options as `SIFT_*` environment variable pairs.
    pub fn to_env_vars(&self) -> Vec<(String, String)> {
        [
            ("SERVER_HOST", self.server_host.clone()),
            ("SERVER_PORT", self.server_port.to_string()),
            ("CORE_PATH", self.core_path.clone()),
            ("PER_PAGE", self.per_page.to_string()),
            ("FACET_LIMIT", self.facet_limit.to_string()),
            ("FACET_PAGE_SIZE", self.facet_page_size.to_string()),
            ("HIGHLIGHT", self.highlight.to_string()),
            ("HIGHLIGHT_SNIPPETS", self.highlight_snippets.to_string()),
            ("HIGHLIGHT_FRAGSIZE", self.highlight_fragsize.to_string()),
            ("FACET_SORT", self.facet_sort.to_string()),
            ("REQUEST_TIMEOUT_SECS", self.request_timeout_secs.to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (format!("{ENV_PREFIX}{k}"), v))
        .collect()
    }
}

fn parse_env<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        Error::config(format!(
            "{ENV_PREFIX}{name} has an invalid value: '{value}'"
        ))
    })
}

fn is_core_path(path: &str) -> bool {
    path.len() >= 2 && path.starts_with('/') && path.ends_with('/')
}

// ============================================================================
// Tests
// ============================================================================
