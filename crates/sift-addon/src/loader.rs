//! Discovery and parsing of addon descriptor files.
//!
//! Every `*.json` and `*.toml` file directly under the addon directory is a
//! descriptor file holding a map of addon name to descriptor. Files are read
//! in path order so load order (and therefore first-match-wins dispatch) is
//! deterministic.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use sift_core::{Error, Result};

use crate::descriptor::{Descriptor, RawDescriptor};

/// Descriptor file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorFormat {
    /// JSON object of addon name → descriptor.
    Json,
    /// TOML document with one table per addon.
    Toml,
}

impl DescriptorFormat {
    /// Infer the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

/// Statistics about one directory load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Descriptor files found.
    pub files_processed: usize,
    /// Files skipped because they could not be read or parsed.
    pub files_skipped: usize,
    /// Descriptors accepted.
    pub descriptors_loaded: usize,
    /// Descriptors dropped because an earlier one claimed the record type.
    pub duplicates_dropped: usize,
}

/// Result of loading an addon directory.
#[derive(Debug, Clone, Default)]
pub struct LoadedAddons {
    /// Accepted descriptors, in load order.
    pub descriptors: Vec<Descriptor>,
    /// Load statistics.
    pub stats: LoadStats,
}

/// Parse descriptor file content.
///
/// Descriptors within one file are returned in addon-name order.
pub fn parse_str(content: &str, format: DescriptorFormat) -> Result<Vec<Descriptor>> {
    let raw: BTreeMap<String, RawDescriptor> = match format {
        DescriptorFormat::Json => serde_json::from_str(content)
            .map_err(|e| Error::parse(format!("invalid descriptor JSON: {e}")))?,
        DescriptorFormat::Toml => toml::from_str(content)
            .map_err(|e| Error::parse(format!("invalid descriptor TOML: {e}")))?,
    };

    raw.into_iter()
        .map(|(name, raw)| Descriptor::from_raw(name, raw))
        .collect()
}

/// Parse one descriptor file.
pub fn parse_file(path: &Path) -> Result<Vec<Descriptor>> {
    let format = DescriptorFormat::from_path(path).ok_or_else(|| {
        Error::config(format!("unsupported descriptor file: {}", path.display()))
    })?;
    let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
    parse_str(&content, format)
}

/// Parse every descriptor file in `dir`, discarding statistics.
pub fn parse_dir(dir: &Path) -> Result<Vec<Descriptor>> {
    load_dir(dir).map(|loaded| loaded.descriptors)
}

/// Parse every descriptor file in `dir`.
///
/// Malformed files are logged and skipped. A missing directory is a
/// configuration error.
pub fn load_dir(dir: &Path) -> Result<LoadedAddons> {
    if !dir.is_dir() {
        return Err(Error::config(format!(
            "addon directory not found: {}",
            dir.display()
        )));
    }

    let files = find_descriptor_files(dir)?;
    log::debug!("Found {} descriptor file(s) in {:?}", files.len(), dir);

    let mut loaded = LoadedAddons::default();
    let mut claimed: HashSet<String> = HashSet::new();

    for path in files {
        loaded.stats.files_processed += 1;

        let descriptors = match parse_file(&path) {
            Ok(d) => d,
            Err(e) => {
                log::warn!("Skipping descriptor file {:?}: {}", path, e);
                loaded.stats.files_skipped += 1;
                continue;
            }
        };

        for descriptor in descriptors {
            if !claimed.insert(descriptor.record_type.clone()) {
                log::warn!(
                    "Addon '{}' in {:?} ignored: record type '{}' is already handled",
                    descriptor.name,
                    path,
                    descriptor.record_type
                );
                loaded.stats.duplicates_dropped += 1;
                continue;
            }
            log::debug!(
                "Loaded addon '{}' for record type '{}'",
                descriptor.name,
                descriptor.record_type
            );
            loaded.descriptors.push(descriptor);
        }
    }

    loaded.stats.descriptors_loaded = loaded.descriptors.len();
    log::info!(
        "Loaded {} addon descriptor(s) from {:?} ({} file(s) skipped)",
        loaded.stats.descriptors_loaded,
        dir,
        loaded.stats.files_skipped
    );
    Ok(loaded)
}

/// Descriptor files directly under `dir`, sorted by path.
fn find_descriptor_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = dir.join("*");
    let pattern = pattern
        .to_str()
        .ok_or_else(|| Error::config(format!("non UTF-8 addon path: {}", dir.display())))?;
    let entries = glob::glob(pattern).map_err(|e| Error::config(e.to_string()))?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() && DescriptorFormat::from_path(&path).is_some() => {
                files.push(path)
            }
            Ok(_) => {}
            Err(e) => log::warn!("Unreadable addon directory entry: {}", e),
        }
    }
    files.sort();
    Ok(files)
}

// ============================================================================
// Tests
// ============================================================================
