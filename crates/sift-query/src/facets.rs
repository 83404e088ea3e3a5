//! The facet registry.
//!
//! Facet definitions decide which document fields are faceted on and shown
//! in the admin. Four generic facets always exist; every indexable field of
//! the host contributes one more, keyed `{element_id}_s`. The registry is
//! persisted as a JSON file seeded at install, bulk-updated by the admin,
//! and removed at uninstall.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use sift_core::{Error, Result};

/// Element set name of the generic facets.
pub const GENERAL_SET: &str = "General";

/// Generic facets as `(name, label)`, in seeding order.
pub const GENERIC_FACETS: [(&str, &str); 4] = [
    ("tag", "Tag"),
    ("collection", "Collection"),
    ("itemtype", "Item Type"),
    ("resulttype", "Result Type"),
];

/// Facet key for an indexable field.
pub fn element_facet_name(element_id: u64) -> String {
    format!("{element_id}_s")
}

/// A host field that can back a facet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexableField {
    /// Host element id.
    pub id: u64,
    /// Display name, used as the initial label.
    pub name: String,
    /// Name of the element set the field belongs to.
    pub set_name: String,
}

impl IndexableField {
    /// Create an indexable field.
    pub fn new(id: u64, name: impl Into<String>, set_name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            set_name: set_name.into(),
        }
    }
}

/// One facet definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetDefinition {
    /// Registry-assigned id.
    pub id: u64,
    /// Backing indexable field, absent for generic facets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_id: Option<u64>,
    /// Unique document field key.
    pub name: String,
    /// Current label.
    pub label: String,
    /// Label restored by a revert.
    pub original_label: String,
    /// Group shown in the admin.
    pub element_set: String,
    /// Whether the field is searchable from the UI.
    pub is_displayed: bool,
    /// Whether the field is faceted on.
    pub is_facet: bool,
}

/// An admin edit of one facet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetUpdate {
    /// Facet to change.
    pub facet_id: u64,
    /// New label. Blank reverts to the original label.
    pub label: String,
    /// New displayed flag.
    pub is_displayed: bool,
    /// New facet flag.
    pub is_facet: bool,
}

impl FacetUpdate {
    /// Create an update.
    pub fn new(facet_id: u64, label: impl Into<String>, is_displayed: bool, is_facet: bool) -> Self {
        Self {
            facet_id,
            label: label.into(),
            is_displayed,
            is_facet,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct FacetTable {
    #[serde(default)]
    facets: Vec<FacetDefinition>,
}

/// Facet definitions, optionally backed by a JSON file.
#[derive(Debug, Clone, Default)]
pub struct FacetRegistry {
    path: Option<PathBuf>,
    facets: Vec<FacetDefinition>,
}

impl FacetRegistry {
    /// An empty registry with no backing file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the registry at `path`; a missing file yields an empty registry.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let facets = if path.exists() {
            let content =
                std::fs::read_to_string(&path).map_err(|e| Error::io_with_path(e, &path))?;
            let table: FacetTable = serde_json::from_str(&content).map_err(|e| {
                Error::parse(format!("invalid facet table {}: {e}", path.display()))
            })?;
            table.facets
        } else {
            Vec::new()
        };
        Ok(Self {
            path: Some(path),
            facets,
        })
    }

    /// The backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write the registry to its backing file. No-op without one.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
            }
        }
        let table = FacetTable {
            facets: self.facets.clone(),
        };
        let content = serde_json::to_string_pretty(&table)
            .map_err(|e| Error::operation(format!("failed to encode facet table: {e}")))?;
        std::fs::write(path, content).map_err(|e| Error::io_with_path(e, path))
    }

    /// Remove every facet and delete the backing file.
    pub fn drop_table(&mut self) -> Result<()> {
        self.facets.clear();
        if let Some(path) = &self.path {
            match std::fs::remove_file(path) {
                Ok(()) => log::debug!("Removed facet table {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(Error::io_with_path(e, path)),
            }
        }
        Ok(())
    }

    /// Seed the generic facets and one facet per indexable field.
    ///
    /// Facets whose name already exists are left untouched, so seeding twice
    /// does not duplicate or reset anything. Returns the number added.
    pub fn install_defaults(&mut self, fields: &[IndexableField]) -> usize {
        let before = self.facets.len();

        for (name, label) in GENERIC_FACETS {
            self.insert_if_absent(None, name.to_string(), label, GENERAL_SET);
        }
        for field in fields {
            self.insert_if_absent(
                Some(field.id),
                element_facet_name(field.id),
                &field.name,
                &field.set_name,
            );
        }

        let added = self.facets.len() - before;
        log::info!("Seeded {added} facet(s), {} total", self.facets.len());
        added
    }

    fn insert_if_absent(
        &mut self,
        element_id: Option<u64>,
        name: String,
        label: &str,
        element_set: &str,
    ) {
        if self.by_name(&name).is_some() {
            return;
        }
        let id = self.facets.iter().map(|f| f.id).max().unwrap_or(0) + 1;
        self.facets.push(FacetDefinition {
            id,
            element_id,
            name,
            label: label.to_string(),
            original_label: label.to_string(),
            element_set: element_set.to_string(),
            is_displayed: true,
            is_facet: true,
        });
    }

    /// All facets in id order.
    pub fn all(&self) -> &[FacetDefinition] {
        &self.facets
    }

    /// Number of facets.
    pub fn len(&self) -> usize {
        self.facets.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }

    /// A facet by id.
    pub fn get(&self, id: u64) -> Option<&FacetDefinition> {
        self.facets.iter().find(|f| f.id == id)
    }

    /// A facet by field key.
    pub fn by_name(&self, name: &str) -> Option<&FacetDefinition> {
        self.facets.iter().find(|f| f.name == name)
    }

    /// Keys of the facets used for faceting.
    pub fn active_facet_keys(&self) -> Vec<String> {
        self.facets
            .iter()
            .filter(|f| f.is_facet)
            .map(|f| f.name.clone())
            .collect()
    }

    /// Keys of the facets shown as searchable.
    pub fn displayed_keys(&self) -> Vec<String> {
        self.facets
            .iter()
            .filter(|f| f.is_displayed)
            .map(|f| f.name.clone())
            .collect()
    }

    /// The label shown for a field key, falling back to the key itself.
    pub fn label_for<'a>(&'a self, name: &'a str) -> &'a str {
        self.by_name(name).map(|f| f.label.as_str()).unwrap_or(name)
    }

    /// Facets grouped by element set, groups in first-seen order.
    pub fn grouped_by_set(&self) -> Vec<(&str, Vec<&FacetDefinition>)> {
        let mut groups: Vec<(&str, Vec<&FacetDefinition>)> = Vec::new();
        for facet in &self.facets {
            match groups.iter_mut().find(|(set, _)| *set == facet.element_set) {
                Some((_, members)) => members.push(facet),
                None => groups.push((facet.element_set.as_str(), vec![facet])),
            }
        }
        groups
    }

    /// Apply admin edits.
    ///
    /// All ids are checked first; an unknown id fails the whole batch and
    /// changes nothing. Returns the number of facets updated.
    pub fn bulk_update(&mut self, updates: &[FacetUpdate]) -> Result<usize> {
        if let Some(missing) = updates.iter().find(|u| self.get(u.facet_id).is_none()) {
            return Err(Error::not_found(missing.facet_id.to_string(), "facet"));
        }

        for update in updates {
            if let Some(facet) = self.facets.iter_mut().find(|f| f.id == update.facet_id) {
                let label = update.label.trim();
                facet.label = if label.is_empty() {
                    facet.original_label.clone()
                } else {
                    label.to_string()
                };
                facet.is_displayed = update.is_displayed;
                facet.is_facet = update.is_facet;
            }
        }
        log::debug!("Updated {} facet(s)", updates.len());
        Ok(updates.len())
    }

    /// Restore a facet's original label.
    pub fn revert_label(&mut self, id: u64) -> Result<()> {
        let facet = self
            .facets
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| Error::not_found(id.to_string(), "facet"))?;
        facet.label = facet.original_label.clone();
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
