//! FacetCatalog building and indexing logic.
//!
//! - Insert facets into the primary index (by name)
//! - Build the per-type index in catalog order
//! - Validate uniqueness and non-empty names

use crate::error::{CatalogError, Result};
use crate::parser;
use crate::types::{FacetCatalog, Filter};
use std::path::Path;

impl FacetCatalog {
    /// Load a facet catalog from a JSON file.
    ///
    /// Steps:
    /// 1. Parse the file into filters
    /// 2. Validate names (non-empty, unique)
    /// 3. Insert into the name and type indices
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let facets = parser::parse_facets(path)?;
        let catalog = Self::from_facets(facets)?;

        tracing::info!(
            "Loaded facet catalog from {} ({} facets)",
            path.display(),
            catalog.len()
        );
        Ok(catalog)
    }

    /// Build a catalog from already-parsed facets, rejecting duplicates.
    pub fn from_facets(facets: impl IntoIterator<Item = Filter>) -> Result<Self> {
        let mut catalog = FacetCatalog::new();
        for facet in facets {
            catalog.insert(facet)?;
        }
        Ok(catalog)
    }

    /// Insert a facet and index it by type.
    pub fn insert(&mut self, facet: Filter) -> Result<()> {
        if facet.name.trim().is_empty() {
            return Err(CatalogError::InvalidValue {
                field: "name".to_string(),
                value: facet.name,
            });
        }
        if self.facets.contains_key(&facet.name) {
            return Err(CatalogError::DuplicateFacet(facet.name));
        }

        self.type_index
            .entry(facet.filter_type)
            .or_default()
            .push(facet.name.clone());
        self.facets.insert(facet.name.clone(), facet);
        Ok(())
    }
}
