//! Core domain types for storefront facet filtering.
//!
//! This module defines the value types shared by the facet catalog and the
//! active filter store:
//! - Type alias for catalog category references (CategoryId)
//! - The FilterType enum with its wire names
//! - The Filter value type itself
//! - FacetCatalog, the in-memory index of selectable facets

use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Type Aliases
// =============================================================================

/// Reference to a catalog category. Opaque to the filter store; only the
/// query-building layer interprets it.
pub type CategoryId = u32;

// =============================================================================
// FilterType
// =============================================================================

/// Facet category a filter belongs to.
///
/// Serialized with the kebab-case names used on the wire
/// (`pairing-note`, `tasting-note`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterType {
    Brand,
    PairingNote,
    Price,
    Region,
    TastingNote,
    Varietal,
}

impl FilterType {
    /// Every variant, in declaration order.
    pub const ALL: [FilterType; 6] = [
        FilterType::Brand,
        FilterType::PairingNote,
        FilterType::Price,
        FilterType::Region,
        FilterType::TastingNote,
        FilterType::Varietal,
    ];

    /// The wire name of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterType::Brand => "brand",
            FilterType::PairingNote => "pairing-note",
            FilterType::Price => "price",
            FilterType::Region => "region",
            FilterType::TastingNote => "tasting-note",
            FilterType::Varietal => "varietal",
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterType {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CatalogError::UnknownFilterType(s.to_string()))
    }
}

// =============================================================================
// Filter
// =============================================================================

/// One facet selection.
///
/// `name` is the identity of a filter: two filters with the same name are
/// the same facet value no matter what the other fields say.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub name: String,
    #[serde(rename = "type")]
    pub filter_type: FilterType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_category_id: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Filter {
    /// Create a filter with no category reference or image.
    pub fn new(name: impl Into<String>, filter_type: FilterType) -> Self {
        Self {
            name: name.into(),
            filter_type,
            display_category_id: None,
            image_url: None,
        }
    }

    pub fn with_display_category_id(mut self, id: CategoryId) -> Self {
        self.display_category_id = Some(id);
        self
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }
}

/// Lets every name-keyed operation accept a `&Filter` as well as a name.
impl AsRef<str> for Filter {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.filter_type, self.name)
    }
}

// =============================================================================
// FacetCatalog
// =============================================================================

/// Index of the facet values a listing offers for selection.
///
/// Facets are unique by name. The per-type index keeps file order so the
/// selection UI can list values the way the catalog defines them.
#[derive(Debug, Default)]
pub struct FacetCatalog {
    pub(crate) facets: HashMap<String, Filter>,
    /// Facet names grouped by type, in insertion order
    pub(crate) type_index: HashMap<FilterType, Vec<String>>,
}

impl FacetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a facet by name.
    pub fn get(&self, name: &str) -> Option<&Filter> {
        self.facets.get(name)
    }

    /// All facets of one type, in catalog order.
    pub fn facets_by_type(&self, filter_type: FilterType) -> Vec<&Filter> {
        self.type_index
            .get(&filter_type)
            .map(|names| names.iter().filter_map(|n| self.facets.get(n)).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.facets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_type_wire_names() {
        for t in FilterType::ALL {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
            assert_eq!(t.as_str().parse::<FilterType>().unwrap(), t);
        }
        assert_eq!(FilterType::PairingNote.to_string(), "pairing-note");
    }

    #[test]
    fn test_unknown_filter_type() {
        let err = "vintage".parse::<FilterType>().unwrap_err();
        assert!(matches!(err, CatalogError::UnknownFilterType(ref s) if s == "vintage"));
    }

    #[test]
    fn test_filter_json_shape() {
        let filter = Filter::new("cabernet", FilterType::Varietal)
            .with_display_category_id(12)
            .with_image_url("https://cdn.example.com/cab.png");

        let value = serde_json::to_value(&filter).unwrap();
        assert_eq!(value["name"], "cabernet");
        assert_eq!(value["type"], "varietal");
        assert_eq!(value["displayCategoryId"], 12);
        assert_eq!(value["imageUrl"], "https://cdn.example.com/cab.png");
    }

    #[test]
    fn test_filter_optional_fields_omitted() {
        let filter = Filter::new("under-20", FilterType::Price);
        let json = serde_json::to_string(&filter).unwrap();
        assert_eq!(json, r#"{"name":"under-20","type":"price"}"#);

        let parsed: Filter = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, filter);
    }

    #[test]
    fn test_filter_as_ref_is_name() {
        let filter = Filter::new("napa", FilterType::Region);
        let name: &str = filter.as_ref();
        assert_eq!(name, "napa");
        assert_eq!(filter.to_string(), "region:napa");
    }
}
