//! # Catalog Crate
//!
//! Facet data model for storefront product listings.
//!
//! ## Main Components
//!
//! - **types**: `Filter`, `FilterType`, `CategoryId` and the `FacetCatalog` index
//! - **parser**: parse `type:name` strings and JSON facet files
//! - **index**: build and validate a `FacetCatalog`
//! - **error**: error types for parsing and loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{FacetCatalog, FilterType};
//! use std::path::Path;
//!
//! let catalog = FacetCatalog::load_from_file(Path::new("data/facets.json"))?;
//! for facet in catalog.facets_by_type(FilterType::Varietal) {
//!     println!("{}", facet.name);
//! }
//! ```

pub mod error;
pub mod types;
pub mod parser;
pub mod index;

pub use error::{CatalogError, Result};
pub use parser::{parse_facets, parse_filter_spec};
pub use types::{CategoryId, FacetCatalog, Filter, FilterType};
