//! Error types for the catalog crate.

use thiserror::Error;

/// Errors that can occur while parsing filters or loading a facet catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Facet file could not be found
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading a file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Facet file is not a valid JSON array of filters
    #[error("Malformed facet data: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A filter type string is not one of the known wire names
    #[error("Unknown filter type: {0}")]
    UnknownFilterType(String),

    /// A textual filter could not be parsed
    #[error("Parse error in '{input}': {reason}")]
    ParseError { input: String, reason: String },

    /// A field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Two facets in one catalog share a name
    #[error("Duplicate facet name: {0}")]
    DuplicateFacet(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CatalogError>;
