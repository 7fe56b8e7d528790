//! Parsers for filters in their textual and file forms.
//!
//! - `type:name` short form, e.g. `varietal:cabernet` or `price:under-20`
//! - facet files: a JSON array of filter objects

use crate::error::{CatalogError, Result};
use crate::types::{Filter, FilterType};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Parse the `type:name` short form.
///
/// Only the first `:` separates type from name, so names may contain colons.
pub fn parse_filter_spec(input: &str) -> Result<Filter> {
    let trimmed = input.trim();
    let (type_part, name_part) =
        trimmed
            .split_once(':')
            .ok_or_else(|| CatalogError::ParseError {
                input: input.to_string(),
                reason: "expected <type>:<name>".to_string(),
            })?;

    let filter_type: FilterType = type_part.trim().parse()?;

    let name = name_part.trim();
    if name.is_empty() {
        return Err(CatalogError::ParseError {
            input: input.to_string(),
            reason: "missing filter name".to_string(),
        });
    }

    Ok(Filter::new(name, filter_type))
}

/// Parse a facet file: a JSON array of filter objects.
pub fn parse_facets(path: &Path) -> Result<Vec<Filter>> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => CatalogError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => CatalogError::IoError(e),
    })?;

    let facets: Vec<Filter> = serde_json::from_str(&content)?;
    tracing::debug!("Parsed {} facets from {}", facets.len(), path.display());
    Ok(facets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_filter_spec() {
        let filter = parse_filter_spec("varietal:cabernet").unwrap();
        assert_eq!(filter.name, "cabernet");
        assert_eq!(filter.filter_type, FilterType::Varietal);
        assert!(filter.display_category_id.is_none());

        let filter = parse_filter_spec(" pairing-note : grilled meats ").unwrap();
        assert_eq!(filter.name, "grilled meats");
        assert_eq!(filter.filter_type, FilterType::PairingNote);
    }

    #[test]
    fn test_parse_filter_spec_name_with_colon() {
        let filter = parse_filter_spec("brand:chateau:margaux").unwrap();
        assert_eq!(filter.filter_type, FilterType::Brand);
        assert_eq!(filter.name, "chateau:margaux");
    }

    #[test]
    fn test_parse_filter_spec_errors() {
        assert!(matches!(
            parse_filter_spec("cabernet"),
            Err(CatalogError::ParseError { .. })
        ));
        assert!(matches!(
            parse_filter_spec("varietal:"),
            Err(CatalogError::ParseError { .. })
        ));
        assert!(matches!(
            parse_filter_spec("vintage:1999"),
            Err(CatalogError::UnknownFilterType(_))
        ));
    }

    #[test]
    fn test_parse_facets_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"name": "cabernet", "type": "varietal", "displayCategoryId": 12}},
                {{"name": "under-20", "type": "price"}}
            ]"#
        )
        .unwrap();

        let facets = parse_facets(file.path()).unwrap();
        assert_eq!(facets.len(), 2);
        assert_eq!(facets[0].display_category_id, Some(12));
        assert_eq!(facets[1].filter_type, FilterType::Price);
    }

    #[test]
    fn test_parse_facets_missing_file() {
        let err = parse_facets(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, CatalogError::FileNotFound { .. }));
    }

    #[test]
    fn test_parse_facets_bad_type() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"name": "x", "type": "vintage"}}]"#).unwrap();

        let err = parse_facets(file.path()).unwrap_err();
        assert!(matches!(err, CatalogError::JsonError(_)));
    }
}
