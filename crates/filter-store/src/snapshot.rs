//! Immutable snapshots of the active filter collection.

use catalog::Filter;
use serde::{Serialize, Serializer};
use std::ops::Deref;
use std::sync::Arc;

/// An immutable, insertion-ordered view of the active filters.
///
/// Cloning is cheap (shared slice). Every mutation of a store produces a new
/// snapshot, so two snapshots that are [`ptr_eq`](ActiveFilters::ptr_eq) are
/// guaranteed to hold the same contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveFilters(Arc<[Filter]>);

impl ActiveFilters {
    pub fn as_slice(&self) -> &[Filter] {
        &self.0
    }

    /// Position of the filter with this name, if active.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Filter> {
        self.0.iter().find(|f| f.name == name)
    }

    /// Names in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|f| f.name.as_str()).collect()
    }

    /// True when both snapshots are the same emitted state.
    pub fn ptr_eq(&self, other: &ActiveFilters) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for ActiveFilters {
    fn default() -> Self {
        Self(Arc::from(Vec::new()))
    }
}

/// Build a snapshot, keeping the first filter for each name.
impl FromIterator<Filter> for ActiveFilters {
    fn from_iter<I: IntoIterator<Item = Filter>>(iter: I) -> Self {
        let mut filters: Vec<Filter> = Vec::new();
        for filter in iter {
            if !filters.iter().any(|f| f.name == filter.name) {
                filters.push(filter);
            }
        }
        Self(Arc::from(filters))
    }
}

impl Deref for ActiveFilters {
    type Target = [Filter];

    fn deref(&self) -> &[Filter] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a ActiveFilters {
    type Item = &'a Filter;
    type IntoIter = std::slice::Iter<'a, Filter>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for ActiveFilters {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::FilterType;

    #[test]
    fn test_default_is_empty() {
        let snapshot = ActiveFilters::default();
        assert!(snapshot.is_empty());
        assert!(snapshot.names().is_empty());
    }

    #[test]
    fn test_from_iter_drops_later_duplicates() {
        let snapshot: ActiveFilters = vec![
            Filter::new("red", FilterType::Varietal),
            Filter::new("napa", FilterType::Region),
            Filter::new("red", FilterType::Region),
        ]
        .into_iter()
        .collect();

        assert_eq!(snapshot.names(), vec!["red", "napa"]);
        assert_eq!(snapshot.get("red").unwrap().filter_type, FilterType::Varietal);
        assert_eq!(snapshot.position("napa"), Some(1));
    }

    #[test]
    fn test_clone_shares_storage() {
        let snapshot: ActiveFilters = vec![Filter::new("oaky", FilterType::TastingNote)]
            .into_iter()
            .collect();
        let copy = snapshot.clone();
        assert!(snapshot.ptr_eq(&copy));

        let rebuilt: ActiveFilters = snapshot.iter().cloned().collect();
        assert_eq!(rebuilt, snapshot);
        assert!(!rebuilt.ptr_eq(&snapshot));
    }

    #[test]
    fn test_serializes_as_array() {
        let snapshot: ActiveFilters = vec![Filter::new("under-20", FilterType::Price)]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(json, r#"[{"name":"under-20","type":"price"}]"#);
    }
}
