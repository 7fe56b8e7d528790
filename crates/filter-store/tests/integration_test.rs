//! Integration tests for the filter store.
//!
//! These tests drive the store the way a listing page does: a facet picker
//! toggles filters, a filter bar renders chips and removes them, and a
//! query layer follows along through notifications.

use catalog::{FacetCatalog, Filter, FilterType};
use filter_store::{ActiveFilters, FilterStore, SessionFile};
use std::sync::{Arc, Mutex};
use std::thread;

fn filter_bar(active: &ActiveFilters) -> Vec<String> {
    active
        .iter()
        .map(|f| format!("{} ({})", f.name, f.filter_type))
        .collect()
}

fn create_test_catalog() -> FacetCatalog {
    FacetCatalog::from_facets(vec![
        Filter::new("cabernet", FilterType::Varietal).with_display_category_id(12),
        Filter::new("merlot", FilterType::Varietal).with_display_category_id(14),
        Filter::new("napa-valley", FilterType::Region),
        Filter::new("under-20", FilterType::Price),
    ])
    .unwrap()
}

#[test]
fn test_listing_session_end_to_end() {
    let store = FilterStore::new();
    let rendered = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&rendered);
    let _bar = store.subscribe(move |active: &ActiveFilters| {
        sink.lock().unwrap().push(filter_bar(active));
    });

    assert!(store.active_filters().is_empty());

    store.toggle_active_filter(Filter::new("cabernet", FilterType::Varietal));
    assert_eq!(store.active_filters().names(), vec!["cabernet"]);

    store.toggle_active_filter(Filter::new("under-20", FilterType::Price));
    assert_eq!(store.active_filters().names(), vec!["cabernet", "under-20"]);

    store.remove_filter("cabernet");
    assert_eq!(store.active_filters().names(), vec!["under-20"]);

    store.clear_all();
    assert!(store.active_filters().is_empty());

    let rendered = rendered.lock().unwrap();
    assert_eq!(
        *rendered,
        vec![
            vec!["cabernet (varietal)".to_string()],
            vec!["cabernet (varietal)".to_string(), "under-20 (price)".to_string()],
            vec!["under-20 (price)".to_string()],
            vec![],
        ]
    );
}

#[test]
fn test_catalog_facets_toggle_through_store() {
    let catalog = create_test_catalog();
    let store = FilterStore::new();

    for facet in catalog.facets_by_type(FilterType::Varietal) {
        store.toggle_active_filter(facet.clone());
    }
    let active = store.active_filters();
    assert_eq!(active.names(), vec!["cabernet", "merlot"]);
    assert_eq!(active.get("merlot").unwrap().display_category_id, Some(14));

    // Selecting the same chip again deselects it
    let cabernet = catalog.get("cabernet").unwrap().clone();
    assert!(!store.toggle_active_filter(cabernet));
    assert_eq!(store.active_filters().names(), vec!["merlot"]);
}

#[test]
fn test_remove_twice_same_as_once() {
    let store = FilterStore::with_filters(vec![
        Filter::new("a", FilterType::Brand),
        Filter::new("b", FilterType::Brand),
    ]);

    store.remove_filter("a");
    let once = store.active_filters();
    store.remove_filter("a");
    assert_eq!(store.active_filters(), once);
}

#[test]
fn test_concurrent_toggles_keep_names_unique() {
    let store = FilterStore::new();
    let names: Vec<String> = (0..8).map(|i| format!("facet-{i}")).collect();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            let names = names.clone();
            thread::spawn(move || {
                for _ in 0..50 {
                    for name in &names {
                        store.toggle_active_filter(Filter::new(name.clone(), FilterType::Region));
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // Every name was toggled an even number of times overall
    assert!(store.active_filters().is_empty());
}

#[test]
fn test_observers_see_snapshots_in_mutation_order() {
    let store = FilterStore::new();
    let lengths = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&lengths);
    let _sub = store.subscribe(move |active: &ActiveFilters| {
        sink.lock().unwrap().push(active.len());
    });

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let store = store.clone();
            thread::spawn(move || {
                for i in 0..25 {
                    store.toggle_active_filter(Filter::new(format!("t{t}-{i}"), FilterType::Price));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // Only additions happened, so each notification is one longer than the last
    let lengths = lengths.lock().unwrap();
    assert_eq!(lengths.len(), 100);
    assert!(lengths.windows(2).all(|w| w[1] == w[0] + 1));
}

#[tokio::test]
async fn test_watch_receiver_wakes_on_change() {
    let store = FilterStore::new();
    let mut rx = store.watch();

    let writer = store.clone();
    let task = tokio::spawn(async move {
        writer.toggle_active_filter(Filter::new("seafood", FilterType::PairingNote));
    });

    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().names(), vec!["seafood"]);
    task.await.unwrap();
}

#[test]
fn test_session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let session = SessionFile::new(dir.path().join("filters.json"));

    {
        let store = session.restore().unwrap();
        let _sub = session.attach(&store);
        store.toggle_active_filter(Filter::new("oaky", FilterType::TastingNote));
        store.toggle_active_filter(Filter::new("sonoma", FilterType::Region));
    }

    let store = session.restore().unwrap();
    assert_eq!(store.active_filters().names(), vec!["oaky", "sonoma"]);
}
