//! Active filter state for product listings.
//!
//! This crate provides:
//! - FilterStore, the single source of truth for which facet filters are
//!   active in one listing session
//! - ActiveFilters, the immutable snapshot readers and observers receive
//! - FilterObserver and Subscription for explicit publish/subscribe
//! - SessionFile for persisting the active filters between runs
//!
//! ## Architecture
//! Consumers never touch the collection directly:
//! 1. A facet-selection UI calls `toggle_active_filter`
//! 2. A filter bar reads `active_filters()`, calls `remove_filter` per chip
//!    and `clear_all` for its clear control
//! 3. Query building reads snapshots and re-runs on every notification
//!
//! ## Example Usage
//! ```ignore
//! use catalog::{Filter, FilterType};
//! use filter_store::{ActiveFilters, FilterStore};
//!
//! let store = FilterStore::new();
//! let _sub = store.subscribe(|active: &ActiveFilters| println!("{:?}", active.names()));
//!
//! store.toggle_active_filter(Filter::new("cabernet", FilterType::Varietal));
//! store.toggle_active_filter(Filter::new("under-20", FilterType::Price));
//! store.remove_filter("cabernet");
//! store.clear_all();
//! ```

pub mod error;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod traits;

// Re-export main types
pub use error::SessionError;
pub use session::SessionFile;
pub use snapshot::ActiveFilters;
pub use store::{FilterStore, Subscription, SubscriptionId};
pub use traits::FilterObserver;
