//! Observer contract for active filter changes.

use crate::snapshot::ActiveFilters;

/// Receives every new snapshot a store emits.
///
/// `on_change` runs synchronously on the mutating thread, after the new
/// snapshot is visible to readers and before the mutating call returns.
/// Observers run in registration order.
///
/// ## Design Note
/// - `Send + Sync` so a store can be shared across threads
/// - Mutating the observed store from inside `on_change` is allowed: the
///   change is queued and applied after every observer has seen the
///   current snapshot, then observers are notified again
/// - A panic in `on_change` propagates to the caller of the mutating
///   operation. The snapshot is already published at that point, so the
///   store stays consistent, but observers registered after the panicking
///   one never receive that snapshot and queued mutations are dropped
pub trait FilterObserver: Send + Sync {
    fn on_change(&self, snapshot: &ActiveFilters);
}

impl<F> FilterObserver for F
where
    F: Fn(&ActiveFilters) + Send + Sync,
{
    fn on_change(&self, snapshot: &ActiveFilters) {
        self(snapshot)
    }
}
