//! The active filter store.
//!
//! A `FilterStore` owns the insertion-ordered collection of active filters
//! for one product-listing session. It is constructed explicitly and handed
//! to whoever needs it; clones are handles onto the same collection.
//!
//! ## Concurrency
//! - Readers take a short read lock and clone the current snapshot
//! - Writers are serialized by a single writer lock held for the whole
//!   compute, publish, notify sequence, so observers see snapshots in
//!   mutation order and never a half-applied change
//! - Observer callbacks never run under the snapshot lock, so they may
//!   read the store freely
//! - A mutation issued from inside an observer is queued and applied once
//!   the current notification round finishes, on the same thread

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};

use catalog::Filter;
use tokio::sync::watch;

use crate::snapshot::ActiveFilters;
use crate::traits::FilterObserver;

thread_local! {
    /// Stores whose observers are running on this thread.
    static NOTIFYING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Identifies one registered observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct RegisteredObserver {
    id: SubscriptionId,
    observer: Arc<dyn FilterObserver>,
}

/// One of the three store operations, kept as data so it can be queued.
enum Mutation {
    Toggle(Filter),
    Remove(String),
    Clear,
}

impl Mutation {
    fn op(&self) -> &'static str {
        match self {
            Mutation::Toggle(_) => "toggle",
            Mutation::Remove(_) => "remove",
            Mutation::Clear => "clear",
        }
    }

    fn name(&self) -> &str {
        match self {
            Mutation::Toggle(filter) => &filter.name,
            Mutation::Remove(name) => name,
            Mutation::Clear => "*",
        }
    }

    /// The next collection, or `None` when the mutation changes nothing.
    fn apply(&self, current: &ActiveFilters) -> Option<ActiveFilters> {
        match self {
            Mutation::Toggle(filter) => Some(match current.position(&filter.name) {
                Some(pos) => current
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != pos)
                    .map(|(_, f)| f.clone())
                    .collect(),
                None => current.iter().cloned().chain(Some(filter.clone())).collect(),
            }),
            Mutation::Remove(name) => {
                current.position(name)?;
                Some(current.iter().filter(|f| &f.name != name).cloned().collect())
            }
            Mutation::Clear => {
                if current.is_empty() {
                    None
                } else {
                    Some(ActiveFilters::default())
                }
            }
        }
    }
}

struct StoreInner {
    current: RwLock<ActiveFilters>,
    writer: Mutex<()>,
    observers: Mutex<Vec<RegisteredObserver>>,
    /// Mutations issued by observers during the current notification round
    deferred: Mutex<VecDeque<Mutation>>,
    next_id: AtomicU64,
    watch_tx: watch::Sender<ActiveFilters>,
}

impl StoreInner {
    fn unregister(&self, id: SubscriptionId) -> bool {
        let mut observers = lock(&self.observers);
        let before = observers.len();
        observers.retain(|r| r.id != id);
        before != observers.len()
    }

    fn key(self: &Arc<Self>) -> usize {
        Arc::as_ptr(self) as usize
    }
}

/// Marks a store as notifying on this thread until dropped, panics included.
struct NotifyingGuard {
    key: usize,
}

impl NotifyingGuard {
    fn enter(key: usize) -> Self {
        NOTIFYING.with(|stores| stores.borrow_mut().push(key));
        Self { key }
    }

    fn is_active(key: usize) -> bool {
        NOTIFYING.with(|stores| stores.borrow().contains(&key))
    }
}

impl Drop for NotifyingGuard {
    fn drop(&mut self) {
        NOTIFYING.with(|stores| {
            let mut stores = stores.borrow_mut();
            if let Some(pos) = stores.iter().rposition(|k| *k == self.key) {
                stores.remove(pos);
            }
        });
    }
}

/// Single source of truth for the filters active in a listing session.
///
/// ## Usage
/// ```ignore
/// let store = FilterStore::new();
/// let _sub = store.subscribe(|active: &ActiveFilters| render_filter_bar(active));
///
/// store.toggle_active_filter(Filter::new("cabernet", FilterType::Varietal));
/// store.remove_filter("cabernet");
/// store.clear_all();
/// ```
#[derive(Clone)]
pub struct FilterStore {
    inner: Arc<StoreInner>,
}

impl FilterStore {
    /// Create a store with no active filters.
    pub fn new() -> Self {
        Self::from_snapshot(ActiveFilters::default())
    }

    /// Create a store seeded with filters, e.g. restored from a session.
    ///
    /// Later filters whose name is already present are dropped.
    pub fn with_filters(filters: impl IntoIterator<Item = Filter>) -> Self {
        Self::from_snapshot(filters.into_iter().collect())
    }

    fn from_snapshot(initial: ActiveFilters) -> Self {
        let (watch_tx, _) = watch::channel(initial.clone());
        Self {
            inner: Arc::new(StoreInner {
                current: RwLock::new(initial),
                writer: Mutex::new(()),
                observers: Mutex::new(Vec::new()),
                deferred: Mutex::new(VecDeque::new()),
                next_id: AtomicU64::new(1),
                watch_tx,
            }),
        }
    }

    /// The current snapshot, in insertion order.
    pub fn active_filters(&self) -> ActiveFilters {
        self.inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Add the filter if its name is inactive, otherwise remove the active
    /// filter with that name.
    ///
    /// Only `name` is compared. Returns whether the name is active afterwards.
    pub fn toggle_active_filter(&self, filter: Filter) -> bool {
        let name = filter.name.clone();
        let (_, after) = self.mutate(Mutation::Toggle(filter));
        after.contains(&name)
    }

    /// Remove the filter with this name, if active.
    ///
    /// Accepts a name or a `&Filter`; only the name is used. Removing an
    /// inactive name is a no-op. Returns whether anything was removed.
    pub fn remove_filter(&self, filter: impl AsRef<str>) -> bool {
        self.mutate(Mutation::Remove(filter.as_ref().to_string())).0
    }

    /// Deactivate every filter. Returns whether anything was active.
    pub fn clear_all(&self) -> bool {
        self.mutate(Mutation::Clear).0
    }

    /// Register an observer for every future snapshot.
    ///
    /// The observer stays registered until the returned [`Subscription`] is
    /// dropped, unsubscribed, or the store is gone.
    pub fn subscribe(&self, observer: impl FilterObserver + 'static) -> Subscription {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.inner.observers).push(RegisteredObserver {
            id,
            observer: Arc::new(observer),
        });
        tracing::debug!(subscription = id.0, "observer registered");

        Subscription {
            id,
            store: Some(Arc::downgrade(&self.inner)),
        }
    }

    /// A receiver that always holds the latest snapshot.
    ///
    /// For async consumers; `changed().await` wakes on each mutation.
    pub fn watch(&self) -> watch::Receiver<ActiveFilters> {
        self.inner.watch_tx.subscribe()
    }

    /// Number of observers currently registered.
    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner.observers).len()
    }

    /// Apply a mutation and everything observers queue in response.
    ///
    /// Returns whether the collection changed and the collection as this
    /// mutation left it. For a mutation queued from inside an observer both
    /// are computed against the pending queue, which is exact because no
    /// other writer can run before the queue drains.
    fn mutate(&self, mutation: Mutation) -> (bool, ActiveFilters) {
        let key = self.inner.key();
        if NotifyingGuard::is_active(key) {
            return self.defer(mutation);
        }

        let _writer = lock(&self.inner.writer);
        // Left over only if an observer panicked mid-round
        lock(&self.inner.deferred).clear();
        let _notifying = NotifyingGuard::enter(key);

        let result = self.apply_and_notify(&mutation);
        loop {
            let Some(next) = lock(&self.inner.deferred).pop_front() else {
                break;
            };
            self.apply_and_notify(&next);
        }
        result
    }

    fn defer(&self, mutation: Mutation) -> (bool, ActiveFilters) {
        let mut deferred = lock(&self.inner.deferred);

        let mut pending = self.active_filters();
        for queued in deferred.iter() {
            if let Some(next) = queued.apply(&pending) {
                pending = next;
            }
        }

        match mutation.apply(&pending) {
            Some(next) => {
                tracing::debug!(
                    op = mutation.op(),
                    name = mutation.name(),
                    "mutation queued until observers finish"
                );
                deferred.push_back(mutation);
                (true, next)
            }
            None => (false, pending),
        }
    }

    /// Publish one mutation's result and run every observer on it.
    fn apply_and_notify(&self, mutation: &Mutation) -> (bool, ActiveFilters) {
        let (op, name) = (mutation.op(), mutation.name());
        let current = self.active_filters();
        let Some(next) = mutation.apply(&current) else {
            tracing::trace!(op, name, "no change");
            return (false, current);
        };

        *self
            .inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = next.clone();
        self.inner.watch_tx.send_replace(next.clone());

        tracing::debug!(op, name, active = next.len(), "active filters changed");

        // Snapshot the registry so observers may subscribe or unsubscribe
        // from inside their callback.
        let observers: Vec<Arc<dyn FilterObserver>> = lock(&self.inner.observers)
            .iter()
            .map(|r| Arc::clone(&r.observer))
            .collect();
        for observer in observers {
            observer.on_change(&next);
        }

        (true, next)
    }
}

impl Default for FilterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FilterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterStore")
            .field("active", &self.active_filters().names())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Registration handle returned by [`FilterStore::subscribe`].
///
/// Dropping it unregisters the observer.
#[must_use = "dropping a Subscription unregisters its observer"]
pub struct Subscription {
    id: SubscriptionId,
    store: Option<Weak<StoreInner>>,
}

impl Subscription {
    /// The id this observer was registered under.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Unregister now.
    pub fn unsubscribe(self) {
        drop(self);
    }

    /// Keep the observer registered for the lifetime of the store.
    pub fn detach(mut self) {
        self.store = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(inner) = self.store.take().and_then(|weak| weak.upgrade()) else {
            return;
        };
        if inner.unregister(self.id) {
            tracing::debug!(subscription = self.id.0, "observer unregistered");
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("attached", &self.store.is_some())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
