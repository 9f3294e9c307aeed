//! Reactive cell: a shared value with change notification.
//!
//! A [`Signal`] is a cheap-to-clone handle to one value. Every write bumps a
//! monotonically increasing version; derived views compare the version they
//! were computed from against the current one to decide whether to recompute.
//! Subscribers are notified after each write, outside of any lock, with a
//! snapshot of the new value.
//!
//! ## Usage Pattern
//!
//! ```ignore
//! let name = Signal::new(String::new());
//! let id = name.subscribe(|v| tracing::debug!(value = %v, "name changed"));
//! name.set("Ada".to_string());
//! name.unsubscribe(id);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

type Subscriber<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Handle returned by [`Signal::subscribe`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Inner<T> {
    value: RwLock<T>,
    version: AtomicU64,
    next_subscriber: AtomicU64,
    subscribers: Mutex<Vec<(SubscriptionId, Subscriber<T>)>>,
}

/// Shared, observable value.
pub struct Signal<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let value = self.inner.value.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("Signal")
            .field("value", &*value)
            .field("version", &self.version())
            .finish()
    }
}

impl<T: Default + Clone + Send + Sync + 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Signal<T> {
    /// Number of writes performed so far.
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::Acquire)
    }

    /// Whether both handles point at the same cell.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Read the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let value = self.inner.value.read().unwrap_or_else(PoisonError::into_inner);
        f(&value)
    }
}

impl<T: Clone + Send + Sync + 'static> Signal<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Inner {
                value: RwLock::new(value),
                version: AtomicU64::new(0),
                next_subscriber: AtomicU64::new(0),
                subscribers: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn get(&self) -> T {
        self.with(T::clone)
    }

    /// Replace the value and notify subscribers.
    pub fn set(&self, value: T) {
        self.update(|slot| *slot = value);
    }

    /// Mutate the value in place and notify subscribers.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let snapshot = {
            let mut slot = self.inner.value.write().unwrap_or_else(PoisonError::into_inner);
            f(&mut slot);
            self.inner.version.fetch_add(1, Ordering::AcqRel);
            if self.has_subscribers() {
                Some(slot.clone())
            } else {
                None
            }
        };

        if let Some(value) = snapshot {
            self.notify(&value);
        }
    }

    /// Register a callback invoked after every write.
    ///
    /// The callback does not fire for the current value.
    pub fn subscribe(&self, f: impl Fn(&T) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_subscriber.fetch_add(1, Ordering::Relaxed));
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(f)));
        id
    }

    /// Remove a callback. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subs = self.inner.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
        let before = subs.len();
        subs.retain(|(sub_id, _)| *sub_id != id);
        subs.len() != before
    }

    fn has_subscribers(&self) -> bool {
        !self
            .inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    fn notify(&self, value: &T) {
        // Copy the list out so callbacks may (un)subscribe or write.
        let subs: Vec<Subscriber<T>> = self
            .inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, f)| Arc::clone(f))
            .collect();

        for f in subs {
            f(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn set_bumps_version_and_replaces_value() {
        let s = Signal::new(1);
        assert_eq!(s.version(), 0);
        s.set(2);
        assert_eq!(s.get(), 2);
        assert_eq!(s.version(), 1);
        s.update(|v| *v += 1);
        assert_eq!(s.get(), 3);
        assert_eq!(s.version(), 2);
    }

    #[test]
    fn clones_share_the_same_cell() {
        let a = Signal::new(String::from("a"));
        let b = a.clone();
        b.set("b".into());
        assert_eq!(a.get(), "b");
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&Signal::new(String::new())));
    }

    #[test]
    fn subscribers_see_every_write_until_unsubscribed() {
        let s = Signal::new(0);
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = Arc::clone(&seen);
        let id = s.subscribe(move |v| {
            seen_clone.store(*v, Ordering::SeqCst);
        });

        s.set(5);
        assert_eq!(seen.load(Ordering::SeqCst), 5);

        assert!(s.unsubscribe(id));
        assert!(!s.unsubscribe(id));
        s.set(9);
        assert_eq!(seen.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn subscriber_may_write_back_without_deadlock() {
        let s = Signal::new(0);
        let mirror = Signal::new(0);
        let mirror_clone = mirror.clone();
        let s_clone = s.clone();
        s.subscribe(move |v| {
            mirror_clone.set(*v * 2);
            // Reading the source from inside a callback must not block.
            assert_eq!(s_clone.get(), *v);
        });
        s.set(21);
        assert_eq!(mirror.get(), 42);
    }
}
