//! Version-keyed cache for derived views.

use std::sync::{Arc, Mutex, PoisonError};

/// Versions a derived view was computed from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct ViewKey {
    pub result: u64,
    pub locale: u64,
}

/// Holds the last computed value together with its [`ViewKey`].
///
/// A read with a different key recomputes; a read with the same key returns
/// the cached value.
pub(crate) struct Derived<V> {
    slot: Mutex<Option<(ViewKey, Arc<V>)>>,
}

impl<V> Default for Derived<V> {
    fn default() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }
}

impl<V> Derived<V> {
    pub fn get_or_compute(&self, key: ViewKey, compute: impl FnOnce() -> V) -> Arc<V> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        match slot.as_ref() {
            Some((cached_key, value)) if *cached_key == key => Arc::clone(value),
            _ => {
                let value = Arc::new(compute());
                *slot = Some((key, Arc::clone(&value)));
                value
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn recomputes_only_when_key_changes() {
        let derived = Derived::default();
        let calls = Cell::new(0);
        let key = ViewKey { result: 1, locale: 0 };

        let compute = || {
            calls.set(calls.get() + 1);
            calls.get()
        };
        assert_eq!(*derived.get_or_compute(key, compute), 1);
        assert_eq!(*derived.get_or_compute(key, compute), 1);
        assert_eq!(calls.get(), 1);

        let bumped = ViewKey { result: 1, locale: 1 };
        assert_eq!(*derived.get_or_compute(bumped, compute), 2);
    }
}
