//! The base map pairs a [`ConcurrentStore`] with an entry counter. The
//! facades in this crate are thin typed views over this structure.
//!
//! The counter is maintained independently of the store and is NOT an
//! exact occupancy count. It is the net number of set and delete calls:
//!
//! * `set_val` always increments, even when it overwrites an existing key.
//! * `get_or_set` never touches it, even when it inserts.
//! * `delete` and `get_and_delete` always decrement, even on a miss.
//! * `clear` decrements once for every entry it actually removes.

use std::borrow::Borrow;
use std::hash::Hash;
use std::marker::PhantomData;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicI32, Ordering};

use crossbeam_utils::CachePadded;

use super::store::ConcurrentStore;

pub(crate) struct BaseMap<K, V, S> {
    store: S,
    len: CachePadded<AtomicI32>,
    _marker: PhantomData<fn(K) -> V>,
}

impl<K, V, S> BaseMap<K, V, S>
where
    K: Hash + Eq,
    S: ConcurrentStore<K, V>,
{
    pub(crate) fn new(store: S) -> Self {
        BaseMap {
            store,
            len: CachePadded::new(AtomicI32::new(0)),
            _marker: PhantomData,
        }
    }

    pub(crate) fn length(&self) -> i32 {
        self.len.load(Ordering::Acquire)
    }

    fn increment(&self) {
        let n = self.len.fetch_add(1, Ordering::AcqRel).wrapping_add(1);
        if n < 0 {
            // Fatal for the whole process, not just this thread.
            tracing::error!(len = n, "entry counter is negative after increment, aborting");
            std::process::abort();
        }
    }

    fn decrement(&self) {
        self.len.fetch_sub(1, Ordering::AcqRel);
    }

    pub(crate) fn exists<Q>(&self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.load(k).is_some()
    }

    pub(crate) fn set_val(&self, k: K, v: V) {
        self.increment();
        self.store.store(k, v);
    }

    pub(crate) fn get_val<Q>(&self, k: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.load(k)
    }

    pub(crate) fn get_or_set(&self, k: K, v: V) -> (V, bool) {
        self.store.load_or_store(k, v)
    }

    pub(crate) fn get_and_delete<Q>(&self, k: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.decrement();
        self.store.load_and_delete(k)
    }

    pub(crate) fn delete<Q>(&self, k: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.decrement();
        self.store.delete(k);
    }

    pub(crate) fn clear(&self) {
        let mut removed = 0usize;
        self.store.range(|k, _| {
            if self.store.load_and_delete(&k).is_some() {
                self.decrement();
                removed += 1;
            }
            ControlFlow::Continue(())
        });
        tracing::trace!(removed, "cleared map");
    }

    /// Visit entries until `f` returns false. A false stops the whole
    /// traversal, it does not just skip the current entry.
    pub(crate) fn for_range<F>(&self, mut f: F)
    where
        F: FnMut(K, V) -> bool,
    {
        self.store.range(|k, v| {
            if f(k, v) {
                ControlFlow::Continue(())
            } else {
                ControlFlow::Break(())
            }
        });
    }

    pub(crate) fn keys(&self) -> Vec<K> {
        let mut keys = Vec::new();
        self.for_range(|k, _| {
            keys.push(k);
            true
        });
        keys
    }

    pub(crate) fn values(&self) -> Vec<V> {
        let mut values = Vec::new();
        self.for_range(|_, v| {
            values.push(v);
            true
        });
        values
    }

    pub(crate) fn is_empty(&self) -> bool {
        let mut empty = true;
        self.for_range(|_, _| {
            empty = false;
            false
        });
        empty
    }
}
