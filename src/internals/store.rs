//! The store is the concurrent key value primitive that every map in this
//! crate is knitted on top of. The map facades never lock anything
//! themselves, so whatever implements [`ConcurrentStore`] is responsible for
//! making each individual operation safe to call from many threads at once.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::ops::ControlFlow;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

#[cfg(feature = "ahash")]
use ahash::RandomState;

#[cfg(all(feature = "foldhash", not(feature = "ahash")))]
use foldhash::fast::RandomState;

#[cfg(all(not(feature = "ahash"), not(feature = "foldhash")))]
use std::collections::hash_map::RandomState;

/// A key value structure that is safe for unsynchronised access from many
/// threads.
///
/// Every operation is atomic with respect to a single key. Nothing is
/// promised across keys, and [`range`](ConcurrentStore::range) does not need
/// to reflect any consistent snapshot of the store.
pub trait ConcurrentStore<K, V> {
    /// Retrieve a copy of the value stored for `k`.
    fn load<Q>(&self, k: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized;

    /// Insert or overwrite the value for `k`.
    fn store(&self, k: K, v: V);

    /// If `k` is present return its current value and `true`, otherwise
    /// insert `v` and return it with `false`. This is a single atomic step.
    fn load_or_store(&self, k: K, v: V) -> (V, bool);

    /// Remove `k`, returning the value it held.
    fn load_and_delete<Q>(&self, k: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized;

    /// Remove `k` if it is present.
    fn delete<Q>(&self, k: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized;

    /// Visit entries in an unspecified order until the visitor breaks.
    ///
    /// The visitor must be allowed to call back into the store, including
    /// mutating it, without deadlocking.
    fn range<F>(&self, f: F)
    where
        F: FnMut(K, V) -> ControlFlow<()>;
}

/// The default store, a sharded hashmap where each shard is guarded by its
/// own reader writer lock.
///
/// Locks are only ever held for the duration of one operation on one shard.
/// In particular [`range`](ConcurrentStore::range) collects the keys it is
/// going to visit first and then loads them one at a time, so a visitor can
/// freely insert or delete in the same store.
pub struct ShardedStore<K, V> {
    inner: DashMap<K, V, RandomState>,
}

impl<K, V> ShardedStore<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Create an empty store with the default shard amount.
    pub fn new() -> Self {
        ShardedStore {
            inner: DashMap::with_hasher(RandomState::default()),
        }
    }

    /// Create an empty store that can hold at least `capacity` entries before
    /// reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        ShardedStore {
            inner: DashMap::with_capacity_and_hasher(capacity, RandomState::default()),
        }
    }
}

impl<K, V> Default for ShardedStore<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for ShardedStore<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardedStore")
            .field("entries", &self.inner.len())
            .finish()
    }
}

impl<K, V> ConcurrentStore<K, V> for ShardedStore<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn load<Q>(&self, k: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.get(k).map(|r| r.value().clone())
    }

    fn store(&self, k: K, v: V) {
        self.inner.insert(k, v);
    }

    fn load_or_store(&self, k: K, v: V) -> (V, bool) {
        match self.inner.entry(k) {
            Entry::Occupied(o) => (o.get().clone(), true),
            Entry::Vacant(e) => {
                let r = e.insert(v);
                (r.value().clone(), false)
            }
        }
    }

    fn load_and_delete<Q>(&self, k: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.remove(k).map(|(_, v)| v)
    }

    fn delete<Q>(&self, k: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let _ = self.inner.remove(k);
    }

    fn range<F>(&self, mut f: F)
    where
        F: FnMut(K, V) -> ControlFlow<()>,
    {
        // The iterator holds a shard read guard, so it must be gone before
        // the visitor runs.
        let keys: Vec<K> = self.inner.iter().map(|r| r.key().clone()).collect();

        for k in keys {
            // Removed since the snapshot, skip it.
            let Some(v) = self.load(&k) else {
                continue;
            };
            if f(k, v).is_break() {
                break;
            }
        }
    }
}

/// A builder for a [`ShardedStore`] that allows tuning of the initial
/// allocation and the amount of lock shards.
#[derive(Debug, Default, Clone)]
pub struct StoreBuilder {
    capacity: Option<usize>,
    shard_amount: Option<usize>,
}

impl StoreBuilder {
    /// Create a new store builder that you can configure before creation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve space for at least `capacity` entries up front.
    #[must_use]
    pub fn set_capacity(self, capacity: usize) -> Self {
        StoreBuilder {
            capacity: Some(capacity),
            shard_amount: self.shard_amount,
        }
    }

    /// Set how many independently locked shards the store is split into.
    /// This must be a power of two greater than one.
    #[must_use]
    pub fn set_shard_amount(self, shard_amount: usize) -> Self {
        StoreBuilder {
            capacity: self.capacity,
            shard_amount: Some(shard_amount),
        }
    }

    /// Consume this builder, returning a store if successful. If the shard
    /// amount is not a power of two greater than one, a None is returned.
    pub fn build<K, V>(self) -> Option<ShardedStore<K, V>>
    where
        K: Hash + Eq + Clone,
        V: Clone,
    {
        let StoreBuilder {
            capacity,
            shard_amount,
        } = self;

        let capacity = capacity.unwrap_or(0);

        let inner = match shard_amount {
            Some(shards) if shards > 1 && shards.is_power_of_two() => {
                DashMap::with_capacity_and_hasher_and_shard_amount(
                    capacity,
                    RandomState::default(),
                    shards,
                )
            }
            Some(shards) => {
                tracing::trace!(shards, "rejecting invalid shard amount");
                return None;
            }
            None => DashMap::with_capacity_and_hasher(capacity, RandomState::default()),
        };

        tracing::trace!(capacity, ?shard_amount, "built sharded store");
        Some(ShardedStore { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::{ConcurrentStore, ShardedStore, StoreBuilder};
    use std::ops::ControlFlow;

    #[test]
    fn test_store_basic() {
        let s: ShardedStore<usize, usize> = ShardedStore::new();
        assert_eq!(s.load(&10), None);

        s.store(10, 10);
        s.store(15, 15);
        assert_eq!(s.load(&10), Some(10));

        s.store(10, 11);
        assert_eq!(s.load(&10), Some(11));

        assert_eq!(s.load_and_delete(&10), Some(11));
        assert_eq!(s.load_and_delete(&10), None);

        s.delete(&15);
        s.delete(&15);
        assert_eq!(s.load(&15), None);
    }

    #[test]
    fn test_store_load_or_store() {
        let s: ShardedStore<&str, usize> = ShardedStore::default();
        assert_eq!(s.load_or_store("a", 1), (1, false));
        assert_eq!(s.load_or_store("a", 2), (1, true));
        assert_eq!(s.load(&"a"), Some(1));
    }

    #[test]
    fn test_store_borrowed_lookup() {
        let s: ShardedStore<String, usize> = ShardedStore::with_capacity(4);
        s.store("key".to_string(), 4);
        assert_eq!(s.load("key"), Some(4));
        s.delete("key");
        assert_eq!(s.load("key"), None);
    }

    #[test]
    fn test_store_range_break() {
        let s: ShardedStore<usize, usize> = ShardedStore::new();
        for i in 0..64 {
            s.store(i, i);
        }

        let mut all = 0;
        s.range(|_, _| {
            all += 1;
            ControlFlow::Continue(())
        });
        assert_eq!(all, 64);

        let mut seen = 0;
        s.range(|_, _| {
            seen += 1;
            if seen == 5 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(seen, 5);
    }

    #[test]
    fn test_store_range_reentrant() {
        let s: ShardedStore<usize, usize> = ShardedStore::new();
        for i in 0..32 {
            s.store(i, i);
        }
        // Deleting from inside the visitor must neither deadlock nor
        // yield removed entries.
        let mut seen = 0;
        s.range(|k, _| {
            seen += 1;
            s.delete(&k);
            s.delete(&(k ^ 1));
            ControlFlow::Continue(())
        });
        assert_eq!(seen, 16);

        let mut left = 0;
        s.range(|_, _| {
            left += 1;
            ControlFlow::Continue(())
        });
        assert_eq!(left, 0);
    }

    #[test]
    fn test_store_builder() {
        let s: ShardedStore<usize, usize> = StoreBuilder::new()
            .set_capacity(128)
            .set_shard_amount(8)
            .build()
            .expect("Invalid store parameters!");
        s.store(1, 1);
        assert_eq!(s.load(&1), Some(1));

        assert!(StoreBuilder::new().build::<usize, usize>().is_some());
        assert!(StoreBuilder::new()
            .set_shard_amount(3)
            .build::<usize, usize>()
            .is_none());
        assert!(StoreBuilder::new()
            .set_shard_amount(1)
            .build::<usize, usize>()
            .is_none());
    }
}
