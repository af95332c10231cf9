//! UniqueMap - A thread-safe set
//!
//! A `UniqueMap` only stores keys. It shares the storage and counter
//! behaviour of [`DefaultMap`](crate::DefaultMap), with `()` as the value,
//! and only exposes the membership operations.

use std::borrow::Borrow;
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{
    de::{Deserialize, Deserializer},
    ser::{Serialize, SerializeSeq, Serializer},
};

use crate::internals::base::BaseMap;
use crate::internals::store::{ConcurrentStore, ShardedStore};

#[cfg(feature = "serde")]
use crate::utils::SetCollector;

/// A thread-safe set of `K`.
///
/// As with [`DefaultMap`](crate::DefaultMap), cloning the handle shares the
/// storage and [`len`](UniqueMap::len) is an approximate counter.
///
/// # Examples
/// ```
/// use syncmaps::UniqueMap;
///
/// let seen: UniqueMap<u64> = UniqueMap::new();
/// seen.set(7);
/// assert!(seen.exists(&7));
///
/// // Only record 8 once 7 has been seen.
/// assert!(seen.set_if(8, |s| s.exists(&7)));
/// assert_eq!(seen.len(), 2);
/// ```
pub struct UniqueMap<K, S = ShardedStore<K, ()>> {
    base: Arc<BaseMap<K, (), S>>,
}

impl<K> UniqueMap<K>
where
    K: Hash + Eq + Clone,
{
    /// Construct a new, empty set.
    pub fn new() -> Self {
        Self::with_store(ShardedStore::new())
    }

    /// Construct a new, empty set with room for at least `capacity` keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_store(ShardedStore::with_capacity(capacity))
    }
}

impl<K, S> UniqueMap<K, S>
where
    K: Hash + Eq,
    S: ConcurrentStore<K, ()>,
{
    /// Construct a new set over the provided, empty, store.
    pub fn with_store(store: S) -> Self {
        UniqueMap {
            base: Arc::new(BaseMap::new(store)),
        }
    }

    /// Returns the entry counter of the set. This has the same drift as
    /// [`DefaultMap::len`](crate::DefaultMap::len): repeated sets of one key
    /// each count, and deleting an absent key still decrements.
    pub fn len(&self) -> i32 {
        self.base.length()
    }

    /// Returns true if the set holds no keys at this instant.
    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    /// Assert if a key is in the set.
    pub fn exists<Q>(&self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.base.exists(k)
    }

    /// Add a key to the set.
    pub fn set(&self, k: K) {
        self.base.set_val(k, ())
    }

    /// Add a key only if the predicate `f` returns true. Returns whether the
    /// key was added. The predicate is not atomic with the insert.
    pub fn set_if<F>(&self, k: K, f: F) -> bool
    where
        F: FnOnce(&Self) -> bool,
    {
        if f(self) {
            self.base.set_val(k, ());
            true
        } else {
            false
        }
    }

    /// Remove a key from the set.
    pub fn delete<Q>(&self, k: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.base.delete(k)
    }

    /// Remove every key from the set.
    pub fn clear(&self) {
        self.base.clear()
    }

    /// Collect the keys of the set, in no particular order.
    pub fn keys(&self) -> Vec<K> {
        self.base.keys()
    }
}

impl<K, S> Clone for UniqueMap<K, S> {
    fn clone(&self) -> Self {
        UniqueMap {
            base: Arc::clone(&self.base),
        }
    }
}

impl<K> Default for UniqueMap<K>
where
    K: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, S> Debug for UniqueMap<K, S>
where
    K: Hash + Eq + Debug,
    S: ConcurrentStore<K, ()>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut set = f.debug_set();
        self.base.for_range(|k, _| {
            set.entry(&k);
            true
        });
        set.finish()
    }
}

impl<K> FromIterator<K> for UniqueMap<K>
where
    K: Hash + Eq + Clone,
{
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = UniqueMap::new();
        set.extend(iter);
        set
    }
}

impl<K, S> Extend<K> for UniqueMap<K, S>
where
    K: Hash + Eq,
    S: ConcurrentStore<K, ()>,
{
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        iter.into_iter().for_each(|k| self.set(k));
    }
}

#[cfg(feature = "serde")]
impl<K, S> Serialize for UniqueMap<K, S>
where
    K: Serialize + Hash + Eq,
    S: ConcurrentStore<K, ()>,
{
    fn serialize<Se>(&self, serializer: Se) -> Result<Se::Ok, Se::Error>
    where
        Se: Serializer,
    {
        let mut state = serializer.serialize_seq(None)?;
        let mut res = Ok(());
        self.base.for_range(|k, _| match state.serialize_element(&k) {
            Ok(()) => true,
            Err(e) => {
                res = Err(e);
                false
            }
        });
        res?;
        state.end()
    }
}

#[cfg(feature = "serde")]
impl<'de, K> Deserialize<'de> for UniqueMap<K>
where
    K: Deserialize<'de> + Hash + Eq + Clone,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(SetCollector::new())
    }
}
