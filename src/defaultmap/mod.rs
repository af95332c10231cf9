//! DefaultMap - A thread-safe key value map with helpers
//!
//! A `DefaultMap` behaves like a `HashMap` that can be shared between threads
//! without an outer lock. Every method takes `&self`, and the handle itself
//! is cheap to clone. All clones refer to the same storage, so a clone moved
//! into another thread sees and makes the same changes.
//!
//! On top of plain get and set, the map offers predicate gated mutation
//! ([`DefaultMap::set_if`], [`DefaultMap::delete_if`]), an atomic
//! [`DefaultMap::get_or_set`], and a few ways of walking the entries.
//!
//! There is no snapshot isolation. A traversal running in parallel with
//! writers may or may not observe those writes, and [`DefaultMap::len`] is
//! an approximate counter rather than a measured occupancy. See the
//! documentation on `len` for how it drifts.

use std::borrow::Borrow;
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{
    de::{Deserialize, Deserializer},
    ser::{Serialize, SerializeMap, Serializer},
};

use crate::internals::base::BaseMap;
use crate::internals::store::{ConcurrentStore, ShardedStore};
use crate::map::Map;

#[cfg(feature = "serde")]
use crate::utils::MapCollector;

/// A thread-safe map from `K` to `V`.
///
/// Values are handed out as clones, so `V` should be cheap to clone (or be
/// wrapped in an `Arc`).
///
/// # Examples
/// ```
/// use syncmaps::DefaultMap;
///
/// let map: DefaultMap<&str, u32> = DefaultMap::new();
/// map.set("a", 1);
///
/// // A clone shares the storage.
/// let other = map.clone();
/// other.set("b", 2);
///
/// assert_eq!(map.get(&"b"), 2);
/// // Missing keys yield the default value.
/// assert_eq!(map.get(&"c"), 0);
/// assert_eq!(map.get_ok(&"c"), None);
/// ```
pub struct DefaultMap<K, V, S = ShardedStore<K, V>> {
    base: Arc<BaseMap<K, V, S>>,
}

impl<K, V> DefaultMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Construct a new, empty map.
    pub fn new() -> Self {
        Self::with_store(ShardedStore::new())
    }

    /// Construct a new, empty map with room for at least `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_store(ShardedStore::with_capacity(capacity))
    }
}

impl<K, V, S> DefaultMap<K, V, S>
where
    K: Hash + Eq,
    S: ConcurrentStore<K, V>,
{
    /// Construct a new map over the provided, empty, store.
    pub fn with_store(store: S) -> Self {
        DefaultMap {
            base: Arc::new(BaseMap::new(store)),
        }
    }

    /// Returns the entry counter of the map.
    ///
    /// This counts net set and delete calls, not distinct resident keys.
    /// Overwriting a key with [`set`](Self::set) increments it again, while
    /// [`delete`](Self::delete) and [`get_and_delete`](Self::get_and_delete)
    /// decrement it even when the key was absent, so it can exceed the true
    /// entry count and it can go below zero. To test for emptiness use
    /// [`is_empty`](Self::is_empty) instead.
    pub fn len(&self) -> i32 {
        self.base.length()
    }

    /// Returns true if the store holds no entries at this instant. Unlike
    /// [`len`](Self::len) this looks at the storage itself.
    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    /// Assert if a key exists in the map.
    pub fn exists<Q>(&self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.base.exists(k)
    }

    /// Insert or overwrite the value for a key.
    ///
    /// # Aborts
    ///
    /// If the entry counter was driven so far below zero by deletes of
    /// absent keys that it is still negative after this insert, the error is
    /// logged and the process is aborted. This cannot be caught.
    pub fn set(&self, k: K, v: V) {
        self.base.set_val(k, v)
    }

    /// Set the value for a key only if the predicate `f` returns true. The
    /// predicate is given this map and may inspect it freely. Returns whether
    /// the value was set.
    ///
    /// The predicate and the set are two separate steps, a concurrent writer
    /// may change the map in between.
    pub fn set_if<F>(&self, k: K, v: V, f: F) -> bool
    where
        F: FnOnce(&Self) -> bool,
    {
        if f(self) {
            self.base.set_val(k, v);
            true
        } else {
            false
        }
    }

    /// Retrieve a value from the map, or the default value of `V` if the key
    /// is not present.
    pub fn get<Q>(&self, k: &Q) -> V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Default,
    {
        self.base.get_val(k).unwrap_or_default()
    }

    /// Retrieve a value from the map. If the value exists it is returned as
    /// `Some(V)`, otherwise `None` is returned.
    pub fn get_ok<Q>(&self, k: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.base.get_val(k)
    }

    /// If the key is present return its value and `true`. Otherwise insert
    /// `v` and return it with `false`. This is a single atomic step.
    ///
    /// This never changes [`len`](Self::len), even when it inserts.
    pub fn get_or_set(&self, k: K, v: V) -> (V, bool) {
        self.base.get_or_set(k, v)
    }

    /// Remove a key, returning the value it held if it was present. This is a
    /// single atomic step. The entry counter is decremented regardless.
    pub fn get_and_delete<Q>(&self, k: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.base.get_and_delete(k)
    }

    /// Remove a key from the map. The entry counter is decremented regardless
    /// of whether the key was present.
    pub fn delete<Q>(&self, k: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.base.delete(k)
    }

    /// Remove a key only if the predicate `f` returns true. Returns whether
    /// the delete was performed.
    pub fn delete_if<Q, F>(&self, k: &Q, f: F) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(&Self) -> bool,
    {
        if f(self) {
            self.base.delete(k);
            true
        } else {
            false
        }
    }

    /// Remove every entry in the map. Entries inserted while the clear is
    /// running may survive it.
    pub fn clear(&self) {
        self.base.clear()
    }

    /// Collect the keys of the map, in no particular order.
    pub fn keys(&self) -> Vec<K> {
        self.base.keys()
    }

    /// Collect the values of the map, in no particular order.
    pub fn values(&self) -> Vec<V> {
        self.base.values()
    }

    /// Collect entries while `f` returns true.
    ///
    /// Entries are visited in the store's arbitrary order and the first
    /// entry for which `f` is false stops the traversal. The result is a
    /// prefix of that order, not every matching entry. If you want the
    /// latter, use [`filter`](Self::filter).
    pub fn take_while<F>(&self, mut f: F) -> (Vec<K>, Vec<V>)
    where
        F: FnMut(&K, &V) -> bool,
    {
        let mut keys = Vec::new();
        let mut values = Vec::new();
        self.base.for_range(|k, v| {
            if f(&k, &v) {
                keys.push(k);
                values.push(v);
                true
            } else {
                false
            }
        });
        (keys, values)
    }

    /// Collect every entry for which `f` returns true. The i-th key belongs
    /// to the i-th value.
    pub fn filter<F>(&self, mut f: F) -> (Vec<K>, Vec<V>)
    where
        F: FnMut(&K, &V) -> bool,
    {
        let mut keys = Vec::new();
        let mut values = Vec::new();
        self.base.for_range(|k, v| {
            if f(&k, &v) {
                keys.push(k);
                values.push(v);
            }
            true
        });
        (keys, values)
    }

    /// Visit each entry until `f` returns false.
    pub fn iterate<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        self.base.for_range(|k, v| f(&k, &v))
    }
}

impl<K, V, S> Map<K, V> for DefaultMap<K, V, S>
where
    K: Hash + Eq,
    S: ConcurrentStore<K, V>,
{
    fn len(&self) -> i32 {
        self.base.length()
    }

    fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    fn exists(&self, k: &K) -> bool {
        self.base.exists(k)
    }

    fn set(&self, k: K, v: V) {
        self.base.set_val(k, v)
    }

    fn get_ok(&self, k: &K) -> Option<V> {
        self.base.get_val(k)
    }

    fn delete(&self, k: &K) {
        self.base.delete(k)
    }

    fn clear(&self) {
        self.base.clear()
    }

    fn keys(&self) -> Vec<K> {
        self.base.keys()
    }

    fn values(&self) -> Vec<V> {
        self.base.values()
    }

    fn iterate(&self, f: &mut dyn FnMut(&K, &V) -> bool) {
        self.base.for_range(|k, v| f(&k, &v))
    }
}

impl<K, V, S> Clone for DefaultMap<K, V, S> {
    fn clone(&self) -> Self {
        DefaultMap {
            base: Arc::clone(&self.base),
        }
    }
}

impl<K, V> Default for DefaultMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> Debug for DefaultMap<K, V, S>
where
    K: Hash + Eq + Debug,
    V: Debug,
    S: ConcurrentStore<K, V>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        self.base.for_range(|k, v| {
            map.entry(&k, &v);
            true
        });
        map.finish()
    }
}

impl<K, V> FromIterator<(K, V)> for DefaultMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = DefaultMap::new();
        map.extend(iter);
        map
    }
}

impl<K, V, S> Extend<(K, V)> for DefaultMap<K, V, S>
where
    K: Hash + Eq,
    S: ConcurrentStore<K, V>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        iter.into_iter().for_each(|(k, v)| self.set(k, v));
    }
}

impl<K, V, S> Extend<(K, V)> for &DefaultMap<K, V, S>
where
    K: Hash + Eq,
    S: ConcurrentStore<K, V>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        iter.into_iter().for_each(|(k, v)| self.set(k, v));
    }
}

#[cfg(feature = "serde")]
impl<K, V, S> Serialize for DefaultMap<K, V, S>
where
    K: Serialize + Hash + Eq,
    V: Serialize,
    S: ConcurrentStore<K, V>,
{
    fn serialize<Se>(&self, serializer: Se) -> Result<Se::Ok, Se::Error>
    where
        Se: Serializer,
    {
        // The counter is not an exact size, so don't hint one.
        let mut state = serializer.serialize_map(None)?;
        let mut res = Ok(());
        self.base.for_range(|k, v| match state.serialize_entry(&k, &v) {
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
impl<'de, K, V> Deserialize<'de> for DefaultMap<K, V>
where
    K: Deserialize<'de> + Hash + Eq + Clone,
    V: Deserialize<'de> + Clone,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(MapCollector::new())
    }
}
