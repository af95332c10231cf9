//! The [`Map`] trait is the common surface of every key value map in this
//! crate, so that code such as [`merge`](crate::merge) can accept any of
//! them, including a mix behind `&dyn Map<K, V>`.

/// A thread-safe key value map.
///
/// Every method takes `&self`. Implementations must be safe to call from
/// many threads at once and must not hold any lock while running the
/// visitor given to [`iterate`](Map::iterate).
pub trait Map<K, V> {
    /// Returns the entry counter of the map. This need not equal the number
    /// of resident keys.
    fn len(&self) -> i32;

    /// Returns true if the map holds no entries at this instant.
    fn is_empty(&self) -> bool;

    /// Assert if a key exists in the map.
    fn exists(&self, k: &K) -> bool;

    /// Insert or overwrite the value for a key.
    fn set(&self, k: K, v: V);

    /// Retrieve a value from the map, or the default value of `V` if the key
    /// is not present.
    fn get(&self, k: &K) -> V
    where
        V: Default,
    {
        self.get_ok(k).unwrap_or_default()
    }

    /// Retrieve a value from the map if it is present.
    fn get_ok(&self, k: &K) -> Option<V>;

    /// Remove a key from the map.
    fn delete(&self, k: &K);

    /// Remove every entry in the map.
    fn clear(&self);

    /// Collect the keys of the map, in no particular order.
    fn keys(&self) -> Vec<K>;

    /// Collect the values of the map, in no particular order.
    fn values(&self) -> Vec<V>;

    /// Visit each entry until `f` returns false.
    fn iterate(&self, f: &mut dyn FnMut(&K, &V) -> bool);
}
