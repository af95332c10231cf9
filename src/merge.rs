//! Merge - fold several maps into a new one
//!
//! Both functions build a fresh [`DefaultMap`] and leave their sources
//! untouched. A source is anything implementing [`Map`], and trait objects
//! allow sources of different types to be given together. Sources are consumed in the order given and each one is fully
//! traversed. They differ only in how a key present in more than one source
//! is resolved:
//!
//! * [`merge`] overwrites, so the last source holding the key wins.
//! * [`merge_unique`] never overwrites, so the first source holding the key
//!   wins.

use std::hash::Hash;

use crate::{DefaultMap, Map};

/// Merge all maps into one combined map, later maps overwriting earlier ones.
///
/// # Examples
/// ```
/// use syncmaps::{merge, DefaultMap};
///
/// let a: DefaultMap<&str, u32> = [("x", 1), ("y", 1)].into_iter().collect();
/// let b: DefaultMap<&str, u32> = [("x", 2)].into_iter().collect();
///
/// let merged = merge([&a, &b]);
/// assert_eq!(merged.get(&"x"), 2);
/// assert_eq!(merged.get(&"y"), 1);
/// ```
pub fn merge<'a, K, V, M, I>(maps: I) -> DefaultMap<K, V>
where
    K: Hash + Eq + Clone + 'a,
    V: Clone + 'a,
    M: Map<K, V> + ?Sized + 'a,
    I: IntoIterator<Item = &'a M>,
{
    let merged = DefaultMap::new();
    let mut sources = 0usize;
    for next in maps {
        next.iterate(&mut |k, v| {
            merged.set(k.clone(), v.clone());
            true
        });
        sources += 1;
    }
    tracing::trace!(sources, "merged maps");
    merged
}

/// Merge all maps into one combined map, keeping only the first occurrence
/// of every key.
///
/// # Examples
/// ```
/// use syncmaps::{merge_unique, DefaultMap};
///
/// let a: DefaultMap<&str, u32> = [("x", 1)].into_iter().collect();
/// let b: DefaultMap<&str, u32> = [("x", 2), ("y", 2)].into_iter().collect();
///
/// let merged = merge_unique([&a, &b]);
/// assert_eq!(merged.get(&"x"), 1);
/// assert_eq!(merged.get(&"y"), 2);
/// ```
pub fn merge_unique<'a, K, V, M, I>(maps: I) -> DefaultMap<K, V>
where
    K: Hash + Eq + Clone + 'a,
    V: Clone + 'a,
    M: Map<K, V> + ?Sized + 'a,
    I: IntoIterator<Item = &'a M>,
{
    let merged = DefaultMap::new();
    let mut sources = 0usize;
    let mut skipped = 0usize;
    for next in maps {
        next.iterate(&mut |k, v| {
            if merged.exists(k) {
                skipped += 1;
            } else {
                merged.set(k.clone(), v.clone());
            }
            true
        });
        sources += 1;
    }
    tracing::trace!(sources, skipped, "merged unique maps");
    merged
}
