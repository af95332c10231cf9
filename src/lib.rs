//! Syncmaps - Thread-safe generic maps with helpers
//!
//! This crate provides maps that can be shared between threads without
//! wrapping them in a `Mutex` or `RwLock`. Every operation takes `&self`
//! and is a short, bounded, synchronous call.
//!
//! * [`DefaultMap`] - a key value map with predicate gated mutation,
//!   atomic get-or-set, and traversal helpers.
//! * [`UniqueMap`] - a set of keys built on the same core.
//! * [`merge`] and [`merge_unique`] - fold several maps into a new one.
//! * [`Map`] - the trait those functions accept, implemented by
//!   [`DefaultMap`].
//!
//! Both maps are thin facades over a shared core which pairs a
//! [`ConcurrentStore`](internals::ConcurrentStore) with an atomic entry
//! counter. The counter is approximate, see [`DefaultMap::len`].
//!
//! None of the traversals (`keys`, `values`, `filter`, `take_while`,
//! `iterate`) are isolated from concurrent writers. They may or may not see
//! entries that are inserted or removed while they run. They never hold a
//! lock while calling back into your code, so a visitor may use the map it
//! is visiting.
//!
//! # Features
//!
//! * `foldhash` - use the foldhash crate for hashing keys (default)
//! * `ahash` - use the cpu accelerated ahash crate, this takes priority
//!   over `foldhash`
//! * `serde` - serialize maps as maps and sets as sequences
//!
//! With neither hashing feature enabled the std `RandomState` is used.

#![deny(warnings)]
#![warn(unused_extern_crates)]
#![warn(missing_docs)]

// The store seam and the counting core.
pub mod internals;

#[cfg(feature = "serde")]
mod utils;

pub mod defaultmap;
pub mod map;
pub mod merge;
pub mod uniquemap;

pub use defaultmap::DefaultMap;
pub use map::Map;
pub use merge::{merge, merge_unique};
pub use uniquemap::UniqueMap;
