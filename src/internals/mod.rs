//! This module contains the internals the map facades are built from. The
//! store seam is public so that an alternate [`ConcurrentStore`] can be
//! supplied to a map, everything else stays inside the crate.
//!
//! If you only want a map, use [`DefaultMap`](crate::DefaultMap) or
//! [`UniqueMap`](crate::UniqueMap) and never look in here.

pub(crate) mod base;
pub mod store;

pub use store::{ConcurrentStore, ShardedStore, StoreBuilder};
