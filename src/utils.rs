//! Serde visitors that rebuild a map or a set through `FromIterator`, so the
//! entries go through the normal insert path.

use std::fmt;
use std::iter;
use std::marker::PhantomData;

use serde::de::{Deserialize, MapAccess, SeqAccess, Visitor};

pub(crate) struct MapCollector<T, K, V>(PhantomData<(T, K, V)>);

impl<T, K, V> MapCollector<T, K, V> {
    pub(crate) fn new() -> Self {
        Self(PhantomData)
    }
}

impl<'de, T, K, V> Visitor<'de> for MapCollector<T, K, V>
where
    T: FromIterator<(K, V)>,
    K: Deserialize<'de>,
    V: Deserialize<'de>,
{
    type Value = T;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        iter::from_fn(|| access.next_entry().transpose()).collect()
    }
}

pub(crate) struct SetCollector<T, K>(PhantomData<(T, K)>);

impl<T, K> SetCollector<T, K> {
    pub(crate) fn new() -> Self {
        Self(PhantomData)
    }
}

impl<'de, T, K> Visitor<'de> for SetCollector<T, K>
where
    T: FromIterator<K>,
    K: Deserialize<'de>,
{
    type Value = T;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence of keys")
    }

    fn visit_seq<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        iter::from_fn(|| access.next_element().transpose()).collect()
    }
}
