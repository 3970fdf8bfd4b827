use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Bijective map
/// Keys map to unique values and values map back to unique keys.
/// Pairs are only ever added, so both sides grow together.
///
/// Iteration follows insertion order. Serialized as the forward map only;
/// deserializing rebuilds the reverse side and rejects non-bijective input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    try_from = "IndexMap<K, V>",
    into = "IndexMap<K, V>",
    bound(
        serialize = "K: Serialize + Eq + Hash + Clone, V: Serialize + Eq + Hash + Clone",
        deserialize = "K: Deserialize<'de> + Eq + Hash + Clone, V: Deserialize<'de> + Eq + Hash + Clone"
    )
)]
pub struct InvertibleMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Eq + Hash + Clone,
{
    forward: IndexMap<K, V>,
    backward: HashMap<V, K>,
}

impl<K, V> Default for InvertibleMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> InvertibleMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            forward: IndexMap::new(),
            backward: HashMap::new(),
        }
    }

    /// Insert a pair. Returns false, leaving the map unchanged, when either
    /// side is already mapped.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        if self.forward.contains_key(&key) || self.backward.contains_key(&value) {
            return false;
        }
        self.backward.insert(value.clone(), key.clone());
        self.forward.insert(key, value);
        true
    }

    #[inline]
    pub fn get_by_key<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.forward.get(key)
    }

    #[inline]
    pub fn get_by_value(&self, value: &V) -> Option<&K> {
        self.backward.get(value)
    }

    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.forward.contains_key(key)
    }

    #[inline]
    pub fn contains_value(&self, value: &V) -> bool {
        self.backward.contains_key(value)
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.forward.iter()
    }
}

impl<K, V> TryFrom<IndexMap<K, V>> for InvertibleMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Eq + Hash + Clone,
{
    type Error = String;

    fn try_from(forward: IndexMap<K, V>) -> Result<Self, Self::Error> {
        let mut map = Self::new();
        let len = forward.len();
        for (key, value) in forward {
            if !map.insert(key, value) {
                return Err(format!("InvertibleMap deserialize error: {len} pairs are not bijective"));
            }
        }
        Ok(map)
    }
}

impl<K, V> From<InvertibleMap<K, V>> for IndexMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Eq + Hash + Clone,
{
    fn from(map: InvertibleMap<K, V>) -> Self {
        map.forward
    }
}
