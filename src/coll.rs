use std::collections::btree_map::{self, Iter};
use std::collections::BTreeMap;
use std::ops::AddAssign;

/// A collection for consolidating occurrence counts per key
///
/// Insert pairs of key and count using the `+=` operator; counts for equal keys are
/// summed up. Iteration yields the keys in ascending order, which makes the derived
/// charts stable across refreshes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tally<K: Ord>(BTreeMap<K, u64>);

impl<K: Ord> Default for Tally<K> {
    fn default() -> Self {
        Tally(BTreeMap::new())
    }
}

impl<K: Ord + Clone> Tally<K> {
    pub fn new() -> Tally<K> {
        Tally(Default::default())
    }

    /// count every key produced by the iterator once
    pub fn count<I: IntoIterator<Item = K>>(keys: I) -> Tally<K> {
        let mut tally = Self::new();
        for key in keys {
            tally += (key, 1);
        }
        tally
    }

    pub fn get(&self, key: &K) -> u64 {
        self.0.get(key).copied().unwrap_or(0)
    }

    pub fn to_vec(&self) -> Vec<(K, u64)> {
        self.0.iter().map(|(k, n)| (k.clone(), *n)).collect()
    }

    pub fn iter(&self) -> Iter<K, u64> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<K: Ord> IntoIterator for Tally<K> {
    type Item = (K, u64);
    type IntoIter = btree_map::IntoIter<K, u64>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, K: Ord> IntoIterator for &'a Tally<K> {
    type Item = (&'a K, &'a u64);
    type IntoIter = btree_map::Iter<'a, K, u64>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<K: Ord> AddAssign<(K, u64)> for Tally<K> {
    fn add_assign(&mut self, other: (K, u64)) {
        let (key, n) = other;
        if n == 0 {
            return;
        }
        *self.0.entry(key).or_insert(0) += n;
    }
}
