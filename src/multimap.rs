use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;

/// Maps a key to an ordered sequence of values. The same map type backs
/// both the sibling-list index (sorted by `(v_pos, t)`, via
/// [`SortedMultiMap::insert_sorted`]) and the deferred queue (plain
/// insertion order, via [`SortedMultiMap::push`]). The comparator for a
/// sorted insert is supplied at the call site rather than stored on the
/// map, since the sibling-list comparator needs a live lookup into the
/// node store that the map itself has no access to.
#[derive(Clone, Debug)]
pub struct SortedMultiMap<K, V> {
    entries: HashMap<K, Vec<V>>,
}

impl<K, V> Default for SortedMultiMap<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, V> SortedMultiMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty slice if the key is absent.
    pub fn get(&self, key: &K) -> &[V] {
        self.entries.get(key).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Append in insertion order, with no resort. Used by the deferred
    /// queue, which has no ordering requirement among parked records.
    pub fn push(&mut self, key: K, value: V) {
        self.entries.entry(key).or_default().push(value);
    }

    /// Append, then stably re-sort the whole sequence with `cmp`. Used by
    /// the sibling-list index; `cmp` is expected to close over whatever
    /// external state (e.g. the node store) it needs to order two values.
    pub fn insert_sorted(&mut self, key: K, value: V, mut cmp: impl FnMut(&V, &V) -> Ordering) {
        let seq = self.entries.entry(key).or_default();
        seq.push(value);
        seq.sort_by(|a, b| cmp(a, b));
    }

    /// Remove the first value matching `pred`, returning it if found.
    pub fn remove_one(&mut self, key: &K, mut pred: impl FnMut(&V) -> bool) -> Option<V> {
        let seq = self.entries.get_mut(key)?;
        let idx = seq.iter().position(|v| pred(v))?;
        let removed = seq.remove(idx);
        self.delete_if_empty(key);
        Some(removed)
    }

    /// Remove and return every value under `key`.
    pub fn drain_all(&mut self, key: &K) -> Vec<V> {
        self.entries.remove(key).unwrap_or_default()
    }

    /// Drop the entry for `key` if its sequence is empty.
    pub fn delete_if_empty(&mut self, key: &K) {
        if self.entries.get(key).is_some_and(|seq| seq.is_empty()) {
            self.entries.remove(key);
        }
    }
}
