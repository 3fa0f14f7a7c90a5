// src/reconcile.rs

use std::collections::HashSet;
use std::hash::Hash;

/// The three disjoint operations that turn one keyed set into another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedDiff<K> {
    /// In `next` but not `prev`, in `next` order
    pub enter: Vec<K>,
    /// In both, in `next` order
    pub update: Vec<K>,
    /// In `prev` but not `next`, in `prev` order
    pub exit: Vec<K>,
}

pub fn diff_keyed<K: Eq + Hash + Clone>(prev: &[K], next: &[K]) -> KeyedDiff<K> {
    let before: HashSet<&K> = prev.iter().collect();
    let after: HashSet<&K> = next.iter().collect();

    let (update, enter): (Vec<K>, Vec<K>) =
        next.iter().cloned().partition(|k| before.contains(k));
    let exit = prev.iter().filter(|k| !after.contains(k)).cloned().collect();

    KeyedDiff { enter, update, exit }
}
