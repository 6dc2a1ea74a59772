//! Compute caches
//!
//! Concurrent get-or-compute maps owned by a [`ScriptContext`](crate::context::ScriptContext).
//! Each key is computed at most once successfully; a failed compute leaves
//! the key empty so a later caller can retry.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::OnceCell;

pub struct ComputeCache<K, V> {
    entries: RwLock<HashMap<K, Arc<OnceCell<V>>>>,
}

impl<K, V> Default for ComputeCache<K, V> {
    fn default() -> Self {
        ComputeCache {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> ComputeCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).and_then(|cell| cell.get().cloned())
    }

    fn cell(&self, key: &K) -> Arc<OnceCell<V>> {
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(cell) = entries.get(key) {
                return cell.clone();
            }
        }
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.entry(key.clone()).or_default().clone()
    }

    /// Cached value for `key`, computing it with `compute` on first use.
    /// Concurrent callers for the same key wait for the first compute; the map lock is not held while computing.
    pub fn get_or_try_insert_with<E>(
        &self,
        key: &K,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        self.cell(key).get_or_try_init(compute).cloned()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Number of populated entries
    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.values().filter(|cell| cell.get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl<K, V> std::fmt::Debug for ComputeCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let len = self
            .entries
            .read()
            .map(|entries| entries.len())
            .unwrap_or_default();
        f.debug_struct("ComputeCache").field("entries", &len).finish()
    }
}
