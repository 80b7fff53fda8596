use std::collections::BTreeMap;
use std::hash::Hash;
use std::num::NonZeroUsize;

use lru::LruCache;

use crate::error::CacheError;

/// Strategy for the in-memory substrate backing a cache instance. Selected
/// once at construction and never switched at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Bounded cache. Inserting past `capacity` silently evicts the least
    /// recently used entry. Eviction does not consult the checkpoint journal,
    /// so reverts of evicted-and-reinserted keys are not deterministic; use
    /// [`BackendKind::Ordered`] when that matters.
    Lru { capacity: usize },
    /// Unbounded key-ordered map. No eviction, deterministic reverts.
    Ordered,
}

/// The key→value substrate a cache writes through. Both implementations are
/// plain owned maps; `get`/`get_mut` take `&mut self` because the LRU variant
/// updates recency on reads.
pub trait KeyValueBackend<K, V> {
    fn get(&mut self, key: &K) -> Option<&V>;
    fn get_mut(&mut self, key: &K) -> Option<&mut V>;
    fn insert(&mut self, key: K, value: V);
    fn remove(&mut self, key: &K) -> Option<V>;
    fn len(&self) -> usize;
    fn clear(&mut self);
    /// All entries, without touching LRU recency.
    fn entries(&self) -> Vec<(&K, &V)>;
}

pub(crate) fn new_backend<K, V>(
    kind: BackendKind,
) -> Result<Box<dyn KeyValueBackend<K, V>>, CacheError>
where
    K: Ord + Hash + 'static,
    V: 'static,
{
    match kind {
        BackendKind::Lru { capacity } => Ok(Box::new(LruBackend::new(capacity)?)),
        BackendKind::Ordered => Ok(Box::new(OrderedBackend::new())),
    }
}

pub(crate) struct LruBackend<K: Hash + Eq, V> {
    inner: LruCache<K, V>,
}

impl<K: Hash + Eq, V> LruBackend<K, V> {
    pub fn new(capacity: usize) -> Result<Self, CacheError> {
        let capacity = NonZeroUsize::new(capacity).ok_or(CacheError::ZeroCapacity)?;
        Ok(Self {
            inner: LruCache::new(capacity),
        })
    }
}

impl<K: Hash + Eq, V> KeyValueBackend<K, V> for LruBackend<K, V> {
    fn get(&mut self, key: &K) -> Option<&V> {
        self.inner.get(key)
    }

    fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.inner.get_mut(key)
    }

    fn insert(&mut self, key: K, value: V) {
        self.inner.put(key, value);
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        self.inner.pop(key)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn clear(&mut self) {
        self.inner.clear();
    }

    fn entries(&self) -> Vec<(&K, &V)> {
        self.inner.iter().collect()
    }
}

pub(crate) struct OrderedBackend<K, V> {
    inner: BTreeMap<K, V>,
}

impl<K, V> OrderedBackend<K, V> {
    pub fn new() -> Self {
        Self {
            inner: BTreeMap::new(),
        }
    }
}

impl<K: Ord, V> KeyValueBackend<K, V> for OrderedBackend<K, V> {
    fn get(&mut self, key: &K) -> Option<&V> {
        self.inner.get(key)
    }

    fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.inner.get_mut(key)
    }

    fn insert(&mut self, key: K, value: V) {
        self.inner.insert(key, value);
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        self.inner.remove(key)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn clear(&mut self) {
        self.inner.clear();
    }

    fn entries(&self) -> Vec<(&K, &V)> {
        self.inner.iter().collect()
    }
}
