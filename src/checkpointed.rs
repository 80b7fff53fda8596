use std::hash::Hash;

use tracing::trace;

use crate::backend::KeyValueBackend;
use crate::journal::Journal;

/// The seam between the checkpoint algorithms and a concrete key topology.
/// The account cache uses a flat target (key = address); the storage cache a
/// nested one (key = (address, slot) over per-address sub-maps). Applying
/// `None` deletes the entry, which is how `DidNotExist` pre-images are
/// replayed on revert.
pub(crate) trait DiffTarget<K, V> {
    /// Clone of the current backend value for `key`, or `None` on a miss.
    fn load(&mut self, key: &K) -> Option<V>;
    /// Writes `Some(value)` into the backend, or deletes the entry on `None`.
    fn apply(&mut self, key: &K, value: Option<V>);
    fn len(&self) -> usize;
    fn clear(&mut self);
}

/// Flat diff target: diff keys map 1:1 onto backend keys.
pub(crate) struct FlatTarget<K, V> {
    backend: Box<dyn KeyValueBackend<K, V>>,
}

impl<K, V> FlatTarget<K, V> {
    pub fn new(backend: Box<dyn KeyValueBackend<K, V>>) -> Self {
        Self { backend }
    }
}

impl<K: Clone, V: Clone> DiffTarget<K, V> for FlatTarget<K, V> {
    fn load(&mut self, key: &K) -> Option<V> {
        self.backend.get(key).cloned()
    }

    fn apply(&mut self, key: &K, value: Option<V>) {
        match value {
            Some(value) => self.backend.insert(key.clone(), value),
            None => {
                self.backend.remove(key);
            }
        }
    }

    fn len(&self) -> usize {
        self.backend.len()
    }

    fn clear(&mut self) {
        self.backend.clear();
    }
}

/// Generic checkpointed map: a diff target plus a journal of per-checkpoint
/// pre-images. Implements the backend-agnostic save-pre-state, commit, revert
/// and flush algorithms shared by both caches.
pub(crate) struct CheckpointedMap<K, V, T> {
    target: T,
    journal: Journal<K, V>,
}

impl<K, V, T> CheckpointedMap<K, V, T>
where
    K: Eq + Hash + Clone,
    V: Clone,
    T: DiffTarget<K, V>,
{
    pub fn new(target: T) -> Self {
        Self {
            target,
            journal: Journal::default(),
        }
    }

    pub fn get(&mut self, key: &K) -> Option<V> {
        self.target.load(key)
    }

    pub fn put(&mut self, key: K, value: V) {
        self.record_pre_state(&key);
        self.target.apply(&key, Some(value));
    }

    pub fn delete(&mut self, key: &K) {
        self.record_pre_state(key);
        self.target.apply(key, None);
    }

    /// Captures the current backend value of `key` in the top diff before a
    /// mutation, first touch per level only. No-op at depth 0.
    fn record_pre_state(&mut self, key: &K) {
        let Self { target, journal } = self;
        journal.record(key, || target.load(key));
    }

    pub fn checkpoint(&mut self) {
        self.journal.checkpoint();
        trace!(depth = self.journal.depth(), "cache checkpoint");
    }

    /// Keeps the writes of the innermost checkpoint. Never touches the
    /// backend; the popped diff is discarded.
    pub fn commit(&mut self) {
        self.journal.commit();
        trace!(depth = self.journal.depth(), "cache commit");
    }

    /// Undoes the innermost checkpoint by replaying the popped diff: each key
    /// is restored to its recorded pre-image, or deleted if it did not exist
    /// when first touched.
    pub fn revert(&mut self) {
        let Some(diff) = self.journal.revert() else {
            return;
        };
        trace!(
            depth = self.journal.depth(),
            entries = diff.len(),
            "cache revert"
        );
        for (key, pre_image) in diff {
            self.target.apply(&key, pre_image);
        }
    }

    /// Emits the current backend value of every key touched since the
    /// innermost checkpoint began, for persistence, and resets the top diff.
    /// Keys without a current entry are skipped. A later revert of this
    /// checkpoint no longer covers the emitted keys.
    pub fn flush(&mut self) -> Vec<(K, V)> {
        let Some(diff) = self.journal.take_top() else {
            return Vec::new();
        };
        trace!(entries = diff.len(), "cache flush");
        diff.into_keys()
            .filter_map(|key| self.target.load(&key).map(|value| (key, value)))
            .collect()
    }

    /// Drops all entries and all open checkpoints.
    pub fn clear(&mut self) {
        self.target.clear();
        self.journal.clear();
    }

    pub fn len(&self) -> usize {
        self.target.len()
    }

    pub fn depth(&self) -> usize {
        self.journal.depth()
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }
}
