use std::hash::Hash;

use rustc_hash::FxHashMap;

/// Pre-images recorded for one checkpoint level. `None` means the backend
/// had no entry at all for the key when it was first touched at this level,
/// which is distinct from an account tombstone (a present entry marking a
/// known-absent address).
pub(crate) type DiffMap<K, V> = FxHashMap<K, Option<V>>;

/// Stack of per-checkpoint diff maps. The checkpoint depth is the stack
/// length, so depth and stack can never desynchronize. At depth 0 every
/// operation is a defined no-op: writes pass straight through to the backend
/// with nothing recorded.
pub(crate) struct Journal<K, V> {
    diffs: Vec<DiffMap<K, V>>,
}

impl<K, V> Default for Journal<K, V> {
    fn default() -> Self {
        Self { diffs: Vec::new() }
    }
}

impl<K: Eq + Hash + Clone, V> Journal<K, V> {
    pub fn depth(&self) -> usize {
        self.diffs.len()
    }

    pub fn checkpoint(&mut self) {
        self.diffs.push(DiffMap::default());
    }

    /// Pops the top diff and discards it. The recorded pre-images are gone;
    /// an enclosing revert only restores keys it captured itself.
    pub fn commit(&mut self) {
        self.diffs.pop();
    }

    /// Pops the top diff and hands it back for replay into the backend.
    pub fn revert(&mut self) -> Option<DiffMap<K, V>> {
        self.diffs.pop()
    }

    /// Swaps the top diff for a fresh empty one and returns the old top, so
    /// flush can emit the touched keys while keeping the checkpoint open.
    /// After this, a revert of the current level no longer covers those keys.
    pub fn take_top(&mut self) -> Option<DiffMap<K, V>> {
        self.diffs.last_mut().map(std::mem::take)
    }

    /// Records `current` as the pre-image of `key`, exactly once per level:
    /// only the first mutation of a key at a given level captures it. The
    /// closure is not invoked when nothing is recorded.
    pub fn record<F>(&mut self, key: &K, current: F)
    where
        F: FnOnce() -> Option<V>,
    {
        let Some(top) = self.diffs.last_mut() else {
            return;
        };
        if !top.contains_key(key) {
            top.insert(key.clone(), current());
        }
    }

    pub fn clear(&mut self) {
        self.diffs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_is_noop_at_depth_zero() {
        let mut journal: Journal<u8, u8> = Journal::default();
        journal.record(&1, || Some(10));
        assert_eq!(journal.depth(), 0);
        assert!(journal.revert().is_none());
    }

    #[test]
    fn first_touch_wins_per_level() {
        let mut journal: Journal<u8, u8> = Journal::default();
        journal.checkpoint();
        journal.record(&1, || Some(10));
        // Second touch at the same level must not overwrite the pre-image,
        // and must not even evaluate the closure.
        journal.record(&1, || unreachable!("pre-image already recorded"));

        let diff = journal.revert().expect("one checkpoint is open");
        assert_eq!(diff.get(&1), Some(&Some(10)));
    }

    #[test]
    fn each_level_records_independently() {
        let mut journal: Journal<u8, u8> = Journal::default();
        journal.checkpoint();
        journal.record(&1, || Some(10));
        journal.checkpoint();
        journal.record(&1, || Some(20));

        assert_eq!(journal.depth(), 2);
        let top = journal.revert().expect("two checkpoints are open");
        assert_eq!(top.get(&1), Some(&Some(20)));
        let bottom = journal.revert().expect("one checkpoint is open");
        assert_eq!(bottom.get(&1), Some(&Some(10)));
    }

    #[test]
    fn take_top_leaves_empty_top() {
        let mut journal: Journal<u8, u8> = Journal::default();
        journal.checkpoint();
        journal.record(&1, || None);

        let taken = journal.take_top().expect("one checkpoint is open");
        assert_eq!(taken.len(), 1);
        assert_eq!(journal.depth(), 1);

        // The same key is recordable again at the same level.
        journal.record(&1, || Some(5));
        let diff = journal.revert().expect("one checkpoint is open");
        assert_eq!(diff.get(&1), Some(&Some(5)));
    }

    #[test]
    fn take_top_at_depth_zero_is_none() {
        let mut journal: Journal<u8, u8> = Journal::default();
        assert!(journal.take_top().is_none());
    }
}
