use bytes::Bytes;
use ethereum_types::{Address, H256};
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::backend::{BackendKind, KeyValueBackend, new_backend};
use crate::checkpointed::{CheckpointedMap, DiffTarget};
use crate::error::CacheError;
use crate::stats::{CacheStats, OpCounters};

/// Per-address storage: slot key → raw slot value bytes. There is no
/// tombstone state; a removed slot reads the same as one never cached.
pub type StorageSlots = FxHashMap<H256, Bytes>;

/// Nested diff target: diffs are keyed by (address, slot) pair while the
/// backend holds one [`StorageSlots`] sub-map per address.
struct SlotTarget {
    backend: Box<dyn KeyValueBackend<Address, StorageSlots>>,
}

impl SlotTarget {
    fn backend_mut(&mut self) -> &mut dyn KeyValueBackend<Address, StorageSlots> {
        &mut *self.backend
    }
}

impl DiffTarget<(Address, H256), Bytes> for SlotTarget {
    fn load(&mut self, key: &(Address, H256)) -> Option<Bytes> {
        let (address, slot) = key;
        self.backend.get(address).and_then(|slots| slots.get(slot).cloned())
    }

    fn apply(&mut self, key: &(Address, H256), value: Option<Bytes>) {
        let (address, slot) = key;
        match value {
            Some(value) => match self.backend.get_mut(address) {
                Some(slots) => {
                    slots.insert(*slot, value);
                }
                None => {
                    // A revert can target an address whose sub-map is gone
                    // (clear_storage or LRU eviction); recreate it.
                    let mut slots = StorageSlots::default();
                    slots.insert(*slot, value);
                    self.backend.insert(*address, slots);
                }
            },
            None => {
                if let Some(slots) = self.backend.get_mut(address) {
                    slots.remove(slot);
                }
            }
        }
    }

    fn len(&self) -> usize {
        self.backend
            .entries()
            .into_iter()
            .map(|(_, slots)| slots.len())
            .sum()
    }

    fn clear(&mut self) {
        self.backend.clear();
    }
}

/// Checkpointable two-level storage cache: address → slot → raw value.
///
/// Diff recording operates at (address, slot) granularity, so a revert
/// restores exactly the slots touched inside the frame. With an LRU backend
/// the capacity counts addresses and eviction drops a whole per-address
/// sub-map.
pub struct StorageCache {
    inner: CheckpointedMap<(Address, H256), Bytes, SlotTarget>,
    counters: OpCounters,
}

impl StorageCache {
    pub fn new(kind: BackendKind) -> Result<Self, CacheError> {
        Ok(Self {
            inner: CheckpointedMap::new(SlotTarget {
                backend: new_backend(kind)?,
            }),
            counters: OpCounters::default(),
        })
    }

    /// Caches `value` for the slot, creating the per-address sub-map on
    /// demand.
    pub fn put(&mut self, address: Address, slot: H256, value: Bytes) {
        self.counters.writes += 1;
        self.inner.put((address, slot), value);
    }

    /// Returns the cached slot value. `None` is a miss: the caller must ask
    /// the trie. A previously deleted slot also reads as `None`.
    pub fn get(&mut self, address: &Address, slot: &H256) -> Option<Bytes> {
        self.counters.reads += 1;
        let value = self.inner.get(&(*address, *slot));
        if value.is_some() {
            self.counters.hits += 1;
        }
        value
    }

    /// Hard-deletes the slot from the sub-map. Unlike [`crate::AccountCache::del`]
    /// there is no tombstone: afterwards the slot is indistinguishable from a
    /// miss.
    pub fn del(&mut self, address: &Address, slot: &H256) {
        self.counters.deletions += 1;
        self.inner.delete(&(*address, *slot));
    }

    /// Drops the entire per-address sub-map without recording pre-state. An
    /// open checkpoint cannot undo this call; only slots already captured by
    /// earlier per-slot writes at an enclosing level come back on revert.
    pub fn clear_storage(&mut self, address: &Address) {
        trace!(address = %address, "storage cleared");
        self.inner.target_mut().backend_mut().remove(address);
    }

    /// Snapshot of the per-address sub-map, or `None` if the address has no
    /// cached storage. Does not touch the read/hit counters.
    pub fn dump(&mut self, address: &Address) -> Option<StorageSlots> {
        self.inner.target_mut().backend_mut().get(address).cloned()
    }

    /// Opens a checkpoint. Call once per nested call frame or transaction.
    pub fn checkpoint(&mut self) {
        self.inner.checkpoint();
    }

    /// Keeps the writes of the innermost checkpoint. No-op at depth 0.
    pub fn commit(&mut self) {
        self.inner.commit();
    }

    /// Undoes the slot writes of the innermost checkpoint. No-op at depth 0.
    pub fn revert(&mut self) {
        self.inner.revert();
    }

    /// Slots dirtied since the innermost checkpoint began, to be persisted to
    /// the trie by the caller. Hard-deleted slots have no current value and
    /// are skipped. Empty at depth 0.
    pub fn flush(&mut self) -> Vec<(Address, H256, Bytes)> {
        self.inner
            .flush()
            .into_iter()
            .map(|((address, slot), value)| (address, slot, value))
            .collect()
    }

    /// Total slot count across all addresses, not the address count.
    pub fn size(&self) -> usize {
        self.inner.len()
    }

    /// Number of open checkpoints.
    pub fn depth(&self) -> usize {
        self.inner.depth()
    }

    /// Drops all entries and all open checkpoints. Operation counters are
    /// kept; reset them through `stats(true)`.
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn stats(&mut self, reset: bool) -> CacheStats {
        let stats = self.counters.snapshot(self.size());
        if reset {
            self.counters.reset();
        }
        stats
    }
}
