use bytes::Bytes;
use ethereum_types::Address;
use serde::{Deserialize, Serialize};

use crate::backend::{BackendKind, new_backend};
use crate::checkpointed::{CheckpointedMap, FlatTarget};
use crate::error::CacheError;
use crate::stats::{CacheStats, OpCounters};

/// Cached state of a single account, holding the RLP serialization produced
/// by the caller; the cache never inspects the bytes.
///
/// `account_rlp: None` is a tombstone: the address is known to not exist in
/// the state trie, so the trie lookup can be skipped. This is different from
/// the address not being cached at all, where [`AccountCache::get`] returns
/// `None` and the caller must consult the trie.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountEntry {
    pub account_rlp: Option<Bytes>,
}

impl AccountEntry {
    pub fn is_tombstone(&self) -> bool {
        self.account_rlp.is_none()
    }
}

/// Checkpointable address → account cache in front of the state trie.
///
/// Writes pass through to the in-memory backend; while checkpoints are open,
/// every first mutation of an address per level records its pre-image so
/// `revert` can undo the frame. Exclusively owned by one state manager, fully
/// synchronous.
pub struct AccountCache {
    inner: CheckpointedMap<Address, AccountEntry, FlatTarget<Address, AccountEntry>>,
    counters: OpCounters,
}

impl AccountCache {
    pub fn new(kind: BackendKind) -> Result<Self, CacheError> {
        Ok(Self {
            inner: CheckpointedMap::new(FlatTarget::new(new_backend(kind)?)),
            counters: OpCounters::default(),
        })
    }

    /// Caches the serialized account for `address`. `None` writes the
    /// known-absent tombstone.
    pub fn put(&mut self, address: Address, account_rlp: Option<Bytes>) {
        self.counters.writes += 1;
        self.inner.put(address, AccountEntry { account_rlp });
    }

    /// Returns the cached entry, tombstoned or not. `None` is a cache miss:
    /// the caller must fall through to the trie.
    pub fn get(&mut self, address: &Address) -> Option<AccountEntry> {
        self.counters.reads += 1;
        let entry = self.inner.get(address);
        if entry.is_some() {
            self.counters.hits += 1;
        }
        entry
    }

    /// Tombstones `address`. The entry stays in the backend so later `get`s
    /// see the address as known-absent instead of re-querying the trie.
    /// Equivalent to `put(address, None)` but counted as a deletion.
    pub fn del(&mut self, address: Address) {
        self.counters.deletions += 1;
        self.inner.put(address, AccountEntry { account_rlp: None });
    }

    /// Opens a checkpoint. Call once per nested call frame or transaction.
    pub fn checkpoint(&mut self) {
        self.inner.checkpoint();
    }

    /// Keeps the writes of the innermost checkpoint. No-op at depth 0.
    pub fn commit(&mut self) {
        self.inner.commit();
    }

    /// Undoes the writes of the innermost checkpoint. No-op at depth 0.
    pub fn revert(&mut self) {
        self.inner.revert();
    }

    /// Entries dirtied since the innermost checkpoint began, to be persisted
    /// to the trie by the caller. Tombstoned entries are included. Empty at
    /// depth 0.
    pub fn flush(&mut self) -> Vec<(Address, AccountEntry)> {
        self.inner.flush()
    }

    /// Number of cached addresses, tombstones included.
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
