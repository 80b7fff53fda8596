//! Checkpointable key-value caches for an EVM state manager.
//!
//! Two caches sit in front of the state trie and give the state manager
//! snapshot isolation: an [`AccountCache`] (address → serialized account) and
//! a [`StorageCache`] (address → slot → raw value). At any point during
//! contract execution a checkpoint can be taken, further writes recorded, and
//! later either committed (kept) or reverted (undone) without ever touching
//! the trie. One checkpoint is taken per nested CALL/CREATE frame or
//! top-level transaction, mirroring call-frame boundaries 1:1.
//!
//! Both caches share a single generic checkpointed-map core: a stack of
//! per-checkpoint diff maps recording the pre-image of every key the first
//! time it is mutated at that level. `revert` replays the popped diff into the
//! backend, `commit` discards it, and `flush` hands the currently-dirty
//! entries to the caller for persistence while leaving the checkpoint open.
//!
//! Keys arrive pre-canonicalized ([`ethereum_types::Address`] /
//! [`ethereum_types::H256`]) and account values pre-serialized
//! ([`bytes::Bytes`]); the trie, RLP encoding and key hashing are the
//! caller's collaborators, never called from here.
//!
//! ```
//! use bytes::Bytes;
//! use ethereum_types::Address;
//! use state_cache::{AccountCache, BackendKind};
//!
//! # fn main() -> Result<(), state_cache::CacheError> {
//! let mut cache = AccountCache::new(BackendKind::Ordered)?;
//! let address = Address::repeat_byte(0x01);
//!
//! cache.put(address, Some(Bytes::from_static(&[0xc0])));
//! cache.checkpoint();
//! cache.del(address);
//! cache.revert();
//!
//! // The tombstone written inside the checkpoint is gone again.
//! let entry = cache.get(&address).expect("cached before the checkpoint");
//! assert!(!entry.is_tombstone());
//! # Ok(())
//! # }
//! ```

pub mod account;
pub mod backend;
pub mod error;
pub mod stats;
pub mod storage;

mod checkpointed;
mod journal;

pub use account::{AccountCache, AccountEntry};
pub use backend::BackendKind;
pub use error::CacheError;
pub use stats::CacheStats;
pub use storage::{StorageCache, StorageSlots};
