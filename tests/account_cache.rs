use bytes::Bytes;
use ethereum_types::{Address, H160};
use hex_literal::hex;
use state_cache::{AccountCache, BackendKind, CacheError, CacheStats};

const ADDR_A: Address = H160(hex!("00000000000000000000000000000000000000aa"));
const ADDR_B: Address = H160(hex!("00000000000000000000000000000000000000bb"));
const ADDR_C: Address = H160(hex!("00000000000000000000000000000000000000cc"));

fn rlp(byte: u8) -> Bytes {
    Bytes::copy_from_slice(&[byte])
}

fn new_cache() -> AccountCache {
    AccountCache::new(BackendKind::Ordered).expect("ordered backend never fails")
}

#[test]
fn checkpoint_then_commit_is_identity() {
    let mut cache = new_cache();
    cache.put(ADDR_A, Some(rlp(1)));

    cache.checkpoint();
    cache.commit();

    let entry = cache.get(&ADDR_A).expect("entry was cached");
    assert_eq!(entry.account_rlp, Some(rlp(1)));
    assert_eq!(cache.size(), 1);
    assert_eq!(cache.depth(), 0);
}

#[test]
fn revert_restores_previous_value() {
    let mut cache = new_cache();
    cache.put(ADDR_A, Some(rlp(1)));

    cache.checkpoint();
    cache.put(ADDR_A, Some(rlp(2)));
    cache.revert();

    let entry = cache.get(&ADDR_A).expect("entry was cached before the checkpoint");
    assert_eq!(entry.account_rlp, Some(rlp(1)));
}

#[test]
fn revert_removes_key_absent_before_checkpoint() {
    let mut cache = new_cache();

    cache.checkpoint();
    cache.put(ADDR_A, Some(rlp(1)));
    cache.revert();

    // A true miss, not a tombstone: the entry is gone entirely.
    assert!(cache.get(&ADDR_A).is_none());
    assert_eq!(cache.size(), 0);
}

#[test]
fn nested_checkpoints_restore_layer_by_layer() {
    let mut cache = new_cache();
    cache.put(ADDR_A, Some(rlp(1)));

    cache.checkpoint();
    cache.put(ADDR_A, Some(rlp(2)));
    cache.checkpoint();
    cache.put(ADDR_A, Some(rlp(3)));

    cache.revert();
    assert_eq!(
        cache.get(&ADDR_A).expect("still cached").account_rlp,
        Some(rlp(2))
    );

    cache.revert();
    assert_eq!(
        cache.get(&ADDR_A).expect("still cached").account_rlp,
        Some(rlp(1))
    );
}

#[test]
fn commit_discards_inner_pre_images() {
    let mut cache = new_cache();
    cache.put(ADDR_A, Some(rlp(1)));

    cache.checkpoint();
    cache.put(ADDR_A, Some(rlp(2)));
    cache.checkpoint();
    cache.put(ADDR_A, Some(rlp(3)));
    cache.commit();

    // The outer level captured the value as of its own first touch.
    cache.revert();
    assert_eq!(
        cache.get(&ADDR_A).expect("still cached").account_rlp,
        Some(rlp(1))
    );
}

#[test]
fn commit_and_revert_are_noops_at_depth_zero() {
    let mut cache = new_cache();
    cache.put(ADDR_A, Some(rlp(1)));

    cache.commit();
    cache.revert();

    assert_eq!(
        cache.get(&ADDR_A).expect("untouched").account_rlp,
        Some(rlp(1))
    );
    assert_eq!(cache.depth(), 0);
}

#[test]
fn flush_at_depth_zero_is_empty() {
    let mut cache = new_cache();
    cache.put(ADDR_A, Some(rlp(1)));
    assert!(cache.flush().is_empty());
}

#[test]
fn flush_emits_current_value_and_discards_pre_image() {
    let mut cache = new_cache();

    cache.checkpoint();
    cache.put(ADDR_A, Some(rlp(1)));
    cache.put(ADDR_A, Some(rlp(2)));

    let flushed = cache.flush();
    assert_eq!(flushed.len(), 1);
    let (address, entry) = &flushed[0];
    assert_eq!(*address, ADDR_A);
    assert_eq!(entry.account_rlp, Some(rlp(2)));

    // Flush replaced the top diff, so the revert can no longer undo the put.
    cache.revert();
    assert_eq!(
        cache.get(&ADDR_A).expect("still cached").account_rlp,
        Some(rlp(2))
    );
}

#[test]
fn flush_includes_tombstones() {
    let mut cache = new_cache();
    cache.put(ADDR_A, Some(rlp(1)));

    cache.checkpoint();
    cache.del(ADDR_A);

    let flushed = cache.flush();
    assert_eq!(flushed.len(), 1);
    assert!(flushed[0].1.is_tombstone());
}

#[test]
fn del_leaves_tombstone_not_miss() {
    let mut cache = new_cache();
    cache.put(ADDR_A, Some(rlp(1)));
    cache.del(ADDR_A);

    let entry = cache.get(&ADDR_A).expect("tombstones are cache hits");
    assert!(entry.is_tombstone());
    assert_eq!(cache.size(), 1);
}

#[test]
fn tombstone_put_is_revertible() {
    let mut cache = new_cache();
    cache.put(ADDR_A, Some(rlp(1)));

    cache.checkpoint();
    cache.del(ADDR_A);
    cache.revert();

    let entry = cache.get(&ADDR_A).expect("still cached");
    assert_eq!(entry.account_rlp, Some(rlp(1)));
}

#[test]
fn stats_counters_match_operation_counts() {
    let mut cache = new_cache();
    cache.put(ADDR_A, Some(rlp(1)));
    cache.put(ADDR_B, Some(rlp(2)));
    cache.del(ADDR_B);
    cache.get(&ADDR_A);
    cache.get(&ADDR_C);

    assert_eq!(
        cache.stats(false),
        CacheStats {
            size: 2,
            reads: 2,
            hits: 1,
            writes: 2,
            deletions: 1,
        }
    );

    // Reset zeroes the counters but keeps the entries.
    cache.stats(true);
    assert_eq!(
        cache.stats(false),
        CacheStats {
            size: 2,
            reads: 0,
            hits: 0,
            writes: 0,
            deletions: 0,
        }
    );
}

#[test]
fn clear_drops_entries_and_checkpoints() {
    let mut cache = new_cache();
    cache.put(ADDR_A, Some(rlp(1)));
    cache.checkpoint();
    cache.put(ADDR_A, Some(rlp(2)));

    cache.clear();

    assert_eq!(cache.size(), 0);
    assert_eq!(cache.depth(), 0);
    // The checkpoint is gone with everything it recorded.
    cache.revert();
    assert!(cache.get(&ADDR_A).is_none());
}

#[test]
fn lru_backend_evicts_silently() {
    let mut cache =
        AccountCache::new(BackendKind::Lru { capacity: 2 }).expect("capacity is non-zero");
    cache.put(ADDR_A, Some(rlp(1)));
    cache.put(ADDR_B, Some(rlp(2)));
    cache.put(ADDR_C, Some(rlp(3)));

    assert_eq!(cache.size(), 2);
    assert!(cache.get(&ADDR_A).is_none());
    assert!(cache.get(&ADDR_B).is_some());
    assert!(cache.get(&ADDR_C).is_some());
}

#[test]
fn lru_zero_capacity_fails_fast() {
    assert!(matches!(
        AccountCache::new(BackendKind::Lru { capacity: 0 }),
        Err(CacheError::ZeroCapacity)
    ));
}
