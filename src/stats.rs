use serde::{Deserialize, Serialize};

/// Point-in-time view of a cache's activity, for capacity tuning and
/// observability. `size` is the current entry count (for the storage cache,
/// the total slot count across all addresses); the remaining fields count
/// operations since construction or since the last counter reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub size: usize,
    pub reads: u64,
    pub hits: u64,
    pub writes: u64,
    pub deletions: u64,
}

/// Mutable operation counters owned by each cache instance.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct OpCounters {
    pub reads: u64,
    pub hits: u64,
    pub writes: u64,
    pub deletions: u64,
}

impl OpCounters {
    pub fn snapshot(&self, size: usize) -> CacheStats {
        CacheStats {
            size,
            reads: self.reads,
            hits: self.hits,
            writes: self.writes,
            deletions: self.deletions,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
