use thiserror::Error;

/// Construction-time cache failures. Normal operation never errors: puts,
/// gets and deletes are infallible, and checkpoint operations at depth 0 are
/// defined no-ops.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("LRU cache capacity must be greater than zero")]
    ZeroCapacity,
}
