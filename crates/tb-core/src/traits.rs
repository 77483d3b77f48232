//! # Core Traits (Ports)
//!
//! Any store plugin must implement these traits to be used by the binary.
//! All exclusion the engine relies on comes from these primitives being
//! atomic in the backend, never from in-process locks.

use async_trait::async_trait;

use crate::error::Result;

/// Direction of a ranged read over an ordered set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Lowest score first, ties by member ascending
    Ascending,
    /// Highest score first, ties by member descending
    Descending,
}

/// Key-value persistence contract.
///
/// Ordered-set members are compared bytewise on score ties, so callers
/// encode numeric members at a fixed width (see [`crate::keys::member`]).
/// Ranges are inclusive and accept negative indices counted from the end.
/// Adapters report connectivity failures and timeouts as
/// [`crate::AppError::StoreUnavailable`].
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait KvStore: Send + Sync {
    // Counters
    /// Atomically increments the counter and returns the new value. Absent keys start at 0.
    async fn incr(&self, key: &str) -> Result<u64>;

    // Blobs
    /// Writes the value only if the key is absent. Returns `false` if it already existed.
    async fn set_nx(&self, key: &str, value: Vec<u8>) -> Result<bool>;
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    // Ordered sets
    /// Inserts the member only if absent. Returns `false` if it was already present.
    async fn zadd_nx(&self, key: &str, member: &str, score: u64) -> Result<bool>;
    /// Raises the score of an existing member. Returns `false` only if the member is absent;
    /// a score that is not greater than the current one leaves the entry untouched.
    async fn zadd_gt(&self, key: &str, member: &str, score: u64) -> Result<bool>;
    async fn zscore(&self, key: &str, member: &str) -> Result<Option<u64>>;
    async fn zcard(&self, key: &str) -> Result<u64>;
    async fn zrange(&self, key: &str, start: i64, stop: i64, order: Order) -> Result<Vec<String>>;

    // Lifecycle
    async fn ping(&self) -> Result<()>;
    async fn close(&self);
}
