//! # tb-kv-memory
//!
//! In-process implementation of `KvStore`, for development and tests.
//! Each key lives in a `DashMap` shard; every primitive holds that shard's
//! lock for its whole read-modify-write, which is what makes it atomic.
//! Nothing survives a restart.
//!
//! Ranges walk the ordered set from the end they read from, so a page
//! costs O(offset + page size) here rather than the O(log n + page size)
//! of a Redis skiplist. Fine for the board sizes this backend serves.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;
use tb_core::error::{AppError, Result};
use tb_core::traits::{KvStore, Order};

enum Value {
    Counter(u64),
    Blob(Vec<u8>),
    Sorted(SortedSet),
}

impl Value {
    fn kind(&self) -> &'static str {
        match self {
            Value::Counter(_) => "counter",
            Value::Blob(_) => "blob",
            Value::Sorted(_) => "ordered set",
        }
    }
}

#[derive(Default)]
struct SortedSet {
    scores: HashMap<String, u64>,
    order: BTreeSet<(u64, String)>,
}

impl SortedSet {
    fn insert(&mut self, member: &str, score: u64) {
        if let Some(old) = self.scores.insert(member.to_string(), score) {
            self.order.remove(&(old, member.to_string()));
        }
        self.order.insert((score, member.to_string()));
    }
}

fn wrong_type(key: &str, entry: &Value) -> AppError {
    AppError::StoreUnavailable(format!("key {key:?} holds a {}", entry.kind()))
}

/// Resolves an inclusive, possibly negative, rank range against `len`.
fn resolve_range(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    if len == 0 {
        return None;
    }
    let len = len as i64;
    let start = if start < 0 { len.saturating_add(start).max(0) } else { start };
    let stop = if stop < 0 { len.saturating_add(stop) } else { stop.min(len - 1) };
    if start > stop || start >= len {
        return None;
    }
    Some((start as usize, stop as usize))
}

#[derive(Default)]
pub struct MemoryKvStore {
    entries: DashMap<String, Value>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held.
    pub fn key_count(&self) -> usize {
        self.entries.len()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn incr(&self, key: &str) -> Result<u64> {
        let mut entry = self.entries.entry(key.to_string()).or_insert(Value::Counter(0));
        match entry.value_mut() {
            Value::Counter(n) => {
                *n += 1;
                Ok(*n)
            }
            other => Err(wrong_type(key, other)),
        }
    }

    async fn set_nx(&self, key: &str, value: Vec<u8>) -> Result<bool> {
        match self.entries.entry(key.to_string()) {
            MapEntry::Occupied(_) => Ok(false),
            MapEntry::Vacant(slot) => {
                slot.insert(Value::Blob(value));
                Ok(true)
            }
        }
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(entry) => match entry.value() {
                Value::Blob(bytes) => Ok(Some(bytes.clone())),
                other => Err(wrong_type(key, other)),
            },
        }
    }

    async fn zadd_nx(&self, key: &str, member: &str, score: u64) -> Result<bool> {
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Value::Sorted(SortedSet::default()));
        match entry.value_mut() {
            Value::Sorted(set) => {
                if set.scores.contains_key(member) {
                    return Ok(false);
                }
                set.insert(member, score);
                Ok(true)
            }
            other => Err(wrong_type(key, other)),
        }
    }

    async fn zadd_gt(&self, key: &str, member: &str, score: u64) -> Result<bool> {
        let Some(mut entry) = self.entries.get_mut(key) else {
            return Ok(false);
        };
        match entry.value_mut() {
            Value::Sorted(set) => match set.scores.get(member).copied() {
                None => Ok(false),
                Some(current) => {
                    if score > current {
                        set.insert(member, score);
                    }
                    Ok(true)
                }
            },
            other => Err(wrong_type(key, other)),
        }
    }

    async fn zscore(&self, key: &str, member: &str) -> Result<Option<u64>> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(entry) => match entry.value() {
                Value::Sorted(set) => Ok(set.scores.get(member).copied()),
                other => Err(wrong_type(key, other)),
            },
        }
    }

    async fn zcard(&self, key: &str) -> Result<u64> {
        match self.entries.get(key) {
            None => Ok(0),
            Some(entry) => match entry.value() {
                Value::Sorted(set) => Ok(set.scores.len() as u64),
                other => Err(wrong_type(key, other)),
            },
        }
    }

    async fn zrange(&self, key: &str, start: i64, stop: i64, order: Order) -> Result<Vec<String>> {
        let Some(entry) = self.entries.get(key) else {
            return Ok(Vec::new());
        };
        let set = match entry.value() {
            Value::Sorted(set) => set,
            other => return Err(wrong_type(key, other)),
        };
        let Some((start, stop)) = resolve_range(set.order.len(), start, stop) else {
            return Ok(Vec::new());
        };

        let take = stop - start + 1;
        let members: Vec<String> = match order {
            Order::Ascending => set.order.iter().skip(start).take(take).map(|(_, m)| m.clone()).collect(),
            Order::Descending => set.order.iter().rev().skip(start).take(take).map(|(_, m)| m.clone()).collect(),
        };
        Ok(members)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn close(&self) {
        tracing::info!(keys = self.entries.len(), "memory store closed; contents discarded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_range() {
        assert_eq!(resolve_range(5, 0, -1), Some((0, 4)));
        assert_eq!(resolve_range(5, -2, -1), Some((3, 4)));
        assert_eq!(resolve_range(5, -9, 1), Some((0, 1)));
        assert_eq!(resolve_range(5, 3, 100), Some((3, 4)));
        assert_eq!(resolve_range(5, 5, 9), None);
        assert_eq!(resolve_range(0, 0, -1), None);
        assert_eq!(resolve_range(5, i64::MIN, -1), Some((0, 4)));
    }

    #[tokio::test]
    async fn test_counters_start_at_one() {
        let store = MemoryKvStore::new();
        assert_eq!(store.incr("c").await.unwrap(), 1);
        assert_eq!(store.incr("c").await.unwrap(), 2);
        assert_eq!(store.incr("other").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_set_nx_never_overwrites() {
        let store = MemoryKvStore::new();
        assert!(store.set_nx("k", b"one".to_vec()).await.unwrap());
        assert!(!store.set_nx("k", b"two".to_vec()).await.unwrap());
        assert_eq!(store.get("k").await.unwrap().unwrap(), b"one");
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_descending_range_breaks_ties_by_member() {
        let store = MemoryKvStore::new();
        store.zadd_nx("z", "a", 1).await.unwrap();
        store.zadd_nx("z", "c", 5).await.unwrap();
        store.zadd_nx("z", "b", 5).await.unwrap();

        let desc = store.zrange("z", 0, -1, Order::Descending).await.unwrap();
        assert_eq!(desc, vec!["c", "b", "a"]);
        let asc = store.zrange("z", 0, 1, Order::Ascending).await.unwrap();
        assert_eq!(asc, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_zadd_gt_only_raises_existing_members() {
        let store = MemoryKvStore::new();
        assert!(!store.zadd_gt("z", "a", 3).await.unwrap());
        store.zadd_nx("z", "a", 3).await.unwrap();
        store.zadd_nx("z", "b", 4).await.unwrap();

        assert!(store.zadd_gt("z", "a", 9).await.unwrap());
        assert!(store.zadd_gt("z", "a", 2).await.unwrap());
        assert_eq!(store.zscore("z", "a").await.unwrap(), Some(9));
        assert_eq!(store.zrange("z", 0, 0, Order::Descending).await.unwrap(), vec!["a"]);
        assert_eq!(store.zcard("z").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_type_mismatch_is_reported() {
        let store = MemoryKvStore::new();
        store.incr("c").await.unwrap();
        assert!(matches!(store.get("c").await, Err(AppError::StoreUnavailable(_))));
        assert!(store.zadd_nx("c", "m", 1).await.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_increments_are_unique() {
        let store = std::sync::Arc::new(MemoryKvStore::new());
        let mut handles = Vec::new();
        for _ in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.incr("c").await.unwrap() }));
        }
        let mut seen = Vec::new();
        for h in handles {
            seen.push(h.await.unwrap());
        }
        seen.sort_unstable();
        assert_eq!(seen, (1..=32).collect::<Vec<u64>>());
    }
}
