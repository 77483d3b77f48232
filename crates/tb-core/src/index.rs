//! # Thread Index
//!
//! Per-board ordered set of thread IDs scored by bump sequence. It is the
//! only authority on listing order. Scores come from a per-board counter so
//! every bump lands strictly above all earlier ones; the backend breaks the
//! remaining ties by member, newest thread first.

use std::sync::Arc;

use crate::allocator::{IdAllocator, Scope};
use crate::error::{AppError, Result};
use crate::keys;
use crate::models::ThreadId;
use crate::traits::{KvStore, Order};

#[derive(Clone)]
pub struct ThreadIndex {
    store: Arc<dyn KvStore>,
    allocator: IdAllocator,
}

impl ThreadIndex {
    pub fn new(store: Arc<dyn KvStore>, allocator: IdAllocator) -> Self {
        Self { store, allocator }
    }

    /// Allocates a score above every score handed out so far on `board`.
    pub async fn fresh_score(&self, board: &str) -> Result<u64> {
        self.allocator.next_id(Scope::Bump(board)).await
    }

    pub async fn insert(&self, board: &str, thread_id: ThreadId, initial_score: u64) -> Result<()> {
        let added = self
            .store
            .zadd_nx(&keys::thread_index(board), &keys::member(thread_id), initial_score)
            .await?;
        if !added {
            tracing::warn!(board, thread_id, "thread id already indexed");
            return Err(AppError::already_exists("thread", format!("{board}/{thread_id}")));
        }
        Ok(())
    }

    /// Moves the thread to the top of its board.
    ///
    /// Concurrent bumps race only on who gets the higher score; the index
    /// keeps the highest, so the last allocated bump wins.
    pub async fn bump(&self, board: &str, thread_id: ThreadId) -> Result<()> {
        let score = self.fresh_score(board).await?;
        let present = self
            .store
            .zadd_gt(&keys::thread_index(board), &keys::member(thread_id), score)
            .await?;
        if !present {
            return Err(AppError::not_found("thread", format!("{board}/{thread_id}")));
        }
        Ok(())
    }

    pub async fn contains(&self, board: &str, thread_id: ThreadId) -> Result<bool> {
        let score = self
            .store
            .zscore(&keys::thread_index(board), &keys::member(thread_id))
            .await?;
        Ok(score.is_some())
    }

    /// Thread IDs on the zero-based `page_number`, most recently bumped first.
    /// Pages past the end are empty.
    pub async fn page(&self, board: &str, page_number: usize, page_size: usize) -> Result<Vec<ThreadId>> {
        let Some((start, stop)) = page_bounds(page_number, page_size) else {
            return Ok(Vec::new());
        };
        self.store
            .zrange(&keys::thread_index(board), start, stop, Order::Descending)
            .await?
            .iter()
            .map(|m| keys::parse_member(m))
            .collect()
    }

    pub async fn count(&self, board: &str) -> Result<u64> {
        self.store.zcard(&keys::thread_index(board)).await
    }
}

/// Inclusive rank bounds of a page, or `None` when the page cannot hold anything.
fn page_bounds(page_number: usize, page_size: usize) -> Option<(i64, i64)> {
    if page_size == 0 {
        return None;
    }
    let start = page_number.checked_mul(page_size)?;
    let stop = start.checked_add(page_size - 1)?;
    Some((i64::try_from(start).ok()?, i64::try_from(stop).unwrap_or(i64::MAX)))
}
