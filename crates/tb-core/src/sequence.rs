//! # Reply Sequence
//!
//! Per-thread append-only list of post IDs. Each post is scored by its own
//! ID, so listings come back ascending even when concurrent replies append
//! out of allocation order.

use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::keys;
use crate::models::{PostId, ThreadId};
use crate::traits::{KvStore, Order};

#[derive(Clone)]
pub struct ReplySequence {
    store: Arc<dyn KvStore>,
}

impl ReplySequence {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    pub async fn append(&self, board: &str, thread_id: ThreadId, post_id: PostId) -> Result<()> {
        let key = keys::reply_seq(board, thread_id);
        if !self.store.zadd_nx(&key, &keys::member(post_id), post_id).await? {
            return Err(AppError::already_exists("post", format!("{board}/{thread_id}/{post_id}")));
        }
        Ok(())
    }

    /// Every post ID of the thread, oldest first.
    pub async fn list(&self, board: &str, thread_id: ThreadId) -> Result<Vec<PostId>> {
        self.range(board, thread_id, 0, -1).await
    }

    /// The last `n` post IDs, oldest first.
    pub async fn tail(&self, board: &str, thread_id: ThreadId, n: usize) -> Result<Vec<PostId>> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let n = i64::try_from(n).unwrap_or(i64::MAX);
        self.range(board, thread_id, -n, -1).await
    }

    pub async fn count(&self, board: &str, thread_id: ThreadId) -> Result<u64> {
        self.store.zcard(&keys::reply_seq(board, thread_id)).await
    }

    async fn range(&self, board: &str, thread_id: ThreadId, start: i64, stop: i64) -> Result<Vec<PostId>> {
        self.store
            .zrange(&keys::reply_seq(board, thread_id), start, stop, Order::Ascending)
            .await?
            .iter()
            .map(|m| keys::parse_member(m))
            .collect()
    }
}
