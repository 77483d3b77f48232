//! # Identifier Allocator
//!
//! Hands out strictly increasing IDs per scope using the store's atomic
//! counter. An ID is consumed the moment it is returned: if the write that
//! follows fails, the gap stays. Duplicates are impossible.

use std::sync::Arc;

use crate::error::Result;
use crate::keys;
use crate::models::ThreadId;
use crate::traits::KvStore;

/// What an allocated ID is unique within.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope<'a> {
    /// Thread IDs of a board
    Board(&'a str),
    /// Post IDs of a thread
    Thread(&'a str, ThreadId),
    /// Bump scores of a board's thread index
    Bump(&'a str),
}

impl Scope<'_> {
    fn counter_key(&self) -> String {
        match *self {
            Scope::Board(board) => keys::next_thread_id(board),
            Scope::Thread(board, thread_id) => keys::next_post_id(board, thread_id),
            Scope::Bump(board) => keys::bump_seq(board),
        }
    }
}

#[derive(Clone)]
pub struct IdAllocator {
    store: Arc<dyn KvStore>,
}

impl IdAllocator {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Returns the next ID in `scope`, starting at 1.
    pub async fn next_id(&self, scope: Scope<'_>) -> Result<u64> {
        self.store.incr(&scope.counter_key()).await
    }
}
