//! # Post Record Store
//!
//! Sole owner of post content, keyed by (board, thread, post). Records are
//! written once with a conditional write and never modified.

use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::keys;
use crate::models::{Post, PostId, ThreadId};
use crate::sequence::ReplySequence;
use crate::traits::KvStore;

#[derive(Clone)]
pub struct PostRecordStore {
    store: Arc<dyn KvStore>,
    sequence: ReplySequence,
}

impl PostRecordStore {
    pub fn new(store: Arc<dyn KvStore>, sequence: ReplySequence) -> Self {
        Self { store, sequence }
    }

    /// Writes the record. The call returns only after the store acknowledged it.
    pub async fn put_post(&self, board: &str, post: &Post) -> Result<()> {
        let key = keys::post(board, post.thread_id, post.id);
        let encoded = serde_json::to_vec(post)?;
        if !self.store.set_nx(&key, encoded).await? {
            return Err(AppError::already_exists("post", format!("{board}/{}/{}", post.thread_id, post.id)));
        }
        Ok(())
    }

    pub async fn get_post(&self, board: &str, thread_id: ThreadId, post_id: PostId) -> Result<Post> {
        self.find_post(board, thread_id, post_id)
            .await?
            .ok_or_else(|| AppError::not_found("post", format!("{board}/{thread_id}/{post_id}")))
    }

    pub async fn find_post(&self, board: &str, thread_id: ThreadId, post_id: PostId) -> Result<Option<Post>> {
        match self.store.get(&keys::post(board, thread_id, post_id)).await? {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            None => Ok(None),
        }
    }

    /// All posts of a thread in ascending post-ID order.
    pub async fn get_posts(&self, board: &str, thread_id: ThreadId) -> Result<Vec<Post>> {
        let ids = self.sequence.list(board, thread_id).await?;
        self.get_many(board, thread_id, &ids).await
    }

    /// Fetches the given posts, in the given order. A sequenced ID with no
    /// record behind it is a data-integrity fault.
    pub async fn get_many(&self, board: &str, thread_id: ThreadId, ids: &[PostId]) -> Result<Vec<Post>> {
        let mut posts = Vec::with_capacity(ids.len());
        for &id in ids {
            match self.find_post(board, thread_id, id).await? {
                Some(post) => posts.push(post),
                None => {
                    tracing::error!(board, thread_id, post_id = id, "sequenced post has no record");
                    return Err(AppError::CorruptIndex(format!(
                        "post {board}/{thread_id}/{id} is sequenced but has no record"
                    )));
                }
            }
        }
        Ok(posts)
    }
}
