//! # Board Engine
//!
//! The façade request handlers call. Composes the allocator, record store,
//! reply sequence and thread index into the four board operations.
//!
//! # Write ordering
//! Mutations write content first and publish last: a root post is stored
//! and sequenced before its thread enters the index, and a reply is stored
//! and sequenced before its thread is bumped. A failure midway leaves at
//! worst an unreferenced record and a skipped ID, both harmless to retry.

use std::sync::Arc;

use crate::allocator::{IdAllocator, Scope};
use crate::error::{AppError, Result};
use crate::index::ThreadIndex;
use crate::input::NewPost;
use crate::models::{Board, Post, PostId, ThreadId, ThreadSummary, ThreadView, ROOT_POST_ID};
use crate::records::PostRecordStore;
use crate::sequence::ReplySequence;
use crate::traits::KvStore;

/// Number of trailing replies shown under each thread on a listing page.
pub const DEFAULT_PREVIEW_REPLIES: usize = 3;

/// The configured set of boards, in display order.
#[derive(Debug, Clone, Default)]
pub struct BoardRegistry {
    boards: Vec<Board>,
}

impl BoardRegistry {
    pub fn new(boards: Vec<Board>) -> Self {
        Self { boards }
    }

    pub fn get(&self, slug: &str) -> Result<&Board> {
        self.boards
            .iter()
            .find(|b| b.slug == slug)
            .ok_or_else(|| AppError::not_found("board", slug))
    }

    pub fn all(&self) -> &[Board] {
        &self.boards
    }
}

pub struct BoardEngine {
    store: Arc<dyn KvStore>,
    boards: BoardRegistry,
    allocator: IdAllocator,
    records: PostRecordStore,
    sequence: ReplySequence,
    index: ThreadIndex,
    preview_replies: usize,
}

impl BoardEngine {
    pub fn new(store: Arc<dyn KvStore>, boards: BoardRegistry) -> Self {
        let allocator = IdAllocator::new(store.clone());
        let sequence = ReplySequence::new(store.clone());
        let records = PostRecordStore::new(store.clone(), sequence.clone());
        let index = ThreadIndex::new(store.clone(), allocator.clone());
        Self {
            store,
            boards,
            allocator,
            records,
            sequence,
            index,
            preview_replies: DEFAULT_PREVIEW_REPLIES,
        }
    }

    pub fn with_preview_replies(mut self, n: usize) -> Self {
        self.preview_replies = n;
        self
    }

    pub fn boards(&self) -> &[Board] {
        self.boards.all()
    }

    pub fn board(&self, slug: &str) -> Result<&Board> {
        self.boards.get(slug)
    }

    /// The injected store handle, for lifecycle calls by the owner.
    pub fn store(&self) -> &Arc<dyn KvStore> {
        &self.store
    }

    /// Creates a thread together with its root post and returns the thread ID.
    pub async fn create_thread(&self, board: &str, post: NewPost) -> Result<ThreadId> {
        self.boards.get(board)?;

        let thread_id = self.allocator.next_id(Scope::Board(board)).await?;
        let post_id = self.allocator.next_id(Scope::Thread(board, thread_id)).await?;
        if post_id != ROOT_POST_ID {
            // A fresh thread ID whose post counter already moved means the
            // keyspace was written outside the allocator.
            tracing::error!(board, thread_id, post_id, "post counter of a new thread was not fresh");
            return Err(AppError::already_exists("thread", format!("{board}/{thread_id}")));
        }

        let (body, subject, author) = post.into_parts();
        let root = Post {
            id: post_id,
            thread_id,
            subject,
            body,
            author,
            created_at: chrono::Utc::now(),
        };
        self.records.put_post(board, &root).await?;
        self.sequence.append(board, thread_id, post_id).await?;

        let score = self.index.fresh_score(board).await?;
        self.index.insert(board, thread_id, score).await?;

        tracing::info!(board, thread_id, "thread created");
        Ok(thread_id)
    }

    /// Appends a reply to an existing thread, bumps it, and returns the post ID.
    pub async fn add_reply(&self, board: &str, thread_id: ThreadId, post: NewPost) -> Result<PostId> {
        self.ensure_listed(board, thread_id).await?;

        let post_id = self.allocator.next_id(Scope::Thread(board, thread_id)).await?;
        let (body, _, author) = post.into_parts();
        let reply = Post {
            id: post_id,
            thread_id,
            subject: None,
            body,
            author,
            created_at: chrono::Utc::now(),
        };
        self.records.put_post(board, &reply).await?;
        self.sequence.append(board, thread_id, post_id).await?;
        self.index.bump(board, thread_id).await?;

        tracing::info!(board, thread_id, post_id, "reply added");
        Ok(post_id)
    }

    /// One page of the board listing, most recently bumped thread first.
    pub async fn list_threads(&self, board: &str, page: usize, page_size: usize) -> Result<Vec<ThreadSummary>> {
        self.boards.get(board)?;

        let ids = self.index.page(board, page, page_size).await?;
        let mut summaries = Vec::with_capacity(ids.len());
        for id in ids {
            summaries.push(self.summarize(board, id).await?);
        }
        Ok(summaries)
    }

    /// Subject and every post of a thread, in creation order.
    pub async fn get_thread(&self, board: &str, thread_id: ThreadId) -> Result<ThreadView> {
        self.ensure_listed(board, thread_id).await?;

        let posts = self.records.get_posts(board, thread_id).await?;
        let subject = match posts.first() {
            Some(root) if root.is_root() => root.subject.clone(),
            _ => return Err(AppError::not_found("thread", format!("{board}/{thread_id}"))),
        };
        Ok(ThreadView {
            thread_id,
            subject,
            posts,
        })
    }

    pub async fn get_subject(&self, board: &str, thread_id: ThreadId) -> Result<Option<String>> {
        self.ensure_listed(board, thread_id).await?;
        match self.records.find_post(board, thread_id, ROOT_POST_ID).await? {
            Some(root) => Ok(root.subject),
            None => Err(AppError::not_found("thread", format!("{board}/{thread_id}"))),
        }
    }

    /// Number of threads currently indexed on the board.
    pub async fn thread_count(&self, board: &str) -> Result<u64> {
        self.boards.get(board)?;
        self.index.count(board).await
    }

    /// A thread exists once it is in the index. Content left behind by a
    /// create that failed before publishing stays unreachable.
    async fn ensure_listed(&self, board: &str, thread_id: ThreadId) -> Result<()> {
        self.boards.get(board)?;
        if !self.index.contains(board, thread_id).await? {
            return Err(AppError::not_found("thread", format!("{board}/{thread_id}")));
        }
        Ok(())
    }

    async fn summarize(&self, board: &str, thread_id: ThreadId) -> Result<ThreadSummary> {
        let corrupt = |what: &str| {
            tracing::error!(board, thread_id, what, "indexed thread is incomplete");
            AppError::CorruptIndex(format!("indexed thread {board}/{thread_id} has {what}"))
        };

        let root = self
            .records
            .find_post(board, thread_id, ROOT_POST_ID)
            .await?
            .ok_or_else(|| corrupt("no root post"))?;

        let count = self.sequence.count(board, thread_id).await?;
        if count == 0 {
            return Err(corrupt("no sequenced posts"));
        }

        // Always read at least the newest post: its timestamp is the bump time.
        let tail = self.sequence.tail(board, thread_id, self.preview_replies.saturating_add(1)).await?;
        let reply_ids: Vec<PostId> = tail.into_iter().filter(|&id| id != ROOT_POST_ID).collect();
        let mut replies = self.records.get_many(board, thread_id, &reply_ids).await?;

        let last_bump = replies.last().map_or(root.created_at, |p| p.created_at);
        let excess = replies.len().saturating_sub(self.preview_replies);
        replies.drain(..excess);

        Ok(ThreadSummary {
            id: thread_id,
            subject: root.subject.clone(),
            root,
            reply_count: count - 1,
            last_bump,
            recent_replies: replies,
        })
    }
}
