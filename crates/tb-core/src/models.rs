//! # Domain Models
//!
//! These structs represent the core entities of the textboard.
//! Threads and posts use small integer IDs scoped to their board and thread.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Thread ID, unique within a board.
pub type ThreadId = u64;

/// Post ID, unique within a thread. The root post is always 1.
pub type PostId = u64;

/// The post ID every thread's root post receives.
pub const ROOT_POST_ID: PostId = 1;

/// Represents a single configured board (e.g., /b/, /g/)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// The URL slug (e.g., "b" for /b/)
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    /// Number of threads shown per listing page
    pub threads_per_page: usize,
}

/// Submitter details. Opaque to the engine; stored and returned as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorMeta {
    /// Submission IP, kept for abuse controls outside the engine
    pub ip: Option<String>,
    /// Metadata bucket for collaborators (e.g., user agent, captcha score)
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// The fundamental unit of conversation, as persisted in the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub thread_id: ThreadId,
    /// Only the root post carries the thread's subject
    pub subject: Option<String>,
    pub body: String,
    pub author: AuthorMeta,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn is_root(&self) -> bool {
        self.id == ROOT_POST_ID
    }
}

/// One entry of a board listing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadSummary {
    pub id: ThreadId,
    pub subject: Option<String>,
    pub root: Post,
    /// Number of posts after the root
    pub reply_count: u64,
    /// Creation time of the newest post in the thread
    pub last_bump: DateTime<Utc>,
    /// Trailing replies in ascending order, for the board index preview
    pub recent_replies: Vec<Post>,
}

/// A full thread: its subject and every post in creation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadView {
    pub thread_id: ThreadId,
    pub subject: Option<String>,
    pub posts: Vec<Post>,
}
