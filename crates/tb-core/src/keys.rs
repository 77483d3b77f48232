//! Logical keyspace of the backing store.
//!
//! ```text
//! board:{board}:next_thread_id           counter
//! board:{board}:bump_seq                 counter
//! thread:{board}:{thread}:next_post_id   counter
//! post:{board}:{thread}:{post}           serialized post record
//! threadindex:{board}                    ordered set thread -> bump score
//! replyseq:{board}:{thread}              ordered set post -> post id
//! ```

use crate::error::{AppError, Result};
use crate::models::{PostId, ThreadId};

/// Width of an encoded ordered-set member; fits any u64.
const MEMBER_WIDTH: usize = 20;

pub fn next_thread_id(board: &str) -> String {
    format!("board:{board}:next_thread_id")
}

pub fn bump_seq(board: &str) -> String {
    format!("board:{board}:bump_seq")
}

pub fn next_post_id(board: &str, thread_id: ThreadId) -> String {
    format!("thread:{board}:{thread_id}:next_post_id")
}

pub fn post(board: &str, thread_id: ThreadId, post_id: PostId) -> String {
    format!("post:{board}:{thread_id}:{post_id}")
}

pub fn thread_index(board: &str) -> String {
    format!("threadindex:{board}")
}

pub fn reply_seq(board: &str, thread_id: ThreadId) -> String {
    format!("replyseq:{board}:{thread_id}")
}

/// Encodes an ID as an ordered-set member. Zero padding makes bytewise
/// tie-breaking agree with numeric order.
pub fn member(id: u64) -> String {
    format!("{id:0width$}", width = MEMBER_WIDTH)
}

pub fn parse_member(raw: &str) -> Result<u64> {
    raw.parse()
        .map_err(|_| AppError::CorruptIndex(format!("unparseable index member {raw:?}")))
}
