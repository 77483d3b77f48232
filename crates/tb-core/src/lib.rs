//! textboard/crates/tb-core/src/lib.rs
//!
//! The post storage and ordering engine, and the store port it runs on.

pub mod allocator;
pub mod engine;
pub mod error;
pub mod index;
pub mod input;
pub mod keys;
pub mod models;
pub mod records;
pub mod sequence;
pub mod traits;

// Re-exporting for easier access in other crates
pub use engine::{BoardEngine, BoardRegistry, DEFAULT_PREVIEW_REPLIES};
pub use error::*;
pub use input::{NewPost, PostLimits};
pub use models::*;
pub use traits::*;

#[cfg(test)]
mod tests {
    use super::models::*;

    #[test]
    fn test_root_post_detection() {
        let post = Post {
            id: ROOT_POST_ID,
            thread_id: 1,
            subject: Some("hello".to_string()),
            body: "first post".to_string(),
            author: AuthorMeta {
                ip: Some("127.0.0.1".to_string()),
                metadata: serde_json::json!({ "version": 1 }),
            },
            created_at: chrono::Utc::now(),
        };
        assert!(post.is_root());
        assert!(!Post { id: 2, ..post }.is_root());
    }
}
