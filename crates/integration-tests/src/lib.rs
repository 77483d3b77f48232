//! Shared fixtures for the cross-crate tests.

use std::sync::Arc;

use tb_core::{AuthorMeta, Board, BoardEngine, BoardRegistry, KvStore, NewPost, PostLimits};
use tb_kv_memory::MemoryKvStore;

pub fn board(slug: &str, threads_per_page: usize) -> Board {
    Board {
        slug: slug.to_string(),
        title: format!("/{slug}/"),
        description: None,
        threads_per_page,
    }
}

/// Boards "b" (10 per page) and "g" (5 per page).
pub fn test_boards() -> BoardRegistry {
    BoardRegistry::new(vec![board("b", 10), board("g", 5)])
}

pub fn memory_engine() -> BoardEngine {
    engine_over(Arc::new(MemoryKvStore::new()))
}

pub fn engine_over(store: Arc<dyn KvStore>) -> BoardEngine {
    BoardEngine::new(store, test_boards())
}

pub fn author(ip: &str) -> AuthorMeta {
    AuthorMeta {
        ip: Some(ip.to_string()),
        metadata: serde_json::json!({}),
    }
}

pub fn post(body: &str) -> NewPost {
    NewPost::new(body, None, author("192.0.2.1"), &PostLimits::default()).unwrap()
}

pub fn thread_post(subject: &str, body: &str) -> NewPost {
    NewPost::new(body, Some(subject), author("192.0.2.1"), &PostLimits::default()).unwrap()
}
