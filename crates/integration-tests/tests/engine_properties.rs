//! Board engine behaviour over the in-memory store.

use std::collections::HashSet;

use integration_tests::{memory_engine, post, thread_post};
use tb_core::{AppError, BoardEngine, ThreadId};
use tokio_test::{assert_err, assert_ok};

async fn create_n(engine: &BoardEngine, board: &str, n: usize) -> Vec<ThreadId> {
    let mut ids = Vec::with_capacity(n);
    for i in 0..n {
        ids.push(engine.create_thread(board, post(&format!("thread {i}"))).await.unwrap());
    }
    ids
}

fn ids_of(page: &[tb_core::ThreadSummary]) -> Vec<ThreadId> {
    page.iter().map(|t| t.id).collect()
}

#[tokio::test]
async fn test_first_thread_and_reply_scenario() {
    let engine = memory_engine();

    let thread_id = engine.create_thread("b", thread_post("hello", "first post")).await.unwrap();
    assert_eq!(thread_id, 1);

    let post_id = engine.add_reply("b", thread_id, post("second post")).await.unwrap();
    assert_eq!(post_id, 2);

    let view = engine.get_thread("b", thread_id).await.unwrap();
    assert_eq!(view.subject.as_deref(), Some("hello"));
    let posts: Vec<(u64, &str)> = view.posts.iter().map(|p| (p.id, p.body.as_str())).collect();
    assert_eq!(posts, vec![(1, "first post"), (2, "second post")]);
    assert_eq!(view.posts[0].subject.as_deref(), Some("hello"));
    assert_eq!(view.posts[1].subject, None);
    assert_eq!(view.posts[1].author.ip.as_deref(), Some("192.0.2.1"));
}

#[tokio::test]
async fn test_thread_ids_strictly_increase_per_board() {
    let engine = memory_engine();

    let b = create_n(&engine, "b", 5).await;
    assert!(b.windows(2).all(|w| w[0] < w[1]));

    // Each board counts on its own
    let g = create_n(&engine, "g", 2).await;
    assert_eq!(g, vec![1, 2]);
}

#[tokio::test]
async fn test_post_ids_strictly_increase_and_read_back_in_order() {
    let engine = memory_engine();
    let thread_id = engine.create_thread("b", post("root")).await.unwrap();

    let mut replies = Vec::new();
    for i in 0..6 {
        replies.push(engine.add_reply("b", thread_id, post(&format!("reply {i}"))).await.unwrap());
    }
    assert!(replies.windows(2).all(|w| w[0] < w[1]));

    let view = engine.get_thread("b", thread_id).await.unwrap();
    let ids: Vec<u64> = view.posts.iter().map(|p| p.id).collect();
    let mut expected = vec![1];
    expected.extend(&replies);
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn test_reply_bumps_thread_to_top() {
    let engine = memory_engine();
    let t1 = engine.create_thread("b", post("one")).await.unwrap();
    let t2 = engine.create_thread("b", post("two")).await.unwrap();

    let before = engine.list_threads("b", 0, 10).await.unwrap();
    assert_eq!(ids_of(&before), vec![t2, t1]);

    engine.add_reply("b", t1, post("bump")).await.unwrap();

    let after = engine.list_threads("b", 0, 10).await.unwrap();
    assert_eq!(ids_of(&after), vec![t1, t2]);
    assert_eq!(after[0].reply_count, 1);
    assert_eq!(after[1].reply_count, 0);
}

#[tokio::test]
async fn test_pages_partition_the_board() {
    let engine = memory_engine();
    let created = create_n(&engine, "b", 25).await;

    let mut seen = Vec::new();
    for (page, expected_len) in [(0, 10), (1, 10), (2, 5)] {
        let threads = engine.list_threads("b", page, 10).await.unwrap();
        assert_eq!(threads.len(), expected_len, "page {page}");
        seen.extend(ids_of(&threads));
    }
    assert!(engine.list_threads("b", 3, 10).await.unwrap().is_empty());

    let unique: HashSet<ThreadId> = seen.iter().copied().collect();
    assert_eq!(unique.len(), 25, "no overlaps");
    assert_eq!(unique, created.iter().copied().collect::<HashSet<_>>(), "no gaps");

    // Newest first across page boundaries
    let mut newest_first = created.clone();
    newest_first.reverse();
    assert_eq!(seen, newest_first);
}

#[tokio::test]
async fn test_listing_is_repeatable_without_writes() {
    let engine = memory_engine();
    let ids = create_n(&engine, "b", 4).await;
    engine.add_reply("b", ids[1], post("a")).await.unwrap();
    engine.add_reply("b", ids[0], post("b")).await.unwrap();

    let first = engine.list_threads("b", 0, 10).await.unwrap();
    let second = engine.list_threads("b", 0, 10).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(ids_of(&first), vec![ids[0], ids[1], ids[3], ids[2]]);
}

#[tokio::test]
async fn test_unknown_thread_is_not_found() {
    let engine = memory_engine();
    engine.create_thread("b", post("exists")).await.unwrap();

    let err = engine.get_thread("b", 999).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(..)));
    assert!(matches!(engine.get_subject("b", 999).await, Err(AppError::NotFound(..))));
}

#[tokio::test]
async fn test_reply_to_unknown_thread_allocates_no_post_id() {
    let engine = memory_engine();
    let thread_id = engine.create_thread("b", post("root")).await.unwrap();

    let err = engine.add_reply("b", 42, post("lost")).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(..)));

    // Thread 42 later comes into existence; its numbering is untouched
    for _ in 0..41 {
        engine.create_thread("b", post("filler")).await.unwrap();
    }
    assert_eq!(engine.add_reply("b", 42, post("first reply")).await.unwrap(), 2);
    assert_eq!(engine.add_reply("b", thread_id, post("reply")).await.unwrap(), 2);
}

#[tokio::test]
async fn test_unknown_board_is_not_found() {
    let engine = memory_engine();
    assert_err!(engine.create_thread("nope", post("x")).await);
    assert!(matches!(engine.list_threads("nope", 0, 10).await, Err(AppError::NotFound(..))));
    assert!(matches!(engine.get_thread("nope", 1).await, Err(AppError::NotFound(..))));
}

#[tokio::test]
async fn test_summary_carries_preview_and_bump_time() {
    let engine = memory_engine().with_preview_replies(2);
    let thread_id = engine.create_thread("b", thread_post("subject", "root")).await.unwrap();
    for body in ["r1", "r2", "r3"] {
        engine.add_reply("b", thread_id, post(body)).await.unwrap();
    }

    let page = engine.list_threads("b", 0, 10).await.unwrap();
    let summary = &page[0];
    assert_eq!(summary.subject.as_deref(), Some("subject"));
    assert_eq!(summary.root.body, "root");
    assert_eq!(summary.reply_count, 3);
    let preview: Vec<&str> = summary.recent_replies.iter().map(|p| p.body.as_str()).collect();
    assert_eq!(preview, vec!["r2", "r3"]);
    assert_eq!(summary.last_bump, summary.recent_replies[1].created_at);
    assert!(summary.last_bump >= summary.root.created_at);
}

#[tokio::test]
async fn test_summary_without_replies_uses_root_time() {
    let engine = memory_engine().with_preview_replies(0);
    engine.create_thread("b", post("lonely")).await.unwrap();
    let id = engine.create_thread("b", post("busy")).await.unwrap();
    engine.add_reply("b", id, post("reply")).await.unwrap();

    let page = engine.list_threads("b", 0, 10).await.unwrap();
    assert!(page.iter().all(|t| t.recent_replies.is_empty()));
    assert_eq!(page[1].last_bump, page[1].root.created_at);
    assert_eq!(page[0].reply_count, 1);
}

#[tokio::test]
async fn test_thread_count_and_subject_lookup() {
    let engine = memory_engine();
    let id = engine.create_thread("g", thread_post("topic", "body")).await.unwrap();
    engine.create_thread("g", post("no subject")).await.unwrap();

    assert_eq!(assert_ok!(engine.thread_count("g").await), 2);
    assert_eq!(engine.thread_count("b").await.unwrap(), 0);
    assert_eq!(engine.get_subject("g", id).await.unwrap().as_deref(), Some("topic"));
    assert_eq!(engine.get_subject("g", id + 1).await.unwrap(), None);
}
