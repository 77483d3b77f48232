//! # tb-api Handlers
//!
//! This module coordinates the flow between HTTP requests and the board engine.
//! Handlers validate and shape input; every rule about ordering and identity
//! lives in the engine.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use tb_core::{AuthorMeta, Board, BoardEngine, NewPost, PostId, PostLimits, ThreadId, ThreadSummary, ThreadView};

use crate::error::ApiError;

/// State shared across all Actix-web workers.
pub struct AppState {
    pub engine: BoardEngine,
    /// Highest 1-based listing page served
    pub max_pages: usize,
    pub limits: PostLimits,
}

/// Body of a thread or reply submission. Replies ignore `subject`.
#[derive(Debug, Deserialize)]
pub struct SubmissionForm {
    pub message: String,
    #[serde(default)]
    pub subject: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BoardList {
    pub boards: Vec<Board>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BoardPage {
    pub board: Board,
    /// 1-based, as in the URL
    pub page: usize,
    pub threads: Vec<ThreadSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ThreadPage {
    pub board: Board,
    #[serde(flatten)]
    pub thread: ThreadView,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ThreadCreated {
    pub thread_id: ThreadId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReplyCreated {
    pub post_id: PostId,
}

/// Collects what the engine stores about the submitter.
fn author_meta(req: &HttpRequest) -> AuthorMeta {
    let user_agent = req
        .headers()
        .get(actix_web::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok());
    AuthorMeta {
        ip: req.peer_addr().map(|a| a.ip().to_string()),
        metadata: serde_json::json!({ "user_agent": user_agent }),
    }
}

/// Lists the configured boards (e.g., /)
pub async fn index(data: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(BoardList {
        boards: data.engine.boards().to_vec(),
    })
}

/// First page of a board (e.g., /b/)
pub async fn board_index(data: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    board_listing(&data, &path.into_inner(), 1).await
}

/// A numbered page of a board (e.g., /b/3/)
pub async fn board_page(
    data: web::Data<AppState>,
    path: web::Path<(String, usize)>,
) -> Result<HttpResponse, ApiError> {
    let (slug, page) = path.into_inner();
    board_listing(&data, &slug, page).await
}

async fn board_listing(data: &AppState, slug: &str, page: usize) -> Result<HttpResponse, ApiError> {
    if page == 0 || page > data.max_pages {
        return Err(ApiError::PageOutOfRange(page));
    }
    let board = data.engine.board(slug)?.clone();
    let threads = data
        .engine
        .list_threads(slug, page - 1, board.threads_per_page)
        .await?;

    Ok(HttpResponse::Ok().json(BoardPage { board, page, threads }))
}

/// Starts a new thread and redirects to it.
pub async fn create_thread(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    form: web::Json<SubmissionForm>,
) -> Result<HttpResponse, ApiError> {
    let slug = path.into_inner();
    let form = form.into_inner();
    let post = NewPost::new(&form.message, form.subject.as_deref(), author_meta(&req), &data.limits)?;

    let thread_id = data.engine.create_thread(&slug, post).await?;

    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", format!("/{slug}/thread/{thread_id}")))
        .json(ThreadCreated { thread_id }))
}

/// A specific thread with all of its posts (e.g., /b/thread/12)
pub async fn view_thread(
    data: web::Data<AppState>,
    path: web::Path<(String, ThreadId)>,
) -> Result<HttpResponse, ApiError> {
    let (slug, thread_id) = path.into_inner();
    let board = data.engine.board(&slug)?.clone();
    let thread = data.engine.get_thread(&slug, thread_id).await?;

    Ok(HttpResponse::Ok().json(ThreadPage { board, thread }))
}

/// Appends a reply and redirects to its anchor in the thread.
pub async fn create_reply(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(String, ThreadId)>,
    form: web::Json<SubmissionForm>,
) -> Result<HttpResponse, ApiError> {
    let (slug, thread_id) = path.into_inner();
    let post = NewPost::new(&form.message, None, author_meta(&req), &data.limits)?;

    let post_id = data.engine.add_reply(&slug, thread_id, post).await?;

    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", format!("/{slug}/thread/{thread_id}#id{post_id}")))
        .json(ReplyCreated { post_id }))
}
