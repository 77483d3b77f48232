//! # tb-api
//!
//! The web routing and orchestration layer for the textboard.

pub mod error;
pub mod handlers;
pub mod middleware;

pub use error::ApiError;
pub use handlers::AppState;

use actix_web::web;
use tb_core::AppError;

/// Largest accepted submission body, in bytes.
const MAX_PAYLOAD: usize = 64 * 1024;

/// Configures the routes for the textboard.
///
/// # Developer Note
/// We use a scoped configuration to allow the main binary to mount
/// the API under different paths if needed (e.g., /api/v1/).
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(MAX_PAYLOAD)
            .error_handler(|err, _req| {
                ApiError::from(AppError::ValidationFailed(format!("invalid submission: {err}"))).into()
            }),
    )
    .service(
        web::scope("")
            // The board list
            .route("/", web::get().to(handlers::index))
            // The "Board Index" (e.g., /b/), and posting a new thread to it
            .route("/{board}/", web::get().to(handlers::board_index))
            .route("/{board}/", web::post().to(handlers::create_thread))
            // Later pages (e.g., /b/2/)
            .route("/{board}/{page}/", web::get().to(handlers::board_page))
            // The "Thread View" (e.g., /b/thread/123), and replying to it
            .route("/{board}/thread/{thread_id}", web::get().to(handlers::view_thread))
            .route("/{board}/thread/{thread_id}", web::post().to(handlers::create_reply)),
    );
}
