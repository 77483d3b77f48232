//! Translation of engine failures into HTTP responses.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use tb_core::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] AppError),

    /// Listing pages are 1-based and capped by configuration.
    #[error("page {0} does not exist")]
    PageOutOfRange(usize),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::PageOutOfRange(_) => StatusCode::NOT_FOUND,
            ApiError::Core(e) => match e {
                AppError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
                AppError::NotFound(..) => StatusCode::NOT_FOUND,
                AppError::AlreadyExists(..) => StatusCode::CONFLICT,
                AppError::CorruptIndex(_) => StatusCode::INTERNAL_SERVER_ERROR,
                AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        // Internal faults are logged in full but never described to the submitter.
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            match status {
                StatusCode::SERVICE_UNAVAILABLE => "service temporarily unavailable".to_string(),
                _ => "internal error".to_string(),
            }
        } else {
            self.to_string()
        };
        HttpResponse::build(status).json(ErrorBody { error: &message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::ValidationFailed("empty message".into()), StatusCode::BAD_REQUEST),
            (AppError::not_found("thread", "b/9"), StatusCode::NOT_FOUND),
            (AppError::already_exists("post", "b/1/2"), StatusCode::CONFLICT),
            (AppError::CorruptIndex("b/3".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::StoreUnavailable("timeout".into()), StatusCode::SERVICE_UNAVAILABLE),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
        assert_eq!(ApiError::PageOutOfRange(11).status_code(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_server_errors_hide_details() {
        let resp = ApiError::from(AppError::StoreUnavailable("10.0.0.5:6379 refused".into())).error_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(!body.contains("10.0.0.5"));
        assert!(body.contains("temporarily unavailable"));
    }
}
