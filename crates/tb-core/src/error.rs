//! # AppError
//!
//! Centralized error handling for the textboard engine.
//! Every store adapter and engine operation reports through this taxonomy.

use thiserror::Error;

/// The primary error type for all tb-core operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Malformed or empty submission, rejected before it reaches the store.
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// Resource not found (e.g., Board, Thread, Post)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// A key that the allocator promised was fresh is already occupied.
    #[error("{0} already exists with ID {1}")]
    AlreadyExists(String, String),

    /// The index references content the record store cannot produce.
    #[error("corrupt index: {0}")]
    CorruptIndex(String),

    /// Backing store unreachable or timed out.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl AppError {
    pub fn not_found(kind: &str, id: impl ToString) -> Self {
        AppError::NotFound(kind.to_string(), id.to_string())
    }

    pub fn already_exists(kind: &str, id: impl ToString) -> Self {
        AppError::AlreadyExists(kind.to_string(), id.to_string())
    }

    /// True for conditions the submitter can fix by changing the request.
    pub fn is_user_error(&self) -> bool {
        matches!(self, AppError::ValidationFailed(_) | AppError::NotFound(..))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::CorruptIndex(format!("undecodable record: {e}"))
    }
}

/// A specialized Result type for textboard logic.
pub type Result<T> = std::result::Result<T, AppError>;
