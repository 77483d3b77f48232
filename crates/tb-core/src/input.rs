//! Validated submissions.
//!
//! The engine never sees raw request payloads. Callers turn them into a
//! [`NewPost`] first, and that constructor is the only place a submission
//! can be rejected for its content.

use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::AuthorMeta;

/// Size limits applied to every submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PostLimits {
    /// Maximum body length, in characters
    pub max_body_len: usize,
    /// Maximum subject length, in characters
    pub max_subject_len: usize,
}

impl Default for PostLimits {
    fn default() -> Self {
        Self {
            max_body_len: 8000,
            max_subject_len: 100,
        }
    }
}

/// A post that passed validation and may be handed to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    body: String,
    subject: Option<String>,
    author: AuthorMeta,
}

impl NewPost {
    pub fn new(body: &str, subject: Option<&str>, author: AuthorMeta, limits: &PostLimits) -> Result<Self> {
        let body = body.trim();
        if body.is_empty() {
            return Err(AppError::ValidationFailed("empty message".into()));
        }
        if body.chars().count() > limits.max_body_len {
            return Err(AppError::ValidationFailed(format!(
                "message longer than {} characters",
                limits.max_body_len
            )));
        }

        let subject = subject.map(str::trim).filter(|s| !s.is_empty());
        if let Some(s) = subject {
            if s.chars().count() > limits.max_subject_len {
                return Err(AppError::ValidationFailed(format!(
                    "subject longer than {} characters",
                    limits.max_subject_len
                )));
            }
        }

        Ok(Self {
            body: body.to_string(),
            subject: subject.map(str::to_string),
            author,
        })
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn author(&self) -> &AuthorMeta {
        &self.author
    }

    pub(crate) fn into_parts(self) -> (String, Option<String>, AuthorMeta) {
        (self.body, self.subject, self.author)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> PostLimits {
        PostLimits {
            max_body_len: 10,
            max_subject_len: 5,
        }
    }

    #[test]
    fn test_whitespace_only_message_is_rejected() {
        let err = NewPost::new("  \n\t ", None, AuthorMeta::default(), &limits()).unwrap_err();
        assert!(matches!(err, AppError::ValidationFailed(_)));
    }

    #[test]
    fn test_blank_subject_becomes_none() {
        let post = NewPost::new(" hi ", Some("   "), AuthorMeta::default(), &limits()).unwrap();
        assert_eq!(post.body(), "hi");
        assert_eq!(post.subject(), None);
    }

    #[test]
    fn test_length_limits_count_characters() {
        assert!(NewPost::new("ééééééééé", Some("ñññññ"), AuthorMeta::default(), &limits()).is_ok());
        assert!(NewPost::new("01234567890", None, AuthorMeta::default(), &limits()).is_err());
        assert!(NewPost::new("ok", Some("toolong"), AuthorMeta::default(), &limits()).is_err());
    }
}
