//! Learning API error types.
//!
//! These error types represent failures when talking to the EduQuest API.
//! Defined in `eduquest-core` so the wizard components can downcast and
//! classify errors (for example, to drop cancelled requests silently) without
//! string matching.

use thiserror::Error;

/// Errors that can occur when calling the learning API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API answered with a non-2xx status.
    #[error("API error (HTTP {status}): {message}")]
    Http { status: u16, message: String },

    /// The API answered 2xx but the body carried an `error` field.
    #[error("API reported an error: {0}")]
    Remote(String),

    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),

    /// The caller cancelled the request before it completed.
    #[error("request cancelled")]
    Cancelled,
}

impl ApiError {
    /// Returns `true` if the request was dropped by its caller.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }

    /// HTTP status of the failure, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Returns `true` if `err` wraps an [`ApiError::Cancelled`].
pub fn is_cancelled(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ApiError>()
        .is_some_and(ApiError::is_cancelled)
}
