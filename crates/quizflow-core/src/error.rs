//! Backend error types.
//!
//! These error types represent failures when talking to the remote quiz
//! store. Defined in `quizflow-core` so the session engine can decide between
//! swallowing a failure (autosave) and falling back to local grading
//! (completion) without string matching.

use thiserror::Error;

/// Errors that can occur when interacting with the quiz backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request was rejected because the token is missing or invalid.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The backend rejected the request parameters (HTTP 400).
    #[error("rejected request: {0}")]
    Rejected(String),

    /// The requested quiz does not exist.
    #[error("quiz not found: {0}")]
    NotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The response body did not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl BackendError {
    /// HTTP status associated with the failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Unauthorized(_) => Some(401),
            BackendError::Rejected(_) => Some(400),
            BackendError::NotFound(_) => Some(404),
            BackendError::ApiError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(BackendError::Rejected("x".into()).status(), Some(400));
        assert_eq!(
            BackendError::ApiError {
                status: 502,
                message: String::new()
            }
            .status(),
            Some(502)
        );
        assert_eq!(BackendError::NetworkError("reset".into()).status(), None);
    }
}
