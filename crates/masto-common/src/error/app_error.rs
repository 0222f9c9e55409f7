//! Application error types
//!
//! Maps every failure that reaches the HTTP boundary to a status code and
//! the error body Mastodon clients read.

use masto_core::DomainError;
use serde::Serialize;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Authentication errors
    #[error("The access token is invalid")]
    MissingAuth,

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl AppError {
    /// Get HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Self::Validation(_) => 400,

            // 401 Unauthorized
            Self::MissingAuth => 401,

            // Map domain errors to appropriate status codes
            Self::Domain(e) => Self::domain_status_code(e),
        }
    }

    /// HTTP status code for a domain error
    #[must_use]
    pub fn domain_status_code(err: &DomainError) -> u16 {
        if err.is_not_found() {
            404
        } else if err.is_authorization() {
            403
        } else if err.is_validation() {
            400
        } else if err.is_unsupported() {
            422
        } else if err.upstream_failure().is_some() {
            502
        } else {
            500
        }
    }

    /// Get error code for API responses
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingAuth => "MISSING_AUTH",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Domain(e) => e.code(),
        }
    }
}

/// Error body in the shape Mastodon clients expect
///
/// `details` carries what an upstream collaborator returned, when it did.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        let details = match err {
            AppError::Domain(e) => e
                .upstream_failure()
                .and_then(|failure| serde_json::to_value(failure).ok()),
            _ => None,
        };
        Self {
            error: err.to_string(),
            error_code: err.error_code().to_string(),
            details,
        }
    }
}

impl From<AppError> for ErrorResponse {
    fn from(err: AppError) -> Self {
        Self::from(&err)
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
