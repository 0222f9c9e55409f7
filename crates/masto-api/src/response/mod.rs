//! Response types and error handling for API endpoints
//!
//! Errors render in the shape Mastodon clients read
//! (`{"error": ..., "error_code": ...}`); pages carry a `Link` header.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use masto_common::{AppError, ErrorResponse};
use masto_core::{DomainError, IdSpace};
use masto_service::{Page, ServiceError};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// API error type for consistent error responses
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    App(#[from] AppError),

    #[error("Invalid path parameter: {0}")]
    InvalidPath(String),

    #[error("Invalid query parameter: {0}")]
    InvalidQuery(String),
}

impl ApiError {
    /// Get HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::App(e) => {
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            Self::InvalidPath(_) | Self::InvalidQuery(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get error code for API responses
    #[must_use]
    pub fn error_code(&self) -> &str {
        match self {
            Self::App(e) => e.error_code(),
            Self::InvalidPath(_) => "INVALID_PATH_PARAMETER",
            Self::InvalidQuery(_) => "INVALID_QUERY_PARAMETER",
        }
    }

    pub fn invalid_path(msg: impl Into<String>) -> Self {
        Self::InvalidPath(msg.into())
    }

    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::InvalidQuery(msg.into())
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self::App(err.into())
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::App(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!(error = ?self, "Server error occurred");
        }

        let body = match &self {
            Self::App(e) => ErrorResponse::from(e),
            _ => ErrorResponse {
                error: self.to_string(),
                error_code: self.error_code().to_string(),
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

/// A page of entities with its `Link` continuation header
pub struct Paginated<T> {
    page: Page<T>,
    endpoint: String,
    space: IdSpace,
}

impl<T> Paginated<T> {
    /// `endpoint` is the absolute URL the continuation links point at
    pub fn new(page: Page<T>, endpoint: impl Into<String>, space: IdSpace) -> Self {
        Self {
            page,
            endpoint: endpoint.into(),
            space,
        }
    }
}

impl<T: Serialize> IntoResponse for Paginated<T> {
    fn into_response(self) -> Response {
        let link = self.page.link_header(&self.endpoint, self.space);
        let mut response = Json(self.page.items).into_response();

        if let Some(link) = link {
            match HeaderValue::from_str(&link) {
                Ok(value) => {
                    response.headers_mut().insert(header::LINK, value);
                }
                Err(e) => warn!(error = %e, "Link header is not a valid header value"),
            }
        }

        response
    }
}
