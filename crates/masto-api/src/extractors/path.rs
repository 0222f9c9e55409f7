//! Path parameter extractors
//!
//! Decodes the `:id` segment from the instance's wire id space.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Path},
    http::request::Parts,
};
use masto_core::NativeId;
use tracing::debug;

use crate::response::ApiError;
use crate::state::AppState;

/// A single wire id from the path, decoded to its native form
#[derive(Debug, Clone)]
pub struct ForeignIdPath(pub NativeId);

#[async_trait]
impl<S> FromRequestParts<S> for ForeignIdPath
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.body_text()))?;

        let space = AppState::from_ref(state).id_space();
        let id = space.decode(&raw).map_err(|e| {
            debug!(error = %e, "Rejected path id");
            ApiError::from(e)
        })?;

        Ok(ForeignIdPath(id))
    }
}
