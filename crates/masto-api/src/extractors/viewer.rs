//! Viewer extractors
//!
//! The identity layer authenticates the request and places the acting
//! [`User`] in the request extensions; anonymous requests carry none.

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use masto_core::User;
use masto_service::RequestContext;

use crate::state::AppState;

/// The acting user, if any
#[derive(Debug, Clone, Default)]
pub struct Viewer(pub Option<User>);

#[async_trait]
impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Viewer(parts.extensions.get::<User>().cloned()))
    }
}

/// A fresh request context for the acting user
///
/// Each request gets its own account cache.
#[derive(Debug, Clone)]
pub struct RequestCtx(pub RequestContext);

#[async_trait]
impl<S> FromRequestParts<S> for RequestCtx
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Viewer(viewer) = Viewer::from_request_parts(parts, state).await?;
        let app_state = AppState::from_ref(state);
        Ok(RequestCtx(app_state.request_context(viewer)))
    }
}
