//! Query string extractor
//!
//! Mastodon clients repeat array parameters (`types[]=a&types[]=b`), which a
//! struct-shaped `Query` cannot hold, so the raw pairs are kept.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use masto_service::QueryParams;

use crate::response::ApiError;

/// Multi-valued query parameters
#[derive(Debug, Clone, Default)]
pub struct QueryMap(pub QueryParams);

#[async_trait]
impl<S> FromRequestParts<S> for QueryMap
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
            .map_err(|e| ApiError::invalid_query(e.body_text()))?;

        Ok(QueryMap(QueryParams::from_pairs(pairs)))
    }
}
