//! Timeline handlers

use axum::extract::{OriginalUri, State};
use masto_service::dto::Status;
use masto_service::TimelineService;

use crate::extractors::{QueryMap, RequestCtx};
use crate::response::{ApiResult, Paginated};
use crate::state::AppState;

/// Home timeline
///
/// GET /timelines/home
pub async fn home(
    State(state): State<AppState>,
    RequestCtx(ctx): RequestCtx,
    QueryMap(params): QueryMap,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Paginated<Status>> {
    let page = TimelineService::new(&ctx).home(&params).await?;
    Ok(state.paginated(page, uri.path()))
}

/// Public timeline
///
/// GET /timelines/public
pub async fn public(
    State(state): State<AppState>,
    RequestCtx(ctx): RequestCtx,
    QueryMap(params): QueryMap,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Paginated<Status>> {
    let page = TimelineService::new(&ctx).public(&params).await?;
    Ok(state.paginated(page, uri.path()))
}
