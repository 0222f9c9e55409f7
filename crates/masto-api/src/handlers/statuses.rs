//! Status handlers

use axum::{
    extract::{OriginalUri, State},
    Json,
};
use masto_service::dto::{Account, Status, StatusContext};
use masto_service::StatusService;

use crate::extractors::{ForeignIdPath, QueryMap, RequestCtx};
use crate::response::{ApiResult, Paginated};
use crate::state::AppState;

/// Get status by ID
///
/// GET /statuses/{id}
pub async fn get_status(
    RequestCtx(ctx): RequestCtx,
    ForeignIdPath(id): ForeignIdPath,
) -> ApiResult<Json<Status>> {
    let status = StatusService::new(&ctx).get(&id).await?;
    Ok(Json(status))
}

/// Ancestors and descendants of a status
///
/// GET /statuses/{id}/context
pub async fn context(
    RequestCtx(ctx): RequestCtx,
    ForeignIdPath(id): ForeignIdPath,
) -> ApiResult<Json<StatusContext>> {
    let context = StatusService::new(&ctx).context(&id).await?;
    Ok(Json(context))
}

/// GET /statuses/{id}/favourited_by
pub async fn favourited_by(
    State(state): State<AppState>,
    RequestCtx(ctx): RequestCtx,
    ForeignIdPath(id): ForeignIdPath,
    QueryMap(params): QueryMap,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Paginated<Account>> {
    let page = StatusService::new(&ctx).favourited_by(&id, &params).await?;
    Ok(state.paginated(page, uri.path()))
}

/// GET /statuses/{id}/reblogged_by
pub async fn reblogged_by(
    State(state): State<AppState>,
    RequestCtx(ctx): RequestCtx,
    ForeignIdPath(id): ForeignIdPath,
    QueryMap(params): QueryMap,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Paginated<Account>> {
    let page = StatusService::new(&ctx).reblogged_by(&id, &params).await?;
    Ok(state.paginated(page, uri.path()))
}
