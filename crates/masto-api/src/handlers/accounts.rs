//! Account handlers
//!
//! Account lookups, account statuses, follow lists and relationships.

use axum::{
    extract::{OriginalUri, State},
    Json,
};
use masto_service::dto::{Account, Relationship, Status};
use masto_service::AccountService;

use crate::extractors::{ForeignIdPath, QueryMap, RequestCtx};
use crate::response::{ApiResult, Paginated};
use crate::state::AppState;

/// Get account by ID
///
/// GET /accounts/{id}
pub async fn get_account(
    RequestCtx(ctx): RequestCtx,
    ForeignIdPath(id): ForeignIdPath,
) -> ApiResult<Json<Account>> {
    let account = AccountService::new(&ctx).get_account(&id).await?;
    Ok(Json(account))
}

/// The viewer's own account
///
/// GET /accounts/verify_credentials
pub async fn verify_credentials(RequestCtx(ctx): RequestCtx) -> ApiResult<Json<Account>> {
    let account = AccountService::new(&ctx).verify_credentials().await?;
    Ok(Json(account))
}

/// Statuses posted by an account
///
/// GET /accounts/{id}/statuses
pub async fn statuses(
    State(state): State<AppState>,
    RequestCtx(ctx): RequestCtx,
    ForeignIdPath(id): ForeignIdPath,
    QueryMap(params): QueryMap,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Paginated<Status>> {
    let page = AccountService::new(&ctx).statuses(&id, &params).await?;
    Ok(state.paginated(page, uri.path()))
}

/// GET /accounts/{id}/followers
pub async fn followers(
    State(state): State<AppState>,
    RequestCtx(ctx): RequestCtx,
    ForeignIdPath(id): ForeignIdPath,
    QueryMap(params): QueryMap,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Paginated<Account>> {
    let page = AccountService::new(&ctx).followers(&id, &params).await?;
    Ok(state.paginated(page, uri.path()))
}

/// GET /accounts/{id}/following
pub async fn following(
    State(state): State<AppState>,
    RequestCtx(ctx): RequestCtx,
    ForeignIdPath(id): ForeignIdPath,
    QueryMap(params): QueryMap,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Paginated<Account>> {
    let page = AccountService::new(&ctx).following(&id, &params).await?;
    Ok(state.paginated(page, uri.path()))
}

/// Relationships to the accounts named by `id[]`
///
/// GET /accounts/relationships
pub async fn relationships(
    RequestCtx(ctx): RequestCtx,
    QueryMap(params): QueryMap,
) -> ApiResult<Json<Vec<Relationship>>> {
    let ids = params.get_all("id");
    let relationships = AccountService::new(&ctx).relationships(&ids).await?;
    Ok(Json(relationships))
}
