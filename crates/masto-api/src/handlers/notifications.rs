//! Notification handlers

use axum::{
    extract::{OriginalUri, State},
    Json,
};
use masto_service::dto::Notification;
use masto_service::NotificationService;

use crate::extractors::{ForeignIdPath, QueryMap, RequestCtx};
use crate::response::{ApiResult, Paginated};
use crate::state::AppState;

/// The viewer's notifications
///
/// GET /notifications
pub async fn list(
    State(state): State<AppState>,
    RequestCtx(ctx): RequestCtx,
    QueryMap(params): QueryMap,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Paginated<Notification>> {
    let page = NotificationService::new(&ctx).list(&params).await?;
    Ok(state.paginated(page, uri.path()))
}

/// GET /notifications/{id}
pub async fn get_notification(
    RequestCtx(ctx): RequestCtx,
    ForeignIdPath(id): ForeignIdPath,
) -> ApiResult<Json<Notification>> {
    let notification = NotificationService::new(&ctx).get(&id).await?;
    Ok(Json(notification))
}
