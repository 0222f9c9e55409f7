//! Notification service

use masto_core::{DomainError, NativeId, Notification as NativeNotification, NotificationFilter};
use tracing::{info, instrument};

use crate::converters::{notification_type, NotificationConverter};
use crate::dto::{Notification, NotificationListOptions};

use super::context::RequestContext;
use super::error::{ServiceError, ServiceResult};
use super::pagination::{fetch_page_filtered, LimitPolicy, Page, PaginationWindow, QueryParams};

/// Notification service
pub struct NotificationService<'a> {
    ctx: &'a RequestContext,
}

impl<'a> NotificationService<'a> {
    /// Create a new NotificationService
    pub fn new(ctx: &'a RequestContext) -> Self {
        Self { ctx }
    }

    /// The viewer's notifications
    ///
    /// Kinds Mastodon clients cannot show are skipped while paging, so they
    /// never shorten a page.
    #[instrument(skip(self, params))]
    pub async fn list(&self, params: &QueryParams) -> ServiceResult<Page<Notification>> {
        let viewer = self.ctx.require_viewer()?;
        let space = self.ctx.services().id_space();
        let window = PaginationWindow::from_query(params, space, LimitPolicy::NOTIFICATIONS)?;
        let options = NotificationListOptions::from_query(params, space)?;

        let mut filter = NotificationFilter::for_user(viewer.id.clone());
        filter.include_kinds = notification_type::native_kinds_for(&options.types);
        filter.exclude_kinds = notification_type::native_kinds_for(&options.exclude_types);
        filter.notifier_id = options.account_id;

        // Requested only types with no native counterpart
        if !options.types.is_empty() && filter.include_kinds.is_empty() {
            return Ok(Page::empty());
        }

        let notifications = self.ctx.services().notification_repo();
        let filter = &filter;
        let page = fetch_page_filtered(
            &window,
            |range| async move { notifications.find_page(filter, &range).await },
            |n: &NativeNotification| notification_type::is_supported(n.kind),
        )
        .await;

        let converted = NotificationConverter::new(self.ctx).encode_many(&page.items).await;
        info!(user_id = %viewer.id, count = converted.len(), "Notifications fetched");
        Ok(page.with_items(converted))
    }

    /// One of the viewer's notifications
    #[instrument(skip(self))]
    pub async fn get(&self, id: &NativeId) -> ServiceResult<Notification> {
        self.ctx.require_viewer()?;
        let notification = self
            .ctx
            .services()
            .notification_repo()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotificationNotFound(id.clone()))?;

        NotificationConverter::new(self.ctx)
            .encode(&notification)
            .await
            .map_err(|e| match e {
                // Someone else's notification reads as missing
                ServiceError::Domain(
                    DomainError::UnsupportedNotificationType(_) | DomainError::NotRecipient,
                ) => DomainError::NotificationNotFound(id.clone()).into(),
                other => other,
            })
    }
}
