//! Native notification to Mastodon notification conversion

use futures::future::join_all;
use masto_core::{DomainError, Note, Notification as NativeNotification, NotificationType};
use tracing::{debug, instrument, warn};

use super::account::AccountConverter;
use super::{notification_type, referenced_note};
use super::status::StatusConverter;
use crate::dto::{Account, MastodonNotificationType, Notification, Status};
use crate::services::context::RequestContext;
use crate::services::error::ServiceResult;

/// Notification converter
#[derive(Clone, Copy)]
pub struct NotificationConverter<'a> {
    ctx: &'a RequestContext,
    accounts: AccountConverter<'a>,
    statuses: StatusConverter<'a>,
}

impl<'a> NotificationConverter<'a> {
    pub fn new(ctx: &'a RequestContext) -> Self {
        Self {
            ctx,
            accounts: AccountConverter::new(ctx),
            statuses: StatusConverter::new(ctx),
        }
    }

    /// Convert one notification addressed to the viewer
    ///
    /// # Errors
    /// `UnsupportedNotificationType` for kinds Mastodon cannot show,
    /// `NotRecipient` when the viewer is not the notifiee.
    #[instrument(skip(self, notification), fields(notification_id = %notification.id))]
    pub async fn encode(&self, notification: &NativeNotification) -> ServiceResult<Notification> {
        let kind = notification_type::to_mastodon(notification.kind)?;
        let viewer = self.ctx.require_viewer()?;
        if notification.notifiee_id != viewer.id {
            return Err(DomainError::NotRecipient.into());
        }

        let (account, status) = futures::join!(
            self.notifier_account(notification),
            self.status(notification.note.as_ref()),
        );
        let status = status?;

        // Poll results are attributed to the poll's author
        let account = match (kind, &status) {
            (MastodonNotificationType::Poll, Some(status)) => status.account.clone(),
            _ => account?,
        };

        let emoji = (notification.kind == NotificationType::Reaction)
            .then(|| notification.reaction.clone())
            .flatten();

        Ok(Notification {
            id: self.ctx.encode_id(&notification.id).into_inner(),
            kind,
            created_at: notification.created_at,
            account,
            status,
            emoji,
        })
    }

    /// Convert notifications concurrently, keeping input order
    ///
    /// Unsupported or failing notifications are skipped.
    pub async fn encode_many(&self, notifications: &[NativeNotification]) -> Vec<Notification> {
        let results = join_all(notifications.iter().map(|n| self.encode(n))).await;
        results
            .into_iter()
            .zip(notifications)
            .filter_map(|(result, native)| match result {
                Ok(converted) => Some(converted),
                Err(e) if e.is_entity_scoped() => {
                    debug!(error = %e, notification_id = %native.id, "Skipping notification");
                    None
                }
                Err(e) => {
                    warn!(error = %e, notification_id = %native.id, "Notification failed to convert");
                    None
                }
            })
            .collect()
    }

    /// The notifier's account, or the viewer's for system notifications
    async fn notifier_account(&self, notification: &NativeNotification) -> ServiceResult<Account> {
        match &notification.notifier_id {
            Some(notifier_id) => self.accounts.encode_by_id(notifier_id).await,
            None => {
                let viewer = self.ctx.require_viewer()?;
                self.accounts.encode(viewer).await
            }
        }
    }

    /// The attached note; pure renotes resolve to the boosted note
    async fn status(&self, note: Option<&Note>) -> ServiceResult<Option<Status>> {
        let Some(note) = note else {
            return Ok(None);
        };

        if note.is_pure_renote() {
            if let Some(target_id) = &note.renote_id {
                let target = referenced_note(self.ctx, target_id).await?;
                return Ok(Some(self.statuses.encode(&target).await?));
            }
        }

        Ok(Some(self.statuses.encode(note).await?))
    }
}
