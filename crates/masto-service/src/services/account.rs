//! Account service
//!
//! Account lookups, account statuses, follow lists and relationships.

use futures::future::try_join_all;
use masto_core::{DomainError, FfVisibility, Following, NativeId, NoteFilter, NoteSource, User, UserProfile};
use tracing::{debug, instrument, warn};

use crate::converters::{AccountConverter, StatusConverter};
use crate::dto::mappers;
use crate::dto::{Account, AccountStatusOptions, Relationship, Status};

use super::context::RequestContext;
use super::error::ServiceResult;
use super::pagination::{fetch_page, LimitPolicy, Page, PaginationWindow, QueryParams};
use super::timeline::status_page;

/// Which side of the follow graph to list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FollowList {
    Followers,
    Following,
}

/// Account service
pub struct AccountService<'a> {
    ctx: &'a RequestContext,
}

impl<'a> AccountService<'a> {
    /// Create a new AccountService
    pub fn new(ctx: &'a RequestContext) -> Self {
        Self { ctx }
    }

    /// Get an account by native id
    #[instrument(skip(self))]
    pub async fn get_account(&self, id: &NativeId) -> ServiceResult<Account> {
        AccountConverter::new(self.ctx).encode_by_id(id).await
    }

    /// The viewer's own account
    pub async fn verify_credentials(&self) -> ServiceResult<Account> {
        let viewer = self.ctx.require_viewer()?;
        AccountConverter::new(self.ctx).encode(viewer).await
    }

    /// Statuses written by an account
    #[instrument(skip(self, params))]
    pub async fn statuses(&self, id: &NativeId, params: &QueryParams) -> ServiceResult<Page<Status>> {
        // Fails with UserNotFound before any paging
        self.ctx.user(id).await?;

        let options = AccountStatusOptions::from_query(params);
        let window =
            PaginationWindow::from_query(params, self.ctx.services().id_space(), LimitPolicy::STATUSES)?;

        if options.pinned {
            return Ok(self.pinned(id, &window).await);
        }

        let mut filter = NoteFilter::new(
            NoteSource::Account { user_id: id.clone() },
            self.ctx.viewer_id().cloned(),
        );
        filter.only_media = options.only_media;
        filter.exclude_replies = options.exclude_replies;
        filter.exclude_reblogs = options.exclude_reblogs;
        filter.tagged = options.tagged;

        Ok(status_page(self.ctx, &window, &filter).await)
    }

    async fn pinned(&self, id: &NativeId, window: &PaginationWindow) -> Page<Status> {
        let notes = self.ctx.services().note_repo();
        let viewer_id = self.ctx.viewer_id();
        let page = fetch_page(window, |range| async move {
            let pinned = notes.find_pinned(id, viewer_id).await?;
            Ok::<_, DomainError>(range.apply(pinned))
        })
        .await;
        let statuses = StatusConverter::new(self.ctx).encode_many(&page.items).await;
        page.with_items(statuses)
    }

    /// Accounts following an account
    #[instrument(skip(self, params))]
    pub async fn followers(&self, id: &NativeId, params: &QueryParams) -> ServiceResult<Page<Account>> {
        self.follow_list(id, params, FollowList::Followers).await
    }

    /// Accounts an account follows
    #[instrument(skip(self, params))]
    pub async fn following(&self, id: &NativeId, params: &QueryParams) -> ServiceResult<Page<Account>> {
        self.follow_list(id, params, FollowList::Following).await
    }

    async fn follow_list(
        &self,
        id: &NativeId,
        params: &QueryParams,
        list: FollowList,
    ) -> ServiceResult<Page<Account>> {
        let user = self.ctx.user(id).await?;
        let window =
            PaginationWindow::from_query(params, self.ctx.services().id_space(), LimitPolicy::ACCOUNTS)?;

        if !self.can_see_follow_lists(&user).await {
            debug!(user_id = %user.id, "Follow lists hidden from viewer");
            return Ok(Page::empty());
        }

        let follows = self.ctx.services().following_repo();
        let page = fetch_page(&window, |range| async move {
            match list {
                FollowList::Followers => follows.find_followers_page(id, &range).await,
                FollowList::Following => follows.find_following_page(id, &range).await,
            }
        })
        .await;

        let users: Vec<User> = page
            .items
            .iter()
            .map(|row: &Following| match list {
                FollowList::Followers => row.follower.clone(),
                FollowList::Following => row.followee.clone(),
            })
            .collect();
        for user in &users {
            self.ctx.cache().prime(user.clone());
        }

        let accounts = AccountConverter::new(self.ctx).encode_many(&users).await;
        Ok(page.with_items(accounts))
    }

    /// Apply the user's follow list visibility to the viewer
    async fn can_see_follow_lists(&self, user: &User) -> bool {
        let is_self = self.ctx.viewer_id() == Some(&user.id);
        let profile = self
            .ctx
            .services()
            .user_repo()
            .find_profile(&user.id)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, user_id = %user.id, "Profile lookup failed");
                None
            })
            .unwrap_or_else(|| UserProfile::for_user(user.id.clone()));

        match profile.ff_visibility {
            FfVisibility::Public => true,
            FfVisibility::Private => is_self,
            FfVisibility::Followers => {
                if is_self {
                    return true;
                }
                let Some(viewer_id) = self.ctx.viewer_id() else {
                    return false;
                };
                self.ctx
                    .services()
                    .following_repo()
                    .is_following(viewer_id, &user.id)
                    .await
                    .unwrap_or_else(|e| {
                        warn!(error = %e, user_id = %user.id, "Follow check failed");
                        false
                    })
            }
        }
    }

    /// Relationships from the viewer to each of the given foreign ids
    #[instrument(skip(self, ids))]
    pub async fn relationships<S: AsRef<str>>(&self, ids: &[S]) -> ServiceResult<Vec<Relationship>> {
        let viewer = self.ctx.require_viewer()?;
        let targets = self.ctx.services().id_space().decode_all(ids)?;
        let follows = self.ctx.services().following_repo();

        let relations = try_join_all(targets.iter().map(|target| async move {
            let relation = follows.relation(&viewer.id, target).await?;
            Ok::<_, DomainError>(mappers::relationship(
                self.ctx.encode_id(target),
                &relation,
            ))
        }))
        .await?;

        Ok(relations)
    }
}
