//! User to Mastodon account conversion

use futures::future::join_all;
use masto_core::{NativeId, User, UserProfile};
use tracing::{instrument, warn};

use super::markup::MarkupRenderer;
use super::{keep_converted, resolve_emojis};
use crate::dto::{Account, Field};
use crate::services::context::RequestContext;
use crate::services::error::ServiceResult;

/// Account converter
#[derive(Clone, Copy)]
pub struct AccountConverter<'a> {
    ctx: &'a RequestContext,
}

impl<'a> AccountConverter<'a> {
    pub fn new(ctx: &'a RequestContext) -> Self {
        Self { ctx }
    }

    /// Convert a user, at most once per request
    pub async fn encode(&self, user: &User) -> ServiceResult<Account> {
        self.ctx
            .cache()
            .account(&user.id, || self.build(user))
            .await
    }

    /// Resolve a user through the account cache and convert it
    pub async fn encode_by_id(&self, id: &NativeId) -> ServiceResult<Account> {
        if let Some(account) = self.ctx.cache().cached_account(id) {
            return Ok(account);
        }
        let user = self.ctx.user(id).await?;
        self.encode(&user).await
    }

    /// Convert users concurrently, keeping input order
    pub async fn encode_many(&self, users: &[User]) -> Vec<Account> {
        let results = join_all(users.iter().map(|user| self.encode(user))).await;
        keep_converted(results, "account")
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn build(&self, user: &User) -> ServiceResult<Account> {
        let (profile, avatar, header, emojis) = futures::join!(
            self.profile(user),
            self.file_url(user.avatar_id.as_ref()),
            self.file_url(user.banner_id.as_ref()),
            resolve_emojis(self.ctx, &user.emojis, user.host.as_deref()),
        );

        let instance = self.ctx.services().instance();
        let renderer = MarkupRenderer::new(instance);

        let avatar = avatar.unwrap_or_else(|| instance.identicon_url(user.id.as_str()));
        let header = header.unwrap_or_else(|| instance.transparent_banner_url());
        let note = profile
            .description
            .as_deref()
            .map(|bio| renderer.render_or_escape(bio))
            .unwrap_or_default();
        let fields = profile
            .fields
            .iter()
            .map(|field| Field {
                name: field.name.clone(),
                value: renderer.render_fragment_or_escape(&field.value),
                verified_at: field.verified.then(|| self.ctx.now()),
            })
            .collect();

        Ok(Account {
            id: self.ctx.encode_id(&user.id).into_inner(),
            username: user.username.clone(),
            acct: user.acct(),
            display_name: user.display_name().to_string(),
            locked: user.is_locked,
            bot: user.is_bot,
            group: false,
            created_at: user.created_at,
            note,
            url: user
                .uri
                .clone()
                .unwrap_or_else(|| instance.profile_url(&user.username, user.host.as_deref())),
            avatar_static: avatar.clone(),
            avatar,
            header_static: header.clone(),
            header,
            followers_count: user.followers_count,
            following_count: user.following_count,
            statuses_count: user.notes_count,
            emojis,
            fields,
            moved: user.moved_to_uri.clone(),
        })
    }

    async fn profile(&self, user: &User) -> UserProfile {
        match self.ctx.services().user_repo().find_profile(&user.id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => UserProfile::for_user(user.id.clone()),
            Err(e) => {
                warn!(error = %e, user_id = %user.id, "Profile lookup failed");
                UserProfile::for_user(user.id.clone())
            }
        }
    }

    async fn file_url(&self, file_id: Option<&NativeId>) -> Option<String> {
        let file_id = file_id?;
        match self.ctx.services().drive_file_repo().find_by_id(file_id).await {
            Ok(file) => file.map(|f| f.url),
            Err(e) => {
                warn!(error = %e, file_id = %file_id, "Drive file lookup failed");
                None
            }
        }
    }
}
