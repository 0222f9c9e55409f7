//! Service context - dependency container for services
//!
//! [`ServiceContext`] holds the store repositories and configuration shared by
//! every request. [`RequestContext`] adds what belongs to one request: the
//! acting viewer, the account cache, and the request clock.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use masto_common::{AppConfig, CompatConfig, InstanceConfig};
use masto_core::traits::{
    DriveFileRepository, EmojiRepository, FollowingRepository, NoteRepository,
    NotificationRepository, PollRepository, ReactionRepository, UserRepository,
};
use masto_core::{DomainError, ForeignId, IdSpace, NativeId, User};

use super::account_cache::AccountCache;
use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    user_repo: Arc<dyn UserRepository>,
    drive_file_repo: Arc<dyn DriveFileRepository>,
    emoji_repo: Arc<dyn EmojiRepository>,
    note_repo: Arc<dyn NoteRepository>,
    reaction_repo: Arc<dyn ReactionRepository>,
    poll_repo: Arc<dyn PollRepository>,
    following_repo: Arc<dyn FollowingRepository>,
    notification_repo: Arc<dyn NotificationRepository>,

    // Configuration
    config: Arc<AppConfig>,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        drive_file_repo: Arc<dyn DriveFileRepository>,
        emoji_repo: Arc<dyn EmojiRepository>,
        note_repo: Arc<dyn NoteRepository>,
        reaction_repo: Arc<dyn ReactionRepository>,
        poll_repo: Arc<dyn PollRepository>,
        following_repo: Arc<dyn FollowingRepository>,
        notification_repo: Arc<dyn NotificationRepository>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            user_repo,
            drive_file_repo,
            emoji_repo,
            note_repo,
            reaction_repo,
            poll_repo,
            following_repo,
            notification_repo,
            config,
        }
    }

    // === Repositories ===

    /// Get the user repository
    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    /// Get the drive file repository
    pub fn drive_file_repo(&self) -> &dyn DriveFileRepository {
        self.drive_file_repo.as_ref()
    }

    /// Get the custom emoji repository
    pub fn emoji_repo(&self) -> &dyn EmojiRepository {
        self.emoji_repo.as_ref()
    }

    /// Get the note repository
    pub fn note_repo(&self) -> &dyn NoteRepository {
        self.note_repo.as_ref()
    }

    /// Get the reaction repository
    pub fn reaction_repo(&self) -> &dyn ReactionRepository {
        self.reaction_repo.as_ref()
    }

    /// Get the poll repository
    pub fn poll_repo(&self) -> &dyn PollRepository {
        self.poll_repo.as_ref()
    }

    /// Get the following repository
    pub fn following_repo(&self) -> &dyn FollowingRepository {
        self.following_repo.as_ref()
    }

    /// Get the notification repository
    pub fn notification_repo(&self) -> &dyn NotificationRepository {
        self.notification_repo.as_ref()
    }

    // === Configuration ===

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn instance(&self) -> &InstanceConfig {
        &self.config.instance
    }

    pub fn compat(&self) -> &CompatConfig {
        &self.config.compat
    }

    /// Id space used on the wire
    pub fn id_space(&self) -> IdSpace {
        self.config.compat.id_space
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("instance", &self.config.instance.url)
            .field("id_space", &self.config.compat.id_space)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    user_repo: Option<Arc<dyn UserRepository>>,
    drive_file_repo: Option<Arc<dyn DriveFileRepository>>,
    emoji_repo: Option<Arc<dyn EmojiRepository>>,
    note_repo: Option<Arc<dyn NoteRepository>>,
    reaction_repo: Option<Arc<dyn ReactionRepository>>,
    poll_repo: Option<Arc<dyn PollRepository>>,
    following_repo: Option<Arc<dyn FollowingRepository>>,
    notification_repo: Option<Arc<dyn NotificationRepository>>,
    config: Option<Arc<AppConfig>>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn drive_file_repo(mut self, repo: Arc<dyn DriveFileRepository>) -> Self {
        self.drive_file_repo = Some(repo);
        self
    }

    pub fn emoji_repo(mut self, repo: Arc<dyn EmojiRepository>) -> Self {
        self.emoji_repo = Some(repo);
        self
    }

    pub fn note_repo(mut self, repo: Arc<dyn NoteRepository>) -> Self {
        self.note_repo = Some(repo);
        self
    }

    pub fn reaction_repo(mut self, repo: Arc<dyn ReactionRepository>) -> Self {
        self.reaction_repo = Some(repo);
        self
    }

    pub fn poll_repo(mut self, repo: Arc<dyn PollRepository>) -> Self {
        self.poll_repo = Some(repo);
        self
    }

    pub fn following_repo(mut self, repo: Arc<dyn FollowingRepository>) -> Self {
        self.following_repo = Some(repo);
        self
    }

    pub fn notification_repo(mut self, repo: Arc<dyn NotificationRepository>) -> Self {
        self.notification_repo = Some(repo);
        self
    }

    pub fn config(mut self, config: Arc<AppConfig>) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.user_repo.ok_or_else(|| ServiceError::validation("user_repo is required"))?,
            self.drive_file_repo.ok_or_else(|| ServiceError::validation("drive_file_repo is required"))?,
            self.emoji_repo.ok_or_else(|| ServiceError::validation("emoji_repo is required"))?,
            self.note_repo.ok_or_else(|| ServiceError::validation("note_repo is required"))?,
            self.reaction_repo.ok_or_else(|| ServiceError::validation("reaction_repo is required"))?,
            self.poll_repo.ok_or_else(|| ServiceError::validation("poll_repo is required"))?,
            self.following_repo.ok_or_else(|| ServiceError::validation("following_repo is required"))?,
            self.notification_repo.ok_or_else(|| ServiceError::validation("notification_repo is required"))?,
            self.config.ok_or_else(|| ServiceError::validation("config is required"))?,
        ))
    }
}

/// Per-request context handed to converters and query services
#[derive(Clone)]
pub struct RequestContext {
    services: ServiceContext,
    viewer: Option<User>,
    cache: Arc<AccountCache>,
    now: DateTime<Utc>,
}

impl RequestContext {
    /// Start a request with a fresh account cache
    pub fn new(services: ServiceContext, viewer: Option<User>) -> Self {
        let cache = Arc::new(AccountCache::new());
        if let Some(viewer) = &viewer {
            cache.prime(viewer.clone());
        }
        Self {
            services,
            viewer,
            cache,
            now: Utc::now(),
        }
    }

    /// Pin the request clock (poll expiry, field verification stamps)
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn services(&self) -> &ServiceContext {
        &self.services
    }

    pub fn viewer(&self) -> Option<&User> {
        self.viewer.as_ref()
    }

    pub fn viewer_id(&self) -> Option<&NativeId> {
        self.viewer.as_ref().map(|v| &v.id)
    }

    /// The viewer, or `Unauthenticated` for anonymous requests
    pub fn require_viewer(&self) -> ServiceResult<&User> {
        self.viewer.as_ref().ok_or(ServiceError::Unauthenticated)
    }

    pub fn cache(&self) -> &AccountCache {
        &self.cache
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Encode a native id into the configured wire space
    pub fn encode_id(&self, id: &NativeId) -> ForeignId {
        self.services.id_space().encode(id)
    }

    /// Decode a wire id from the configured space
    pub fn decode_id(&self, raw: &str) -> Result<NativeId, DomainError> {
        self.services.id_space().decode(raw)
    }

    /// Resolve a user through the account cache
    pub async fn user(&self, id: &NativeId) -> ServiceResult<User> {
        Ok(self.cache.get_cached(id, self.services.user_repo()).await?)
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("viewer", &self.viewer_id())
            .field("now", &self.now)
            .finish()
    }
}
