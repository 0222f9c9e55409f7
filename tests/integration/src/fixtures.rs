//! Test fixtures and data generators
//!
//! [`MemoryStore`] holds native entities in memory and answers every
//! repository trait the services depend on. It applies the same visibility
//! and range rules a real store would, counts user lookups, and can be told
//! to fail or slow down.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use dashmap::{DashMap, DashSet};
use masto_common::AppConfig;
use masto_core::{
    CustomEmoji, DriveFile, DriveFileRepository, EmojiRepository, Following,
    FollowingRepository, NativeId, Note, NoteFilter, NoteOrigin, NoteReaction, NoteRepository,
    NoteSource, NoteViewerState, Notification, NotificationFilter, NotificationRepository, Poll,
    PollRepository, RangeQuery, ReactionRepository, Relation, RepoResult, UpstreamFailure, User,
    UserProfile, UserRepository, Visibility,
};
use masto_service::{RequestContext, ServiceContext, ServiceContextBuilder};
use serde_json::json;

/// Instance URL used by every fixture
pub const INSTANCE_URL: &str = "https://social.example";

// ============================================================================
// Ids and timestamps
// ============================================================================

/// Note-like id whose string order follows `n`
pub fn nid(n: u32) -> NativeId {
    parse_id(&format!("9k{n:08}"))
}

/// User id whose string order follows `n`
pub fn uid(n: u32) -> NativeId {
    parse_id(&format!("8u{n:08}"))
}

/// Parse a literal test id
pub fn parse_id(raw: &str) -> NativeId {
    NativeId::parse(raw).unwrap_or_else(|e| panic!("bad test id {raw:?}: {e}"))
}

/// Fixed clock for deterministic output
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

// ============================================================================
// Entity builders
// ============================================================================

/// Local user
pub fn local_user(n: u32, username: &str) -> User {
    User {
        created_at: fixed_now(),
        ..User::new(uid(n), username)
    }
}

/// Remote user
pub fn remote_user(n: u32, username: &str, host: &str) -> User {
    User {
        created_at: fixed_now(),
        uri: Some(format!("https://{host}/users/{username}")),
        ..User::remote(uid(n), username, host)
    }
}

/// Public note with text
pub fn note(n: u32, author: &User, text: &str) -> Note {
    Note {
        created_at: fixed_now(),
        user_host: author.host.clone(),
        ..Note::new(nid(n), author.id.clone(), Some(text.to_string()))
    }
}

/// Pure renote of `target`
pub fn renote(n: u32, author: &User, target: &Note) -> Note {
    Note {
        created_at: fixed_now(),
        user_host: author.host.clone(),
        ..Note::new_renote(nid(n), author.id.clone(), target.id.clone())
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// In-memory native entity store
#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<NativeId, User>,
    profiles: DashMap<NativeId, UserProfile>,
    files: DashMap<NativeId, DriveFile>,
    emojis: DashMap<(String, Option<String>), CustomEmoji>,
    notes: DashMap<NativeId, Note>,
    /// Notes only their author may see
    hidden_notes: DashSet<NativeId>,
    pinned: DashMap<NativeId, Vec<NativeId>>,
    reactions: DashMap<NativeId, NoteReaction>,
    polls: DashMap<NativeId, Poll>,
    votes: DashMap<(NativeId, NativeId), Vec<usize>>,
    followings: DashMap<NativeId, Following>,
    relations: DashMap<(NativeId, NativeId), Relation>,
    notifications: DashMap<NativeId, Notification>,
    viewer_states: DashMap<(NativeId, NativeId), NoteViewerState>,

    user_lookups: AtomicUsize,
    page_queries: AtomicUsize,
    user_lookup_delay_ms: AtomicU64,
    fail_page_queries: AtomicBool,
    fail_user_lookups: DashSet<NativeId>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    // ------------------------------------------------------------------------
    // Seeding
    // ------------------------------------------------------------------------

    pub fn add_user(&self, user: User) {
        self.users.insert(user.id.clone(), user);
    }

    pub fn add_profile(&self, profile: UserProfile) {
        if let Some(user_id) = profile.user_id.clone() {
            self.profiles.insert(user_id, profile);
        }
    }

    pub fn add_file(&self, file: DriveFile) {
        self.files.insert(file.id.clone(), file);
    }

    pub fn add_emoji(&self, emoji: CustomEmoji) {
        self.emojis
            .insert((emoji.name.clone(), emoji.host.clone()), emoji);
    }

    pub fn add_note(&self, note: Note) {
        self.notes.insert(note.id.clone(), note);
    }

    pub fn hide_note(&self, id: &NativeId) {
        self.hidden_notes.insert(id.clone());
    }

    pub fn pin(&self, user_id: &NativeId, note_id: &NativeId) {
        self.pinned
            .entry(user_id.clone())
            .or_default()
            .push(note_id.clone());
    }

    pub fn add_reaction(&self, reaction: NoteReaction) {
        self.reactions.insert(reaction.id.clone(), reaction);
    }

    pub fn add_poll(&self, poll: Poll) {
        self.polls.insert(poll.note_id.clone(), poll);
    }

    pub fn add_votes(&self, note_id: &NativeId, user_id: &NativeId, choices: Vec<usize>) {
        self.votes.insert((note_id.clone(), user_id.clone()), choices);
    }

    pub fn follow(&self, id: NativeId, follower: &User, followee: &User) {
        self.followings.insert(
            id.clone(),
            Following {
                created_at: fixed_now(),
                ..Following::new(id, follower.clone(), followee.clone())
            },
        );
    }

    pub fn set_relation(&self, viewer_id: &NativeId, relation: Relation) {
        if let Some(target_id) = relation.target_id.clone() {
            self.relations.insert((viewer_id.clone(), target_id), relation);
        }
    }

    pub fn add_notification(&self, notification: Notification) {
        self.notifications
            .insert(notification.id.clone(), notification);
    }

    pub fn set_viewer_state(&self, note_id: &NativeId, viewer_id: &NativeId, state: NoteViewerState) {
        self.viewer_states
            .insert((note_id.clone(), viewer_id.clone()), state);
    }

    // ------------------------------------------------------------------------
    // Instrumentation
    // ------------------------------------------------------------------------

    /// Calls to `UserRepository::find_by_id` so far
    pub fn user_lookups(&self) -> usize {
        self.user_lookups.load(Ordering::SeqCst)
    }

    /// Range queries answered so far, across every paged table
    pub fn page_queries(&self) -> usize {
        self.page_queries.load(Ordering::SeqCst)
    }

    /// Make user lookups take this long
    pub fn delay_user_lookups(&self, delay: Duration) {
        self.user_lookup_delay_ms
            .store(u64::try_from(delay.as_millis()).unwrap_or(u64::MAX), Ordering::SeqCst);
    }

    /// Make every range query fail
    pub fn fail_page_queries(&self, fail: bool) {
        self.fail_page_queries.store(fail, Ordering::SeqCst);
    }

    /// Make lookups of one user fail
    pub fn fail_user_lookup(&self, id: &NativeId) {
        self.fail_user_lookups.insert(id.clone());
    }

    // ------------------------------------------------------------------------
    // Rules
    // ------------------------------------------------------------------------

    fn begin_page_query(&self) -> RepoResult<()> {
        self.page_queries.fetch_add(1, Ordering::SeqCst);
        if self.fail_page_queries.load(Ordering::SeqCst) {
            return Err(UpstreamFailure::new("store")
                .with_status(503)
                .with_body(json!({ "error": "connection reset" }))
                .into());
        }
        Ok(())
    }

    fn visible(&self, note: &Note, viewer_id: Option<&NativeId>) -> bool {
        !self.hidden_notes.contains(&note.id) || viewer_id == Some(&note.user_id)
    }

    fn follows(&self, follower_id: &NativeId, followee_id: &NativeId) -> bool {
        self.followings
            .iter()
            .any(|row| &row.follower.id == follower_id && &row.followee.id == followee_id)
    }

    fn matches(&self, note: &Note, filter: &NoteFilter) -> bool {
        let from_source = match &filter.source {
            NoteSource::Home { user_id } => {
                &note.user_id == user_id || self.follows(user_id, &note.user_id)
            }
            NoteSource::Public { origin } => {
                note.visibility == Visibility::Public
                    && match origin {
                        NoteOrigin::Any => true,
                        NoteOrigin::Local => note.is_local(),
                        NoteOrigin::Remote => !note.is_local(),
                    }
            }
            NoteSource::Account { user_id } => &note.user_id == user_id,
        };

        from_source
            && self.visible(note, filter.viewer_id.as_ref())
            && (!filter.only_media || !note.file_ids.is_empty())
            && (!filter.exclude_replies || !note.is_reply())
            && (!filter.exclude_reblogs || !note.is_pure_renote())
            && filter
                .tagged
                .as_ref()
                .map_or(true, |tag| note.tags.iter().any(|t| t == tag))
    }
}

// ============================================================================
// Repository implementations
// ============================================================================

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: &NativeId) -> RepoResult<Option<User>> {
        self.user_lookups.fetch_add(1, Ordering::SeqCst);
        let delay = self.user_lookup_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.fail_user_lookups.contains(id) {
            return Err(UpstreamFailure::new("store")
                .with_status(503)
                .with_body(json!({ "error": format!("user {id} unavailable") }))
                .into());
        }
        Ok(self.users.get(id).map(|u| u.clone()))
    }

    async fn find_profile(&self, user_id: &NativeId) -> RepoResult<Option<UserProfile>> {
        Ok(self.profiles.get(user_id).map(|p| p.clone()))
    }
}

#[async_trait]
impl DriveFileRepository for MemoryStore {
    async fn find_by_id(&self, id: &NativeId) -> RepoResult<Option<DriveFile>> {
        Ok(self.files.get(id).map(|f| f.clone()))
    }

    async fn find_by_ids(&self, ids: &[NativeId]) -> RepoResult<Vec<DriveFile>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.files.get(id).map(|f| f.clone()))
            .collect())
    }
}

#[async_trait]
impl EmojiRepository for MemoryStore {
    async fn find_by_names(
        &self,
        names: &[String],
        host: Option<&str>,
    ) -> RepoResult<Vec<CustomEmoji>> {
        let host = host.map(str::to_string);
        Ok(names
            .iter()
            .filter_map(|name| {
                self.emojis
                    .get(&(name.clone(), host.clone()))
                    .map(|e| e.clone())
            })
            .collect())
    }
}

#[async_trait]
impl NoteRepository for MemoryStore {
    async fn find_by_id(&self, id: &NativeId) -> RepoResult<Option<Note>> {
        Ok(self.notes.get(id).map(|n| n.clone()))
    }

    async fn find_page(&self, filter: &NoteFilter, range: &RangeQuery) -> RepoResult<Vec<Note>> {
        self.begin_page_query()?;
        let rows: Vec<Note> = self
            .notes
            .iter()
            .filter(|n| self.matches(n.value(), filter))
            .map(|n| n.clone())
            .collect();
        Ok(range.apply(rows))
    }

    async fn find_pinned(
        &self,
        user_id: &NativeId,
        viewer_id: Option<&NativeId>,
    ) -> RepoResult<Vec<Note>> {
        let ids = self
            .pinned
            .get(user_id)
            .map(|p| p.clone())
            .unwrap_or_default();
        Ok(ids
            .iter()
            .filter_map(|id| self.notes.get(id).map(|n| n.clone()))
            .filter(|n| self.visible(n, viewer_id))
            .collect())
    }

    async fn find_descendants(
        &self,
        note_id: &NativeId,
        viewer_id: Option<&NativeId>,
        depth: usize,
        limit: usize,
    ) -> RepoResult<Vec<Note>> {
        let mut found = Vec::new();
        let mut level = vec![note_id.clone()];
        for _ in 0..depth {
            let children: Vec<Note> = self
                .notes
                .iter()
                .filter(|n| n.reply_id.as_ref().is_some_and(|parent| level.contains(parent)))
                .filter(|n| self.visible(n.value(), viewer_id))
                .map(|n| n.clone())
                .collect();
            level = children.iter().map(|n| n.id.clone()).collect();
            found.extend(children);
        }
        found.sort_by(|a, b| a.id.cmp(&b.id));
        found.truncate(limit);
        Ok(found)
    }

    async fn is_visible_for(&self, note: &Note, viewer_id: Option<&NativeId>) -> RepoResult<bool> {
        Ok(self.visible(note, viewer_id))
    }

    async fn find_renotes_page(
        &self,
        note_id: &NativeId,
        range: &RangeQuery,
    ) -> RepoResult<Vec<Note>> {
        self.begin_page_query()?;
        let rows: Vec<Note> = self
            .notes
            .iter()
            .filter(|n| n.is_pure_renote() && n.renote_id.as_ref() == Some(note_id))
            .map(|n| n.clone())
            .collect();
        Ok(range.apply(rows))
    }

    async fn viewer_state(
        &self,
        note_id: &NativeId,
        viewer_id: &NativeId,
    ) -> RepoResult<NoteViewerState> {
        Ok(self
            .viewer_states
            .get(&(note_id.clone(), viewer_id.clone()))
            .map(|s| s.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl ReactionRepository for MemoryStore {
    async fn find_page_by_note(
        &self,
        note_id: &NativeId,
        range: &RangeQuery,
    ) -> RepoResult<Vec<NoteReaction>> {
        self.begin_page_query()?;
        let rows: Vec<NoteReaction> = self
            .reactions
            .iter()
            .filter(|r| &r.note_id == note_id)
            .map(|r| r.clone())
            .collect();
        Ok(range.apply(rows))
    }
}

#[async_trait]
impl PollRepository for MemoryStore {
    async fn find_by_note(&self, note_id: &NativeId) -> RepoResult<Option<Poll>> {
        Ok(self.polls.get(note_id).map(|p| p.clone()))
    }

    async fn find_votes(&self, note_id: &NativeId, user_id: &NativeId) -> RepoResult<Vec<usize>> {
        Ok(self
            .votes
            .get(&(note_id.clone(), user_id.clone()))
            .map(|v| v.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl FollowingRepository for MemoryStore {
    async fn find_followers_page(
        &self,
        user_id: &NativeId,
        range: &RangeQuery,
    ) -> RepoResult<Vec<Following>> {
        self.begin_page_query()?;
        let rows: Vec<Following> = self
            .followings
            .iter()
            .filter(|f| &f.followee.id == user_id)
            .map(|f| f.clone())
            .collect();
        Ok(range.apply(rows))
    }

    async fn find_following_page(
        &self,
        user_id: &NativeId,
        range: &RangeQuery,
    ) -> RepoResult<Vec<Following>> {
        self.begin_page_query()?;
        let rows: Vec<Following> = self
            .followings
            .iter()
            .filter(|f| &f.follower.id == user_id)
            .map(|f| f.clone())
            .collect();
        Ok(range.apply(rows))
    }

    async fn is_following(
        &self,
        follower_id: &NativeId,
        followee_id: &NativeId,
    ) -> RepoResult<bool> {
        Ok(self.follows(follower_id, followee_id))
    }

    async fn relation(&self, viewer_id: &NativeId, target_id: &NativeId) -> RepoResult<Relation> {
        if let Some(relation) = self.relations.get(&(viewer_id.clone(), target_id.clone())) {
            return Ok(relation.clone());
        }
        Ok(Relation {
            following: self.follows(viewer_id, target_id),
            followed_by: self.follows(target_id, viewer_id),
            ..Relation::none(target_id.clone())
        })
    }
}

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn find_by_id(&self, id: &NativeId) -> RepoResult<Option<Notification>> {
        Ok(self.notifications.get(id).map(|n| n.clone()))
    }

    async fn find_page(
        &self,
        filter: &NotificationFilter,
        range: &RangeQuery,
    ) -> RepoResult<Vec<Notification>> {
        self.begin_page_query()?;
        let rows: Vec<Notification> = self
            .notifications
            .iter()
            .filter(|n| filter.matches(n.value()))
            .map(|n| n.clone())
            .collect();
        Ok(range.apply(rows))
    }
}

// ============================================================================
// Service wiring
// ============================================================================

/// Test configuration for [`INSTANCE_URL`]
pub fn test_config() -> AppConfig {
    AppConfig::for_instance(INSTANCE_URL)
}

/// Service context with every repository backed by `store`
pub fn service_context(store: &Arc<MemoryStore>, config: AppConfig) -> ServiceContext {
    ServiceContextBuilder::new()
        .user_repo(store.clone())
        .drive_file_repo(store.clone())
        .emoji_repo(store.clone())
        .note_repo(store.clone())
        .reaction_repo(store.clone())
        .poll_repo(store.clone())
        .following_repo(store.clone())
        .notification_repo(store.clone())
        .config(Arc::new(config))
        .build()
        .unwrap_or_else(|e| panic!("service context: {e}"))
}

/// A store plus the services wired to it
pub struct TestWorld {
    pub store: Arc<MemoryStore>,
    pub services: ServiceContext,
}

impl TestWorld {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store = MemoryStore::new();
        let services = service_context(&store, config);
        Self { store, services }
    }

    /// Request context with a fixed clock
    pub fn request(&self, viewer: Option<&User>) -> RequestContext {
        RequestContext::new(self.services.clone(), viewer.cloned()).at(fixed_now())
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}
