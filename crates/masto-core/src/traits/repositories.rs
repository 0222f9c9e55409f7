//! Repository traits (ports) - define the interface for data access
//!
//! The store applies visibility, mute and block rules relative to the viewer
//! passed in each query. Range queries are expressed with [`RangeQuery`] and
//! return rows ordered by cursor id.

use async_trait::async_trait;

use crate::entities::{
    CustomEmoji, DriveFile, Following, Note, NoteReaction, NoteViewerState, Notification,
    NotificationType, Poll, Relation, User, UserProfile,
};
use crate::error::DomainError;
use crate::value_objects::NativeId;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Range queries
// ============================================================================

/// Rows that can be paged by id
pub trait Paginated {
    fn cursor_id(&self) -> &NativeId;
}

impl Paginated for Note {
    fn cursor_id(&self) -> &NativeId {
        &self.id
    }
}

impl Paginated for Notification {
    fn cursor_id(&self) -> &NativeId {
        &self.id
    }
}

impl Paginated for Following {
    fn cursor_id(&self) -> &NativeId {
        &self.id
    }
}

impl Paginated for NoteReaction {
    fn cursor_id(&self) -> &NativeId {
        &self.id
    }
}

/// Cursor-bounded slice of a table
///
/// Bounds are exclusive. Rows are ordered newest-first unless `ascending`.
/// Ids compare the way [`NativeId`]'s `Ord` does: shorter ids first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeQuery {
    /// Only rows with `id < max_id`
    pub max_id: Option<NativeId>,
    /// Only rows with `id > min_id`
    pub min_id: Option<NativeId>,
    pub ascending: bool,
    pub take: usize,
    pub skip: usize,
}

impl RangeQuery {
    pub fn new(take: usize) -> Self {
        Self {
            max_id: None,
            min_id: None,
            ascending: false,
            take,
            skip: 0,
        }
    }

    /// Whether an id falls inside the bounds
    pub fn contains(&self, id: &NativeId) -> bool {
        self.max_id.as_ref().map_or(true, |max| id < max)
            && self.min_id.as_ref().map_or(true, |min| id > min)
    }

    /// Apply bounds, ordering, skip and take to an in-memory row set
    pub fn apply<T, I>(&self, rows: I) -> Vec<T>
    where
        T: Paginated,
        I: IntoIterator<Item = T>,
    {
        let mut rows: Vec<T> = rows
            .into_iter()
            .filter(|row| self.contains(row.cursor_id()))
            .collect();
        if self.ascending {
            rows.sort_by(|a, b| a.cursor_id().cmp(b.cursor_id()));
        } else {
            rows.sort_by(|a, b| b.cursor_id().cmp(a.cursor_id()));
        }
        rows.into_iter().skip(self.skip).take(self.take).collect()
    }
}

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: &NativeId) -> RepoResult<Option<User>>;

    /// Find the extended profile of a user
    async fn find_profile(&self, user_id: &NativeId) -> RepoResult<Option<UserProfile>>;
}

// ============================================================================
// Drive File Repository
// ============================================================================

#[async_trait]
pub trait DriveFileRepository: Send + Sync {
    /// Find file by ID
    async fn find_by_id(&self, id: &NativeId) -> RepoResult<Option<DriveFile>>;

    /// Find files by ID, in the order given; missing ids are skipped
    async fn find_by_ids(&self, ids: &[NativeId]) -> RepoResult<Vec<DriveFile>>;
}

// ============================================================================
// Emoji Repository
// ============================================================================

#[async_trait]
pub trait EmojiRepository: Send + Sync {
    /// Find custom emoji by shortcode on a host (`None` = this instance)
    async fn find_by_names(&self, names: &[String], host: Option<&str>)
        -> RepoResult<Vec<CustomEmoji>>;
}

// ============================================================================
// Note Repository
// ============================================================================

/// Where the notes of a timeline come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteSource {
    /// The viewer's own notes and those of users they follow
    Home { user_id: NativeId },
    /// All public notes
    Public { origin: NoteOrigin },
    /// Notes written by one user
    Account { user_id: NativeId },
}

/// Restrict notes by the author's instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoteOrigin {
    #[default]
    Any,
    Local,
    Remote,
}

/// Note timeline query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteFilter {
    pub source: NoteSource,
    /// Viewer whose visibility, mute and block rules apply
    pub viewer_id: Option<NativeId>,
    pub only_media: bool,
    pub exclude_replies: bool,
    pub exclude_reblogs: bool,
    pub tagged: Option<String>,
}

impl NoteFilter {
    pub fn new(source: NoteSource, viewer_id: Option<NativeId>) -> Self {
        Self {
            source,
            viewer_id,
            only_media: false,
            exclude_replies: false,
            exclude_reblogs: false,
            tagged: None,
        }
    }
}

#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Find note by ID (no visibility check)
    async fn find_by_id(&self, id: &NativeId) -> RepoResult<Option<Note>>;

    /// Page through a timeline
    async fn find_page(&self, filter: &NoteFilter, range: &RangeQuery) -> RepoResult<Vec<Note>>;

    /// Notes a user has pinned to their profile, visible to the viewer
    async fn find_pinned(
        &self,
        user_id: &NativeId,
        viewer_id: Option<&NativeId>,
    ) -> RepoResult<Vec<Note>>;

    /// Replies below a note up to `depth` levels, oldest first
    async fn find_descendants(
        &self,
        note_id: &NativeId,
        viewer_id: Option<&NativeId>,
        depth: usize,
        limit: usize,
    ) -> RepoResult<Vec<Note>>;

    /// Whether the viewer may see a note
    async fn is_visible_for(&self, note: &Note, viewer_id: Option<&NativeId>) -> RepoResult<bool>;

    /// Pure renotes of a note
    async fn find_renotes_page(&self, note_id: &NativeId, range: &RangeQuery)
        -> RepoResult<Vec<Note>>;

    /// Viewer-relative flags (own reaction, renoted, bookmarked, pinned, muted)
    async fn viewer_state(&self, note_id: &NativeId, viewer_id: &NativeId)
        -> RepoResult<NoteViewerState>;
}

// ============================================================================
// Reaction Repository
// ============================================================================

#[async_trait]
pub trait ReactionRepository: Send + Sync {
    /// Page through the reactions on a note
    async fn find_page_by_note(
        &self,
        note_id: &NativeId,
        range: &RangeQuery,
    ) -> RepoResult<Vec<NoteReaction>>;
}

// ============================================================================
// Poll Repository
// ============================================================================

#[async_trait]
pub trait PollRepository: Send + Sync {
    /// Find the poll attached to a note
    async fn find_by_note(&self, note_id: &NativeId) -> RepoResult<Option<Poll>>;

    /// Choice indices a user voted for
    async fn find_votes(&self, note_id: &NativeId, user_id: &NativeId) -> RepoResult<Vec<usize>>;
}

// ============================================================================
// Following Repository
// ============================================================================

#[async_trait]
pub trait FollowingRepository: Send + Sync {
    /// Follow rows where `user_id` is the followee
    async fn find_followers_page(
        &self,
        user_id: &NativeId,
        range: &RangeQuery,
    ) -> RepoResult<Vec<Following>>;

    /// Follow rows where `user_id` is the follower
    async fn find_following_page(
        &self,
        user_id: &NativeId,
        range: &RangeQuery,
    ) -> RepoResult<Vec<Following>>;

    /// Check if `follower_id` follows `followee_id`
    async fn is_following(&self, follower_id: &NativeId, followee_id: &NativeId)
        -> RepoResult<bool>;

    /// Relation flags from the viewer towards a target
    async fn relation(&self, viewer_id: &NativeId, target_id: &NativeId) -> RepoResult<Relation>;
}

// ============================================================================
// Notification Repository
// ============================================================================

/// Notification list query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationFilter {
    pub notifiee_id: NativeId,
    /// Empty means every kind
    pub include_kinds: Vec<NotificationType>,
    pub exclude_kinds: Vec<NotificationType>,
    pub notifier_id: Option<NativeId>,
}

impl NotificationFilter {
    pub fn for_user(notifiee_id: NativeId) -> Self {
        Self {
            notifiee_id,
            include_kinds: Vec::new(),
            exclude_kinds: Vec::new(),
            notifier_id: None,
        }
    }

    /// Whether a notification passes the kind and notifier filters
    pub fn matches(&self, notification: &Notification) -> bool {
        notification.notifiee_id == self.notifiee_id
            && (self.include_kinds.is_empty() || self.include_kinds.contains(&notification.kind))
            && !self.exclude_kinds.contains(&notification.kind)
            && self
                .notifier_id
                .as_ref()
                .map_or(true, |id| notification.notifier_id.as_ref() == Some(id))
    }
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Find notification by ID
    async fn find_by_id(&self, id: &NativeId) -> RepoResult<Option<Notification>>;

    /// Page through a user's notifications
    async fn find_page(
        &self,
        filter: &NotificationFilter,
        range: &RangeQuery,
    ) -> RepoResult<Vec<Notification>>;
}
