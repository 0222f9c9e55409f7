//! Response DTOs for API endpoints
//!
//! Field names and shapes follow the Mastodon REST API entities. All ids are
//! foreign ids in the configured id space, serialized as strings.

use chrono::{DateTime, Utc};
use serde::Serialize;

// ============================================================================
// Account Responses
// ============================================================================

/// Mastodon `Account`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    pub id: String,
    pub username: String,
    /// `username` for local users, `username@host` for remote ones
    pub acct: String,
    pub display_name: String,
    pub locked: bool,
    pub bot: bool,
    pub group: bool,
    pub created_at: DateTime<Utc>,
    /// Rendered profile bio (HTML)
    pub note: String,
    pub url: String,
    pub avatar: String,
    pub avatar_static: String,
    pub header: String,
    pub header_static: String,
    pub followers_count: u64,
    pub following_count: u64,
    pub statuses_count: u64,
    pub emojis: Vec<Emoji>,
    pub fields: Vec<Field>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moved: Option<String>,
}

/// Profile metadata field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    pub value: String,
    pub verified_at: Option<DateTime<Utc>>,
}

/// Custom emoji
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Emoji {
    pub shortcode: String,
    pub url: String,
    pub static_url: String,
    pub visible_in_picker: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Relationship between the viewer and another account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relationship {
    pub id: String,
    pub following: bool,
    pub followed_by: bool,
    pub blocking: bool,
    pub blocked_by: bool,
    pub muting: bool,
    pub muting_notifications: bool,
    pub requested: bool,
    pub domain_blocking: bool,
    pub showing_reblogs: bool,
    pub endorsed: bool,
    pub notifying: bool,
    pub note: String,
}

// ============================================================================
// Status Responses
// ============================================================================

/// Status visibility on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MastodonVisibility {
    Public,
    Unlisted,
    Private,
    Direct,
}

/// Mastodon `Status`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Status {
    pub id: String,
    pub uri: String,
    pub url: String,
    pub account: Account,
    pub in_reply_to_id: Option<String>,
    pub in_reply_to_account_id: Option<String>,
    /// Renoted status, for pure renotes
    pub reblog: Option<Box<Status>>,
    /// Quoted status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<Box<Status>>,
    pub content: String,
    /// Source text
    pub text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
    pub emojis: Vec<Emoji>,
    pub replies_count: u64,
    pub reblogs_count: u64,
    pub favourites_count: u64,
    pub reblogged: bool,
    pub favourited: bool,
    pub muted: bool,
    pub sensitive: bool,
    pub spoiler_text: String,
    pub visibility: MastodonVisibility,
    pub media_attachments: Vec<Attachment>,
    pub mentions: Vec<Mention>,
    pub tags: Vec<Tag>,
    pub poll: Option<Poll>,
    pub pinned: bool,
    pub bookmarked: bool,
    pub emoji_reactions: Vec<Reaction>,
}

/// Media attachment kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentType {
    Image,
    Video,
    Audio,
    Unknown,
}

/// Media attachment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attachment {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AttachmentType,
    pub url: String,
    pub remote_url: String,
    pub preview_url: String,
    pub text_url: String,
    pub description: Option<String>,
    pub blurhash: Option<String>,
    pub meta: Option<AttachmentMeta>,
}

/// Attachment dimensions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttachmentMeta {
    pub width: u32,
    pub height: u32,
    pub size: String,
    pub aspect: f64,
}

/// Mentioned account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mention {
    pub id: String,
    pub username: String,
    pub url: String,
    pub acct: String,
}

/// Hashtag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub name: String,
    pub url: String,
}

/// Poll attached to a status
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Poll {
    pub id: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub expired: bool,
    pub multiple: bool,
    pub votes_count: u64,
    pub voters_count: Option<u64>,
    pub options: Vec<PollOption>,
    pub voted: bool,
    pub own_votes: Vec<usize>,
    pub emojis: Vec<Emoji>,
}

/// Poll choice with its tally
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollOption {
    pub title: String,
    pub votes_count: u64,
}

/// Emoji reaction tally on a status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reaction {
    pub name: String,
    pub count: u64,
    pub me: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_url: Option<String>,
}

/// Thread around a status
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusContext {
    pub ancestors: Vec<Status>,
    pub descendants: Vec<Status>,
}

// ============================================================================
// Notification Responses
// ============================================================================

/// Notification kinds known to Mastodon clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MastodonNotificationType {
    Mention,
    Status,
    Reblog,
    Follow,
    FollowRequest,
    Favourite,
    Poll,
    Update,
}

impl MastodonNotificationType {
    pub const ALL: [MastodonNotificationType; 8] = [
        Self::Mention,
        Self::Status,
        Self::Reblog,
        Self::Follow,
        Self::FollowRequest,
        Self::Favourite,
        Self::Poll,
        Self::Update,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mention => "mention",
            Self::Status => "status",
            Self::Reblog => "reblog",
            Self::Follow => "follow",
            Self::FollowRequest => "follow_request",
            Self::Favourite => "favourite",
            Self::Poll => "poll",
            Self::Update => "update",
        }
    }

    /// Parse a wire name; unknown names yield `None`
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == raw)
    }
}

/// Mastodon `Notification`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MastodonNotificationType,
    pub created_at: DateTime<Utc>,
    pub account: Account,
    pub status: Option<Status>,
    /// Reaction that triggered a `favourite`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}
