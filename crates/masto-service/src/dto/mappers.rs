//! Entity to DTO mappers
//!
//! Synchronous conversions that need no store lookups. The converters in
//! `crate::converters` build on these for the nested parts of accounts and
//! statuses.

use chrono::{DateTime, Utc};
use masto_common::InstanceConfig;
use masto_core::entities::{CustomEmoji, DriveFile, Poll as NativePoll, Relation, Visibility};
use masto_core::{ForeignId, IdSpace};

use super::responses::{
    Attachment, AttachmentMeta, AttachmentType, Emoji, MastodonVisibility, Poll, PollOption,
    Relationship, Tag,
};

// ============================================================================
// Emoji Mappers
// ============================================================================

impl From<&CustomEmoji> for Emoji {
    fn from(emoji: &CustomEmoji) -> Self {
        Self {
            shortcode: emoji.name.clone(),
            url: emoji.url.clone(),
            static_url: emoji.url.clone(),
            visible_in_picker: true,
            category: emoji.category.clone(),
        }
    }
}

impl From<CustomEmoji> for Emoji {
    fn from(emoji: CustomEmoji) -> Self {
        Self::from(&emoji)
    }
}

// ============================================================================
// Visibility Mappers
// ============================================================================

impl From<Visibility> for MastodonVisibility {
    fn from(visibility: Visibility) -> Self {
        match visibility {
            Visibility::Public => Self::Public,
            Visibility::Home => Self::Unlisted,
            Visibility::Followers | Visibility::Hidden => Self::Private,
            Visibility::Specified => Self::Direct,
        }
    }
}

// ============================================================================
// Attachment Mappers
// ============================================================================

impl AttachmentType {
    /// Attachment kind from the top-level MIME type
    pub fn from_mime(mime: &str) -> Self {
        match mime.split('/').next().unwrap_or_default() {
            "image" => Self::Image,
            "video" => Self::Video,
            "audio" => Self::Audio,
            _ => Self::Unknown,
        }
    }
}

/// Map a drive file to a media attachment
pub fn attachment(file: &DriveFile, space: IdSpace) -> Attachment {
    let meta = match (file.width, file.height) {
        (Some(width), Some(height)) if width > 0 && height > 0 => Some(AttachmentMeta {
            width,
            height,
            size: format!("{width}x{height}"),
            aspect: f64::from(width) / f64::from(height),
        }),
        _ => None,
    };

    Attachment {
        id: space.encode(&file.id).into_inner(),
        kind: AttachmentType::from_mime(&file.mime),
        url: file.url.clone(),
        remote_url: file.url.clone(),
        preview_url: file.thumbnail_url.clone().unwrap_or_else(|| file.url.clone()),
        text_url: file.url.clone(),
        description: file.comment.clone(),
        blurhash: file.blurhash.clone(),
        meta,
    }
}

// ============================================================================
// Relationship Mappers
// ============================================================================

/// Map viewer relation flags to a Mastodon relationship
pub fn relationship(id: ForeignId, relation: &Relation) -> Relationship {
    Relationship {
        id: id.into_inner(),
        following: relation.following,
        followed_by: relation.followed_by,
        blocking: relation.blocking,
        blocked_by: relation.blocked_by,
        muting: relation.muting,
        muting_notifications: relation.muting,
        requested: relation.requested,
        domain_blocking: false,
        showing_reblogs: !relation.muting_renotes,
        endorsed: false,
        notifying: false,
        note: relation.note.clone().unwrap_or_default(),
    }
}

// ============================================================================
// Poll Mappers
// ============================================================================

/// Map a poll with the viewer's votes
///
/// `id` is the foreign id of the note carrying the poll.
pub fn poll(
    id: ForeignId,
    native: &NativePoll,
    own_votes: Vec<usize>,
    emojis: Vec<Emoji>,
    now: DateTime<Utc>,
) -> Poll {
    let options = native
        .choices
        .iter()
        .enumerate()
        .map(|(i, title)| PollOption {
            title: title.clone(),
            votes_count: native.votes_for(i),
        })
        .collect();

    Poll {
        id: id.into_inner(),
        expires_at: native.expires_at,
        expired: native.is_expired_at(now),
        multiple: native.multiple,
        votes_count: native.total_votes(),
        voters_count: None,
        options,
        voted: !own_votes.is_empty(),
        own_votes,
        emojis,
    }
}

// ============================================================================
// Tag Mappers
// ============================================================================

pub fn tag(name: &str, instance: &InstanceConfig) -> Tag {
    Tag {
        name: name.to_string(),
        url: instance.tag_url(name),
    }
}
