//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request option types parsed from query parameters
//! - Mastodon wire entities for serializing API outputs
//! - Mappers for the parts of those entities that need no lookups

pub mod mappers;
pub mod requests;
pub mod responses;

// Re-export commonly used request types
pub use requests::{AccountStatusOptions, NotificationListOptions, TimelineOptions};

// Re-export commonly used response types
pub use responses::{
    Account, Attachment, AttachmentMeta, AttachmentType, Emoji, Field, MastodonNotificationType,
    MastodonVisibility, Mention, Notification, Poll, PollOption, Reaction, Relationship, Status,
    StatusContext, Tag,
};
