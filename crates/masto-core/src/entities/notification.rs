//! Notification entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entities::Note;
use crate::value_objects::NativeId;

/// Native notification kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationType {
    Follow,
    Mention,
    Reply,
    Renote,
    Quote,
    Reaction,
    PollVote,
    PollEnded,
    ReceiveFollowRequest,
    FollowRequestAccepted,
    GroupInvited,
    App,
}

impl NotificationType {
    pub const ALL: [NotificationType; 12] = [
        Self::Follow,
        Self::Mention,
        Self::Reply,
        Self::Renote,
        Self::Quote,
        Self::Reaction,
        Self::PollVote,
        Self::PollEnded,
        Self::ReceiveFollowRequest,
        Self::FollowRequestAccepted,
        Self::GroupInvited,
        Self::App,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Follow => "follow",
            Self::Mention => "mention",
            Self::Reply => "reply",
            Self::Renote => "renote",
            Self::Quote => "quote",
            Self::Reaction => "reaction",
            Self::PollVote => "pollVote",
            Self::PollEnded => "pollEnded",
            Self::ReceiveFollowRequest => "receiveFollowRequest",
            Self::FollowRequestAccepted => "followRequestAccepted",
            Self::GroupInvited => "groupInvited",
            Self::App => "app",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notification entity
///
/// The related note, when any, is loaded together with the notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NativeId,
    pub created_at: DateTime<Utc>,
    pub notifiee_id: NativeId,
    pub notifier_id: Option<NativeId>,
    pub kind: NotificationType,
    pub note: Option<Note>,
    pub reaction: Option<String>,
    pub is_read: bool,
}

impl Notification {
    pub fn new(id: NativeId, notifiee_id: NativeId, kind: NotificationType) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            notifiee_id,
            notifier_id: None,
            kind,
            note: None,
            reaction: None,
            is_read: false,
        }
    }

    pub fn from_user(mut self, notifier_id: NativeId) -> Self {
        self.notifier_id = Some(notifier_id);
        self
    }

    pub fn with_note(mut self, note: Note) -> Self {
        self.note = Some(note);
        self
    }
}
