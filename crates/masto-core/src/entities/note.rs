//! Note entity - a post, reply, quote, or renote

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::NativeId;

/// Audience of a note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Home,
    Followers,
    Specified,
    Hidden,
}

/// Mentioned user as recorded on the note at creation time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteMention {
    pub user_id: NativeId,
    pub username: String,
    pub host: Option<String>,
    pub uri: Option<String>,
    pub url: Option<String>,
}

/// Note entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: NativeId,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub user_id: NativeId,
    /// Author's host, `None` for local notes
    pub user_host: Option<String>,
    /// Body in markup source form
    pub text: Option<String>,
    /// Content warning
    pub cw: Option<String>,
    pub visibility: Visibility,
    pub reply_id: Option<NativeId>,
    pub renote_id: Option<NativeId>,
    pub file_ids: Vec<NativeId>,
    pub mentions: Vec<NoteMention>,
    pub emojis: Vec<String>,
    pub tags: Vec<String>,
    pub has_poll: bool,
    /// Reaction string to count
    pub reactions: BTreeMap<String, u64>,
    pub renote_count: u64,
    pub replies_count: u64,
    pub uri: Option<String>,
    pub url: Option<String>,
}

impl Note {
    /// Create a new local public Note
    pub fn new(id: NativeId, user_id: NativeId, text: Option<String>) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            updated_at: None,
            user_id,
            user_host: None,
            text,
            cw: None,
            visibility: Visibility::Public,
            reply_id: None,
            renote_id: None,
            file_ids: Vec::new(),
            mentions: Vec::new(),
            emojis: Vec::new(),
            tags: Vec::new(),
            has_poll: false,
            reactions: BTreeMap::new(),
            renote_count: 0,
            replies_count: 0,
            uri: None,
            url: None,
        }
    }

    /// Create a renote with no text of its own
    pub fn new_renote(id: NativeId, user_id: NativeId, renote_id: NativeId) -> Self {
        Self {
            renote_id: Some(renote_id),
            ..Self::new(id, user_id, None)
        }
    }

    /// Renote without text: a boost rather than a quote
    #[inline]
    pub fn is_pure_renote(&self) -> bool {
        self.renote_id.is_some() && self.text.is_none()
    }

    /// Renote carrying its own text
    #[inline]
    pub fn is_quote(&self) -> bool {
        self.renote_id.is_some() && self.text.is_some()
    }

    #[inline]
    pub fn is_reply(&self) -> bool {
        self.reply_id.is_some()
    }

    #[inline]
    pub fn is_local(&self) -> bool {
        self.user_host.is_none()
    }

    /// Sum of all reaction counts
    pub fn reaction_total(&self) -> u64 {
        self.reactions.values().sum()
    }
}

/// Viewer-relative flags for one note
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NoteViewerState {
    /// The viewer's own reaction, if any
    pub reaction: Option<String>,
    pub reblogged: bool,
    pub bookmarked: bool,
    pub pinned: bool,
    pub thread_muted: bool,
}
