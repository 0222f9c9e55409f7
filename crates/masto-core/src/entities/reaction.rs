//! Note reaction entity - one user's emoji reaction on a note

use chrono::{DateTime, Utc};

use crate::entities::User;
use crate::value_objects::NativeId;

/// Reaction row, loaded with the reacting user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteReaction {
    pub id: NativeId,
    pub created_at: DateTime<Utc>,
    pub note_id: NativeId,
    pub user: User,
    /// Unicode emoji or `:shortcode@host:`
    pub reaction: String,
}

impl NoteReaction {
    pub fn new(id: NativeId, note_id: NativeId, user: User, reaction: impl Into<String>) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            note_id,
            user,
            reaction: reaction.into(),
        }
    }

    /// Custom emoji shortcode when the reaction is `:name:` or `:name@host:`
    pub fn custom_emoji_name(&self) -> Option<&str> {
        custom_emoji_name(&self.reaction)
    }
}

/// Extract the shortcode from a `:name:` / `:name@host:` reaction string
pub fn custom_emoji_name(reaction: &str) -> Option<&str> {
    let inner = reaction.strip_prefix(':')?.strip_suffix(':')?;
    let name = inner.split('@').next()?;
    (!name.is_empty()).then_some(name)
}
