//! User entity - a local or remote account on the federated graph

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::Visibility;
use crate::value_objects::NativeId;

/// User entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: NativeId,
    pub username: String,
    /// `None` for users on this instance
    pub host: Option<String>,
    pub name: Option<String>,
    pub avatar_id: Option<NativeId>,
    pub banner_id: Option<NativeId>,
    pub is_locked: bool,
    pub is_bot: bool,
    pub is_cat: bool,
    pub is_admin: bool,
    pub is_moderator: bool,
    pub followers_count: u64,
    pub following_count: u64,
    pub notes_count: u64,
    /// Custom emoji shortcodes used in the name or bio
    pub emojis: Vec<String>,
    pub uri: Option<String>,
    pub moved_to_uri: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new local User with required fields
    pub fn new(id: NativeId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            host: None,
            name: None,
            avatar_id: None,
            banner_id: None,
            is_locked: false,
            is_bot: false,
            is_cat: false,
            is_admin: false,
            is_moderator: false,
            followers_count: 0,
            following_count: 0,
            notes_count: 0,
            emojis: Vec::new(),
            uri: None,
            moved_to_uri: None,
            created_at: Utc::now(),
        }
    }

    /// Create a remote User
    pub fn remote(id: NativeId, username: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            ..Self::new(id, username)
        }
    }

    #[inline]
    pub fn is_local(&self) -> bool {
        self.host.is_none()
    }

    /// `username` for local users, `username@host` for remote ones
    pub fn acct(&self) -> String {
        match &self.host {
            Some(host) => format!("{}@{}", self.username, host),
            None => self.username.clone(),
        }
    }

    /// Display name, falling back to the username when unset or blank
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.username,
        }
    }

    /// Admins and moderators may bypass instance-level restrictions
    #[inline]
    pub fn is_staff(&self) -> bool {
        self.is_admin || self.is_moderator
    }
}

/// Who may see a user's follower and following lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FfVisibility {
    #[default]
    Public,
    Followers,
    Private,
}

/// Profile key/value field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub verified: bool,
}

/// Extended profile data stored apart from the user row
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserProfile {
    pub user_id: Option<NativeId>,
    /// Bio in markup source form
    pub description: Option<String>,
    pub fields: Vec<ProfileField>,
    pub ff_visibility: FfVisibility,
    pub default_visibility: Option<Visibility>,
}

impl UserProfile {
    pub fn for_user(user_id: NativeId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }
}
