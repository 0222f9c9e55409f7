//! Social graph edges - follow rows and viewer relations

use chrono::{DateTime, Utc};

use crate::entities::User;
use crate::value_objects::NativeId;

/// Follow row, loaded with both ends
///
/// The row id is the pagination cursor for follower and following lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Following {
    pub id: NativeId,
    pub created_at: DateTime<Utc>,
    pub follower: User,
    pub followee: User,
}

impl Following {
    pub fn new(id: NativeId, follower: User, followee: User) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            follower,
            followee,
        }
    }
}

/// Relation between a viewer and a target user
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Relation {
    pub target_id: Option<NativeId>,
    pub following: bool,
    pub followed_by: bool,
    pub requested: bool,
    pub blocking: bool,
    pub blocked_by: bool,
    pub muting: bool,
    pub muting_renotes: bool,
    /// Private note the viewer keeps about the target
    pub note: Option<String>,
}

impl Relation {
    pub fn none(target_id: NativeId) -> Self {
        Self {
            target_id: Some(target_id),
            ..Self::default()
        }
    }
}
