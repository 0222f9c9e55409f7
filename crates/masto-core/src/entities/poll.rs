//! Poll entity - attached to a note with `has_poll`

use chrono::{DateTime, Utc};

use crate::value_objects::NativeId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poll {
    pub note_id: NativeId,
    pub choices: Vec<String>,
    /// Vote count per choice, same order as `choices`
    pub votes: Vec<u64>,
    pub multiple: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Poll {
    pub fn new(note_id: NativeId, choices: Vec<String>) -> Self {
        let votes = vec![0; choices.len()];
        Self {
            note_id,
            choices,
            votes,
            multiple: false,
            expires_at: None,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    pub fn total_votes(&self) -> u64 {
        self.votes.iter().sum()
    }

    /// Vote count for a choice, zero when the counts are shorter than the choices
    pub fn votes_for(&self, choice: usize) -> u64 {
        self.votes.get(choice).copied().unwrap_or(0)
    }
}
