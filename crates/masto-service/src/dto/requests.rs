//! Request DTOs for list endpoints
//!
//! Filter options parsed from the raw query parameters, next to the
//! pagination window built from the same parameters.

use masto_core::{DomainError, IdSpace, NativeId};

use super::responses::MastodonNotificationType;
use crate::services::pagination::QueryParams;

// ============================================================================
// Timeline Requests
// ============================================================================

/// Public timeline filters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimelineOptions {
    pub local: bool,
    pub remote: bool,
    pub only_media: bool,
}

impl TimelineOptions {
    pub fn from_query(params: &QueryParams) -> Self {
        Self {
            local: params.get_bool("local"),
            remote: params.get_bool("remote"),
            only_media: params.get_bool("only_media"),
        }
    }
}

// ============================================================================
// Account Requests
// ============================================================================

/// Account statuses filters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountStatusOptions {
    pub only_media: bool,
    pub exclude_replies: bool,
    pub exclude_reblogs: bool,
    pub pinned: bool,
    pub tagged: Option<String>,
}

impl AccountStatusOptions {
    pub fn from_query(params: &QueryParams) -> Self {
        Self {
            only_media: params.get_bool("only_media"),
            exclude_replies: params.get_bool("exclude_replies"),
            exclude_reblogs: params.get_bool("exclude_reblogs"),
            pinned: params.get_bool("pinned"),
            tagged: params.get_non_empty("tagged").map(str::to_string),
        }
    }
}

// ============================================================================
// Notification Requests
// ============================================================================

/// Notification list filters
///
/// Unknown type names are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationListOptions {
    pub types: Vec<MastodonNotificationType>,
    pub exclude_types: Vec<MastodonNotificationType>,
    pub account_id: Option<NativeId>,
}

impl NotificationListOptions {
    pub fn from_query(params: &QueryParams, space: IdSpace) -> Result<Self, DomainError> {
        let parse = |key: &str| {
            params
                .get_all(key)
                .into_iter()
                .filter_map(MastodonNotificationType::parse)
                .collect()
        };

        Ok(Self {
            types: parse("types"),
            exclude_types: parse("exclude_types"),
            account_id: params.get_id("account_id", space)?,
        })
    }
}
