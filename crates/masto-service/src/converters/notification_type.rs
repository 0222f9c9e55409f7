//! Native notification kinds to Mastodon notification types and back

use masto_core::{DomainError, NotificationType};

use crate::dto::MastodonNotificationType;

/// Mastodon type for a native kind
///
/// Kinds Mastodon has no equivalent for fail with
/// `UnsupportedNotificationType`; list callers skip them.
pub fn to_mastodon(kind: NotificationType) -> Result<MastodonNotificationType, DomainError> {
    match kind {
        NotificationType::Follow => Ok(MastodonNotificationType::Follow),
        NotificationType::Mention | NotificationType::Reply => Ok(MastodonNotificationType::Mention),
        NotificationType::Renote | NotificationType::Quote => Ok(MastodonNotificationType::Reblog),
        NotificationType::Reaction => Ok(MastodonNotificationType::Favourite),
        NotificationType::PollEnded => Ok(MastodonNotificationType::Poll),
        NotificationType::ReceiveFollowRequest => Ok(MastodonNotificationType::FollowRequest),
        NotificationType::FollowRequestAccepted
        | NotificationType::PollVote
        | NotificationType::GroupInvited
        | NotificationType::App => Err(DomainError::UnsupportedNotificationType(kind)),
    }
}

/// Whether a native kind can be shown to Mastodon clients
pub fn is_supported(kind: NotificationType) -> bool {
    to_mastodon(kind).is_ok()
}

/// Native kinds that map onto a Mastodon type
pub fn native_kinds(kind: MastodonNotificationType) -> Vec<NotificationType> {
    NotificationType::ALL
        .into_iter()
        .filter(|native| to_mastodon(*native).is_ok_and(|mapped| mapped == kind))
        .collect()
}

/// Native kinds for a list of Mastodon types, without duplicates
pub fn native_kinds_for(kinds: &[MastodonNotificationType]) -> Vec<NotificationType> {
    let mut out: Vec<NotificationType> = Vec::new();
    for native in kinds.iter().flat_map(|kind| native_kinds(*kind)) {
        if !out.contains(&native) {
            out.push(native);
        }
    }
    out
}
