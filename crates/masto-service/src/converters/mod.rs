//! Entity converters
//!
//! Build Mastodon wire entities from native entities. Each converter borrows
//! the [`RequestContext`], resolves its nested lookups concurrently, and only
//! returns fully assembled objects. Lookups of optional parts degrade to a
//! default; only a missing required entity fails the conversion.

pub mod account;
pub mod markup;
pub mod notification;
pub mod notification_type;
pub mod status;

pub use account::AccountConverter;
pub use markup::{MarkupError, MarkupRenderer};
pub use notification::NotificationConverter;
pub use status::StatusConverter;

use std::collections::BTreeMap;

use futures::future::join_all;
use masto_core::{DomainError, NativeId, Note};
use tracing::{debug, warn};

use crate::dto::Emoji;
use crate::services::context::RequestContext;
use crate::services::error::{ServiceError, ServiceResult};

/// Load a note referenced by another one (boost or quote target)
///
/// Fails with `EntityResolution` when the note is missing or hidden from the
/// viewer, so an embed never shows more than the viewer could fetch directly.
pub(crate) async fn referenced_note(ctx: &RequestContext, id: &NativeId) -> ServiceResult<Note> {
    let notes = ctx.services().note_repo();
    let note = notes.find_by_id(id).await?.ok_or_else(|| DomainError::EntityResolution {
        entity: "note",
        id: id.clone(),
        reason: "referenced note not found".to_string(),
    })?;
    if !notes.is_visible_for(&note, ctx.viewer_id()).await? {
        debug!(note_id = %id, "Referenced note hidden from viewer");
        return Err(DomainError::EntityResolution {
            entity: "note",
            id: id.clone(),
            reason: "referenced note not visible".to_string(),
        }
        .into());
    }
    Ok(note)
}

/// Resolve custom emoji shortcodes on one host (`None` = this instance)
///
/// Lookup failures degrade to no emojis.
pub(crate) async fn resolve_emojis(
    ctx: &RequestContext,
    names: &[String],
    host: Option<&str>,
) -> Vec<Emoji> {
    if names.is_empty() {
        return Vec::new();
    }
    match ctx.services().emoji_repo().find_by_names(names, host).await {
        Ok(emojis) => emojis.iter().map(Emoji::from).collect(),
        Err(e) => {
            warn!(error = %e, host = ?host, "Emoji lookup failed");
            Vec::new()
        }
    }
}

/// Resolve the custom emojis used as reactions, keyed by reaction string
///
/// Reactions look like `:name:`, `:name@.:` (local) or `:name@host:`.
pub(crate) async fn resolve_reaction_emojis<'r, I>(
    ctx: &RequestContext,
    reactions: I,
) -> BTreeMap<String, Emoji>
where
    I: IntoIterator<Item = &'r String>,
{
    let mut by_host: BTreeMap<Option<String>, Vec<(String, String)>> = BTreeMap::new();
    for reaction in reactions {
        let Some(name) = masto_core::entities::custom_emoji_name(reaction) else {
            continue;
        };
        let host = reaction
            .trim_matches(':')
            .split_once('@')
            .map(|(_, host)| host)
            .filter(|host| *host != "." && !host.is_empty())
            .map(str::to_string);
        by_host
            .entry(host)
            .or_default()
            .push((name.to_string(), reaction.clone()));
    }

    let lookups = by_host.into_iter().map(|(host, wanted)| async move {
        let names: Vec<String> = wanted.iter().map(|(name, _)| name.clone()).collect();
        let found = resolve_emojis(ctx, &names, host.as_deref()).await;
        wanted
            .into_iter()
            .filter_map(|(name, reaction)| {
                found
                    .iter()
                    .find(|emoji| emoji.shortcode == name)
                    .map(|emoji| (reaction, emoji.clone()))
            })
            .collect::<Vec<_>>()
    });

    join_all(lookups).await.into_iter().flatten().collect()
}

/// Keep converted entities in input order, logging and dropping failures
pub(crate) fn keep_converted<T>(results: Vec<Result<T, ServiceError>>, entity: &str) -> Vec<T> {
    results
        .into_iter()
        .filter_map(|result| match result {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(error = %e, entity = entity, "Dropping entity that failed to convert");
                None
            }
        })
        .collect()
}
