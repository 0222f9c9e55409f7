//! Note to Mastodon status conversion
//!
//! Every nested part of a status (author, media, mentions, emojis, poll,
//! reply parent, viewer state, quoted note) is looked up concurrently. Pure
//! renotes become a wrapper status whose `reblog` holds the boosted note and
//! whose content mirrors it.

use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use masto_core::{
    DomainError, DriveFile, NativeId, Note, NoteMention, NoteViewerState, Poll as NativePoll,
};
use tracing::{debug, instrument, warn};

use super::account::AccountConverter;
use super::markup::MarkupRenderer;
use super::{keep_converted, referenced_note, resolve_emojis, resolve_reaction_emojis};
use crate::dto::mappers;
use crate::dto::{Mention, Reaction, Status};
use crate::services::context::RequestContext;
use crate::services::error::ServiceResult;

/// How many renote or quote levels are expanded below a status
const MAX_EMBED_DEPTH: usize = 2;

/// Status converter
#[derive(Clone, Copy)]
pub struct StatusConverter<'a> {
    ctx: &'a RequestContext,
    accounts: AccountConverter<'a>,
}

impl<'a> StatusConverter<'a> {
    pub fn new(ctx: &'a RequestContext) -> Self {
        Self {
            ctx,
            accounts: AccountConverter::new(ctx),
        }
    }

    /// Convert one note
    pub async fn encode(&self, note: &Note) -> ServiceResult<Status> {
        self.encode_at_depth(note.clone(), 0).await
    }

    /// Convert notes concurrently, keeping input order
    ///
    /// Notes that fail to convert are dropped.
    pub async fn encode_many(&self, notes: &[Note]) -> Vec<Status> {
        let results = join_all(notes.iter().map(|note| self.encode(note))).await;
        keep_converted(results, "status")
    }

    fn encode_at_depth(&self, note: Note, depth: usize) -> BoxFuture<'_, ServiceResult<Status>> {
        async move {
            if note.is_pure_renote() {
                self.encode_renote(note, depth).await
            } else {
                self.encode_note(note, depth).await
            }
        }
        .boxed()
    }

    #[instrument(skip(self, note), fields(note_id = %note.id))]
    async fn encode_renote(&self, note: Note, depth: usize) -> ServiceResult<Status> {
        let target_id = note
            .renote_id
            .clone()
            .ok_or_else(|| resolution_error(&note.id, "renote without target"))?;
        if depth >= MAX_EMBED_DEPTH {
            return Err(resolution_error(&target_id, "renote chain too deep").into());
        }

        let (account, target) = futures::join!(
            self.accounts.encode_by_id(&note.user_id),
            referenced_note(self.ctx, &target_id),
        );
        let account = account?;
        let target = target?;
        let inner = self.encode_at_depth(target, depth + 1).await?;

        let (uri, url) = self.links(&note);
        Ok(Status {
            id: self.ctx.encode_id(&note.id).into_inner(),
            uri,
            url,
            account,
            in_reply_to_id: None,
            in_reply_to_account_id: None,
            reblog: Some(Box::new(inner.clone())),
            quote: None,
            created_at: note.created_at,
            edited_at: None,
            visibility: note.visibility.into(),
            pinned: false,
            ..inner
        })
    }

    #[instrument(skip(self, note), fields(note_id = %note.id))]
    async fn encode_note(&self, note: Note, depth: usize) -> ServiceResult<Status> {
        let host = note.user_host.as_deref();

        let (account, files, mentions, emojis, reaction_emojis, poll, reply_account, state, quote) = futures::join!(
            self.accounts.encode_by_id(&note.user_id),
            self.files(&note.file_ids),
            self.mentions(&note.mentions),
            resolve_emojis(self.ctx, &note.emojis, host),
            resolve_reaction_emojis(self.ctx, note.reactions.keys()),
            self.poll(&note),
            self.reply_account(note.reply_id.as_ref()),
            self.viewer_state(&note.id),
            self.quote(&note, depth),
        );
        let account = account?;
        let poll = poll.map(|(poll, own_votes)| {
            mappers::poll(self.ctx.encode_id(&note.id), &poll, own_votes, emojis.clone(), self.ctx.now())
        });

        let instance = self.ctx.services().instance();
        let renderer = MarkupRenderer::new(instance);
        let (uri, url) = self.links(&note);

        let emoji_reactions = note
            .reactions
            .iter()
            .map(|(name, count)| {
                let emoji = reaction_emojis.get(name);
                Reaction {
                    name: name.clone(),
                    count: *count,
                    me: state.reaction.as_deref() == Some(name.as_str()),
                    url: emoji.map(|e| e.url.clone()),
                    static_url: emoji.map(|e| e.static_url.clone()),
                }
            })
            .collect();

        let sensitive = note.cw.is_some() || files.iter().any(|f| f.is_sensitive);
        let space = self.ctx.services().id_space();

        Ok(Status {
            id: self.ctx.encode_id(&note.id).into_inner(),
            uri,
            url,
            account,
            in_reply_to_id: note
                .reply_id
                .as_ref()
                .map(|id| self.ctx.encode_id(id).into_inner()),
            in_reply_to_account_id: reply_account,
            reblog: None,
            quote: quote.map(Box::new),
            content: note
                .text
                .as_deref()
                .map(|text| renderer.render_or_escape(text))
                .unwrap_or_default(),
            text: note.text.clone(),
            created_at: note.created_at,
            edited_at: note.updated_at,
            emojis,
            replies_count: note.replies_count,
            reblogs_count: note.renote_count,
            favourites_count: note.reaction_total(),
            reblogged: state.reblogged,
            favourited: state.reaction.is_some(),
            muted: state.thread_muted,
            sensitive,
            spoiler_text: note.cw.clone().unwrap_or_default(),
            visibility: note.visibility.into(),
            media_attachments: files.iter().map(|f| mappers::attachment(f, space)).collect(),
            mentions,
            tags: note.tags.iter().map(|t| mappers::tag(t, instance)).collect(),
            poll,
            pinned: state.pinned,
            bookmarked: state.bookmarked,
            emoji_reactions,
        })
    }

    /// `(uri, url)`, falling back to the local note page
    fn links(&self, note: &Note) -> (String, String) {
        let local = self.ctx.services().instance().note_url(note.id.as_str());
        let uri = note.uri.clone().unwrap_or_else(|| local.clone());
        let url = note.url.clone().or_else(|| note.uri.clone()).unwrap_or(local);
        (uri, url)
    }

    async fn files(&self, ids: &[NativeId]) -> Vec<DriveFile> {
        if ids.is_empty() {
            return Vec::new();
        }
        self.ctx
            .services()
            .drive_file_repo()
            .find_by_ids(ids)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Attachment lookup failed");
                Vec::new()
            })
    }

    /// Mentions whose user still resolves; others are dropped
    async fn mentions(&self, mentions: &[NoteMention]) -> Vec<Mention> {
        let instance = self.ctx.services().instance();
        let resolved = join_all(mentions.iter().map(|mention| async move {
            let user = self.ctx.user(&mention.user_id).await.ok();
            user.map(|user| Mention {
                id: self.ctx.encode_id(&user.id).into_inner(),
                url: mention
                    .url
                    .clone()
                    .or_else(|| mention.uri.clone())
                    .or_else(|| user.uri.clone())
                    .unwrap_or_else(|| instance.profile_url(&user.username, user.host.as_deref())),
                acct: user.acct(),
                username: user.username,
            })
        }))
        .await;
        resolved.into_iter().flatten().collect()
    }

    /// The note's poll with the viewer's own votes
    async fn poll(&self, note: &Note) -> Option<(NativePoll, Vec<usize>)> {
        if !note.has_poll {
            return None;
        }
        let polls = self.ctx.services().poll_repo();
        let poll = match polls.find_by_note(&note.id).await {
            Ok(poll) => poll?,
            Err(e) => {
                warn!(error = %e, note_id = %note.id, "Poll lookup failed");
                return None;
            }
        };

        let own_votes = match self.ctx.viewer_id() {
            Some(viewer_id) => polls.find_votes(&note.id, viewer_id).await.unwrap_or_else(|e| {
                warn!(error = %e, note_id = %note.id, "Poll vote lookup failed");
                Vec::new()
            }),
            None => Vec::new(),
        };
        Some((poll, own_votes))
    }

    /// Foreign id of the author of the replied-to note
    async fn reply_account(&self, reply_id: Option<&NativeId>) -> Option<String> {
        let reply_id = reply_id?;
        match self.ctx.services().note_repo().find_by_id(reply_id).await {
            Ok(parent) => parent.map(|p| self.ctx.encode_id(&p.user_id).into_inner()),
            Err(e) => {
                warn!(error = %e, reply_id = %reply_id, "Reply parent lookup failed");
                None
            }
        }
    }

    async fn viewer_state(&self, note_id: &NativeId) -> NoteViewerState {
        let Some(viewer_id) = self.ctx.viewer_id() else {
            return NoteViewerState::default();
        };
        self.ctx
            .services()
            .note_repo()
            .viewer_state(note_id, viewer_id)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, note_id = %note_id, "Viewer state lookup failed");
                NoteViewerState::default()
            })
    }

    /// Quoted note, while within the embed depth
    async fn quote(&self, note: &Note, depth: usize) -> Option<Status> {
        if !note.is_quote() || depth >= MAX_EMBED_DEPTH {
            return None;
        }
        let target_id = note.renote_id.as_ref()?;
        let target = match referenced_note(self.ctx, target_id).await {
            Ok(target) => target,
            Err(e) => {
                debug!(error = %e, renote_id = %target_id, "Quoted note not shown");
                return None;
            }
        };
        match self.encode_at_depth(target, depth + 1).await {
            Ok(status) => Some(status),
            Err(e) => {
                warn!(error = %e, renote_id = %target_id, "Quoted note failed to convert");
                None
            }
        }
    }
}

fn resolution_error(id: &NativeId, reason: &str) -> DomainError {
    DomainError::EntityResolution {
        entity: "note",
        id: id.clone(),
        reason: reason.to_string(),
    }
}
