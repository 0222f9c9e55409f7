//! Status service
//!
//! Single status lookups, the accounts that reacted to or renoted a status,
//! and the thread around it.

use futures::future::join_all;
use masto_core::{DomainError, NativeId, Note, User};
use tracing::{debug, instrument, warn};

use crate::converters::{AccountConverter, StatusConverter};
use crate::dto::{Account, Status, StatusContext};

use super::context::RequestContext;
use super::error::ServiceResult;
use super::pagination::{fetch_page, LimitPolicy, Page, PaginationWindow, QueryParams};

/// Reply-chain notes shown above a status
const MAX_ANCESTORS: usize = 10;
/// Reply levels shown below a status
const DESCENDANT_DEPTH: usize = 2;
/// Replies shown below a status
const MAX_DESCENDANTS: usize = 10;

/// Status service
pub struct StatusService<'a> {
    ctx: &'a RequestContext,
}

impl<'a> StatusService<'a> {
    /// Create a new StatusService
    pub fn new(ctx: &'a RequestContext) -> Self {
        Self { ctx }
    }

    /// Get a status visible to the viewer
    #[instrument(skip(self))]
    pub async fn get(&self, id: &NativeId) -> ServiceResult<Status> {
        let note = self.visible_note(id).await?;
        StatusConverter::new(self.ctx).encode(&note).await
    }

    /// Accounts that reacted to a status
    #[instrument(skip(self, params))]
    pub async fn favourited_by(&self, id: &NativeId, params: &QueryParams) -> ServiceResult<Page<Account>> {
        self.visible_note(id).await?;
        let window =
            PaginationWindow::from_query(params, self.ctx.services().id_space(), LimitPolicy::ACCOUNTS)?;

        let reactions = self.ctx.services().reaction_repo();
        let page = fetch_page(&window, |range| async move {
            reactions.find_page_by_note(id, &range).await
        })
        .await;

        let users: Vec<User> = page.items.iter().map(|r| r.user.clone()).collect();
        for user in &users {
            self.ctx.cache().prime(user.clone());
        }
        let accounts = AccountConverter::new(self.ctx).encode_many(&users).await;
        Ok(page.with_items(accounts))
    }

    /// Accounts that renoted a status
    #[instrument(skip(self, params))]
    pub async fn reblogged_by(&self, id: &NativeId, params: &QueryParams) -> ServiceResult<Page<Account>> {
        self.visible_note(id).await?;
        let window =
            PaginationWindow::from_query(params, self.ctx.services().id_space(), LimitPolicy::ACCOUNTS)?;

        let notes = self.ctx.services().note_repo();
        let page = fetch_page(&window, |range| async move {
            notes.find_renotes_page(id, &range).await
        })
        .await;

        let users: Vec<User> = join_all(page.items.iter().map(|renote| self.ctx.user(&renote.user_id)))
            .await
            .into_iter()
            .filter_map(|user| match user {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!(error = %e, "Renoting user failed to resolve");
                    None
                }
            })
            .collect();
        let accounts = AccountConverter::new(self.ctx).encode_many(&users).await;
        Ok(page.with_items(accounts))
    }

    /// Visible ancestors (oldest first) and descendants of a status
    #[instrument(skip(self))]
    pub async fn context(&self, id: &NativeId) -> ServiceResult<StatusContext> {
        let note = self.visible_note(id).await?;

        let (ancestors, descendants) = futures::join!(self.ancestors(&note), self.descendants(&note));

        let converter = StatusConverter::new(self.ctx);
        let (ancestors, descendants) = futures::join!(
            converter.encode_many(&ancestors),
            converter.encode_many(&descendants),
        );

        Ok(StatusContext {
            ancestors,
            descendants,
        })
    }

    /// Walk the reply chain upwards, oldest first
    async fn ancestors(&self, note: &Note) -> Vec<Note> {
        let notes = self.ctx.services().note_repo();
        let mut ancestors = Vec::new();
        let mut next = note.reply_id.clone();

        while let Some(parent_id) = next.take() {
            if ancestors.len() >= MAX_ANCESTORS {
                break;
            }
            let parent = match notes.find_by_id(&parent_id).await {
                Ok(Some(parent)) => parent,
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, note_id = %parent_id, "Ancestor lookup failed");
                    break;
                }
            };
            let visible = notes
                .is_visible_for(&parent, self.ctx.viewer_id())
                .await
                .unwrap_or(false);
            if !visible {
                debug!(note_id = %parent.id, "Ancestor hidden from viewer, stopping");
                break;
            }
            next = parent.reply_id.clone();
            ancestors.push(parent);
        }

        ancestors.reverse();
        ancestors
    }

    async fn descendants(&self, note: &Note) -> Vec<Note> {
        self.ctx
            .services()
            .note_repo()
            .find_descendants(&note.id, self.ctx.viewer_id(), DESCENDANT_DEPTH, MAX_DESCENDANTS)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, note_id = %note.id, "Descendant lookup failed");
                Vec::new()
            })
    }

    /// Load a note, treating notes hidden from the viewer as missing
    async fn visible_note(&self, id: &NativeId) -> ServiceResult<Note> {
        let notes = self.ctx.services().note_repo();
        let note = notes
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NoteNotFound(id.clone()))?;
        if !notes.is_visible_for(&note, self.ctx.viewer_id()).await? {
            return Err(DomainError::NoteNotFound(id.clone()).into());
        }
        Ok(note)
    }
}
