//! Timeline service
//!
//! Home and public timelines as pages of statuses.

use masto_core::{DomainError, NoteFilter, NoteOrigin, NoteSource};
use tracing::{info, instrument};

use crate::converters::StatusConverter;
use crate::dto::{Status, TimelineOptions};

use super::context::RequestContext;
use super::error::ServiceResult;
use super::pagination::{fetch_page, LimitPolicy, Page, PaginationWindow, QueryParams};

/// Timeline service
pub struct TimelineService<'a> {
    ctx: &'a RequestContext,
}

impl<'a> TimelineService<'a> {
    /// Create a new TimelineService
    pub fn new(ctx: &'a RequestContext) -> Self {
        Self { ctx }
    }

    /// The viewer's notes and those of the users they follow
    #[instrument(skip(self, params))]
    pub async fn home(&self, params: &QueryParams) -> ServiceResult<Page<Status>> {
        let viewer = self.ctx.require_viewer()?;
        let window =
            PaginationWindow::from_query(params, self.ctx.services().id_space(), LimitPolicy::STATUSES)?;

        let filter = NoteFilter::new(
            NoteSource::Home {
                user_id: viewer.id.clone(),
            },
            Some(viewer.id.clone()),
        );

        let page = status_page(self.ctx, &window, &filter).await;
        info!(user_id = %viewer.id, count = page.len(), "Home timeline fetched");
        Ok(page)
    }

    /// Public notes, optionally only local or only remote ones
    ///
    /// # Errors
    /// `ValidationError` when both `local` and `remote` are set,
    /// `TimelineDisabled` for the global timeline when it is turned off and
    /// the viewer is not staff.
    #[instrument(skip(self, params))]
    pub async fn public(&self, params: &QueryParams) -> ServiceResult<Page<Status>> {
        let options = TimelineOptions::from_query(params);
        if options.local && options.remote {
            return Err(DomainError::ValidationError(
                "local and remote cannot both be set".to_string(),
            )
            .into());
        }

        if !options.local
            && self.ctx.services().compat().disable_global_timeline
            && !self.ctx.viewer().is_some_and(|v| v.is_staff())
        {
            return Err(DomainError::TimelineDisabled.into());
        }

        let window =
            PaginationWindow::from_query(params, self.ctx.services().id_space(), LimitPolicy::STATUSES)?;

        let origin = if options.local {
            NoteOrigin::Local
        } else if options.remote {
            NoteOrigin::Remote
        } else {
            NoteOrigin::Any
        };
        let mut filter = NoteFilter::new(NoteSource::Public { origin }, self.ctx.viewer_id().cloned());
        filter.only_media = options.only_media;

        Ok(status_page(self.ctx, &window, &filter).await)
    }
}

/// Page through notes matching a filter and convert them
pub(crate) async fn status_page(
    ctx: &RequestContext,
    window: &PaginationWindow,
    filter: &NoteFilter,
) -> Page<Status> {
    let notes = ctx.services().note_repo();
    let page = fetch_page(window, |range| async move { notes.find_page(filter, &range).await }).await;
    let statuses = StatusConverter::new(ctx).encode_many(&page.items).await;
    page.with_items(statuses)
}
