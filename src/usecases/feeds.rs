//! Merges paged history with the live event stream of one feed.
//!
//! Both sources are deduplicated by message id, so applying a page and a live
//! `create` for the same record yields the same feed in either order. Responses
//! are tagged with the generation that requested them and dropped once the
//! scope has moved on.

use crate::common::error::{AppError, ServiceResult};
use crate::entities::pages::RecordPage;
use crate::models::feeds::{FeedScope, FeedState, LiveAction, LiveEvent, PageRequest};
use crate::models::messages::Message;
use crate::models::notifications::{Notification, NotificationMode};
use crate::models::viewers::Viewer;
use crate::usecases::notifications;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    Applied { inserted: usize },
    Stale,
    Failed(AppError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveOutcome {
    Inserted,
    Duplicate,
    OutOfScope,
    Updated,
    Removed,
    Ignored,
}

/// Resets the feed for `scope` and returns the first page request.
pub fn initialize(state: &mut FeedState, scope: FeedScope) -> PageRequest {
    state.generation += 1;
    state.clear();
    state.scope = scope;
    state.loading = true;
    debug!(
        generation = state.generation,
        scope = ?state.scope,
        "Initializing feed"
    );
    PageRequest {
        generation: state.generation,
        page: 1,
        per_page: state.per_page,
    }
}

/// Next page request, unless everything is loaded, a request is in flight
/// or the last page failed.
pub fn load_more(state: &mut FeedState) -> Option<PageRequest> {
    if !state.has_more || state.in_flight() || state.error.is_some() {
        return None;
    }
    state.loading_more = true;
    Some(PageRequest {
        generation: state.generation,
        page: state.page + 1,
        per_page: state.per_page,
    })
}

pub fn apply_page(
    state: &mut FeedState,
    request: PageRequest,
    result: ServiceResult<RecordPage<Message>>,
) -> PageOutcome {
    if request.generation != state.generation {
        trace!(
            request_generation = request.generation,
            generation = state.generation,
            "Discarding stale page"
        );
        return PageOutcome::Stale;
    }

    state.loading = false;
    state.loading_more = false;

    match result {
        Ok(page) => {
            let inserted = page
                .items
                .into_iter()
                .filter(|message| !message.deleted)
                .map(|message| state.insert(message))
                .filter(|inserted| *inserted)
                .count();
            state.page = request.page;
            state.has_more = page.has_next_page;
            state.error = None;
            PageOutcome::Applied { inserted }
        }
        Err(e) => {
            state.error = Some(e);
            PageOutcome::Failed(e)
        }
    }
}

pub fn apply_live_event(
    state: &mut FeedState,
    event: LiveEvent,
    viewer: Option<&Viewer>,
) -> LiveOutcome {
    let LiveEvent { action, record } = event;
    match action {
        LiveAction::Create if state.contains(&record.id) => LiveOutcome::Duplicate,
        LiveAction::Create if !state.scope.matches(&record, viewer) => LiveOutcome::OutOfScope,
        LiveAction::Create => match state.insert(record) {
            true => LiveOutcome::Inserted,
            false => LiveOutcome::Duplicate,
        },
        LiveAction::Update if !state.contains(&record.id) => LiveOutcome::Ignored,
        LiveAction::Update if state.scope.matches(&record, viewer) => {
            state.replace(record);
            LiveOutcome::Updated
        }
        LiveAction::Update | LiveAction::Delete => match state.remove(&record.id) {
            Some(_) => LiveOutcome::Removed,
            None => LiveOutcome::Ignored,
        },
    }
}

/// Applies a live event and decides whether the viewer gets a toast for it.
pub fn on_live_event(
    state: &mut FeedState,
    event: LiveEvent,
    viewer: Option<&Viewer>,
    mode: NotificationMode,
) -> (LiveOutcome, Option<Notification>) {
    let candidate = match (mode, event.action) {
        (NotificationMode::View, LiveAction::Create) => {
            notifications::message_notification(viewer, &event.record)
        }
        _ => None,
    };
    let outcome = apply_live_event(state, event, viewer);
    let notification = match outcome {
        LiveOutcome::Inserted => candidate,
        _ => None,
    };
    (outcome, notification)
}
