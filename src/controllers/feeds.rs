use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult};
use crate::entities::pages::RecordPage;
use crate::models::feeds::{
    FeedPhase, FeedScope, FeedSnapshot, FeedState, FeedTab, LiveEvent, PageRequest,
};
use crate::models::messages::Message;
use crate::models::notifications::NotificationMode;
use crate::models::viewers::Viewer;
use crate::repositories::collections::SubscriptionHandle;
use crate::settings::AppSettings;
use crate::usecases::feeds::{self, PageOutcome};
use crate::usecases::{messages, notifications};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, trace, warn};

#[derive(Debug, Clone)]
pub struct FeedOptions {
    pub per_page: u32,
    pub mode: NotificationMode,
    pub viewer: Option<Viewer>,
}

impl FeedOptions {
    pub fn from_settings(settings: &AppSettings, viewer: Option<Viewer>) -> Self {
        Self {
            per_page: settings.feed_page_size,
            mode: settings.notification_mode,
            viewer,
        }
    }
}

struct FeedShared {
    state: FeedState,
    phase: FeedPhase,
    viewer: Option<Viewer>,
    mode: NotificationMode,
    filter: Option<String>,
    subscription: Option<SubscriptionHandle>,
}

impl FeedShared {
    fn is_current(&self, generation: u64) -> bool {
        self.phase != FeedPhase::Terminated && self.state.generation == generation
    }
}

fn lock(shared: &Mutex<FeedShared>) -> MutexGuard<'_, FeedShared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drives one mounted feed view: scope changes, paging and the live subscription.
///
/// Clones share the same feed. The subscription is released on scope change,
/// on a failed first page and on [`FeedController::unmount`].
pub struct FeedController<C: Context + 'static> {
    ctx: Arc<C>,
    shared: Arc<Mutex<FeedShared>>,
}

impl<C: Context + 'static> Clone for FeedController<C> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            shared: self.shared.clone(),
        }
    }
}

impl<C: Context + 'static> FeedController<C> {
    pub fn new(ctx: Arc<C>, options: FeedOptions) -> Self {
        let shared = FeedShared {
            state: FeedState::new(options.per_page),
            phase: FeedPhase::Idle,
            viewer: options.viewer,
            mode: options.mode,
            filter: None,
            subscription: None,
        };
        Self {
            ctx,
            shared: Arc::new(Mutex::new(shared)),
        }
    }

    pub async fn mount(&self, scope: FeedScope) -> ServiceResult<()> {
        info!(scope = ?scope, "Mounting feed");
        self.set_scope(scope).await
    }

    pub async fn select_tab(&self, recipient: Option<&str>, tab: FeedTab) -> ServiceResult<()> {
        self.set_scope(FeedScope::wall(recipient, tab)).await
    }

    /// Re-runs the last scope after a failed first page, or re-requests the
    /// page that failed to load more.
    pub async fn retry(&self) -> ServiceResult<()> {
        let scope = {
            let mut shared = lock(&self.shared);
            match (shared.phase, shared.state.error.is_some()) {
                (FeedPhase::Error, _) => Some(shared.state.scope.clone()),
                (FeedPhase::Ready, true) => {
                    shared.state.error = None;
                    None
                }
                _ => return Ok(()),
            }
        };
        match scope {
            Some(scope) => self.set_scope(scope).await,
            None => self.load_more().await,
        }
    }

    pub async fn set_scope(&self, scope: FeedScope) -> ServiceResult<()> {
        let (request, filter, previous) = {
            let mut shared = lock(&self.shared);
            if shared.phase == FeedPhase::Terminated {
                return Err(AppError::FeedsTerminated);
            }
            let request = feeds::initialize(&mut shared.state, scope);
            let filter = shared.state.scope.filter_expression(shared.viewer.as_ref());
            shared.phase = FeedPhase::Loading;
            shared.filter = filter.clone();
            (request, filter, shared.subscription.take())
        };
        if let Some(previous) = previous {
            previous.unsubscribe();
        }

        let Some(filter) = filter else {
            debug!(
                generation = request.generation,
                "Scope cannot match for this viewer, skipping fetch"
            );
            let empty = Ok(RecordPage {
                items: vec![],
                has_next_page: false,
            });
            self.finish_page(request, empty);
            return Ok(());
        };

        self.open_subscription(request.generation, &filter).await;

        let result = messages::fetch_page(self.ctx.as_ref(), &filter, request).await;
        match self.finish_page(request, result) {
            PageOutcome::Failed(e) => {
                notifications::catch_and_notify_error(self.ctx.notifier(), e);
                Err(e)
            }
            PageOutcome::Applied { .. } | PageOutcome::Stale => Ok(()),
        }
    }

    pub async fn load_more(&self) -> ServiceResult<()> {
        let (request, filter) = {
            let mut shared = lock(&self.shared);
            if shared.phase != FeedPhase::Ready {
                return Ok(());
            }
            let Some(filter) = shared.filter.clone() else {
                return Ok(());
            };
            let Some(request) = feeds::load_more(&mut shared.state) else {
                return Ok(());
            };
            shared.phase = FeedPhase::LoadingMore;
            (request, filter)
        };

        let result = messages::fetch_page(self.ctx.as_ref(), &filter, request).await;
        match self.finish_page(request, result) {
            PageOutcome::Failed(e) => Err(e),
            PageOutcome::Applied { .. } | PageOutcome::Stale => Ok(()),
        }
    }

    /// Tears the view down. Events still queued for its subscription are ignored.
    pub fn unmount(&self) {
        let subscription = {
            let mut shared = lock(&self.shared);
            if shared.phase == FeedPhase::Terminated {
                return;
            }
            shared.phase = FeedPhase::Terminated;
            shared.state.generation += 1;
            shared.subscription.take()
        };
        if let Some(subscription) = subscription {
            subscription.unsubscribe();
        }
        info!("Unmounted feed");
    }

    pub fn phase(&self) -> FeedPhase {
        lock(&self.shared).phase
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        let shared = lock(&self.shared);
        FeedSnapshot {
            phase: shared.phase,
            scope: shared.state.scope.clone(),
            items: shared.state.items.clone(),
            has_more: shared.state.has_more,
            loading: shared.state.loading,
            loading_more: shared.state.loading_more,
            error: shared.state.error,
            live: shared.subscription.is_some(),
        }
    }

    fn finish_page(
        &self,
        request: PageRequest,
        result: ServiceResult<RecordPage<Message>>,
    ) -> PageOutcome {
        let (outcome, released) = {
            let mut shared = lock(&self.shared);
            if shared.phase == FeedPhase::Terminated {
                return PageOutcome::Stale;
            }
            let outcome = feeds::apply_page(&mut shared.state, request, result);
            let mut released = None;
            match outcome {
                PageOutcome::Stale => {}
                PageOutcome::Applied { inserted } => {
                    debug!(
                        generation = request.generation,
                        page = request.page,
                        inserted,
                        "Applied feed page"
                    );
                    shared.phase = FeedPhase::Ready;
                }
                PageOutcome::Failed(_) if request.page > 1 => {
                    shared.phase = FeedPhase::Ready;
                }
                PageOutcome::Failed(_) => {
                    shared.phase = FeedPhase::Error;
                    released = shared.subscription.take();
                }
            }
            (outcome, released)
        };
        if let Some(released) = released {
            released.unsubscribe();
        }
        outcome
    }

    async fn open_subscription(&self, generation: u64, filter: &str) {
        let handle = match messages::subscribe(
            self.ctx.as_ref(),
            filter,
            self.live_callback(generation),
        )
        .await
        {
            Ok(handle) => handle,
            Err(e) => {
                warn!(generation, code = e.code(), "Feed running without live updates");
                return;
            }
        };

        let stale = {
            let mut shared = lock(&self.shared);
            match shared.is_current(generation) {
                true => shared.subscription.replace(handle),
                false => Some(handle),
            }
        };
        if let Some(stale) = stale {
            stale.unsubscribe();
        }
    }

    fn live_callback(&self, generation: u64) -> impl Fn(LiveEvent) + Send + Sync + 'static {
        let shared = Arc::downgrade(&self.shared);
        let ctx = self.ctx.clone();
        move |event: LiveEvent| {
            let Some(shared) = shared.upgrade() else {
                return;
            };
            let notification = {
                let mut guard = lock(&shared);
                if !guard.is_current(generation) {
                    trace!(generation, "Ignoring event for a released feed");
                    return;
                }
                let shared = &mut *guard;
                let message_id = event.record.id.clone();
                let (outcome, notification) = feeds::on_live_event(
                    &mut shared.state,
                    event,
                    shared.viewer.as_ref(),
                    shared.mode,
                );
                debug!(generation, message_id = %message_id, outcome = ?outcome, "Applied live event");
                notification
            };
            if let Some(notification) = notification {
                notifications::deliver(ctx.notifier(), &notification);
            }
        }
    }
}
