use crate::common::context::Context;
use crate::common::error::ServiceResult;
use crate::models::feeds::{LiveAction, LiveEvent};
use crate::models::viewers::Viewer;
use crate::repositories::collections::SubscriptionHandle;
use crate::repositories::messages::inbox_filter;
use crate::usecases::{messages, notifications};
use hashbrown::HashSet;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

const SEEN_CAPACITY: usize = 512;

/// Recently announced ids. The oldest id is forgotten once `capacity` is reached.
struct SeenIds {
    ids: HashSet<String>,
    order: VecDeque<String>,
    capacity: usize,
}

impl SeenIds {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: HashSet::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn insert(&mut self, id: &str) -> bool {
        if !self.ids.insert(id.to_string()) {
            return false;
        }
        self.order.push_back(id.to_string());
        if self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.ids.remove(&oldest);
            }
        }
        true
    }
}

struct Inbox {
    viewer: Viewer,
    seen: Mutex<SeenIds>,
    stopped: AtomicBool,
}

impl Inbox {
    /// True the first time a created message id shows up.
    fn first_sighting(&self, id: &str) -> bool {
        let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
        seen.insert(id)
    }
}

/// Process-wide toasts for private messages addressed to the viewer.
///
/// Runs independently of any mounted feed, so a message is announced once
/// no matter how many views are open.
pub struct MessageNotifier {
    inbox: Arc<Inbox>,
    subscription: Mutex<Option<SubscriptionHandle>>,
}

impl MessageNotifier {
    pub async fn start<C: Context + 'static>(ctx: Arc<C>, viewer: Viewer) -> ServiceResult<Self> {
        let inbox = Arc::new(Inbox {
            viewer,
            seen: Mutex::new(SeenIds::with_capacity(SEEN_CAPACITY)),
            stopped: AtomicBool::new(false),
        });

        let filter = inbox_filter(&inbox.viewer.student_id);
        let callback_inbox = inbox.clone();
        let callback_ctx = ctx.clone();
        let subscription = messages::subscribe(ctx.as_ref(), &filter, move |event: LiveEvent| {
            handle_event(callback_ctx.as_ref(), &callback_inbox, event)
        })
        .await?;

        info!(
            user_id = %inbox.viewer.user_id,
            subscription_id = subscription.subscription_id().to_string(),
            "Message notifier started"
        );
        Ok(Self {
            inbox,
            subscription: Mutex::new(Some(subscription)),
        })
    }

    pub fn is_running(&self) -> bool {
        !self.inbox.stopped.load(Ordering::Acquire)
    }

    pub fn stop(&self) {
        if self.inbox.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        let subscription = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(subscription) = subscription {
            subscription.unsubscribe();
        }
        info!(user_id = %self.inbox.viewer.user_id, "Message notifier stopped");
    }
}

impl Drop for MessageNotifier {
    fn drop(&mut self) {
        self.stop();
    }
}

fn handle_event<C: Context + ?Sized>(ctx: &C, inbox: &Inbox, event: LiveEvent) {
    if inbox.stopped.load(Ordering::Acquire) || event.action != LiveAction::Create {
        return;
    }
    if !inbox.first_sighting(&event.record.id) {
        debug!(message_id = %event.record.id, "Already announced");
        return;
    }
    if let Some(notification) =
        notifications::message_notification(Some(&inbox.viewer), &event.record)
    {
        notifications::deliver(ctx.notifier(), &notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seen_ids_reject_repeats() {
        let mut seen = SeenIds::with_capacity(4);
        assert!(seen.insert("m1"));
        assert!(!seen.insert("m1"));
        assert!(seen.insert("m2"));
    }

    #[test]
    fn seen_ids_stay_bounded() {
        let mut seen = SeenIds::with_capacity(2);
        assert!(seen.insert("m1"));
        assert!(seen.insert("m2"));
        assert!(seen.insert("m3"));
        assert_eq!(seen.ids.len(), 2);
        assert_eq!(seen.order.len(), 2);
        assert!(!seen.insert("m3"));
        assert!(seen.insert("m1"));
        assert!(!seen.ids.contains("m2"));
    }
}
