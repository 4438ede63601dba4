use crate::entities::messages::Message;
use crate::entities::pages::RecordPage;
use crate::entities::realtime::RealtimeEvent;
use async_trait::async_trait;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

pub const MESSAGES_COLLECTION: &str = "messages";

pub type EventCallback = Arc<dyn Fn(RealtimeEvent) + Send + Sync>;

/// Remote collection store with REST listing and realtime subscriptions.
#[async_trait]
pub trait CollectionClient: Send + Sync {
    async fn fetch_page(
        &self,
        collection: &str,
        filter: &str,
        page: u32,
        per_page: u32,
    ) -> anyhow::Result<RecordPage<Message>>;

    async fn subscribe(
        &self,
        collection: &str,
        filter: &str,
        callback: EventCallback,
    ) -> anyhow::Result<SubscriptionHandle>;
}

/// Owns a live channel. The channel is torn down on [`SubscriptionHandle::unsubscribe`]
/// or when the handle is dropped, whichever comes first.
pub struct SubscriptionHandle {
    subscription_id: Uuid,
    teardown: Option<Box<dyn FnOnce() + Send>>,
}

impl SubscriptionHandle {
    pub fn new<F: FnOnce() + Send + 'static>(teardown: F) -> Self {
        Self {
            subscription_id: Uuid::new_v4(),
            teardown: Some(Box::new(teardown)),
        }
    }

    pub fn subscription_id(&self) -> Uuid {
        self.subscription_id
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            debug!(
                subscription_id = self.subscription_id.to_string(),
                "Releasing subscription"
            );
            teardown();
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("subscription_id", &self.subscription_id)
            .field("active", &self.teardown.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn teardown_runs_exactly_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let handle = SubscriptionHandle::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        handle.unsubscribe();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropping_the_handle_releases_it() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        {
            let _handle = SubscriptionHandle::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
