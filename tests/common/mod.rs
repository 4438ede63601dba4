#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use valentine_wall::common::context::{Context, Notifier};
use valentine_wall::common::error::ServiceResult;
use valentine_wall::entities::messages::Message;
use valentine_wall::entities::pages::RecordPage;
use valentine_wall::entities::realtime::{RealtimeAction, RealtimeEvent};
use valentine_wall::models::notifications::Notification;
use valentine_wall::models::viewers::Viewer;
use valentine_wall::repositories::collections::{
    CollectionClient, EventCallback, SubscriptionHandle,
};

pub const ME: &str = "202012345678";
pub const STRANGER: &str = "202087654321";

pub fn viewer() -> Viewer {
    Viewer::new("user1", "details1", ME)
}

pub fn record(id: &str, recipient: &str, gifts: usize, minute: u32) -> Message {
    Message {
        id: id.to_string(),
        content: "happy valentine's".to_string(),
        recipient: recipient.to_string(),
        user: "details9".to_string(),
        gifts: (0..gifts).map(|i| format!("gift{i}")).collect(),
        deleted: false,
        replies_count: 0,
        created: Utc.with_ymd_and_hms(2023, 2, 14, 8, minute, 0).unwrap(),
        expand: None,
    }
}

pub fn created(record: Message) -> RealtimeEvent {
    RealtimeEvent {
        action: RealtimeAction::Create,
        record,
    }
}

struct Subscription {
    filter: String,
    callback: EventCallback,
    active: Arc<AtomicBool>,
}

/// In-memory collection store. Pages are keyed by filter.
#[derive(Default)]
pub struct FakeCollectionClient {
    pages: Mutex<HashMap<String, Vec<Vec<Message>>>>,
    subscriptions: Mutex<Vec<Subscription>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    pub fail_fetch: AtomicBool,
    pub fail_subscribe: AtomicBool,
    pub fetches: AtomicUsize,
    pub unsubscribes: Arc<AtomicUsize>,
}

impl FakeCollectionClient {
    pub fn with_pages(&self, filter: &str, pages: Vec<Vec<Message>>) {
        self.pages.lock().unwrap().insert(filter.to_string(), pages);
    }

    /// Holds fetches for `filter` until the returned gate is notified.
    pub fn gate(&self, filter: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(filter.to_string(), gate.clone());
        gate
    }

    pub fn active_subscriptions(&self) -> Vec<String> {
        self.subscriptions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.active.load(Ordering::SeqCst))
            .map(|s| s.filter.clone())
            .collect()
    }

    /// Delivers to the open subscriptions of `filter`.
    pub fn emit(&self, filter: &str, event: RealtimeEvent) {
        let callbacks: Vec<EventCallback> = self
            .subscriptions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.filter == filter && s.active.load(Ordering::SeqCst))
            .map(|s| s.callback.clone())
            .collect();
        for callback in callbacks {
            callback(event.clone());
        }
    }

    /// Delivers to every callback ever registered, released ones included.
    pub fn emit_late(&self, event: RealtimeEvent) {
        let callbacks: Vec<EventCallback> = self
            .subscriptions
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.callback.clone())
            .collect();
        for callback in callbacks {
            callback(event.clone());
        }
    }
}

#[async_trait]
impl CollectionClient for FakeCollectionClient {
    async fn fetch_page(
        &self,
        _collection: &str,
        filter: &str,
        page: u32,
        _per_page: u32,
    ) -> anyhow::Result<RecordPage<Message>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let gate = self.gates.lock().unwrap().get(filter).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_fetch.load(Ordering::SeqCst) {
            anyhow::bail!("connection refused");
        }
        let pages = self.pages.lock().unwrap();
        let pages = pages.get(filter).cloned().unwrap_or_default();
        let index = page as usize - 1;
        Ok(RecordPage {
            items: pages.get(index).cloned().unwrap_or_default(),
            has_next_page: index + 1 < pages.len(),
        })
    }

    async fn subscribe(
        &self,
        _collection: &str,
        filter: &str,
        callback: EventCallback,
    ) -> anyhow::Result<SubscriptionHandle> {
        if self.fail_subscribe.load(Ordering::SeqCst) {
            anyhow::bail!("realtime unavailable");
        }
        let active = Arc::new(AtomicBool::new(true));
        self.subscriptions.lock().unwrap().push(Subscription {
            filter: filter.to_string(),
            callback,
            active: active.clone(),
        });
        let unsubscribes = self.unsubscribes.clone();
        Ok(SubscriptionHandle::new(move || {
            active.store(false, Ordering::SeqCst);
            unsubscribes.fetch_add(1, Ordering::SeqCst);
        }))
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn texts(&self) -> Vec<String> {
        self.notifications
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.text.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) -> ServiceResult<()> {
        self.notifications.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct TestContext {
    pub collections: FakeCollectionClient,
    pub notifier: RecordingNotifier,
}

impl TestContext {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl Context for TestContext {
    fn collections(&self) -> &dyn CollectionClient {
        &self.collections
    }

    fn notifier(&self) -> &dyn Notifier {
        &self.notifier
    }
}

