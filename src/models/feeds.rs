use crate::common::error::AppError;
use crate::entities::messages::EVERYONE;
use crate::entities::realtime::{RealtimeAction, RealtimeEvent};
use crate::models::messages::Message;
use crate::models::viewers::Viewer;
use hashbrown::HashSet;

/// Which subset of messages a feed view displays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedScope {
    /// `None` is the public wall (`recipient = "everyone"`).
    pub recipient_filter: Option<String>,
    pub gift_filter: Option<bool>,
    pub sent_view: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FeedTab {
    #[default]
    All,
    Messages,
    Gifts,
    Sent,
}

impl FeedScope {
    pub fn recent() -> Self {
        Self::default()
    }

    pub fn wall(recipient: Option<&str>, tab: FeedTab) -> Self {
        let recipient_filter = recipient
            .map(str::trim)
            .filter(|recipient| !recipient.is_empty() && *recipient != EVERYONE)
            .map(str::to_string);
        let (gift_filter, sent_view) = match tab {
            FeedTab::All => (None, false),
            FeedTab::Messages => (Some(false), false),
            FeedTab::Gifts => (Some(true), false),
            FeedTab::Sent => (None, true),
        };
        Self {
            recipient_filter,
            gift_filter,
            sent_view,
        }
    }

    pub fn is_public(&self) -> bool {
        self.recipient_filter
            .as_deref()
            .is_none_or(|recipient| recipient == EVERYONE)
    }

    fn recipient_value(&self) -> &str {
        match self.recipient_filter.as_deref() {
            Some(recipient) if !self.is_public() => recipient,
            _ => EVERYONE,
        }
    }

    pub fn matches(&self, message: &Message, viewer: Option<&Viewer>) -> bool {
        if message.deleted {
            return false;
        }

        let recipient_ok = message.recipient.as_str() == self.recipient_value();
        let gifts_ok = self
            .gift_filter
            .is_none_or(|with_gifts| message.has_gifts() == with_gifts);
        let audience_ok = if self.sent_view {
            viewer.is_some_and(|viewer| message.sender == viewer.details_id)
        } else {
            self.is_public()
                || viewer.is_some_and(|viewer| message.recipient.is_user(&viewer.student_id))
        };

        recipient_ok && gifts_ok && audience_ok
    }

    /// Encodes [`FeedScope::matches`] in the backend filter language.
    /// `None` means no record can ever match for this viewer.
    pub fn filter_expression(&self, viewer: Option<&Viewer>) -> Option<String> {
        let mut clauses = vec![format!("recipient = {}", quote(self.recipient_value()))];

        match self.gift_filter {
            Some(true) => clauses.push("gifts:length > 0".to_string()),
            Some(false) => clauses.push("gifts:length = 0".to_string()),
            None => {}
        }

        if self.sent_view {
            let viewer = viewer?;
            clauses.push(format!("user = {}", quote(&viewer.details_id)));
        } else if !self.is_public() {
            let viewer = viewer?;
            if viewer.student_id != self.recipient_value() {
                return None;
            }
        }

        clauses.push("deleted = false".to_string());
        Some(clauses.join(" && "))
    }
}

pub fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub generation: u64,
    pub page: u32,
    pub per_page: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveAction {
    Create,
    Update,
    Delete,
}

impl From<RealtimeAction> for LiveAction {
    fn from(value: RealtimeAction) -> Self {
        match value {
            RealtimeAction::Create => LiveAction::Create,
            RealtimeAction::Update => LiveAction::Update,
            RealtimeAction::Delete => LiveAction::Delete,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiveEvent {
    pub action: LiveAction,
    pub record: Message,
}

impl LiveEvent {
    pub fn create(record: Message) -> Self {
        Self {
            action: LiveAction::Create,
            record,
        }
    }
}

impl TryFrom<RealtimeEvent> for LiveEvent {
    type Error = AppError;

    fn try_from(value: RealtimeEvent) -> Result<Self, Self::Error> {
        Ok(Self {
            action: value.action.into(),
            record: Message::try_from(value.record)?,
        })
    }
}

/// In-memory feed of one mounted view.
#[derive(Debug, Clone, Default)]
pub struct FeedState {
    pub scope: FeedScope,
    pub generation: u64,
    /// Sorted by `created`, newest first.
    pub items: Vec<Message>,
    pub(crate) ids: HashSet<String>,
    pub page: u32,
    pub per_page: u32,
    pub has_more: bool,
    pub loading: bool,
    pub loading_more: bool,
    pub error: Option<AppError>,
}

impl FeedState {
    pub fn new(per_page: u32) -> Self {
        Self {
            per_page,
            ..Self::default()
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn in_flight(&self) -> bool {
        self.loading || self.loading_more
    }

    /// Inserts keeping the newest-first order. Returns false for a known id.
    pub(crate) fn insert(&mut self, message: Message) -> bool {
        if !self.ids.insert(message.id.clone()) {
            return false;
        }
        let position = self
            .items
            .partition_point(|existing| existing.created >= message.created);
        self.items.insert(position, message);
        true
    }

    pub(crate) fn replace(&mut self, message: Message) -> bool {
        match self.items.iter_mut().find(|item| item.id == message.id) {
            Some(item) => {
                *item = message;
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove(&mut self, id: &str) -> Option<Message> {
        if !self.ids.remove(id) {
            return None;
        }
        let position = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(position))
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
        self.ids.clear();
        self.page = 0;
        self.has_more = false;
        self.loading = false;
        self.loading_more = false;
        self.error = None;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FeedPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    LoadingMore,
    Error,
    Terminated,
}

/// Read-only view of a feed handed to renderers.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    pub phase: FeedPhase,
    pub scope: FeedScope,
    pub items: Vec<Message>,
    pub has_more: bool,
    pub loading: bool,
    pub loading_more: bool,
    pub error: Option<AppError>,
    /// False while the feed runs without a live subscription.
    pub live: bool,
}
