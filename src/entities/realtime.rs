use crate::entities::messages::Message;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RealtimeAction {
    Create,
    Update,
    Delete,
}

/// Payload of a realtime SSE event for a subscribed collection topic.
#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeEvent {
    pub action: RealtimeAction,
    pub record: Message,
}

#[derive(Debug, Deserialize)]
pub struct RealtimeConnect {
    #[serde(rename = "clientId")]
    pub client_id: String,
}
