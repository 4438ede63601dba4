use crate::common::timestamps;
use chrono::{DateTime, Utc};
use serde::Deserialize;

pub const EVERYONE: &str = "everyone";

/// A record of the `messages` collection as the backend returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(default)]
    pub content: String,
    pub recipient: String,
    /// `user_details` id of the sender.
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub gifts: Vec<String>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub replies_count: i64,
    #[serde(deserialize_with = "timestamps::deserialize")]
    pub created: DateTime<Utc>,
    /// Only populated when the query asked for `expand=user`.
    #[serde(default)]
    pub expand: Option<MessageExpand>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageExpand {
    #[serde(default)]
    pub user: Option<UserDetails>,
}

/// A record of the `user_details` collection.
#[derive(Debug, Clone, Deserialize)]
pub struct UserDetails {
    pub id: String,
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub college_department: String,
}
