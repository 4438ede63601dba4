use crate::common::error::AppError;
use crate::entities::messages::{EVERYONE, Message as MessageEntity, UserDetails};
use chrono::{DateTime, Utc};
use std::fmt::{Display, Formatter};

pub const MAX_CONTENT_LENGTH: usize = 240;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Recipient {
    /// Broadcast message shown on the public wall.
    Everyone,
    /// Student id of a private recipient.
    User(String),
}

impl Recipient {
    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value.trim() {
            "" => Err(AppError::MessagesInvalidRecipient),
            EVERYONE => Ok(Recipient::Everyone),
            id => Ok(Recipient::User(id.to_string())),
        }
    }

    pub fn is_everyone(&self) -> bool {
        matches!(self, Recipient::Everyone)
    }

    pub fn is_user(&self, student_id: &str) -> bool {
        match self {
            Recipient::Everyone => false,
            Recipient::User(id) => id == student_id,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Recipient::Everyone => EVERYONE,
            Recipient::User(id) => id,
        }
    }
}

impl Display for Recipient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SenderDetails {
    pub details_id: String,
    pub student_id: String,
    pub college_department: String,
}

impl From<UserDetails> for SenderDetails {
    fn from(value: UserDetails) -> Self {
        Self {
            details_id: value.id,
            student_id: value.student_id,
            college_department: value.college_department,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: String,
    pub content: String,
    pub recipient: Recipient,
    /// `user_details` id of the sender.
    pub sender: String,
    pub gifts: Vec<String>,
    pub replies_count: i64,
    pub deleted: bool,
    pub created: DateTime<Utc>,
    pub sender_details: Option<SenderDetails>,
}

impl Message {
    pub fn has_gifts(&self) -> bool {
        !self.gifts.is_empty()
    }

    pub fn is_broadcast(&self) -> bool {
        self.recipient.is_everyone()
    }
}

impl TryFrom<MessageEntity> for Message {
    type Error = AppError;

    fn try_from(value: MessageEntity) -> Result<Self, Self::Error> {
        if value.content.chars().count() > MAX_CONTENT_LENGTH {
            return Err(AppError::MessagesInvalidLength);
        }
        let recipient = Recipient::parse(&value.recipient)?;
        let sender_details = value
            .expand
            .and_then(|expand| expand.user)
            .map(SenderDetails::from);
        Ok(Self {
            id: value.id,
            content: value.content,
            recipient,
            sender: value.user,
            gifts: value.gifts,
            replies_count: value.replies_count,
            deleted: value.deleted,
            created: value.created,
            sender_details,
        })
    }
}
