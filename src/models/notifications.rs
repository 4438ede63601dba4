use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

impl NotificationKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
        }
    }
}

/// A transient toast shown to the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub text: String,
}

impl Notification {
    pub fn new(kind: NotificationKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, text)
    }
}

/// Who decides to toast incoming private messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationMode {
    /// Every mounted feed view notifies for the messages it inserts.
    View,
    /// A single process-wide subscriber notifies; views stay quiet.
    #[default]
    Central,
}

#[derive(Debug)]
pub struct ParseNotificationModeError(String);

impl Display for ParseNotificationModeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown notification mode `{}`", self.0)
    }
}

impl std::error::Error for ParseNotificationModeError {}

impl FromStr for NotificationMode {
    type Err = ParseNotificationModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "view" => Ok(NotificationMode::View),
            "central" => Ok(NotificationMode::Central),
            _ => Err(ParseNotificationModeError(s.to_string())),
        }
    }
}
