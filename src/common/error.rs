use std::fmt::{Display, Formatter};
use tracing::error;

pub type ServiceResult<T> = Result<T, AppError>;

#[track_caller]
pub fn unexpected<T, E: Into<anyhow::Error>>(e: E) -> ServiceResult<T> {
    let caller = std::panic::Location::caller();
    error!("An unexpected error has occurred at {caller}: {}", e.into());
    Err(AppError::Unexpected)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppError {
    Unexpected,

    FeedsFetchFailed,
    FeedsSubscriptionFailed,
    FeedsTerminated,

    MessagesInvalidLength,
    MessagesInvalidRecipient,

    NotificationsDeliveryFailed,

    SessionsInvalidCredentials,
    SessionsSetupRequired,
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    #[track_caller]
    fn from(e: E) -> Self {
        unexpected::<(), E>(e).unwrap_err()
    }
}

impl AppError {
    pub const fn code(&self) -> &'static str {
        match self {
            AppError::Unexpected => "unexpected",

            AppError::FeedsFetchFailed => "feeds.fetch_failed",
            AppError::FeedsSubscriptionFailed => "feeds.subscription_failed",
            AppError::FeedsTerminated => "feeds.terminated",

            AppError::MessagesInvalidLength => "messages.invalid_length",
            AppError::MessagesInvalidRecipient => "messages.invalid_recipient",

            AppError::NotificationsDeliveryFailed => "notifications.delivery_failed",

            AppError::SessionsInvalidCredentials => "sessions.invalid_credentials",
            AppError::SessionsSetupRequired => "sessions.setup_required",
        }
    }

    pub const fn message(&self) -> &'static str {
        match self {
            AppError::Unexpected => "Unknown error.",

            AppError::FeedsFetchFailed => "Nothing to see here!",
            AppError::FeedsSubscriptionFailed => "Live updates are currently unavailable.",
            AppError::FeedsTerminated => "This feed is no longer active.",

            AppError::MessagesInvalidLength => "Messages must be at most 240 characters long.",
            AppError::MessagesInvalidRecipient => "The message recipient is invalid.",

            AppError::NotificationsDeliveryFailed => "The notification could not be shown.",

            AppError::SessionsInvalidCredentials => {
                "You have entered an invalid username or password."
            }
            AppError::SessionsSetupRequired => "Please finish setting up your account first.",
        }
    }

    /// Errors rendered by the view itself instead of the global notifier.
    pub const fn is_inline(&self) -> bool {
        matches!(self, AppError::FeedsFetchFailed)
    }

    /// Errors that degrade a feed without interrupting the user.
    pub const fn is_silent(&self) -> bool {
        matches!(
            self,
            AppError::FeedsSubscriptionFailed | AppError::NotificationsDeliveryFailed
        )
    }

    pub fn into_anyhow(self) -> anyhow::Error {
        anyhow::anyhow!("{self}")
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}
