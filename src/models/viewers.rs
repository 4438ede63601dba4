use crate::common::error::AppError;
use crate::entities::users::User;

/// Identity of the authenticated person looking at a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: String,
    /// Matched against the `user` (sender) field of messages.
    pub details_id: String,
    /// Matched against the `recipient` field of messages.
    pub student_id: String,
}

impl Viewer {
    pub fn new(
        user_id: impl Into<String>,
        details_id: impl Into<String>,
        student_id: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            details_id: details_id.into(),
            student_id: student_id.into(),
        }
    }
}

impl TryFrom<User> for Viewer {
    type Error = AppError;

    fn try_from(value: User) -> Result<Self, Self::Error> {
        let details = value
            .expand
            .and_then(|expand| expand.details)
            .ok_or(AppError::SessionsSetupRequired)?;
        if value.details.is_empty() || details.student_id.is_empty() {
            return Err(AppError::SessionsSetupRequired);
        }
        Ok(Self {
            user_id: value.id,
            details_id: details.id,
            student_id: details.student_id,
        })
    }
}
