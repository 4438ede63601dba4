use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::models::notifications::NotificationMode;
use crate::models::viewers::Viewer;
use crate::repositories::users::Authenticator;
use crate::workers::daemons::message_notifier::MessageNotifier;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, warn};

/// Authenticates with the backend. Returns the viewer and the auth token.
pub async fn login(
    authenticator: &dyn Authenticator,
    identity: &str,
    password: &str,
) -> ServiceResult<(Viewer, String)> {
    let auth = match authenticator.auth_with_password(identity, password).await {
        Ok(Some(auth)) => auth,
        Ok(None) => return Err(AppError::SessionsInvalidCredentials),
        Err(e) => return unexpected(e),
    };

    let user_id = auth.record.id.clone();
    let viewer = match Viewer::try_from(auth.record) {
        Ok(viewer) => viewer,
        Err(e) => {
            warn!(user_id = %user_id, "Account setup not finished");
            authenticator.clear_token();
            return Err(e);
        }
    };
    info!(user_id = %viewer.user_id, "Logged in");
    Ok((viewer, auth.token))
}

/// Owns the per-login background work.
pub struct AuthSession {
    viewer: Viewer,
    notifier: Mutex<Option<MessageNotifier>>,
}

impl AuthSession {
    /// Starts the central notifier unless feed views notify on their own.
    pub async fn start<C: Context + 'static>(
        ctx: Arc<C>,
        viewer: Viewer,
        mode: NotificationMode,
    ) -> ServiceResult<Self> {
        let notifier = match mode {
            NotificationMode::Central => Some(MessageNotifier::start(ctx, viewer.clone()).await?),
            NotificationMode::View => None,
        };
        Ok(Self {
            viewer,
            notifier: Mutex::new(notifier),
        })
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn is_notifying(&self) -> bool {
        self.notifier
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(MessageNotifier::is_running)
    }

    pub fn logout(&self) {
        let notifier = self
            .notifier
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(notifier) = notifier {
            notifier.stop();
            info!(user_id = %self.viewer.user_id, "Logged out");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::messages::UserDetails;
    use crate::entities::users::{AuthResponse, User, UserExpand};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct FakeAuthenticator {
        response: Option<fn() -> AuthResponse>,
        cleared: AtomicBool,
    }

    #[async_trait]
    impl Authenticator for FakeAuthenticator {
        async fn auth_with_password(
            &self,
            _identity: &str,
            _password: &str,
        ) -> anyhow::Result<Option<AuthResponse>> {
            Ok(self.response.map(|response| response()))
        }

        fn clear_token(&self) {
            self.cleared.store(true, Ordering::SeqCst);
        }
    }

    fn user(details: Option<UserDetails>) -> User {
        User {
            id: "user123".to_string(),
            details: details.as_ref().map(|d| d.id.clone()).unwrap_or_default(),
            expand: Some(UserExpand { details }),
        }
    }

    fn complete() -> AuthResponse {
        AuthResponse {
            token: "token".to_string(),
            record: user(Some(UserDetails {
                id: "details123".to_string(),
                student_id: "202012345678".to_string(),
                college_department: "cas".to_string(),
            })),
        }
    }

    fn unfinished() -> AuthResponse {
        AuthResponse {
            token: "token".to_string(),
            record: user(None),
        }
    }

    fn authenticator(response: Option<fn() -> AuthResponse>) -> FakeAuthenticator {
        FakeAuthenticator {
            response,
            cleared: AtomicBool::new(false),
        }
    }

    #[tokio::test]
    async fn login_resolves_the_viewer() {
        let auth = authenticator(Some(complete));
        let (viewer, token) = login(&auth, "juan", "secret").await.unwrap();
        assert_eq!(viewer, Viewer::new("user123", "details123", "202012345678"));
        assert_eq!(token, "token");
    }

    #[tokio::test]
    async fn rejected_credentials() {
        let auth = authenticator(None);
        let result = login(&auth, "juan", "wrong").await;
        assert_eq!(result.unwrap_err(), AppError::SessionsInvalidCredentials);
    }

    #[tokio::test]
    async fn unfinished_accounts_need_setup() {
        let auth = authenticator(Some(unfinished));
        let result = login(&auth, "juan", "secret").await;
        assert_eq!(result.unwrap_err(), AppError::SessionsSetupRequired);
        assert!(auth.cleared.load(Ordering::SeqCst));
    }
}
