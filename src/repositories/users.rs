use crate::entities::users::AuthResponse;
use async_trait::async_trait;

/// Password login against the `users` auth collection.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// `None` when the backend rejects the credentials.
    async fn auth_with_password(
        &self,
        identity: &str,
        password: &str,
    ) -> anyhow::Result<Option<AuthResponse>>;

    fn clear_token(&self);
}
