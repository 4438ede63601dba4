use crate::entities::messages::UserDetails;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct PasswordAuthRequest<'a> {
    pub identity: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub record: User,
}

/// A record of the `users` auth collection.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: String,
    /// `user_details` id, empty until the account setup is finished.
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub expand: Option<UserExpand>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserExpand {
    #[serde(default)]
    pub details: Option<UserDetails>,
}
