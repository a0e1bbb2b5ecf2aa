use serde::{Deserialize, Serialize};

/// Role claim that grants access to the console.
pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl SessionUser {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

/// A signed-in session. Both tokens and the user travel together, so a
/// half-populated session cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub user: SessionUser,
}

impl AuthSession {
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>, user: SessionUser) -> Self {
        Self { access_token: access_token.into(), refresh_token: refresh_token.into(), user }
    }

    /// Returns a copy carrying `access_token`, keeping the refresh token and user.
    #[must_use]
    pub fn with_access_token(&self, access_token: impl Into<String>) -> Self {
        Self { access_token: access_token.into(), ..self.clone() }
    }
}
