//! User authentication.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::adapter::{AdapterError, CapabilityAdapter};

/// An authenticated user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub user_id: String,
    pub email: String,
    pub name: String,
    #[serde(default = "default_role")]
    pub role: String,
    /// Session token issued by the identity provider, when it issues one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

pub(crate) fn default_role() -> String {
    "student".to_string()
}

/// Email/password identity provider.
#[async_trait]
pub trait AuthProvider: CapabilityAdapter {
    /// Register a new account. Fails with `Conflict` if the email is taken.
    async fn sign_up(&self, email: &str, password: &str, name: &str)
        -> Result<UserAccount, AdapterError>;

    /// Fails with `AuthenticationFailed` on unknown email or wrong password.
    async fn sign_in(&self, email: &str, password: &str) -> Result<UserAccount, AdapterError>;
}
