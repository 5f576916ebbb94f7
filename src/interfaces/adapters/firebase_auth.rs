//! Firebase Authentication via the Identity Toolkit REST API.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::http;
use crate::capabilities::{AdapterMode, Capability, Credential};
use crate::config::Settings;
use crate::interfaces::adapter::{AdapterError, CapabilityAdapter};
use crate::interfaces::auth::{default_role, AuthProvider, UserAccount};

const VENDOR: &str = "Firebase Auth";

/// Live [`AuthProvider`] using email/password accounts.
pub struct FirebaseAuthProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Credential,
    fingerprint: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    email: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
}

impl FirebaseAuthProvider {
    pub fn new(client: reqwest::Client, settings: &Settings, api_key: Credential) -> Self {
        let fingerprint = api_key.fingerprint();
        Self {
            client,
            base_url: settings.endpoints.firebase_auth.trim_end_matches('/').to_string(),
            api_key,
            fingerprint,
        }
    }

    async fn call(&self, operation: &str, body: serde_json::Value) -> Result<AccountResponse, AdapterError> {
        let request = self
            .client
            .post(format!("{}/accounts:{}", self.base_url, operation))
            .header(http::GOOGLE_API_KEY, self.api_key.expose())
            .json(&body);
        http::send_json(VENDOR, request).await.map_err(map_auth_error)
    }
}

/// Identity Toolkit error codes come back as `CODE` or `CODE : detail`.
fn map_auth_error(err: AdapterError) -> AdapterError {
    match err {
        AdapterError::Api { message, status, vendor } => {
            let code = message.split_whitespace().next().unwrap_or_default();
            match code {
                "EMAIL_EXISTS" => AdapterError::Conflict("email already registered".to_string()),
                "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS"
                | "USER_DISABLED" => AdapterError::AuthenticationFailed(code.to_string()),
                "WEAK_PASSWORD" | "INVALID_EMAIL" | "MISSING_PASSWORD" => {
                    AdapterError::InvalidInput(message)
                }
                _ => AdapterError::Api { vendor, status, message },
            }
        }
        other => other,
    }
}

impl CapabilityAdapter for FirebaseAuthProvider {
    fn name(&self) -> &str {
        "Firebase Auth"
    }

    fn capability(&self) -> Capability {
        Capability::Auth
    }

    fn mode(&self) -> AdapterMode {
        AdapterMode::Live
    }

    fn credential_fingerprint(&self) -> Option<&str> {
        Some(&self.fingerprint)
    }
}

#[async_trait]
impl AuthProvider for FirebaseAuthProvider {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<UserAccount, AdapterError> {
        let account = self
            .call(
                "signUp",
                json!({
                    "email": email,
                    "password": password,
                    "displayName": name,
                    "returnSecureToken": true,
                }),
            )
            .await?;
        log::info!("Firebase account created: {}", account.local_id);
        Ok(UserAccount {
            user_id: account.local_id,
            email: account.email,
            name: account.display_name.unwrap_or_else(|| name.to_string()),
            role: default_role(),
            id_token: account.id_token,
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<UserAccount, AdapterError> {
        let account = self
            .call(
                "signInWithPassword",
                json!({
                    "email": email,
                    "password": password,
                    "returnSecureToken": true,
                }),
            )
            .await?;
        Ok(UserAccount {
            user_id: account.local_id,
            email: account.email,
            name: account
                .display_name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "User".to_string()),
            role: default_role(),
            id_token: account.id_token,
        })
    }
}
