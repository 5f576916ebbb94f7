use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::capabilities::{AdapterMode, Capability};
use crate::fixtures::{FixtureStore, FixtureUser};
use crate::interfaces::adapter::{AdapterError, CapabilityAdapter};
use crate::interfaces::auth::{default_role, AuthProvider, UserAccount};
use crate::utilities::passwords::{hash_password, verify_password};

/// Seeded accounts plus any registered during this process.
pub struct DemoAuthProvider {
    fixtures: Arc<FixtureStore>,
    /// Keyed by lowercased email.
    registered: DashMap<String, FixtureUser>,
}

impl DemoAuthProvider {
    pub fn new(fixtures: Arc<FixtureStore>) -> Self {
        Self {
            fixtures,
            registered: DashMap::new(),
        }
    }

    fn find(&self, email: &str) -> Option<FixtureUser> {
        let key = email.trim().to_lowercase();
        self.registered
            .get(&key)
            .map(|entry| entry.value().clone())
            .or_else(|| self.fixtures.user_by_email(&key).cloned())
    }
}

fn account(user: &FixtureUser) -> UserAccount {
    UserAccount {
        user_id: user.user_id.clone(),
        email: user.email.clone(),
        name: user.name.clone(),
        role: user.role.clone(),
        id_token: None,
    }
}

impl CapabilityAdapter for DemoAuthProvider {
    fn name(&self) -> &str {
        "Demo auth"
    }

    fn capability(&self) -> Capability {
        Capability::Auth
    }

    fn mode(&self) -> AdapterMode {
        AdapterMode::Demo
    }
}

#[async_trait]
impl AuthProvider for DemoAuthProvider {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<UserAccount, AdapterError> {
        let key = email.trim().to_lowercase();
        if self.fixtures.user_by_email(&key).is_some() {
            return Err(AdapterError::Conflict(format!("email {} is already registered", email)));
        }
        let user = match self.registered.entry(key) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(AdapterError::Conflict(format!(
                    "email {} is already registered",
                    email
                )));
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                let simple = Uuid::new_v4().simple().to_string();
                let user = FixtureUser {
                    user_id: format!("demo_user_{}", &simple[..16]),
                    email: email.trim().to_string(),
                    name: name.to_string(),
                    role: default_role(),
                    password_hash: hash_password(password),
                    created_at: Some(Utc::now()),
                };
                slot.insert(user.clone());
                user
            }
        };
        log::debug!("Demo account registered: {}", user.user_id);
        Ok(account(&user))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<UserAccount, AdapterError> {
        match self.find(email) {
            Some(user) if verify_password(password, &user.password_hash) => Ok(account(&user)),
            _ => Err(AdapterError::AuthenticationFailed(
                "invalid email or password".to_string(),
            )),
        }
    }
}
