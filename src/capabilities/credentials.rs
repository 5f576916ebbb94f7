//! Opaque per-capability secrets supplied once at startup.
//!
//! Validation happens while the set is built, so a [`CredentialSet`] only
//! ever holds well-formed values and resolution itself cannot fail.

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

use super::capability::Capability;
use crate::config::{ConfigurationError, EnvLookup};

/// Placeholder values from `.env.example`; treated as unset.
const PLACEHOLDER_VALUES: &[&str] = &["demo_key", "demo_sid", "demo_token", "demo_client_id"];

static TWILIO_SID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^AC[0-9a-fA-F]{32}$").unwrap());

static GCP_PROJECT_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9-]{4,28}[a-z0-9]$").unwrap());

/// A validated, non-empty credential. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Validate a raw value for a capability.
    ///
    /// Returns `Ok(None)` for empty or placeholder values.
    pub fn parse(
        capability: Capability,
        raw: impl AsRef<str>,
    ) -> Result<Option<Self>, ConfigurationError> {
        let value = raw.as_ref().trim();
        if value.is_empty() || PLACEHOLDER_VALUES.contains(&value) {
            return Ok(None);
        }

        let malformed = |reason: &str| ConfigurationError::MalformedCredential {
            capability,
            reason: reason.to_string(),
        };

        if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(malformed("contains whitespace or control characters"));
        }

        if capability.is_composite() {
            let (first, second) = value
                .split_once(':')
                .ok_or_else(|| malformed("expected `first:second`"))?;
            if first.is_empty() || second.is_empty() {
                return Err(malformed("both halves of the pair must be non-empty"));
            }
            match capability {
                Capability::Notify if !TWILIO_SID.is_match(first) => {
                    return Err(malformed("account SID must be `AC` followed by 32 hex digits"));
                }
                Capability::Storage if !GCP_PROJECT_ID.is_match(first) => {
                    return Err(malformed("project id must be 6-30 lowercase letters, digits or hyphens"));
                }
                _ => {}
            }
        }

        Ok(Some(Self(value.to_string())))
    }

    /// The raw secret. Only live adapters should call this.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Split a composite credential into its two halves.
    pub fn pair(&self) -> Option<(&str, &str)> {
        self.0.split_once(':')
    }

    /// First 12 hex digits of the SHA-256 of the secret. Safe to log.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        hex::encode(digest)[..12].to_string()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({}…)", self.fingerprint())
    }
}

/// Process-wide credentials, one optional entry per capability.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialSet {
    entries: BTreeMap<Capability, Credential>,
}

impl CredentialSet {
    /// An empty set: every capability resolves to demo.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store a credential. Empty values leave the entry unset.
    pub fn insert(
        &mut self,
        capability: Capability,
        raw: impl AsRef<str>,
    ) -> Result<(), ConfigurationError> {
        match Credential::parse(capability, raw)? {
            Some(credential) => {
                self.entries.insert(capability, credential);
            }
            None => {
                self.entries.remove(&capability);
            }
        }
        Ok(())
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(
        mut self,
        capability: Capability,
        raw: impl AsRef<str>,
    ) -> Result<Self, ConfigurationError> {
        self.insert(capability, raw)?;
        Ok(self)
    }

    pub fn get(&self, capability: Capability) -> Option<&Credential> {
        self.entries.get(&capability)
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.entries.contains_key(&capability)
    }

    /// Capabilities that have a credential.
    pub fn configured(&self) -> impl Iterator<Item = Capability> + '_ {
        self.entries.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read every capability's variables from an environment lookup.
    ///
    /// A composite credential with only one half set is rejected so the
    /// process never starts half-configured.
    pub fn from_lookup(env: &impl EnvLookup) -> Result<Self, ConfigurationError> {
        let mut set = Self::new();
        for capability in Capability::ALL {
            let values: Vec<Option<String>> = capability
                .env_vars()
                .iter()
                .map(|name| {
                    env.get(name)
                        .map(|v| v.trim().to_string())
                        .filter(|v| !v.is_empty() && !PLACEHOLDER_VALUES.contains(&v.as_str()))
                })
                .collect();

            let raw = match values.as_slice() {
                [single] => single.clone(),
                [Some(first), Some(second)] => Some(format!("{}:{}", first, second)),
                [None, None] => None,
                [first, _] => {
                    let vars = capability.env_vars();
                    let (present, missing) = if first.is_some() {
                        (vars[0], vars[1])
                    } else {
                        (vars[1], vars[0])
                    };
                    return Err(ConfigurationError::IncompleteCredential {
                        capability,
                        present,
                        missing,
                    });
                }
                _ => None,
            };

            if let Some(raw) = raw {
                set.insert(capability, raw)?;
            }
        }
        Ok(set)
    }

    /// Read credentials from the process environment.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(&crate::config::process_env)
    }
}
