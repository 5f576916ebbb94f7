//! Process configuration: settings, startup errors.
//!
//! Configuration is read exactly once, at startup, from an explicit lookup
//! function. Nothing in the library reads the process environment on its
//! own; the server binary passes [`process_env`] in.

pub mod settings;

pub use settings::{Endpoints, Settings};

use thiserror::Error;

use crate::capabilities::Capability;

/// Errors that prevent the process from starting.
///
/// Absent credentials are never an error; only values that are present but
/// unusable end up here.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A credential is present but fails validation.
    #[error("malformed credential for {capability}: {reason}")]
    MalformedCredential {
        capability: Capability,
        reason: String,
    },

    /// Only one half of a composite credential is set.
    #[error("incomplete credential for {capability}: {present} is set but {missing} is not")]
    IncompleteCredential {
        capability: Capability,
        present: &'static str,
        missing: &'static str,
    },

    /// A non-credential setting has an unusable value.
    #[error("invalid setting {key}: {reason}")]
    InvalidSetting { key: String, reason: String },

    /// The fixture store could not be loaded or parsed.
    #[error("fixture store error: {0}")]
    Fixtures(String),

    /// The shared HTTP client could not be built.
    #[error("HTTP client initialization failed: {0}")]
    HttpClient(String),
}

/// Environment lookup used by [`Settings::from_lookup`] and
/// [`CredentialSet::from_lookup`](crate::capabilities::CredentialSet::from_lookup).
pub trait EnvLookup {
    fn get(&self, key: &str) -> Option<String>;
}

impl<F> EnvLookup for F
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        self(key)
    }
}

/// Reads the real process environment.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

#[cfg(test)]
pub(crate) fn map_lookup(
    pairs: &[(&str, &str)],
) -> impl Fn(&str) -> Option<String> + Clone {
    let map: std::collections::HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}
