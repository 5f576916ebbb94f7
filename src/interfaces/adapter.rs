//! CapabilityAdapter trait: the surface every live and demo adapter shares.

use crate::capabilities::{AdapterMode, Capability};

/// Common surface of every adapter, regardless of capability.
///
/// Each capability trait (`ContentGenerator`, `Notifier`, ...) has this as a
/// supertrait, so callers holding any adapter can ask what it is without
/// caring which variant they got.
pub trait CapabilityAdapter: Send + Sync {
    /// Human-readable adapter name (e.g., "Gemini", "Demo notifier")
    fn name(&self) -> &str;

    /// The capability this adapter serves.
    fn capability(&self) -> Capability;

    /// Live or demo.
    fn mode(&self) -> AdapterMode;

    /// Fingerprint of the bound credential; `None` for demo adapters.
    fn credential_fingerprint(&self) -> Option<&str> {
        None
    }
}

/// Adapter error types
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// Transport failure. The request URL is stripped because API keys
    /// travel in query strings.
    #[error("HTTP transport error: {0}")]
    Http(reqwest::Error),

    #[error("{vendor} API error ({status}): {message}")]
    Api {
        vendor: &'static str,
        status: u16,
        message: String,
    },

    #[error("Failed to decode {vendor} response: {message}")]
    Decode {
        vendor: &'static str,
        message: String,
    },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Local document rendering failed; never caused by caller input.
    #[error("Failed to render document: {0}")]
    Render(String),

    #[error("Rate limited by {0}")]
    RateLimited(&'static str),
}

impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        AdapterError::Http(err.without_url())
    }
}

impl AdapterError {
    pub(crate) fn decode(vendor: &'static str, err: impl std::fmt::Display) -> Self {
        AdapterError::Decode {
            vendor,
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_transport_error_hides_query_secrets() {
        let err = reqwest::Client::new()
            .get("http://127.0.0.1:1/search")
            .query(&[("key", "SUPERSECRETKEY")])
            .send()
            .await
            .unwrap_err();
        let err = AdapterError::from(err);
        assert!(matches!(err, AdapterError::Http(_)));
        assert!(!err.to_string().contains("SUPERSECRETKEY"));
        assert!(!format!("{:?}", err).contains("SUPERSECRETKEY"));
    }
}
