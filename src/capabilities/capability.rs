//! Capability identifiers: the fixed set of externally delegated functions.
//!
//! Each capability is served by exactly one adapter at runtime, either a live
//! vendor client or a fixture-backed demo implementation. The set is closed:
//! adding a capability means adding a variant here, an adapter pair, and a
//! field on [`AdapterBindings`](super::AdapterBindings).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One externally delegated capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Learning-plan generation (Google Gemini)
    ContentGen,
    /// User sign-up / sign-in (Firebase Auth)
    Auth,
    /// Plans, progress and notification log (Firestore)
    Storage,
    /// SMS, WhatsApp and voice delivery (Twilio)
    Notify,
    /// Text-to-speech narration (ElevenLabs)
    Tts,
    /// Educational video lookup (YouTube Data API v3)
    VideoSearch,
    /// Plan documents (Google Drive)
    DocGen,
}

impl Capability {
    /// Every capability, in resolution order.
    pub const ALL: [Capability; 7] = [
        Capability::ContentGen,
        Capability::Auth,
        Capability::Storage,
        Capability::Notify,
        Capability::Tts,
        Capability::VideoSearch,
        Capability::DocGen,
    ];

    /// Stable snake_case identifier used in logs, config and the HTTP API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ContentGen => "content_gen",
            Capability::Auth => "auth",
            Capability::Storage => "storage",
            Capability::Notify => "notify",
            Capability::Tts => "tts",
            Capability::VideoSearch => "video_search",
            Capability::DocGen => "doc_gen",
        }
    }

    /// Vendor that backs the live adapter.
    pub fn vendor(&self) -> &'static str {
        match self {
            Capability::ContentGen => "Google Gemini",
            Capability::Auth => "Firebase Auth",
            Capability::Storage => "Cloud Firestore",
            Capability::Notify => "Twilio",
            Capability::Tts => "ElevenLabs",
            Capability::VideoSearch => "YouTube Data API v3",
            Capability::DocGen => "Google Drive",
        }
    }

    /// Environment variables that carry this capability's credential.
    ///
    /// Two names mean a composite credential joined as `first:second`.
    pub fn env_vars(&self) -> &'static [&'static str] {
        match self {
            Capability::ContentGen => &["GEMINI_API_KEY"],
            Capability::Auth => &["FIREBASE_API_KEY"],
            Capability::Storage => &["FIREBASE_PROJECT_ID", "FIREBASE_ACCESS_TOKEN"],
            Capability::Notify => &["TWILIO_ACCOUNT_SID", "TWILIO_AUTH_TOKEN"],
            Capability::Tts => &["ELEVENLABS_API_KEY"],
            Capability::VideoSearch => &["YOUTUBE_API_KEY"],
            Capability::DocGen => &["GOOGLE_DRIVE_ACCESS_TOKEN"],
        }
    }

    /// Whether the credential is a `first:second` pair.
    pub fn is_composite(&self) -> bool {
        self.env_vars().len() == 2
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Capability::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| format!("unknown capability: {}", s))
    }
}

/// Which variant of an adapter is bound. Chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterMode {
    /// Backed by the vendor API.
    Live,
    /// Backed by the local fixture store; no network access.
    Demo,
}

impl AdapterMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdapterMode::Live => "live",
            AdapterMode::Demo => "demo",
        }
    }
}

impl fmt::Display for AdapterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
