//! Non-secret application settings.
//!
//! Precedence, lowest to highest: built-in defaults, the YAML file named by
//! `LEARNPATH_CONFIG`, individual environment variables.
//!
//! ```yaml
//! port: 8080
//! http_timeout_ms: 30000
//! twilio_phone_number: "+15550100"
//! endpoints:
//!   youtube: "http://localhost:9000/youtube/v3"
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{ConfigurationError, EnvLookup};

/// Base URLs for each vendor API. Overridable for proxies and tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub gemini: String,
    pub firebase_auth: String,
    pub firestore: String,
    pub twilio: String,
    pub elevenlabs: String,
    pub youtube: String,
    pub drive: String,
    pub drive_upload: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            gemini: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            firebase_auth: "https://identitytoolkit.googleapis.com/v1".to_string(),
            firestore: "https://firestore.googleapis.com/v1".to_string(),
            twilio: "https://api.twilio.com/2010-04-01".to_string(),
            elevenlabs: "https://api.elevenlabs.io/v1".to_string(),
            youtube: "https://www.googleapis.com/youtube/v3".to_string(),
            drive: "https://www.googleapis.com/drive/v3".to_string(),
            drive_upload: "https://www.googleapis.com/upload/drive/v3".to_string(),
        }
    }
}

/// Application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// HTTP listen port.
    pub port: u16,
    /// Directory holding a `demo.json` that replaces the embedded fixtures.
    pub fixtures_dir: Option<PathBuf>,
    /// Per-request timeout for vendor calls.
    pub http_timeout_ms: u64,
    /// Sender number for SMS and voice.
    pub twilio_phone_number: String,
    /// Sender address for WhatsApp.
    pub twilio_whatsapp_number: String,
    /// Default ElevenLabs voice.
    pub tts_voice_id: String,
    pub tts_model_id: String,
    /// Model for regular plans.
    pub gemini_model: String,
    /// Model for adaptive plans.
    pub gemini_adaptive_model: String,
    pub debug: bool,
    pub endpoints: Endpoints,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: 8080,
            fixtures_dir: None,
            http_timeout_ms: 30_000,
            twilio_phone_number: "+1234567890".to_string(),
            twilio_whatsapp_number: "whatsapp:+14155238886".to_string(),
            tts_voice_id: "21m00Tcm4TlvDq8ikWAM".to_string(),
            tts_model_id: "eleven_monolingual_v1".to_string(),
            gemini_model: "gemini-2.5-flash".to_string(),
            gemini_adaptive_model: "gemini-2.5-pro".to_string(),
            debug: false,
            endpoints: Endpoints::default(),
        }
    }
}

impl Settings {
    /// Parse settings from a YAML document. Missing keys take defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigurationError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigurationError::InvalidSetting {
            key: "LEARNPATH_CONFIG".to_string(),
            reason: e.to_string(),
        })
    }

    /// Build settings from an environment lookup.
    pub fn from_lookup(env: &impl EnvLookup) -> Result<Self, ConfigurationError> {
        let mut settings = match env.get("LEARNPATH_CONFIG").filter(|p| !p.trim().is_empty()) {
            Some(path) => {
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    ConfigurationError::InvalidSetting {
                        key: "LEARNPATH_CONFIG".to_string(),
                        reason: format!("{}: {}", path, e),
                    }
                })?;
                Self::from_yaml(&content)?
            }
            None => Self::default(),
        };
        settings.apply_env(env)?;
        Ok(settings)
    }

    /// Build settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(&super::process_env)
    }

    fn apply_env(&mut self, env: &impl EnvLookup) -> Result<(), ConfigurationError> {
        if let Some(port) = non_empty(env, "PORT") {
            self.port = parse_number("PORT", &port)?;
        }
        if let Some(timeout) = non_empty(env, "LEARNPATH_HTTP_TIMEOUT_MS") {
            self.http_timeout_ms = parse_number("LEARNPATH_HTTP_TIMEOUT_MS", &timeout)?;
        }
        if let Some(dir) = non_empty(env, "LEARNPATH_FIXTURES_DIR") {
            self.fixtures_dir = Some(PathBuf::from(dir));
        }
        if let Some(v) = non_empty(env, "TWILIO_PHONE_NUMBER") {
            self.twilio_phone_number = v;
        }
        if let Some(v) = non_empty(env, "TWILIO_WHATSAPP_NUMBER") {
            self.twilio_whatsapp_number = v;
        }
        if let Some(v) = non_empty(env, "ELEVENLABS_VOICE_ID") {
            self.tts_voice_id = v;
        }
        if let Some(v) = non_empty(env, "GEMINI_MODEL") {
            self.gemini_model = v;
        }
        if let Some(v) = non_empty(env, "DEBUG") {
            self.debug = v.eq_ignore_ascii_case("true");
        }
        Ok(())
    }
}

fn non_empty(env: &impl EnvLookup, key: &str) -> Option<String> {
    env.get(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigurationError>
where
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigurationError::InvalidSetting {
        key: key.to_string(),
        reason: format!("{:?}: {}", value, e),
    })
}
