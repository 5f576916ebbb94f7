//! Text-to-speech narration.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::adapter::{AdapterError, CapabilityAdapter};

/// Synthesized audio.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub mime_type: String,
    /// Empty for demo narration.
    pub data: Bytes,
}

impl AudioClip {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A selectable voice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voice {
    pub voice_id: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
}

#[async_trait]
pub trait SpeechSynthesizer: CapabilityAdapter {
    /// `voice_id` of `None` uses the configured default voice.
    async fn synthesize(&self, text: &str, voice_id: Option<&str>)
        -> Result<AudioClip, AdapterError>;

    async fn list_voices(&self) -> Result<Vec<Voice>, AdapterError>;
}
