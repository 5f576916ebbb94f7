//! ElevenLabs text-to-speech.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::http;
use crate::capabilities::{AdapterMode, Capability, Credential};
use crate::config::Settings;
use crate::interfaces::adapter::{AdapterError, CapabilityAdapter};
use crate::interfaces::speech::{AudioClip, SpeechSynthesizer, Voice};

const VENDOR: &str = "ElevenLabs";
const AUDIO_MPEG: &str = "audio/mpeg";

pub struct ElevenLabsSynthesizer {
    client: reqwest::Client,
    base_url: String,
    api_key: Credential,
    fingerprint: String,
    default_voice: String,
    model_id: String,
}

#[derive(Debug, Deserialize)]
struct VoiceList {
    #[serde(default)]
    voices: Vec<Voice>,
}

impl ElevenLabsSynthesizer {
    pub fn new(client: reqwest::Client, settings: &Settings, api_key: Credential) -> Self {
        let fingerprint = api_key.fingerprint();
        Self {
            client,
            base_url: settings.endpoints.elevenlabs.trim_end_matches('/').to_string(),
            api_key,
            fingerprint,
            default_voice: settings.tts_voice_id.clone(),
            model_id: settings.tts_model_id.clone(),
        }
    }
}

impl CapabilityAdapter for ElevenLabsSynthesizer {
    fn name(&self) -> &str {
        "ElevenLabs"
    }

    fn capability(&self) -> Capability {
        Capability::Tts
    }

    fn mode(&self) -> AdapterMode {
        AdapterMode::Live
    }

    fn credential_fingerprint(&self) -> Option<&str> {
        Some(&self.fingerprint)
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsSynthesizer {
    async fn synthesize(
        &self,
        text: &str,
        voice_id: Option<&str>,
    ) -> Result<AudioClip, AdapterError> {
        if text.trim().is_empty() {
            return Err(AdapterError::InvalidInput("nothing to synthesize".to_string()));
        }
        let voice = voice_id.unwrap_or(self.default_voice.as_str());
        let request = self
            .client
            .post(format!("{}/text-to-speech/{}", self.base_url, voice))
            .header("accept", AUDIO_MPEG)
            .header("xi-api-key", self.api_key.expose())
            .json(&json!({
                "text": text,
                "model_id": self.model_id,
                "voice_settings": {"stability": 0.5, "similarity_boost": 0.5},
            }));
        let response = http::send(VENDOR, request).await?;
        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(AUDIO_MPEG)
            .to_string();
        let data = response.bytes().await?;
        log::debug!("ElevenLabs synthesized {} bytes with voice {}", data.len(), voice);
        Ok(AudioClip { mime_type, data })
    }

    async fn list_voices(&self) -> Result<Vec<Voice>, AdapterError> {
        let request = self
            .client
            .get(format!("{}/voices", self.base_url))
            .header("xi-api-key", self.api_key.expose());
        let list: VoiceList = http::send_json(VENDOR, request).await?;
        Ok(list.voices)
    }
}
