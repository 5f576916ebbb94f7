use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::capabilities::{AdapterMode, Capability};
use crate::fixtures::FixtureStore;
use crate::interfaces::adapter::{AdapterError, CapabilityAdapter};
use crate::interfaces::speech::{AudioClip, SpeechSynthesizer, Voice};

/// Returns empty audio and the fixture voices.
pub struct DemoSynthesizer {
    fixtures: Arc<FixtureStore>,
}

impl DemoSynthesizer {
    pub fn new(fixtures: Arc<FixtureStore>) -> Self {
        Self { fixtures }
    }
}

impl CapabilityAdapter for DemoSynthesizer {
    fn name(&self) -> &str {
        "Demo speech"
    }

    fn capability(&self) -> Capability {
        Capability::Tts
    }

    fn mode(&self) -> AdapterMode {
        AdapterMode::Demo
    }
}

#[async_trait]
impl SpeechSynthesizer for DemoSynthesizer {
    async fn synthesize(
        &self,
        text: &str,
        voice_id: Option<&str>,
    ) -> Result<AudioClip, AdapterError> {
        log::debug!(
            "[demo] narration of {} chars with voice {}",
            text.len(),
            voice_id.unwrap_or("default")
        );
        Ok(AudioClip {
            mime_type: "audio/mpeg".to_string(),
            data: Bytes::new(),
        })
    }

    async fn list_voices(&self) -> Result<Vec<Voice>, AdapterError> {
        Ok(self.fixtures.voices().to_vec())
    }
}
