//! The resolved adapter for every capability.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use super::capability::{AdapterMode, Capability};
use crate::interfaces::{
    AuthProvider, CapabilityAdapter, ContentGenerator, DocumentPublisher, LearningStore, Notifier,
    SpeechSynthesizer, VideoSearch,
};

/// One adapter per capability, fixed for the life of the process.
///
/// Cloning is cheap; every field is an `Arc`.
#[derive(Clone)]
pub struct AdapterBindings {
    pub content: Arc<dyn ContentGenerator>,
    pub auth: Arc<dyn AuthProvider>,
    pub storage: Arc<dyn LearningStore>,
    pub notify: Arc<dyn Notifier>,
    pub tts: Arc<dyn SpeechSynthesizer>,
    pub video: Arc<dyn VideoSearch>,
    pub docs: Arc<dyn DocumentPublisher>,
}

/// What is bound for a capability. Safe to log and to return over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingInfo {
    pub capability: Capability,
    pub mode: AdapterMode,
    pub adapter: String,
    pub vendor: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_fingerprint: Option<String>,
}

impl AdapterBindings {
    /// The adapter bound to `capability`, seen through the common trait.
    pub fn get(&self, capability: Capability) -> &dyn CapabilityAdapter {
        match capability {
            Capability::ContentGen => self.content.as_ref(),
            Capability::Auth => self.auth.as_ref(),
            Capability::Storage => self.storage.as_ref(),
            Capability::Notify => self.notify.as_ref(),
            Capability::Tts => self.tts.as_ref(),
            Capability::VideoSearch => self.video.as_ref(),
            Capability::DocGen => self.docs.as_ref(),
        }
    }

    pub fn mode(&self, capability: Capability) -> AdapterMode {
        self.get(capability).mode()
    }

    pub fn modes(&self) -> BTreeMap<Capability, AdapterMode> {
        Capability::ALL
            .into_iter()
            .map(|c| (c, self.mode(c)))
            .collect()
    }

    /// True when every capability is served from fixtures.
    pub fn is_demo_mode(&self) -> bool {
        Capability::ALL
            .into_iter()
            .all(|c| self.mode(c) == AdapterMode::Demo)
    }

    pub fn describe(&self) -> Vec<BindingInfo> {
        Capability::ALL
            .into_iter()
            .map(|capability| {
                let adapter = self.get(capability);
                BindingInfo {
                    capability,
                    mode: adapter.mode(),
                    adapter: adapter.name().to_string(),
                    vendor: capability.vendor(),
                    credential_fingerprint: adapter.credential_fingerprint().map(str::to_string),
                }
            })
            .collect()
    }
}

impl std::fmt::Debug for AdapterBindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for capability in Capability::ALL {
            map.entry(&capability.as_str(), &self.mode(capability).as_str());
        }
        map.finish()
    }
}
