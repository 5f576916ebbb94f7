//! Capability resolution: credential present → live adapter, absent → demo.
//!
//! Resolution never fails and never performs I/O. Everything that can go
//! wrong (a malformed credential, an unreadable fixture file, a TLS backend
//! that will not initialize) is caught earlier, while building the inputs.

use std::sync::Arc;
use std::time::Duration;

use super::bindings::AdapterBindings;
use super::capability::{AdapterMode, Capability};
use super::credentials::CredentialSet;
use crate::config::{ConfigurationError, Settings};
use crate::fixtures::FixtureStore;
use crate::interfaces::adapters::demo::{
    DemoAuthProvider, DemoContentGenerator, DemoDocumentPublisher, DemoNotifier, DemoStore,
    DemoSynthesizer, DemoVideoSearch,
};
use crate::interfaces::adapters::{
    DrivePublisher, ElevenLabsSynthesizer, FirebaseAuthProvider, FirestoreStore,
    GeminiContentGenerator, TwilioNotifier, YouTubeSearch,
};
use crate::interfaces::{
    AuthProvider, CapabilityAdapter, ContentGenerator, DocumentPublisher, LearningStore, Notifier,
    SpeechSynthesizer, VideoSearch,
};

/// A resolved adapter for one capability.
#[derive(Clone)]
pub enum Adapter {
    ContentGen(Arc<dyn ContentGenerator>),
    Auth(Arc<dyn AuthProvider>),
    Storage(Arc<dyn LearningStore>),
    Notify(Arc<dyn Notifier>),
    Tts(Arc<dyn SpeechSynthesizer>),
    VideoSearch(Arc<dyn VideoSearch>),
    DocGen(Arc<dyn DocumentPublisher>),
}

impl Adapter {
    /// The adapter through its capability-independent surface.
    pub fn as_capability_adapter(&self) -> &dyn CapabilityAdapter {
        match self {
            Adapter::ContentGen(a) => a.as_ref(),
            Adapter::Auth(a) => a.as_ref(),
            Adapter::Storage(a) => a.as_ref(),
            Adapter::Notify(a) => a.as_ref(),
            Adapter::Tts(a) => a.as_ref(),
            Adapter::VideoSearch(a) => a.as_ref(),
            Adapter::DocGen(a) => a.as_ref(),
        }
    }

    pub fn capability(&self) -> Capability {
        self.as_capability_adapter().capability()
    }

    pub fn mode(&self) -> AdapterMode {
        self.as_capability_adapter().mode()
    }

    pub fn name(&self) -> &str {
        self.as_capability_adapter().name()
    }

    pub fn credential_fingerprint(&self) -> Option<&str> {
        self.as_capability_adapter().credential_fingerprint()
    }
}

impl std::fmt::Debug for Adapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Adapter")
            .field("capability", &self.capability())
            .field("mode", &self.mode())
            .field("name", &self.name())
            .finish()
    }
}

/// Builds adapters from credentials.
///
/// Owns the shared HTTP client handed to every live adapter and the fixture
/// store shared by every demo adapter.
pub struct CapabilityResolver {
    settings: Settings,
    fixtures: Arc<FixtureStore>,
    client: reqwest::Client,
}

impl CapabilityResolver {
    pub fn new(settings: Settings, fixtures: FixtureStore) -> Result<Self, ConfigurationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(settings.http_timeout_ms))
            .user_agent(concat!("learnpath/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigurationError::HttpClient(e.to_string()))?;
        Ok(Self {
            settings,
            fixtures: Arc::new(fixtures),
            client,
        })
    }

    /// Default settings and the embedded fixtures.
    pub fn demo() -> Result<Self, ConfigurationError> {
        Self::new(Settings::default(), FixtureStore::embedded()?)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn fixtures(&self) -> &Arc<FixtureStore> {
        &self.fixtures
    }

    pub fn resolve_content_gen(&self, credentials: &CredentialSet) -> Arc<dyn ContentGenerator> {
        match credentials.get(Capability::ContentGen) {
            Some(key) => Arc::new(GeminiContentGenerator::new(
                self.client.clone(),
                &self.settings,
                key.clone(),
            )),
            None => Arc::new(DemoContentGenerator::new()),
        }
    }

    pub fn resolve_auth(&self, credentials: &CredentialSet) -> Arc<dyn AuthProvider> {
        match credentials.get(Capability::Auth) {
            Some(key) => Arc::new(FirebaseAuthProvider::new(
                self.client.clone(),
                &self.settings,
                key.clone(),
            )),
            None => Arc::new(DemoAuthProvider::new(self.fixtures.clone())),
        }
    }

    pub fn resolve_storage(&self, credentials: &CredentialSet) -> Arc<dyn LearningStore> {
        match credentials.get(Capability::Storage) {
            Some(credential) => Arc::new(FirestoreStore::new(
                self.client.clone(),
                &self.settings,
                credential.clone(),
            )),
            None => Arc::new(DemoStore::new(self.fixtures.clone())),
        }
    }

    pub fn resolve_notify(&self, credentials: &CredentialSet) -> Arc<dyn Notifier> {
        match credentials.get(Capability::Notify) {
            Some(credential) => Arc::new(TwilioNotifier::new(
                self.client.clone(),
                &self.settings,
                credential.clone(),
            )),
            None => Arc::new(DemoNotifier::new()),
        }
    }

    pub fn resolve_tts(&self, credentials: &CredentialSet) -> Arc<dyn SpeechSynthesizer> {
        match credentials.get(Capability::Tts) {
            Some(key) => Arc::new(ElevenLabsSynthesizer::new(
                self.client.clone(),
                &self.settings,
                key.clone(),
            )),
            None => Arc::new(DemoSynthesizer::new(self.fixtures.clone())),
        }
    }

    pub fn resolve_video(&self, credentials: &CredentialSet) -> Arc<dyn VideoSearch> {
        match credentials.get(Capability::VideoSearch) {
            Some(key) => Arc::new(YouTubeSearch::new(
                self.client.clone(),
                &self.settings,
                key.clone(),
            )),
            None => Arc::new(DemoVideoSearch::new(self.fixtures.clone())),
        }
    }

    pub fn resolve_docs(&self, credentials: &CredentialSet) -> Arc<dyn DocumentPublisher> {
        match credentials.get(Capability::DocGen) {
            Some(token) => Arc::new(DrivePublisher::new(
                self.client.clone(),
                &self.settings,
                token.clone(),
            )),
            None => Arc::new(DemoDocumentPublisher::new(self.fixtures.clone())),
        }
    }

    /// Resolve a single capability.
    pub fn resolve(&self, capability: Capability, credentials: &CredentialSet) -> Adapter {
        match capability {
            Capability::ContentGen => Adapter::ContentGen(self.resolve_content_gen(credentials)),
            Capability::Auth => Adapter::Auth(self.resolve_auth(credentials)),
            Capability::Storage => Adapter::Storage(self.resolve_storage(credentials)),
            Capability::Notify => Adapter::Notify(self.resolve_notify(credentials)),
            Capability::Tts => Adapter::Tts(self.resolve_tts(credentials)),
            Capability::VideoSearch => Adapter::VideoSearch(self.resolve_video(credentials)),
            Capability::DocGen => Adapter::DocGen(self.resolve_docs(credentials)),
        }
    }

    /// Resolve every capability, in [`Capability::ALL`] order.
    pub fn resolve_all(&self, credentials: &CredentialSet) -> AdapterBindings {
        let bindings = AdapterBindings {
            content: self.resolve_content_gen(credentials),
            auth: self.resolve_auth(credentials),
            storage: self.resolve_storage(credentials),
            notify: self.resolve_notify(credentials),
            tts: self.resolve_tts(credentials),
            video: self.resolve_video(credentials),
            docs: self.resolve_docs(credentials),
        };

        for info in bindings.describe() {
            tracing::info!(
                capability = %info.capability,
                mode = %info.mode,
                adapter = %info.adapter,
                fingerprint = info.credential_fingerprint.as_deref().unwrap_or("-"),
                "capability bound"
            );
        }
        if bindings.is_demo_mode() {
            tracing::warn!("no credentials configured; running entirely on demo fixtures");
        }
        bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::{Channel, Difficulty, LearnerContext, PlanRequest};
    use wiremock::MockServer;

    const SID: &str = "AC0123456789abcdef0123456789abcdef";

    fn resolver() -> CapabilityResolver {
        CapabilityResolver::demo().unwrap()
    }

    fn full_credentials() -> CredentialSet {
        CredentialSet::new()
            .with(Capability::ContentGen, "gemini-key")
            .unwrap()
            .with(Capability::Auth, "firebase-key")
            .unwrap()
            .with(Capability::Storage, "learn-path-42:ya29.token")
            .unwrap()
            .with(Capability::Notify, format!("{}:tok", SID))
            .unwrap()
            .with(Capability::Tts, "sk_el")
            .unwrap()
            .with(Capability::VideoSearch, "yt-key")
            .unwrap()
            .with(Capability::DocGen, "ya29.drive")
            .unwrap()
    }

    #[test]
    fn test_empty_credentials_resolve_to_demo() {
        let resolver = resolver();
        let credentials = CredentialSet::new();
        for capability in Capability::ALL {
            let adapter = resolver.resolve(capability, &credentials);
            assert_eq!(adapter.capability(), capability);
            assert_eq!(adapter.mode(), AdapterMode::Demo);
            assert!(adapter.credential_fingerprint().is_none());
        }
        assert!(resolver.resolve_all(&credentials).is_demo_mode());
    }

    #[test]
    fn test_single_credential_binds_one_live_adapter() {
        let credentials = CredentialSet::new()
            .with(Capability::ContentGen, "key123")
            .unwrap();
        let bindings = resolver().resolve_all(&credentials);

        let modes = bindings.modes();
        assert_eq!(modes[&Capability::ContentGen], AdapterMode::Live);
        assert_eq!(
            modes.values().filter(|m| **m == AdapterMode::Demo).count(),
            6
        );
        assert!(!bindings.is_demo_mode());
    }

    #[test]
    fn test_live_adapter_is_bound_to_its_credential() {
        let credentials = full_credentials();
        let resolver = resolver();
        for capability in Capability::ALL {
            let adapter = resolver.resolve(capability, &credentials);
            let expected = credentials.get(capability).unwrap().fingerprint();
            assert_eq!(adapter.mode(), AdapterMode::Live, "{}", capability);
            assert_eq!(adapter.credential_fingerprint(), Some(expected.as_str()));
        }
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let resolver = resolver();
        let credentials = CredentialSet::new()
            .with(Capability::Tts, "sk_el")
            .unwrap();
        let first = resolver.resolve_all(&credentials).describe();
        let second = resolver.resolve_all(&credentials).describe();
        assert_eq!(first, second);
    }

    #[test]
    fn test_describe_never_contains_secret() {
        let bindings = resolver().resolve_all(&full_credentials());
        let json = serde_json::to_string(&bindings.describe()).unwrap();
        assert!(!json.contains("gemini-key"));
        assert!(!json.contains("ya29"));
        assert!(json.contains("\"mode\":\"live\""));
    }

    #[tokio::test]
    async fn test_demo_bindings_never_touch_the_network() {
        let server = MockServer::start().await;
        let mut settings = Settings::default();
        for url in [
            &mut settings.endpoints.gemini,
            &mut settings.endpoints.firebase_auth,
            &mut settings.endpoints.firestore,
            &mut settings.endpoints.twilio,
            &mut settings.endpoints.elevenlabs,
            &mut settings.endpoints.youtube,
            &mut settings.endpoints.drive,
            &mut settings.endpoints.drive_upload,
        ] {
            *url = server.uri();
        }
        let resolver =
            CapabilityResolver::new(settings, FixtureStore::embedded().unwrap()).unwrap();
        let b = resolver.resolve_all(&CredentialSet::new());

        let request = PlanRequest::new("Learn Rust traits", 2, Difficulty::Beginner);
        let plan = b.content.generate_plan(&request).await.unwrap();
        b.content
            .generate_adaptive_plan(&request, &LearnerContext::default())
            .await
            .unwrap();
        b.content
            .enhance_day(&plan.daily_plans[0], "more practice")
            .await
            .unwrap();
        b.auth
            .sign_up("new@example.com", "s3cret!", "New Learner")
            .await
            .unwrap();
        b.auth.sign_in("demo@example.com", "demo123").await.unwrap();
        b.storage.get_user_profile("demo_user_123").await.unwrap();
        let path_id = b.storage.save_learning_path("demo_user_123", &plan).await.unwrap();
        b.storage.list_learning_paths("demo_user_123").await.unwrap();
        b.storage
            .get_learning_path("demo_user_123", &path_id)
            .await
            .unwrap();
        b.storage
            .update_progress("demo_user_123", &path_id, 1, true)
            .await
            .unwrap();
        b.storage.get_progress("demo_user_123", &path_id).await.unwrap();
        b.storage.notification_history("demo_user_123").await.unwrap();
        b.notify.send(Channel::Voice, "+15555550199", "hi").await.unwrap();
        b.tts.synthesize("hello", None).await.unwrap();
        b.tts.list_voices().await.unwrap();
        b.video.search("rust traits", 3).await.unwrap();
        b.video.video_details("abc123").await.unwrap();
        b.video.educational_channels("Rust").await.unwrap();
        b.docs.publish_plan(&plan).await.unwrap();
        b.docs.export_plan(&plan).await.unwrap();
        b.docs.list_documents().await.unwrap();

        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
