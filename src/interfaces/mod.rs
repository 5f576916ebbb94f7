//! # Capability interfaces
//!
//! One trait per externally delegated capability. Each trait has exactly two
//! implementations: a live client for the vendor API and a demo adapter
//! backed by the fixture store.
//!
//! ## Architecture
//!
//! ```text
//! CredentialSet ──► CapabilityResolver::resolve_all()
//!                        │
//!                        ▼
//!                  AdapterBindings
//!                    ├── ContentGenerator   (GeminiContentGenerator | DemoContentGenerator)
//!                    ├── AuthProvider       (FirebaseAuthProvider   | DemoAuthProvider)
//!                    ├── LearningStore      (FirestoreStore         | DemoStore)
//!                    ├── Notifier           (TwilioNotifier         | DemoNotifier)
//!                    ├── SpeechSynthesizer  (ElevenLabsSynthesizer  | DemoSynthesizer)
//!                    ├── VideoSearch        (YouTubeSearch          | DemoVideoSearch)
//!                    └── DocumentPublisher  (DrivePublisher         | DemoDocumentPublisher)
//! ```
//!
//! Services hold the bindings and only ever see the traits.

pub mod adapter;
pub mod adapters;
pub mod auth;
pub mod content;
pub mod documents;
pub mod notify;
pub mod speech;
pub mod storage;
pub mod video;

pub use adapter::{AdapterError, CapabilityAdapter};
pub use auth::{AuthProvider, UserAccount};
pub use content::{
    ContentGenerator, DailyPlan, Difficulty, LearnerContext, LearningPlan, PlanKind, PlanRequest,
};
pub use documents::{DocumentPublisher, DocumentRef};
pub use notify::{Channel, DeliveryReceipt, Notifier};
pub use speech::{AudioClip, SpeechSynthesizer, Voice};
pub use storage::{
    LearningStore, NotificationKind, NotificationRecord, NotificationSettings, Progress,
    UserProfile,
};
pub use video::{ChannelInfo, Playlist, PlaylistEntry, Video, VideoDetails, VideoSearch};
