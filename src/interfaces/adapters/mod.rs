//! Built-in adapters.
//!
//! Live adapters wrap one vendor REST API each and share the resolver's
//! `reqwest::Client`. Demo adapters live under [`demo`] and never touch the
//! network.

pub mod demo;
pub mod drive;
pub mod elevenlabs;
pub mod firebase_auth;
pub mod firestore;
pub mod gemini;
pub(crate) mod http;
pub mod twilio;
pub mod youtube;

pub use drive::DrivePublisher;
pub use elevenlabs::ElevenLabsSynthesizer;
pub use firebase_auth::FirebaseAuthProvider;
pub use firestore::FirestoreStore;
pub use gemini::GeminiContentGenerator;
pub use twilio::TwilioNotifier;
pub use youtube::YouTubeSearch;
