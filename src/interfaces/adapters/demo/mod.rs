//! Demo adapters: fixture-backed, offline implementations of every capability.
//!
//! A demo adapter is bound whenever its capability has no credential. None of
//! them touch the network. Reads come from the shared [`FixtureStore`]; the
//! ones that accept writes keep a per-process overlay that is lost on restart.
//!
//! [`FixtureStore`]: crate::fixtures::FixtureStore

mod auth;
mod content;
mod documents;
mod notify;
mod speech;
mod storage;
mod video;

pub use auth::DemoAuthProvider;
pub use content::DemoContentGenerator;
pub use documents::DemoDocumentPublisher;
pub use notify::{DemoNotifier, SentMessage};
pub use speech::DemoSynthesizer;
pub use storage::DemoStore;
pub use video::DemoVideoSearch;
