//! # learnpath
//!
//! Backend for an AI-assisted learning path planner.
//!
//! Every external capability (plan generation, identity, persistence,
//! notifications, speech, video search, document export) sits behind a trait.
//! At startup the [`CapabilityResolver`] binds each one to either a live
//! vendor client, when a credential is configured, or a fixture-backed demo
//! adapter. The rest of the crate only sees [`AdapterBindings`], so the same
//! services run unchanged with zero, some, or all credentials present.

pub mod capabilities;
pub mod config;
pub mod fixtures;
pub mod interfaces;
pub mod server;
pub mod services;
pub mod utilities;

pub use capabilities::{
    AdapterBindings, AdapterMode, Capability, CapabilityResolver, Credential, CredentialSet,
};
pub use config::{ConfigurationError, Settings};
pub use fixtures::FixtureStore;
pub use interfaces::AdapterError;
pub use services::{LearningService, NotificationService, ServiceError};

/// Crate version reported by the health endpoint.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
