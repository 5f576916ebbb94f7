//! # Capabilities
//!
//! The fixed set of externally delegated functions and the resolver that
//! binds each one to a live or demo adapter at startup.
//!
//! ## Resolution flow
//!
//! 1. `CredentialSet::from_env()` reads and validates every credential;
//!    a malformed value is a `ConfigurationError` and the process stops.
//! 2. `CapabilityResolver::new(settings, fixtures)` builds the shared HTTP
//!    client and loads the fixture store.
//! 3. `resolve_all(&credentials)` returns `AdapterBindings`: live where a
//!    credential is present, demo everywhere else.
//! 4. Services receive the bindings and never learn which mode they got.

pub mod bindings;
pub mod capability;
pub mod credentials;
pub mod resolver;

pub use bindings::{AdapterBindings, BindingInfo};
pub use capability::{AdapterMode, Capability};
pub use credentials::{Credential, CredentialSet};
pub use resolver::{Adapter, CapabilityResolver};
