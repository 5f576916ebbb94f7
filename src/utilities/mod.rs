//! Small helpers shared by the adapters and services.

pub mod passwords;
pub mod validation;
