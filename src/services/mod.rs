//! Application services built on the resolved adapter bindings.
//!
//! Services validate input, orchestrate several capabilities per operation
//! and never know whether an adapter is live or demo.

pub mod learning;
pub mod notifications;

pub use learning::{
    completion_percentage, estimate_duration, DurationEstimate, ExportFormat, ExportedPlan,
    LearningService, PathSummary,
};
pub use notifications::{NotificationService, ReminderSettings};

use thiserror::Error;

use crate::interfaces::AdapterError;

/// Errors returned by the service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Caller-supplied input failed validation.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// An adapter call failed.
    #[error(transparent)]
    Adapter(#[from] AdapterError),
}

impl ServiceError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }
}
