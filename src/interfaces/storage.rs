//! Persistence for profiles, plans, progress and the notification log.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::adapter::{AdapterError, CapabilityAdapter};
use super::content::LearningPlan;
use super::notify::Channel;

/// Stored profile for a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub email: String,
    pub name: String,
    #[serde(default = "super::auth::default_role")]
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_settings: Option<NotificationSettings>,
}

/// Per-day completion for one plan. Keys are day numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    #[serde(default)]
    pub completed_days: BTreeMap<u32, bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Progress {
    pub fn completed_count(&self) -> usize {
        self.completed_days.values().filter(|done| **done).count()
    }

    pub fn is_completed(&self, day: u32) -> bool {
        self.completed_days.get(&day).copied().unwrap_or(false)
    }
}

/// Reminder preferences for one plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub path_id: String,
    pub phone_number: String,
    #[serde(default)]
    pub channel: Channel,
    /// Local time of day, `HH:MM`.
    pub reminder_time: String,
    /// ISO weekdays, 1 = Monday.
    #[serde(default = "default_weekdays")]
    pub weekdays: Vec<u8>,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_weekdays() -> Vec<u8> {
    vec![1, 2, 3, 4, 5]
}

fn default_true() -> bool {
    true
}

/// What kind of message was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Reminder,
    Completion,
    Motivation,
}

/// One entry of the notification log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub user_id: String,
    pub path_id: String,
    pub kind: NotificationKind,
    pub channel: Channel,
    pub receipt_id: String,
    pub sent_at: DateTime<Utc>,
}

/// Fresh id for a saved plan.
pub fn new_path_id() -> String {
    format!("path_{}", Uuid::new_v4().simple())
}

/// Backing store for user data.
#[async_trait]
pub trait LearningStore: CapabilityAdapter {
    async fn create_user_profile(&self, profile: &UserProfile) -> Result<(), AdapterError>;

    async fn get_user_profile(&self, user_id: &str) -> Result<Option<UserProfile>, AdapterError>;

    /// Save a plan and return its assigned id.
    async fn save_learning_path(
        &self,
        user_id: &str,
        plan: &LearningPlan,
    ) -> Result<String, AdapterError>;

    async fn list_learning_paths(&self, user_id: &str) -> Result<Vec<LearningPlan>, AdapterError>;

    async fn get_learning_path(
        &self,
        user_id: &str,
        path_id: &str,
    ) -> Result<Option<LearningPlan>, AdapterError>;

    async fn update_progress(
        &self,
        user_id: &str,
        path_id: &str,
        day: u32,
        completed: bool,
    ) -> Result<(), AdapterError>;

    /// Progress for a plan; empty when nothing has been recorded.
    async fn get_progress(&self, user_id: &str, path_id: &str) -> Result<Progress, AdapterError>;

    async fn save_notification_settings(
        &self,
        user_id: &str,
        settings: &NotificationSettings,
    ) -> Result<(), AdapterError>;

    async fn log_notification(&self, record: &NotificationRecord) -> Result<(), AdapterError>;

    /// Most recent first.
    async fn notification_history(
        &self,
        user_id: &str,
    ) -> Result<Vec<NotificationRecord>, AdapterError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_counts_only_completed_days() {
        let progress: Progress =
            serde_json::from_str(r#"{"completed_days": {"1": true, "2": false, "3": true}}"#)
                .unwrap();
        assert_eq!(progress.completed_count(), 2);
        assert!(progress.is_completed(3));
        assert!(!progress.is_completed(2));
        assert!(!progress.is_completed(9));
    }
}
