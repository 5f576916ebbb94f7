use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::capabilities::{AdapterMode, Capability};
use crate::fixtures::{progress_key, FixtureStore};
use crate::interfaces::adapter::{AdapterError, CapabilityAdapter};
use crate::interfaces::content::LearningPlan;
use crate::interfaces::storage::{
    new_path_id, LearningStore, NotificationRecord, NotificationSettings, Progress, UserProfile,
};

#[derive(Default)]
struct Overlay {
    profiles: HashMap<String, UserProfile>,
    /// Keyed by path id.
    paths: HashMap<String, LearningPlan>,
    /// Keyed by `progress_key(user, path)`.
    progress: HashMap<String, Progress>,
    notifications: Vec<NotificationRecord>,
}

/// In-memory store seeded from the fixtures.
///
/// The fixture data is copied in at construction; writes only touch the copy.
pub struct DemoStore {
    state: RwLock<Overlay>,
}

impl DemoStore {
    pub fn new(fixtures: Arc<FixtureStore>) -> Self {
        let mut overlay = Overlay::default();
        for user in fixtures.users() {
            overlay.profiles.insert(user.user_id.clone(), user.profile());
        }
        for plan in fixtures.learning_paths() {
            if let Some(id) = &plan.id {
                overlay.paths.insert(id.clone(), plan.clone());
            }
        }
        overlay.progress.extend(
            fixtures
                .progress()
                .iter()
                .map(|(key, progress)| (key.clone(), progress.clone())),
        );
        Self {
            state: RwLock::new(overlay),
        }
    }
}

impl CapabilityAdapter for DemoStore {
    fn name(&self) -> &str {
        "Demo store"
    }

    fn capability(&self) -> Capability {
        Capability::Storage
    }

    fn mode(&self) -> AdapterMode {
        AdapterMode::Demo
    }
}

#[async_trait]
impl LearningStore for DemoStore {
    async fn create_user_profile(&self, profile: &UserProfile) -> Result<(), AdapterError> {
        let mut profile = profile.clone();
        profile.created_at.get_or_insert_with(Utc::now);
        self.state
            .write()
            .profiles
            .insert(profile.user_id.clone(), profile);
        Ok(())
    }

    async fn get_user_profile(&self, user_id: &str) -> Result<Option<UserProfile>, AdapterError> {
        Ok(self.state.read().profiles.get(user_id).cloned())
    }

    async fn save_learning_path(
        &self,
        user_id: &str,
        plan: &LearningPlan,
    ) -> Result<String, AdapterError> {
        let path_id = new_path_id();
        let mut stored = plan.clone();
        stored.id = Some(path_id.clone());
        stored.user_id = Some(user_id.to_string());
        stored.created_at = Some(plan.created_at.unwrap_or_else(Utc::now));
        self.state.write().paths.insert(path_id.clone(), stored);
        log::debug!("Demo store saved learning path {} for {}", path_id, user_id);
        Ok(path_id)
    }

    async fn list_learning_paths(&self, user_id: &str) -> Result<Vec<LearningPlan>, AdapterError> {
        let mut plans: Vec<LearningPlan> = self
            .state
            .read()
            .paths
            .values()
            .filter(|p| p.user_id.as_deref() == Some(user_id))
            .cloned()
            .collect();
        plans.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(plans)
    }

    async fn get_learning_path(
        &self,
        user_id: &str,
        path_id: &str,
    ) -> Result<Option<LearningPlan>, AdapterError> {
        Ok(self
            .state
            .read()
            .paths
            .get(path_id)
            .filter(|p| p.user_id.as_deref() == Some(user_id))
            .cloned())
    }

    async fn update_progress(
        &self,
        user_id: &str,
        path_id: &str,
        day: u32,
        completed: bool,
    ) -> Result<(), AdapterError> {
        let mut state = self.state.write();
        let progress = state
            .progress
            .entry(progress_key(user_id, path_id))
            .or_default();
        progress.completed_days.insert(day, completed);
        progress.last_updated = Some(Utc::now());
        Ok(())
    }

    async fn get_progress(&self, user_id: &str, path_id: &str) -> Result<Progress, AdapterError> {
        Ok(self
            .state
            .read()
            .progress
            .get(&progress_key(user_id, path_id))
            .cloned()
            .unwrap_or_default())
    }

    async fn save_notification_settings(
        &self,
        user_id: &str,
        settings: &NotificationSettings,
    ) -> Result<(), AdapterError> {
        let mut state = self.state.write();
        let profile = state
            .profiles
            .get_mut(user_id)
            .ok_or_else(|| AdapterError::NotFound(format!("user {}", user_id)))?;
        profile.notification_settings = Some(settings.clone());
        Ok(())
    }

    async fn log_notification(&self, record: &NotificationRecord) -> Result<(), AdapterError> {
        self.state.write().notifications.push(record.clone());
        Ok(())
    }

    async fn notification_history(
        &self,
        user_id: &str,
    ) -> Result<Vec<NotificationRecord>, AdapterError> {
        let mut records: Vec<NotificationRecord> = self
            .state
            .read()
            .notifications
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
        Ok(records)
    }
}
