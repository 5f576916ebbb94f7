//! Read-only fixture store backing every demo adapter.
//!
//! The embedded `fixtures/demo.json` is compiled into the binary. A
//! `demo.json` inside `Settings::fixtures_dir` replaces it wholesale. The
//! store is loaded once at startup and never written; demo adapters that
//! accept writes keep their own in-memory overlay.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::config::{ConfigurationError, Settings};
use crate::interfaces::content::LearningPlan;
use crate::interfaces::documents::DocumentRef;
use crate::interfaces::speech::Voice;
use crate::interfaces::storage::{Progress, UserProfile};
use crate::interfaces::video::{ChannelInfo, Video, VideoDetails};

const EMBEDDED: &str = include_str!("../../fixtures/demo.json");

/// File name looked up inside a fixtures directory.
pub const FIXTURE_FILE: &str = "demo.json";

/// A seeded demo account.
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureUser {
    pub user_id: String,
    pub email: String,
    pub name: String,
    #[serde(default = "crate::interfaces::auth::default_role")]
    pub role: String,
    /// `salt:sha256(password + salt)`.
    pub password_hash: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl FixtureUser {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            user_id: self.user_id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role.clone(),
            created_at: self.created_at,
            notification_settings: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct FixtureData {
    users: Vec<FixtureUser>,
    learning_paths: Vec<LearningPlan>,
    /// Keyed by `{user_id}_{path_id}`.
    progress: BTreeMap<String, Progress>,
    videos: Vec<Video>,
    video_details: Option<VideoDetails>,
    channels: Vec<ChannelInfo>,
    voices: Vec<Voice>,
    documents: Vec<DocumentRef>,
}

/// Pre-populated demo data.
#[derive(Debug, Clone)]
pub struct FixtureStore {
    data: FixtureData,
}

impl FixtureStore {
    /// The fixtures compiled into the crate.
    pub fn embedded() -> Result<Self, ConfigurationError> {
        Self::from_json(EMBEDDED)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        let data: FixtureData = serde_json::from_str(json)
            .map_err(|e| ConfigurationError::Fixtures(format!("invalid fixture JSON: {}", e)))?;
        Ok(Self { data })
    }

    /// Load `demo.json` from a directory.
    pub fn from_dir(dir: &Path) -> Result<Self, ConfigurationError> {
        let path = dir.join(FIXTURE_FILE);
        let json = std::fs::read_to_string(&path).map_err(|e| {
            ConfigurationError::Fixtures(format!("{}: {}", path.display(), e))
        })?;
        log::info!("Loaded fixtures from {}", path.display());
        Self::from_json(&json)
    }

    /// The override directory from settings if set, the embedded data otherwise.
    pub fn load(settings: &Settings) -> Result<Self, ConfigurationError> {
        match &settings.fixtures_dir {
            Some(dir) => Self::from_dir(dir),
            None => Self::embedded(),
        }
    }

    pub fn users(&self) -> &[FixtureUser] {
        &self.data.users
    }

    /// Case-insensitive lookup.
    pub fn user_by_email(&self, email: &str) -> Option<&FixtureUser> {
        self.data
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email.trim()))
    }

    pub fn learning_paths(&self) -> &[LearningPlan] {
        &self.data.learning_paths
    }

    pub fn progress(&self) -> &BTreeMap<String, Progress> {
        &self.data.progress
    }

    /// Video templates with `{query}` and `{query_plus}` filled in.
    pub fn videos_for(&self, query: &str) -> Vec<Video> {
        let query = query.trim();
        let query_plus = query.replace(' ', "+");
        let fill = |s: &str| s.replace("{query_plus}", &query_plus).replace("{query}", query);
        self.data
            .videos
            .iter()
            .map(|v| Video {
                video_id: v.video_id.clone(),
                title: fill(&v.title),
                description: fill(&v.description),
                thumbnail: v.thumbnail.clone(),
                channel: v.channel.clone(),
                published_at: v.published_at.clone(),
                url: fill(&v.url),
            })
            .collect()
    }

    /// The details template for any requested id.
    pub fn video_details_for(&self, video_id: &str) -> Option<VideoDetails> {
        self.data.video_details.as_ref().map(|d| VideoDetails {
            video_id: video_id.to_string(),
            ..d.clone()
        })
    }

    /// Channel templates with `{subject}` filled in.
    pub fn channels_for(&self, subject: &str) -> Vec<ChannelInfo> {
        let subject = subject.trim();
        self.data
            .channels
            .iter()
            .map(|c| ChannelInfo {
                title: c.title.replace("{subject}", subject),
                description: c.description.replace("{subject}", subject),
                ..c.clone()
            })
            .collect()
    }

    pub fn voices(&self) -> &[Voice] {
        &self.data.voices
    }

    pub fn documents(&self) -> &[DocumentRef] {
        &self.data.documents
    }
}

/// Key for a progress document.
pub fn progress_key(user_id: &str, path_id: &str) -> String {
    format!("{}_{}", user_id, path_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_fixtures_parse() {
        let store = FixtureStore::embedded().unwrap();
        assert!(store.user_by_email("Demo@Example.com").is_some());
        assert_eq!(store.voices().len(), 2);
        assert_eq!(store.documents().len(), 2);
        assert_eq!(store.learning_paths().len(), 1);
        let progress = &store.progress()[&progress_key("demo_user_123", "path_demo_python")];
        assert_eq!(progress.completed_count(), 1);
    }

    #[test]
    fn test_video_templates_are_filled() {
        let store = FixtureStore::embedded().unwrap();
        let videos = store.videos_for("rust ownership");
        assert_eq!(videos.len(), 3);
        assert_eq!(videos[0].title, "Introduction to rust ownership");
        assert_eq!(
            videos[1].url,
            "https://www.youtube.com/results?search_query=rust+ownership+tutorial"
        );
        let details = store.video_details_for("abc").unwrap();
        assert_eq!(details.video_id, "abc");
        assert_eq!(details.readable_duration(), "10m 30s");
        assert_eq!(store.channels_for("SQL")[1].title, "Master SQL");
    }

    #[test]
    fn test_fixture_dir_override() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(FIXTURE_FILE),
            r#"{"voices": [{"voice_id": "v", "name": "Only Voice"}]}"#,
        )
        .unwrap();
        let settings = Settings {
            fixtures_dir: Some(dir.path().to_path_buf()),
            ..Settings::default()
        };
        let store = FixtureStore::load(&settings).unwrap();
        assert_eq!(store.voices().len(), 1);
        assert!(store.users().is_empty());
    }

    #[test]
    fn test_missing_fixture_dir_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FixtureStore::from_dir(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, ConfigurationError::Fixtures(_)));
    }
}
