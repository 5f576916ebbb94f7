//! Learning paths: creation, progress, export and narration.

use std::collections::HashSet;
use std::str::FromStr;

use bytes::Bytes;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::ServiceError;
use crate::capabilities::AdapterBindings;
use crate::interfaces::documents::document_file_name;
use crate::interfaces::{
    AudioClip, DailyPlan, Difficulty, LearnerContext, LearningPlan, PlanKind, PlanRequest,
    Playlist, PlaylistEntry, Progress, Video,
};
use crate::utilities::validation::{
    validate_duration, validate_learning_goal, MAX_DURATION_DAYS, MAX_GOAL_LENGTH,
    MIN_DURATION_DAYS,
};

/// Days that get video recommendations.
const VIDEO_DAYS: usize = 7;
const VIDEO_SEARCHES_PER_DAY: usize = 3;
const VIDEOS_PER_SEARCH: usize = 2;
const VIDEOS_PER_DAY: usize = 5;
const PLAYLIST_VIDEOS_PER_DAY: usize = 2;
const WORDS_PER_MINUTE: usize = 150;

/// A stored plan with its progress.
#[derive(Debug, Clone, Serialize)]
pub struct PathSummary {
    #[serde(flatten)]
    pub plan: LearningPlan,
    pub progress: Progress,
    pub completion_percentage: f64,
}

/// Suggested plan lengths for a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DurationEstimate {
    pub min_days: u32,
    pub recommended_days: u32,
    pub max_days: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// The rendered plan document.
    #[default]
    Document,
    Json,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "document" | "doc" | "md" | "markdown" => Ok(ExportFormat::Document),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("unsupported export format: {}", other)),
        }
    }
}

/// Export payload ready to be served as a download.
#[derive(Debug, Clone)]
pub struct ExportedPlan {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Bytes,
}

pub struct LearningService {
    bindings: AdapterBindings,
}

impl LearningService {
    pub fn new(bindings: AdapterBindings) -> Self {
        Self { bindings }
    }

    /// Generate, enrich, publish and save a new plan.
    ///
    /// Video lookup, document publishing and progress initialisation are
    /// best effort. Their failures are logged and the plan is still returned.
    pub async fn create_learning_path(
        &self,
        user_id: &str,
        request: &PlanRequest,
        context: &LearnerContext,
    ) -> Result<LearningPlan, ServiceError> {
        if !validate_learning_goal(&request.goal) {
            return Err(ServiceError::validation(format!(
                "learning goal must be 3 to {} characters and at least two words",
                MAX_GOAL_LENGTH
            )));
        }
        if !validate_duration(request.duration_days) {
            return Err(ServiceError::validation(format!(
                "duration must be between {} and {} days",
                MIN_DURATION_DAYS, MAX_DURATION_DAYS
            )));
        }

        let mut plan = match request.kind {
            PlanKind::Normal => self.bindings.content.generate_plan(request).await?,
            PlanKind::Adaptive => {
                self.bindings
                    .content
                    .generate_adaptive_plan(request, context)
                    .await?
            }
        };
        plan.created_at.get_or_insert_with(Utc::now);

        self.attach_videos(&mut plan).await;
        plan.playlist = Some(learning_playlist(&plan));
        for day in &mut plan.daily_plans {
            day.audio_duration = Some(estimate_audio_duration(day));
        }

        match self.bindings.docs.publish_plan(&plan).await {
            Ok(doc) => plan.document_url = Some(doc.url),
            Err(e) => log::warn!("Failed to publish plan document for {}: {}", user_id, e),
        }

        let path_id = self
            .bindings
            .storage
            .save_learning_path(user_id, &plan)
            .await?;
        self.init_progress(user_id, &path_id, plan.duration_days).await;

        log::info!(
            "Created {} learning path {} for {} ({} days)",
            plan.kind.as_str(),
            path_id,
            user_id,
            plan.duration_days
        );
        plan.id = Some(path_id);
        plan.user_id = Some(user_id.to_string());
        Ok(plan)
    }

    async fn attach_videos(&self, plan: &mut LearningPlan) {
        for day in plan.daily_plans.iter_mut().take(VIDEO_DAYS) {
            match self.videos_for_day(day).await {
                Ok(videos) => day.recommended_videos = videos,
                Err(e) => log::warn!("Video lookup failed for day {}: {}", day.day, e),
            }
        }
    }

    async fn videos_for_day(&self, day: &DailyPlan) -> Result<Vec<Video>, ServiceError> {
        let mut seen = HashSet::new();
        let mut videos = Vec::new();
        for query in video_queries(day).into_iter().take(VIDEO_SEARCHES_PER_DAY) {
            for video in self.bindings.video.search(&query, VIDEOS_PER_SEARCH).await? {
                if seen.insert(video.video_id.clone()) {
                    videos.push(video);
                }
            }
        }
        videos.truncate(VIDEOS_PER_DAY);
        Ok(videos)
    }

    /// Plans for a user, oldest first, with progress attached.
    pub async fn list_learning_paths(&self, user_id: &str) -> Result<Vec<PathSummary>, ServiceError> {
        let plans = self.bindings.storage.list_learning_paths(user_id).await?;
        let mut summaries = Vec::with_capacity(plans.len());
        for plan in plans {
            let progress = match &plan.id {
                Some(id) => self.bindings.storage.get_progress(user_id, id).await?,
                None => Progress::default(),
            };
            summaries.push(PathSummary {
                completion_percentage: completion_percentage(&progress, plan.duration_days),
                plan,
                progress,
            });
        }
        Ok(summaries)
    }

    pub async fn get_learning_path(
        &self,
        user_id: &str,
        path_id: &str,
    ) -> Result<LearningPlan, ServiceError> {
        self.bindings
            .storage
            .get_learning_path(user_id, path_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("learning path {}", path_id)))
    }

    pub async fn get_progress(&self, user_id: &str, path_id: &str) -> Result<Progress, ServiceError> {
        Ok(self.bindings.storage.get_progress(user_id, path_id).await?)
    }

    /// Mark a day complete or incomplete and return the updated progress.
    pub async fn update_daily_progress(
        &self,
        user_id: &str,
        path_id: &str,
        day: u32,
        completed: bool,
    ) -> Result<Progress, ServiceError> {
        let plan = self.get_learning_path(user_id, path_id).await?;
        if day < 1 || day > plan.duration_days {
            return Err(ServiceError::validation(format!(
                "day must be between 1 and {}",
                plan.duration_days
            )));
        }
        self.bindings
            .storage
            .update_progress(user_id, path_id, day, completed)
            .await?;
        self.get_progress(user_id, path_id).await
    }

    pub async fn export_learning_path(
        &self,
        user_id: &str,
        path_id: &str,
        format: ExportFormat,
    ) -> Result<ExportedPlan, ServiceError> {
        let plan = self.get_learning_path(user_id, path_id).await?;
        let file_name = document_file_name(&plan);
        match format {
            ExportFormat::Document => Ok(ExportedPlan {
                bytes: self.bindings.docs.export_plan(&plan).await?,
                file_name,
                mime_type: "text/markdown; charset=utf-8",
            }),
            ExportFormat::Json => {
                let json = serde_json::to_vec_pretty(&plan)
                    .map_err(|e| ServiceError::validation(format!("plan is not serializable: {}", e)))?;
                Ok(ExportedPlan {
                    bytes: Bytes::from(json),
                    file_name: file_name.replace(".md", ".json"),
                    mime_type: "application/json",
                })
            }
        }
    }

    /// Narrate one day of a plan.
    pub async fn narrate_day(
        &self,
        user_id: &str,
        path_id: &str,
        day: u32,
        voice_id: Option<&str>,
    ) -> Result<AudioClip, ServiceError> {
        let plan = self.get_learning_path(user_id, path_id).await?;
        let daily = plan
            .day(day)
            .ok_or_else(|| ServiceError::NotFound(format!("day {} of {}", day, path_id)))?;
        Ok(self
            .bindings
            .tts
            .synthesize(&narration_script(daily), voice_id)
            .await?)
    }

    /// Copy a plan under a new id with fresh progress.
    pub async fn duplicate_learning_path(
        &self,
        user_id: &str,
        path_id: &str,
    ) -> Result<LearningPlan, ServiceError> {
        let mut copy = self.get_learning_path(user_id, path_id).await?;
        copy.goal = format!("{} (Copy)", copy.goal);
        copy.id = None;
        copy.created_at = Some(Utc::now());

        let new_id = self.bindings.storage.save_learning_path(user_id, &copy).await?;
        self.init_progress(user_id, &new_id, copy.duration_days).await;
        copy.id = Some(new_id);
        Ok(copy)
    }

    /// Rework one day of a stored plan from learner feedback.
    ///
    /// Returns the reworked day; the stored plan is left unchanged.
    pub async fn enhance_day(
        &self,
        user_id: &str,
        path_id: &str,
        day: u32,
        feedback: &str,
    ) -> Result<DailyPlan, ServiceError> {
        let plan = self.get_learning_path(user_id, path_id).await?;
        let daily = plan
            .day(day)
            .ok_or_else(|| ServiceError::NotFound(format!("day {} of {}", day, path_id)))?;
        let mut enhanced = self.bindings.content.enhance_day(daily, feedback.trim()).await?;
        enhanced.day = daily.day;
        Ok(enhanced)
    }

    /// The plan's video playlist, rebuilt from its days when none was stored.
    pub async fn playlist(&self, user_id: &str, path_id: &str) -> Result<Playlist, ServiceError> {
        let plan = self.get_learning_path(user_id, path_id).await?;
        Ok(plan.playlist.clone().unwrap_or_else(|| learning_playlist(&plan)))
    }

    /// Mark every day incomplete. A missing entry already reads as
    /// incomplete, so failures are logged rather than returned.
    async fn init_progress(&self, user_id: &str, path_id: &str, duration_days: u32) {
        for day in 1..=duration_days {
            if let Err(e) = self
                .bindings
                .storage
                .update_progress(user_id, path_id, day, false)
                .await
            {
                log::warn!("Failed to initialise progress for {} day {}: {}", path_id, day, e);
                return;
            }
        }
    }
}

/// Playlist of the first week's recommended videos, two per day.
pub fn learning_playlist(plan: &LearningPlan) -> Playlist {
    let entries = plan
        .daily_plans
        .iter()
        .take(VIDEO_DAYS)
        .flat_map(|day| {
            day.recommended_videos
                .iter()
                .take(PLAYLIST_VIDEOS_PER_DAY)
                .map(move |video| PlaylistEntry {
                    day: day.day,
                    day_title: day.title.clone(),
                    video: video.clone(),
                })
        })
        .collect();
    Playlist {
        title: format!("Learning Path: {}", plan.goal),
        description: format!("Curated videos for your {} learning journey", plan.goal),
        entries,
    }
}

/// Search queries for a day: its title, then two objectives, then two key concepts.
fn video_queries(day: &DailyPlan) -> Vec<String> {
    std::iter::once(&day.title)
        .chain(day.objectives.iter().take(2))
        .chain(day.key_concepts.iter().take(2))
        .filter(|q| !q.trim().is_empty())
        .cloned()
        .collect()
}

/// Narration length at 150 words per minute, at least one minute.
pub fn estimate_audio_duration(day: &DailyPlan) -> String {
    let words = day.content.split_whitespace().count();
    format!("{}m", (words / WORDS_PER_MINUTE).max(1))
}

/// Script read aloud for a day.
pub fn narration_script(day: &DailyPlan) -> String {
    format!(
        "Welcome to {}.\n\n\
         Today's learning objectives are:\n{}\n\n\
         Here's what you'll be learning:\n{}\n\n\
         Your activities for today include:\n{}\n\n\
         Take your time with each activity and remember to practice what you learn.\n\
         Good luck with your learning journey today!",
        day.title,
        day.objectives.join(", "),
        day.content,
        day.activities.join(", ")
    )
}

/// Completed days over plan length, as a percentage; 0 for an empty plan.
pub fn completion_percentage(progress: &Progress, duration_days: u32) -> f64 {
    if duration_days == 0 {
        return 0.0;
    }
    progress.completed_count() as f64 / duration_days as f64 * 100.0
}

/// Suggested plan lengths based on difficulty and how demanding the goal sounds.
pub fn estimate_duration(goal: &str, difficulty: Difficulty) -> DurationEstimate {
    const DEMANDING: [&str; 5] = [
        "programming",
        "development",
        "advanced",
        "professional",
        "certification",
    ];

    let base: u32 = match difficulty {
        Difficulty::Beginner => 7,
        Difficulty::Intermediate => 14,
        Difficulty::Advanced => 21,
        Difficulty::Expert => 30,
    };
    let goal = goal.to_lowercase();
    let recommended = if DEMANDING.iter().any(|word| goal.contains(word)) {
        base * 3 / 2
    } else {
        base
    };

    DurationEstimate {
        min_days: recommended.saturating_sub(5).max(3),
        recommended_days: recommended,
        max_days: (recommended + 10).min(MAX_DURATION_DAYS),
    }
}
