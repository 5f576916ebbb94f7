//! Content generation: learning plans and their daily breakdown.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::adapter::{AdapterError, CapabilityAdapter};
use super::video::{Playlist, Video};

/// Learner-declared difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
            Difficulty::Expert => "expert",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            "expert" => Ok(Difficulty::Expert),
            other => Err(format!("unknown difficulty: {}", other)),
        }
    }
}

/// Regular plans follow a fixed curriculum; adaptive plans carry
/// checkpoints, alternatives and reflection prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlanKind {
    #[default]
    Normal,
    Adaptive,
}

impl PlanKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanKind::Normal => "normal",
            PlanKind::Adaptive => "adaptive",
        }
    }
}

/// What the learner asked for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRequest {
    pub goal: String,
    #[serde(default = "default_duration")]
    pub duration_days: u32,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub kind: PlanKind,
    #[serde(default = "default_true")]
    pub include_practice: bool,
}

fn default_duration() -> u32 {
    7
}

fn default_true() -> bool {
    true
}

impl PlanRequest {
    pub fn new(goal: impl Into<String>, duration_days: u32, difficulty: Difficulty) -> Self {
        Self {
            goal: goal.into(),
            duration_days,
            difficulty,
            kind: PlanKind::Normal,
            include_practice: true,
        }
    }

    pub fn adaptive(mut self) -> Self {
        self.kind = PlanKind::Adaptive;
        self
    }
}

/// Extra learner context used for adaptive plans.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LearnerContext {
    #[serde(default)]
    pub previous_learning: Option<String>,
    #[serde(default)]
    pub learning_style: Option<String>,
    #[serde(default)]
    pub time_per_day: Option<String>,
    #[serde(default)]
    pub interests: Option<String>,
    #[serde(default)]
    pub current_level: Option<String>,
}

/// One day of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DailyPlan {
    pub day: u32,
    pub title: String,
    #[serde(default)]
    pub objectives: Vec<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default)]
    pub estimated_time: String,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub key_concepts: Vec<String>,

    // adaptive-only fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metacognitive_element: Option<String>,

    // filled in by the learning service
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommended_videos: Vec<Video>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_duration: Option<String>,
}

/// A generated learning plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningPlan {
    /// Assigned by storage on save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub goal: String,
    pub duration_days: u32,
    pub difficulty: Difficulty,
    #[serde(rename = "type", default)]
    pub kind: PlanKind,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_strategy: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub adaptation_points: Vec<String>,
    #[serde(default)]
    pub created_with_ai: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_url: Option<String>,
    /// Videos from the first week, two per day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist: Option<Playlist>,
    pub daily_plans: Vec<DailyPlan>,
}

impl LearningPlan {
    pub fn day(&self, day: u32) -> Option<&DailyPlan> {
        self.daily_plans.iter().find(|d| d.day == day)
    }
}

/// Generates learning plans.
#[async_trait]
pub trait ContentGenerator: CapabilityAdapter {
    /// Generate a fixed-curriculum plan.
    async fn generate_plan(&self, request: &PlanRequest) -> Result<LearningPlan, AdapterError>;

    /// Generate an adaptive plan shaped by learner context.
    async fn generate_adaptive_plan(
        &self,
        request: &PlanRequest,
        context: &LearnerContext,
    ) -> Result<LearningPlan, AdapterError>;

    /// Rework one day in response to learner feedback.
    ///
    /// Empty feedback returns the day unchanged.
    async fn enhance_day(&self, day: &DailyPlan, feedback: &str) -> Result<DailyPlan, AdapterError>;
}
