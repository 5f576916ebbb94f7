use async_trait::async_trait;
use chrono::Utc;

use crate::capabilities::{AdapterMode, Capability};
use crate::interfaces::adapter::{AdapterError, CapabilityAdapter};
use crate::interfaces::content::{
    ContentGenerator, DailyPlan, LearnerContext, LearningPlan, PlanKind, PlanRequest,
};

/// Templated plans, built from the request alone.
#[derive(Debug, Default, Clone)]
pub struct DemoContentGenerator;

impl DemoContentGenerator {
    pub fn new() -> Self {
        Self
    }

    fn normal_day(request: &PlanRequest, day: u32) -> DailyPlan {
        let goal = request.goal.trim();
        let difficulty = request.difficulty.as_str();
        let title = if day == 1 {
            format!("Day {}: Introduction to {}", day, goal)
        } else {
            format!("Day {}: Advanced {} Concepts", day, goal)
        };
        let (practice_objective, practice_activity) = if request.include_practice {
            ("Complete practical exercises", "Complete hands-on exercises")
        } else {
            ("Review theoretical concepts", "Review key concepts")
        };

        DailyPlan {
            day,
            title,
            objectives: vec![
                format!("Understand key concepts of {}", goal),
                format!("Apply {} level techniques", difficulty),
                practice_objective.to_string(),
            ],
            content: format!(
                "This is day {} of your {} learning journey. Focus on building foundational \
                 knowledge and applying concepts through practice.",
                day, goal
            ),
            activities: vec![
                format!("Read about {} fundamentals", goal),
                format!("Watch educational videos on {}", goal),
                practice_activity.to_string(),
            ],
            estimated_time: "2-3 hours".to_string(),
            resources: vec![
                format!("Introduction to {} - Online Tutorial", goal),
                format!("{} Best Practices Guide", goal),
                format!("Practice exercises for {}", goal),
            ],
            key_concepts: vec![
                format!("{} fundamentals", goal),
                format!("{} level applications", difficulty),
                "Real-world examples".to_string(),
            ],
            ..Default::default()
        }
    }

    fn adaptive_day(request: &PlanRequest, day: u32) -> DailyPlan {
        let goal = request.goal.trim();
        DailyPlan {
            day,
            title: format!("Day {}: Adaptive {} Learning", day, goal),
            objectives: vec![
                format!("Context-aware learning of {}", goal),
                format!("Metacognitive reflection on {}", goal),
                "Adaptive skill development".to_string(),
            ],
            content: format!(
                "Day {} focuses on adaptive learning strategies for {}, adjusting to your \
                 learning style and progress.",
                day, goal
            ),
            activities: vec![
                format!("Adaptive exercises in {}", goal),
                "Self-assessment and reflection".to_string(),
                "Progress-based activity selection".to_string(),
            ],
            estimated_time: "Flexible 1-3 hours".to_string(),
            resources: vec![
                format!("Adaptive {} Resources", goal),
                "Metacognitive Learning Guide".to_string(),
                "Progress Tracking Tools".to_string(),
            ],
            key_concepts: vec![
                format!("Adaptive {} concepts", goal),
                "Learning strategy awareness".to_string(),
                "Progress self-monitoring".to_string(),
            ],
            checkpoint: Some(format!("Day {} progress assessment", day)),
            alternatives: vec![
                format!("Alternative approach for {}", goal),
                format!("Advanced {} path option", goal),
            ],
            metacognitive_element: Some(
                "Reflection on your learning process and strategy adjustment".to_string(),
            ),
            ..Default::default()
        }
    }
}

/// Checkpoints every third day, strictly before the last day.
pub(crate) fn adaptation_points(duration_days: u32) -> Vec<String> {
    (3..duration_days)
        .step_by(3)
        .map(|day| format!("Day {}: Progress checkpoint", day))
        .collect()
}

impl CapabilityAdapter for DemoContentGenerator {
    fn name(&self) -> &str {
        "Demo content generator"
    }

    fn capability(&self) -> Capability {
        Capability::ContentGen
    }

    fn mode(&self) -> AdapterMode {
        AdapterMode::Demo
    }
}

#[async_trait]
impl ContentGenerator for DemoContentGenerator {
    async fn generate_plan(&self, request: &PlanRequest) -> Result<LearningPlan, AdapterError> {
        let goal = request.goal.trim().to_string();
        let days = request.duration_days;
        Ok(LearningPlan {
            id: None,
            user_id: None,
            description: format!(
                "A comprehensive {}-day journey to master {} at {} level",
                days, goal, request.difficulty
            ),
            goal,
            duration_days: days,
            difficulty: request.difficulty,
            kind: PlanKind::Normal,
            learning_strategy: None,
            adaptation_points: Vec::new(),
            created_with_ai: false,
            created_at: Some(Utc::now()),
            document_url: None,
            playlist: None,
            daily_plans: (1..=days).map(|d| Self::normal_day(request, d)).collect(),
        })
    }

    async fn generate_adaptive_plan(
        &self,
        request: &PlanRequest,
        _context: &LearnerContext,
    ) -> Result<LearningPlan, AdapterError> {
        let goal = request.goal.trim().to_string();
        let days = request.duration_days;
        Ok(LearningPlan {
            id: None,
            user_id: None,
            description: format!(
                "An adaptive, context-aware {}-day learning path for {}",
                days, goal
            ),
            goal,
            duration_days: days,
            difficulty: request.difficulty,
            kind: PlanKind::Adaptive,
            learning_strategy: Some(
                "Context-aware approach with adaptive content delivery".to_string(),
            ),
            adaptation_points: adaptation_points(days),
            created_with_ai: false,
            created_at: Some(Utc::now()),
            document_url: None,
            playlist: None,
            daily_plans: (1..=days).map(|d| Self::adaptive_day(request, d)).collect(),
        })
    }

    async fn enhance_day(&self, day: &DailyPlan, _feedback: &str) -> Result<DailyPlan, AdapterError> {
        Ok(day.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::content::Difficulty;

    #[tokio::test]
    async fn test_normal_plan_templates() {
        let request = PlanRequest::new("Python programming", 3, Difficulty::Intermediate);
        let plan = DemoContentGenerator::new().generate_plan(&request).await.unwrap();
        assert_eq!(plan.daily_plans.len(), 3);
        assert_eq!(plan.daily_plans[0].title, "Day 1: Introduction to Python programming");
        assert_eq!(plan.daily_plans[2].title, "Day 3: Advanced Python programming Concepts");
        assert_eq!(plan.daily_plans[1].objectives[1], "Apply intermediate level techniques");
        assert_eq!(
            plan.description,
            "A comprehensive 3-day journey to master Python programming at intermediate level"
        );
        assert!(!plan.created_with_ai);
        assert!(plan.adaptation_points.is_empty());
    }

    #[tokio::test]
    async fn test_practice_toggle() {
        let mut request = PlanRequest::new("Music theory", 1, Difficulty::Beginner);
        request.include_practice = false;
        let plan = DemoContentGenerator::new().generate_plan(&request).await.unwrap();
        assert_eq!(plan.daily_plans[0].objectives[2], "Review theoretical concepts");
        assert_eq!(plan.daily_plans[0].activities[2], "Review key concepts");
    }

    #[tokio::test]
    async fn test_adaptive_plan_checkpoints() {
        let request = PlanRequest::new("Data science", 10, Difficulty::Beginner).adaptive();
        let plan = DemoContentGenerator::new()
            .generate_adaptive_plan(&request, &LearnerContext::default())
            .await
            .unwrap();
        assert_eq!(plan.kind, PlanKind::Adaptive);
        assert_eq!(
            plan.adaptation_points,
            vec![
                "Day 3: Progress checkpoint",
                "Day 6: Progress checkpoint",
                "Day 9: Progress checkpoint"
            ]
        );
        let day = plan.day(4).unwrap();
        assert_eq!(day.title, "Day 4: Adaptive Data science Learning");
        assert_eq!(day.checkpoint.as_deref(), Some("Day 4 progress assessment"));
        assert_eq!(day.alternatives.len(), 2);
    }

    #[test]
    fn test_short_plans_have_no_checkpoints() {
        assert!(adaptation_points(3).is_empty());
        assert_eq!(adaptation_points(4), vec!["Day 3: Progress checkpoint"]);
    }

    #[tokio::test]
    async fn test_enhance_returns_day_unchanged() {
        let day = DailyPlan {
            day: 2,
            title: "Day 2".to_string(),
            ..Default::default()
        };
        let enhanced = DemoContentGenerator::new()
            .enhance_day(&day, "too hard")
            .await
            .unwrap();
        assert_eq!(enhanced, day);
    }
}
