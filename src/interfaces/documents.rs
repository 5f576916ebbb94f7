//! Plan documents: rendering and publishing.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tera::{Context, Tera};

use super::adapter::{AdapterError, CapabilityAdapter};
use super::content::{LearningPlan, PlanKind};

/// A published document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub id: String,
    pub name: String,
    /// Browser link; `demo://` scheme for demo documents.
    pub url: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait DocumentPublisher: CapabilityAdapter {
    /// Render the plan and publish it as a document.
    async fn publish_plan(&self, plan: &LearningPlan) -> Result<DocumentRef, AdapterError>;

    /// Rendered plan as downloadable bytes.
    async fn export_plan(&self, plan: &LearningPlan) -> Result<Bytes, AdapterError> {
        Ok(Bytes::from(render_plan_document(plan)?))
    }

    async fn list_documents(&self) -> Result<Vec<DocumentRef>, AdapterError>;
}

const PLAN_DOCUMENT: &str = r#"# {{ plan.goal }} - Learning Path

## Overview
- **Duration**: {{ plan.duration_days }} days
- **Difficulty**: {{ plan.difficulty }}
- **Type**: {{ kind_label }}
- **Description**: {{ plan.description }}

## Daily Learning Plan
{% for day in plan.daily_plans %}
### {{ day.title }}

**Estimated Time**: {{ day.estimated_time }}

**Learning Objectives**:
{% for item in day.objectives %}- {{ item }}
{% endfor %}
**Content**:
{{ day.content }}

**Activities**:
{% for item in day.activities %}- {{ item }}
{% endfor %}{% if day.key_concepts | length > 0 %}
**Key Concepts**:
{% for item in day.key_concepts %}- {{ item }}
{% endfor %}{% endif %}{% if day.resources | length > 0 %}
**Resources**:
{% for item in day.resources %}- {{ item }}
{% endfor %}{% endif %}
==================================================
{% endfor %}{% if adaptation_points | length > 0 %}
## Adaptive Checkpoints
{% for point in adaptation_points %}- {{ point }}
{% endfor %}{% endif %}
## Progress Tracking

Use this document to track your daily progress:

{% for day in tracking_days %}[ ] Day {{ day }}: _________________ (Date completed)
{% endfor %}
## Notes and Reflections

Use this space to write your thoughts, insights, and questions as you progress through the learning path:

_____________________________________________________________________
_____________________________________________________________________
_____________________________________________________________________

---
Generated by learnpath
Creation Date: {{ created }}
"#;

/// Render a plan as a Markdown document.
pub fn render_plan_document(plan: &LearningPlan) -> Result<String, AdapterError> {
    let mut ctx = Context::new();
    ctx.insert("plan", plan);
    ctx.insert(
        "kind_label",
        match plan.kind {
            PlanKind::Normal => "NORMAL",
            PlanKind::Adaptive => "ADAPTIVE",
        },
    );
    ctx.insert("adaptation_points", &plan.adaptation_points);
    ctx.insert("tracking_days", &(1..=plan.duration_days).collect::<Vec<_>>());
    ctx.insert(
        "created",
        &plan
            .created_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "Unknown".to_string()),
    );

    Tera::one_off(PLAN_DOCUMENT, &ctx, false).map_err(|e| AdapterError::Render(e.to_string()))
}

/// File name for a plan document: the goal reduced to `[A-Za-z0-9 _-]`,
/// spaces replaced by underscores.
pub fn document_file_name(plan: &LearningPlan) -> String {
    let safe: String = plan
        .goal
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    let safe = safe.trim_end().replace(' ', "_");
    let stem = if safe.is_empty() { "learning_path".to_string() } else { safe };
    format!("{}_learning_path.md", stem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::content::{DailyPlan, Difficulty};

    fn plan() -> LearningPlan {
        LearningPlan {
            id: None,
            user_id: None,
            goal: "Rust <async> basics".to_string(),
            duration_days: 2,
            difficulty: Difficulty::Intermediate,
            kind: PlanKind::Normal,
            description: "Futures and executors".to_string(),
            learning_strategy: None,
            adaptation_points: vec![],
            created_with_ai: false,
            created_at: None,
            document_url: None,
            playlist: None,
            daily_plans: vec![
                DailyPlan {
                    day: 1,
                    title: "Day 1: Futures".to_string(),
                    objectives: vec!["Poll a future".to_string()],
                    content: "Futures are lazy.".to_string(),
                    activities: vec!["Write an executor".to_string()],
                    estimated_time: "2-3 hours".to_string(),
                    key_concepts: vec!["Waker".to_string()],
                    ..Default::default()
                },
                DailyPlan {
                    day: 2,
                    title: "Day 2: Tokio".to_string(),
                    ..Default::default()
                },
            ],
        }
    }

    #[test]
    fn test_render_contains_days_and_tracking() {
        let doc = render_plan_document(&plan()).unwrap();
        assert!(doc.starts_with("# Rust <async> basics - Learning Path"));
        assert!(doc.contains("- **Type**: NORMAL"));
        assert!(doc.contains("### Day 1: Futures"));
        assert!(doc.contains("- Poll a future\n"));
        assert!(doc.contains("**Key Concepts**:\n- Waker\n"));
        assert!(doc.contains("[ ] Day 2: _________________"));
        assert!(!doc.contains("[ ] Day 3"));
        assert!(!doc.contains("## Adaptive Checkpoints"));
        assert!(doc.contains("Creation Date: Unknown"));
    }

    #[test]
    fn test_document_file_name_is_sanitized() {
        assert_eq!(document_file_name(&plan()), "Rust_async_basics_learning_path.md");
    }
}
