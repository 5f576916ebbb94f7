use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::capabilities::{AdapterMode, Capability};
use crate::fixtures::FixtureStore;
use crate::interfaces::adapter::{AdapterError, CapabilityAdapter};
use crate::interfaces::content::LearningPlan;
use crate::interfaces::documents::{
    document_file_name, render_plan_document, DocumentPublisher, DocumentRef,
};

/// Renders plans in memory and hands out `demo://` links.
pub struct DemoDocumentPublisher {
    fixtures: Arc<FixtureStore>,
    published: DashMap<String, (DocumentRef, String)>,
}

impl DemoDocumentPublisher {
    pub fn new(fixtures: Arc<FixtureStore>) -> Self {
        Self {
            fixtures,
            published: DashMap::new(),
        }
    }

    /// Rendered body of a document published in this process.
    pub fn content(&self, document_id: &str) -> Option<String> {
        self.published
            .get(document_id)
            .map(|entry| entry.value().1.clone())
    }
}

impl CapabilityAdapter for DemoDocumentPublisher {
    fn name(&self) -> &str {
        "Demo documents"
    }

    fn capability(&self) -> Capability {
        Capability::DocGen
    }

    fn mode(&self) -> AdapterMode {
        AdapterMode::Demo
    }
}

#[async_trait]
impl DocumentPublisher for DemoDocumentPublisher {
    async fn publish_plan(&self, plan: &LearningPlan) -> Result<DocumentRef, AdapterError> {
        let content = render_plan_document(plan)?;
        let id = format!("demo_doc_{}", Uuid::new_v4().simple());
        let doc = DocumentRef {
            url: format!("demo://documents/{}", id),
            id: id.clone(),
            name: document_file_name(plan),
            mime_type: "text/markdown".to_string(),
            created_at: Some(Utc::now()),
        };
        self.published.insert(id, (doc.clone(), content));
        Ok(doc)
    }

    async fn list_documents(&self) -> Result<Vec<DocumentRef>, AdapterError> {
        let mut published: Vec<DocumentRef> = self
            .published
            .iter()
            .map(|entry| entry.value().0.clone())
            .collect();
        published.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let mut documents = self.fixtures.documents().to_vec();
        documents.extend(published);
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::content::{Difficulty, PlanKind};

    fn plan() -> LearningPlan {
        LearningPlan {
            id: Some("path_x".to_string()),
            user_id: Some("u1".to_string()),
            goal: "Learn Kotlin coroutines".to_string(),
            duration_days: 2,
            difficulty: Difficulty::Advanced,
            kind: PlanKind::Adaptive,
            description: "Structured concurrency".to_string(),
            learning_strategy: None,
            adaptation_points: vec!["Day 3: Progress checkpoint".to_string()],
            created_with_ai: false,
            created_at: None,
            document_url: None,
            playlist: None,
            daily_plans: vec![],
        }
    }

    #[tokio::test]
    async fn test_publish_then_list() {
        let publisher = DemoDocumentPublisher::new(Arc::new(FixtureStore::embedded().unwrap()));
        let doc = publisher.publish_plan(&plan()).await.unwrap();
        assert!(doc.url.starts_with("demo://documents/demo_doc_"));
        assert_eq!(doc.name, "Learn_Kotlin_coroutines_learning_path.md");

        let body = publisher.content(&doc.id).unwrap();
        assert!(body.contains("- **Type**: ADAPTIVE"));
        assert!(body.contains("## Adaptive Checkpoints"));

        let listed = publisher.list_documents().await.unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[2].id, doc.id);
    }
}
