//! Google Drive document publisher.
//!
//! Uploads the rendered plan as a `multipart/related` body and asks Drive to
//! convert it into a Google Doc.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::http;
use crate::capabilities::{AdapterMode, Capability, Credential};
use crate::config::Settings;
use crate::interfaces::adapter::{AdapterError, CapabilityAdapter};
use crate::interfaces::content::LearningPlan;
use crate::interfaces::documents::{
    document_file_name, render_plan_document, DocumentPublisher, DocumentRef,
};

const VENDOR: &str = "Google Drive";
const GOOGLE_DOC: &str = "application/vnd.google-apps.document";
const FILE_FIELDS: &str = "id,name,mimeType,webViewLink,createdTime";

pub struct DrivePublisher {
    client: reqwest::Client,
    base_url: String,
    upload_url: String,
    token: Credential,
    fingerprint: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    web_view_link: Option<String>,
    #[serde(default)]
    created_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

impl From<DriveFile> for DocumentRef {
    fn from(file: DriveFile) -> Self {
        let url = file
            .web_view_link
            .unwrap_or_else(|| format!("https://docs.google.com/document/d/{}/edit", file.id));
        DocumentRef {
            id: file.id,
            name: file.name,
            url,
            mime_type: file.mime_type,
            created_at: file.created_time,
        }
    }
}

impl DrivePublisher {
    pub fn new(client: reqwest::Client, settings: &Settings, token: Credential) -> Self {
        let fingerprint = token.fingerprint();
        Self {
            client,
            base_url: settings.endpoints.drive.trim_end_matches('/').to_string(),
            upload_url: settings.endpoints.drive_upload.trim_end_matches('/').to_string(),
            token,
            fingerprint,
        }
    }
}

/// Body of a Drive multipart upload: JSON metadata, then the media part.
fn multipart_related(boundary: &str, metadata: &serde_json::Value, content: &str) -> String {
    format!(
        "--{b}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{meta}\r\n\
         --{b}\r\nContent-Type: text/plain; charset=UTF-8\r\n\r\n{content}\r\n--{b}--\r\n",
        b = boundary,
        meta = metadata,
        content = content,
    )
}

impl CapabilityAdapter for DrivePublisher {
    fn name(&self) -> &str {
        "Google Drive"
    }

    fn capability(&self) -> Capability {
        Capability::DocGen
    }

    fn mode(&self) -> AdapterMode {
        AdapterMode::Live
    }

    fn credential_fingerprint(&self) -> Option<&str> {
        Some(&self.fingerprint)
    }
}

#[async_trait]
impl DocumentPublisher for DrivePublisher {
    async fn publish_plan(&self, plan: &LearningPlan) -> Result<DocumentRef, AdapterError> {
        let content = render_plan_document(plan)?;
        let name = document_file_name(plan)
            .trim_end_matches(".md")
            .to_string();
        let boundary = format!("learnpath-{}", Uuid::new_v4().simple());
        let metadata = json!({ "name": name, "mimeType": GOOGLE_DOC });

        let request = self
            .client
            .post(format!("{}/files", self.upload_url))
            .query(&[("uploadType", "multipart"), ("fields", FILE_FIELDS)])
            .bearer_auth(self.token.expose())
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .body(multipart_related(&boundary, &metadata, &content));
        let file: DriveFile = http::send_json(VENDOR, request).await?;
        log::info!("Published plan document {} to Drive", file.id);
        Ok(file.into())
    }

    async fn list_documents(&self) -> Result<Vec<DocumentRef>, AdapterError> {
        let fields = format!("files({})", FILE_FIELDS);
        let query = format!("mimeType='{}' and trashed=false", GOOGLE_DOC);
        let request = self
            .client
            .get(format!("{}/files", self.base_url))
            .query(&[
                ("pageSize", "50"),
                ("orderBy", "createdTime desc"),
                ("q", query.as_str()),
                ("fields", fields.as_str()),
            ])
            .bearer_auth(self.token.expose());
        let list: FileList = http::send_json(VENDOR, request).await?;
        Ok(list.files.into_iter().map(DocumentRef::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::content::{DailyPlan, Difficulty, PlanKind};
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn publisher(server: &MockServer) -> DrivePublisher {
        let mut settings = Settings::default();
        settings.endpoints.drive = format!("{}/drive/v3", server.uri());
        settings.endpoints.drive_upload = format!("{}/upload/drive/v3", server.uri());
        let token = Credential::parse(Capability::DocGen, "ya29.drive").unwrap().unwrap();
        DrivePublisher::new(reqwest::Client::new(), &settings, token)
    }

    fn plan() -> LearningPlan {
        LearningPlan {
            id: Some("path_1".to_string()),
            user_id: Some("u1".to_string()),
            goal: "Learn SQL joins".to_string(),
            duration_days: 1,
            difficulty: Difficulty::Beginner,
            kind: PlanKind::Normal,
            description: "Joins".to_string(),
            learning_strategy: None,
            adaptation_points: vec![],
            created_with_ai: false,
            created_at: None,
            document_url: None,
            playlist: None,
            daily_plans: vec![DailyPlan {
                day: 1,
                title: "Day 1: Inner joins".to_string(),
                ..Default::default()
            }],
        }
    }

    #[tokio::test]
    async fn test_publish_uploads_multipart_document() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload/drive/v3/files"))
            .and(query_param("uploadType", "multipart"))
            .and(header("authorization", "Bearer ya29.drive"))
            .and(body_string_contains("\"name\":\"Learn_SQL_joins_learning_path\""))
            .and(body_string_contains("### Day 1: Inner joins"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "doc-1",
                "name": "Learn_SQL_joins_learning_path",
                "mimeType": GOOGLE_DOC,
                "webViewLink": "https://docs.google.com/document/d/doc-1/edit"
            })))
            .mount(&server)
            .await;

        let doc = publisher(&server).publish_plan(&plan()).await.unwrap();
        assert_eq!(doc.id, "doc-1");
        assert_eq!(doc.url, "https://docs.google.com/document/d/doc-1/edit");
    }

    #[tokio::test]
    async fn test_list_documents() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drive/v3/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "files": [{"id": "d1", "name": "Plan", "mimeType": GOOGLE_DOC,
                           "createdTime": "2024-01-01T00:00:00.000Z"}]
            })))
            .mount(&server)
            .await;

        let docs = publisher(&server).list_documents().await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].url, "https://docs.google.com/document/d/d1/edit");
        assert!(docs[0].created_at.is_some());
    }

    #[tokio::test]
    async fn test_export_renders_locally() {
        let server = MockServer::start().await;
        let bytes = publisher(&server).export_plan(&plan()).await.unwrap();
        assert!(String::from_utf8(bytes.to_vec()).unwrap().contains("# Learn SQL joins - Learning Path"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
