//! Cloud Firestore store via the REST API.
//!
//! Collections:
//!
//! | collection       | document id            | contents               |
//! |------------------|------------------------|------------------------|
//! | `users`          | user id                | `UserProfile`          |
//! | `learning_paths` | `path_<uuid>`          | `LearningPlan`         |
//! | `progress`       | `{user_id}_{path_id}`  | `Progress`             |
//! | `notifications`  | uuid                   | `NotificationRecord`   |
//!
//! Documents are plain serde values converted to and from Firestore's typed
//! value encoding (`stringValue`, `mapValue`, ...).

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::http;
use crate::capabilities::{AdapterMode, Capability, Credential};
use crate::config::Settings;
use crate::fixtures::progress_key;
use crate::interfaces::adapter::{AdapterError, CapabilityAdapter};
use crate::interfaces::content::LearningPlan;
use crate::interfaces::storage::{
    new_path_id, LearningStore, NotificationRecord, NotificationSettings, Progress, UserProfile,
};

const VENDOR: &str = "Firestore";

const USERS: &str = "users";
const LEARNING_PATHS: &str = "learning_paths";
const PROGRESS: &str = "progress";
const NOTIFICATIONS: &str = "notifications";

/// Live [`LearningStore`] backed by Firestore.
pub struct FirestoreStore {
    client: reqwest::Client,
    documents_url: String,
    credential: Credential,
    fingerprint: String,
}

impl FirestoreStore {
    /// `credential` is `project_id:access_token`.
    pub fn new(client: reqwest::Client, settings: &Settings, credential: Credential) -> Self {
        let project = credential.pair().map(|(p, _)| p).unwrap_or_default();
        let documents_url = format!(
            "{}/projects/{}/databases/(default)/documents",
            settings.endpoints.firestore.trim_end_matches('/'),
            project
        );
        let fingerprint = credential.fingerprint();
        Self {
            client,
            documents_url,
            credential,
            fingerprint,
        }
    }

    fn token(&self) -> &str {
        self.credential.pair().map(|(_, t)| t).unwrap_or_default()
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.documents_url, collection, id)
    }

    async fn get_document<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<T>, AdapterError> {
        let request = self
            .client
            .get(self.document_url(collection, id))
            .bearer_auth(self.token());
        let document: Value = match http::send_json(VENDOR, request).await {
            Ok(doc) => doc,
            Err(AdapterError::Api { status: 404, .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        decode_document(&document).map(Some)
    }

    async fn set_document<T: Serialize>(
        &self,
        collection: &str,
        id: &str,
        value: &T,
        mask: Option<&str>,
    ) -> Result<(), AdapterError> {
        let fields = encode_fields(value)?;
        let mut request = self
            .client
            .patch(self.document_url(collection, id))
            .bearer_auth(self.token())
            .json(&json!({ "fields": fields }));
        if let Some(field) = mask {
            request = request.query(&[("updateMask.fieldPaths", field)]);
        }
        http::send(VENDOR, request).await?;
        Ok(())
    }

    /// Documents in `collection` whose `field` equals `value`.
    async fn query_equal<T: DeserializeOwned>(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<T>, AdapterError> {
        let body = json!({
            "structuredQuery": {
                "from": [{"collectionId": collection}],
                "where": {
                    "fieldFilter": {
                        "field": {"fieldPath": field},
                        "op": "EQUAL",
                        "value": {"stringValue": value}
                    }
                }
            }
        });
        let request = self
            .client
            .post(format!("{}:runQuery", self.documents_url))
            .bearer_auth(self.token())
            .json(&body);
        let rows: Vec<Value> = http::send_json(VENDOR, request).await?;
        rows.iter()
            .filter_map(|row| row.get("document"))
            .map(decode_document)
            .collect()
    }
}

/// Serialize a value and convert its top-level object into Firestore fields.
fn encode_fields<T: Serialize>(value: &T) -> Result<Map<String, Value>, AdapterError> {
    match serde_json::to_value(value).map_err(|e| AdapterError::decode(VENDOR, e))? {
        Value::Object(obj) => Ok(obj.iter().map(|(k, v)| (k.clone(), encode_value(v))).collect()),
        _ => Err(AdapterError::InvalidInput("document must be an object".to_string())),
    }
}

fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64().unwrap_or_default() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            json!({ "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() } })
        }
        Value::Object(obj) => {
            let fields: Map<String, Value> =
                obj.iter().map(|(k, v)| (k.clone(), encode_value(v))).collect();
            json!({ "mapValue": { "fields": fields } })
        }
    }
}

fn decode_value(value: &Value) -> Value {
    let Some((kind, inner)) = value.as_object().and_then(|o| o.iter().next()) else {
        return Value::Null;
    };
    match kind.as_str() {
        "booleanValue" => inner.clone(),
        "integerValue" => inner
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .map(Value::from)
            .unwrap_or_else(|| inner.clone()),
        "doubleValue" => inner.clone(),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner.clone(),
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(|v| v.as_array())
                .map(|items| items.iter().map(decode_value).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => Value::Object(decode_map(inner.get("fields"))),
        _ => Value::Null,
    }
}

fn decode_map(fields: Option<&Value>) -> Map<String, Value> {
    fields
        .and_then(|f| f.as_object())
        .map(|f| f.iter().map(|(k, v)| (k.clone(), decode_value(v))).collect())
        .unwrap_or_default()
}

fn decode_document<T: DeserializeOwned>(document: &Value) -> Result<T, AdapterError> {
    let value = Value::Object(decode_map(document.get("fields")));
    serde_json::from_value(value).map_err(|e| AdapterError::decode(VENDOR, e))
}

impl CapabilityAdapter for FirestoreStore {
    fn name(&self) -> &str {
        "Firestore"
    }

    fn capability(&self) -> Capability {
        Capability::Storage
    }

    fn mode(&self) -> AdapterMode {
        AdapterMode::Live
    }

    fn credential_fingerprint(&self) -> Option<&str> {
        Some(&self.fingerprint)
    }
}

#[async_trait]
impl LearningStore for FirestoreStore {
    async fn create_user_profile(&self, profile: &UserProfile) -> Result<(), AdapterError> {
        self.set_document(USERS, &profile.user_id, profile, None).await
    }

    async fn get_user_profile(&self, user_id: &str) -> Result<Option<UserProfile>, AdapterError> {
        self.get_document(USERS, user_id).await
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
        self.set_document(LEARNING_PATHS, &path_id, &stored, None).await?;
        log::info!("Saved learning path {} for {}", path_id, user_id);
        Ok(path_id)
    }

    async fn list_learning_paths(&self, user_id: &str) -> Result<Vec<LearningPlan>, AdapterError> {
        let mut plans: Vec<LearningPlan> =
            self.query_equal(LEARNING_PATHS, "user_id", user_id).await?;
        plans.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(plans)
    }

    async fn get_learning_path(
        &self,
        user_id: &str,
        path_id: &str,
    ) -> Result<Option<LearningPlan>, AdapterError> {
        let plan: Option<LearningPlan> = self.get_document(LEARNING_PATHS, path_id).await?;
        Ok(plan.filter(|p| p.user_id.as_deref() == Some(user_id)))
    }

    async fn update_progress(
        &self,
        user_id: &str,
        path_id: &str,
        day: u32,
        completed: bool,
    ) -> Result<(), AdapterError> {
        let key = progress_key(user_id, path_id);
        let mut progress: Progress = self.get_document(PROGRESS, &key).await?.unwrap_or_default();
        progress.completed_days.insert(day, completed);
        progress.last_updated = Some(Utc::now());
        self.set_document(PROGRESS, &key, &progress, None).await
    }

    async fn get_progress(&self, user_id: &str, path_id: &str) -> Result<Progress, AdapterError> {
        Ok(self
            .get_document(PROGRESS, &progress_key(user_id, path_id))
            .await?
            .unwrap_or_default())
    }

    async fn save_notification_settings(
        &self,
        user_id: &str,
        settings: &NotificationSettings,
    ) -> Result<(), AdapterError> {
        self.set_document(
            USERS,
            user_id,
            &json!({ "notification_settings": settings }),
            Some("notification_settings"),
        )
        .await
    }

    async fn log_notification(&self, record: &NotificationRecord) -> Result<(), AdapterError> {
        let id = Uuid::new_v4().simple().to_string();
        self.set_document(NOTIFICATIONS, &id, record, None).await
    }

    async fn notification_history(
        &self,
        user_id: &str,
    ) -> Result<Vec<NotificationRecord>, AdapterError> {
        let mut records: Vec<NotificationRecord> =
            self.query_equal(NOTIFICATIONS, "user_id", user_id).await?;
        records.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DOCS: &str = "/projects/learn-path-42/databases/(default)/documents";

    fn store(server: &MockServer) -> FirestoreStore {
        let mut settings = Settings::default();
        settings.endpoints.firestore = server.uri();
        let credential = Credential::parse(Capability::Storage, "learn-path-42:ya29.token")
            .unwrap()
            .unwrap();
        FirestoreStore::new(reqwest::Client::new(), &settings, credential)
    }

    #[test]
    fn test_value_encoding_round_trips_nested_documents() {
        let original = json!({
            "goal": "SQL joins",
            "duration_days": 3,
            "score": 0.5,
            "done": false,
            "tags": ["a", "b"],
            "completed_days": {"1": true},
            "note": null
        });
        let fields = encode_fields(&original).unwrap();
        assert_eq!(fields["duration_days"], json!({"integerValue": "3"}));
        assert_eq!(fields["completed_days"]["mapValue"]["fields"]["1"], json!({"booleanValue": true}));
        let decoded: Value = decode_document(&json!({ "fields": fields })).unwrap();
        assert_eq!(decoded, original);
    }

    #[tokio::test]
    async fn test_missing_progress_document_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/progress/u1_p1", DOCS)))
            .and(header("authorization", "Bearer ya29.token"))
            .respond_with(ResponseTemplate::new(404).set_body_json(
                json!({"error": {"code": 404, "message": "not found", "status": "NOT_FOUND"}}),
            ))
            .mount(&server)
            .await;

        let progress = store(&server).get_progress("u1", "p1").await.unwrap();
        assert_eq!(progress, Progress::default());
    }

    #[tokio::test]
    async fn test_get_learning_path_checks_owner() {
        let server = MockServer::start().await;
        let plan = LearningPlan {
            id: Some("path_1".to_string()),
            user_id: Some("owner".to_string()),
            goal: "SQL joins".to_string(),
            duration_days: 1,
            difficulty: Default::default(),
            kind: Default::default(),
            description: String::new(),
            learning_strategy: None,
            adaptation_points: vec![],
            created_with_ai: false,
            created_at: None,
            document_url: None,
            playlist: None,
            daily_plans: vec![],
        };
        let fields = encode_fields(&plan).unwrap();
        Mock::given(method("GET"))
            .and(path(format!("{}/learning_paths/path_1", DOCS)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "projects/learn-path-42/databases/(default)/documents/learning_paths/path_1",
                "fields": fields
            })))
            .mount(&server)
            .await;

        let store = store(&server);
        assert_eq!(store.get_learning_path("owner", "path_1").await.unwrap(), Some(plan));
        assert!(store.get_learning_path("someone-else", "path_1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_notification_settings_use_update_mask() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path(format!("{}/users/u1", DOCS)))
            .and(query_param("updateMask.fieldPaths", "notification_settings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let settings = NotificationSettings {
            path_id: "p1".to_string(),
            phone_number: "+15550100199".to_string(),
            channel: Default::default(),
            reminder_time: "09:00".to_string(),
            weekdays: vec![1, 3, 5],
            active: true,
        };
        store(&server)
            .save_notification_settings("u1", &settings)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_list_learning_paths_runs_query() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("{}:runQuery", DOCS)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"readTime": "2024-01-01T00:00:00Z"}
            ])))
            .mount(&server)
            .await;

        let plans = store(&server).list_learning_paths("u1").await.unwrap();
        assert!(plans.is_empty());
    }
}
