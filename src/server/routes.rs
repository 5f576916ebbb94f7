//! Axum route handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::capabilities::AdapterBindings;
use crate::interfaces::{
    AdapterError, Channel, Difficulty, LearnerContext, NotificationKind, PlanRequest, UserProfile,
};
use crate::services::{
    estimate_duration, ExportFormat, LearningService, NotificationService, ReminderSettings,
    ServiceError,
};
use crate::utilities::validation::validate_email;

const MAX_VIDEO_RESULTS: usize = 50;

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    pub bindings: AdapterBindings,
    pub learning: Arc<LearningService>,
    pub notifications: Arc<NotificationService>,
}

impl AppState {
    pub fn new(bindings: AdapterBindings) -> Self {
        Self {
            learning: Arc::new(LearningService::new(bindings.clone())),
            notifications: Arc::new(NotificationService::new(bindings.clone())),
            bindings,
        }
    }
}

type ApiError = (StatusCode, Json<Value>);
type ApiResult<T> = Result<T, ApiError>;

fn error_response(err: ServiceError) -> ApiError {
    let status = match &err {
        ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Adapter(adapter) => match adapter {
            AdapterError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AdapterError::AuthenticationFailed(_) => StatusCode::UNAUTHORIZED,
            AdapterError::NotFound(_) => StatusCode::NOT_FOUND,
            AdapterError::Conflict(_) => StatusCode::CONFLICT,
            AdapterError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_GATEWAY,
        },
    };
    if status.is_server_error() {
        tracing::warn!(error = %err, status = status.as_u16(), "request failed");
    }
    (status, Json(json!({ "error": err.to_string() })))
}

fn bad_request(message: impl Into<String>) -> ApiError {
    error_response(ServiceError::Validation(message.into()))
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/capabilities", get(capabilities_handler))
        .route("/auth/signup", post(sign_up_handler))
        .route("/auth/signin", post(sign_in_handler))
        .route("/estimate", get(estimate_handler))
        .route(
            "/users/:user_id/paths",
            get(list_paths_handler).post(create_path_handler),
        )
        .route("/users/:user_id/paths/:path_id", get(get_path_handler))
        .route(
            "/users/:user_id/paths/:path_id/progress",
            post(progress_handler),
        )
        .route("/users/:user_id/paths/:path_id/export", get(export_handler))
        .route(
            "/users/:user_id/paths/:path_id/duplicate",
            post(duplicate_handler),
        )
        .route(
            "/users/:user_id/paths/:path_id/days/:day/audio",
            get(narration_handler),
        )
        .route(
            "/users/:user_id/paths/:path_id/days/:day/enhance",
            post(enhance_handler),
        )
        .route(
            "/users/:user_id/paths/:path_id/playlist",
            get(playlist_handler),
        )
        .route(
            "/users/:user_id/paths/:path_id/reminders",
            post(reminders_handler).delete(cancel_reminders_handler),
        )
        .route("/users/:user_id/paths/:path_id/notify", post(notify_handler))
        .route("/users/:user_id/notifications", get(history_handler))
        .route("/notifications/test", post(test_notification_handler))
        .route("/videos", get(videos_handler))
        .route("/videos/:video_id", get(video_details_handler))
        .route("/channels", get(channels_handler))
        .route("/tts", post(tts_handler))
        .route("/tts/voices", get(voices_handler))
        .route("/documents", get(documents_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// GET /health: liveness probe.
async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": crate::VERSION,
        "service": "learnpath",
    }))
}

/// GET /capabilities: which adapter serves each capability.
async fn capabilities_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "demo_mode": state.bindings.is_demo_mode(),
        "bindings": state.bindings.describe(),
    }))
}

#[derive(Debug, Deserialize)]
struct SignUpBody {
    email: String,
    password: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct SignInBody {
    email: String,
    password: String,
}

/// POST /auth/signup: register and create the user profile.
async fn sign_up_handler(
    State(state): State<AppState>,
    Json(body): Json<SignUpBody>,
) -> ApiResult<impl IntoResponse> {
    if !validate_email(&body.email) {
        return Err(bad_request("invalid email address"));
    }
    if body.password.len() < 6 {
        return Err(bad_request("password must be at least 6 characters"));
    }
    if body.name.trim().is_empty() {
        return Err(bad_request("name is required"));
    }

    let account = state
        .bindings
        .auth
        .sign_up(body.email.trim(), &body.password, body.name.trim())
        .await
        .map_err(|e| error_response(e.into()))?;
    let profile = UserProfile {
        user_id: account.user_id.clone(),
        email: account.email.clone(),
        name: account.name.clone(),
        role: account.role.clone(),
        created_at: Some(chrono::Utc::now()),
        notification_settings: None,
    };
    state
        .bindings
        .storage
        .create_user_profile(&profile)
        .await
        .map_err(|e| error_response(e.into()))?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// POST /auth/signin
async fn sign_in_handler(
    State(state): State<AppState>,
    Json(body): Json<SignInBody>,
) -> ApiResult<impl IntoResponse> {
    let account = state
        .bindings
        .auth
        .sign_in(body.email.trim(), &body.password)
        .await
        .map_err(|e| error_response(e.into()))?;
    Ok(Json(account))
}

#[derive(Debug, Deserialize)]
struct EstimateQuery {
    goal: String,
    #[serde(default)]
    difficulty: Option<String>,
}

/// GET /estimate?goal=..&difficulty=..
async fn estimate_handler(Query(query): Query<EstimateQuery>) -> ApiResult<impl IntoResponse> {
    let difficulty = match query.difficulty.as_deref() {
        Some(d) => d.parse::<Difficulty>().map_err(bad_request)?,
        None => Difficulty::default(),
    };
    Ok(Json(estimate_duration(&query.goal, difficulty)))
}

async fn list_paths_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let paths = state
        .learning
        .list_learning_paths(&user_id)
        .await
        .map_err(error_response)?;
    Ok(Json(paths))
}

#[derive(Debug, Deserialize)]
struct CreatePathBody {
    #[serde(flatten)]
    request: PlanRequest,
    #[serde(default)]
    context: LearnerContext,
}

async fn create_path_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<CreatePathBody>,
) -> ApiResult<impl IntoResponse> {
    let plan = state
        .learning
        .create_learning_path(&user_id, &body.request, &body.context)
        .await
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(plan)))
}

async fn get_path_handler(
    State(state): State<AppState>,
    Path((user_id, path_id)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let plan = state
        .learning
        .get_learning_path(&user_id, &path_id)
        .await
        .map_err(error_response)?;
    Ok(Json(plan))
}

#[derive(Debug, Deserialize)]
struct ProgressBody {
    day: u32,
    #[serde(default = "default_completed")]
    completed: bool,
}

fn default_completed() -> bool {
    true
}

async fn progress_handler(
    State(state): State<AppState>,
    Path((user_id, path_id)): Path<(String, String)>,
    Json(body): Json<ProgressBody>,
) -> ApiResult<impl IntoResponse> {
    let progress = state
        .learning
        .update_daily_progress(&user_id, &path_id, body.day, body.completed)
        .await
        .map_err(error_response)?;
    Ok(Json(progress))
}

#[derive(Debug, Deserialize)]
struct ExportQuery {
    #[serde(default)]
    format: Option<String>,
}

/// GET .../export?format=document|json: file download.
async fn export_handler(
    State(state): State<AppState>,
    Path((user_id, path_id)): Path<(String, String)>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<impl IntoResponse> {
    let format = match query.format.as_deref() {
        Some(f) => f.parse::<ExportFormat>().map_err(bad_request)?,
        None => ExportFormat::default(),
    };
    let export = state
        .learning
        .export_learning_path(&user_id, &path_id, format)
        .await
        .map_err(error_response)?;
    Ok((
        [
            (header::CONTENT_TYPE, export.mime_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export.file_name),
            ),
        ],
        export.bytes,
    ))
}

async fn duplicate_handler(
    State(state): State<AppState>,
    Path((user_id, path_id)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let copy = state
        .learning
        .duplicate_learning_path(&user_id, &path_id)
        .await
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(copy)))
}

#[derive(Debug, Deserialize)]
struct VoiceQuery {
    #[serde(default)]
    voice_id: Option<String>,
}

/// GET .../days/:day/audio: narration of one day as base64 audio.
async fn narration_handler(
    State(state): State<AppState>,
    Path((user_id, path_id, day)): Path<(String, String, u32)>,
    Query(query): Query<VoiceQuery>,
) -> ApiResult<impl IntoResponse> {
    let clip = state
        .learning
        .narrate_day(&user_id, &path_id, day, query.voice_id.as_deref())
        .await
        .map_err(error_response)?;
    Ok(Json(audio_json(&clip)))
}

#[derive(Debug, Deserialize)]
struct EnhanceBody {
    feedback: String,
}

/// POST .../days/:day/enhance: rework a day from learner feedback.
async fn enhance_handler(
    State(state): State<AppState>,
    Path((user_id, path_id, day)): Path<(String, String, u32)>,
    Json(body): Json<EnhanceBody>,
) -> ApiResult<impl IntoResponse> {
    let enhanced = state
        .learning
        .enhance_day(&user_id, &path_id, day, &body.feedback)
        .await
        .map_err(error_response)?;
    Ok(Json(enhanced))
}

async fn playlist_handler(
    State(state): State<AppState>,
    Path((user_id, path_id)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let playlist = state
        .learning
        .playlist(&user_id, &path_id)
        .await
        .map_err(error_response)?;
    Ok(Json(playlist))
}

async fn reminders_handler(
    State(state): State<AppState>,
    Path((user_id, path_id)): Path<(String, String)>,
    Json(body): Json<ReminderSettings>,
) -> ApiResult<impl IntoResponse> {
    let settings = state
        .notifications
        .schedule_reminders(&user_id, &path_id, &body)
        .await
        .map_err(error_response)?;
    Ok(Json(settings))
}

async fn cancel_reminders_handler(
    State(state): State<AppState>,
    Path((user_id, path_id)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let settings = state
        .notifications
        .cancel_reminders(&user_id, &path_id)
        .await
        .map_err(error_response)?;
    Ok(Json(settings))
}

#[derive(Debug, Deserialize)]
struct TestNotificationBody {
    phone_number: String,
    #[serde(default, alias = "method")]
    channel: Channel,
}

/// POST /notifications/test: check a number and channel.
async fn test_notification_handler(
    State(state): State<AppState>,
    Json(body): Json<TestNotificationBody>,
) -> ApiResult<impl IntoResponse> {
    let receipt = state
        .notifications
        .send_test(&body.phone_number, body.channel)
        .await
        .map_err(error_response)?;
    Ok(Json(receipt))
}

#[derive(Debug, Deserialize)]
struct NotifyBody {
    #[serde(default = "default_kind")]
    kind: NotificationKind,
    phone_number: String,
    #[serde(default, alias = "method")]
    channel: Channel,
}

fn default_kind() -> NotificationKind {
    NotificationKind::Reminder
}

async fn notify_handler(
    State(state): State<AppState>,
    Path((user_id, path_id)): Path<(String, String)>,
    Json(body): Json<NotifyBody>,
) -> ApiResult<impl IntoResponse> {
    let receipt = state
        .notifications
        .send(body.kind, &user_id, &path_id, &body.phone_number, body.channel)
        .await
        .map_err(error_response)?;
    Ok(Json(receipt))
}

async fn history_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let history = state
        .notifications
        .history(&user_id)
        .await
        .map_err(error_response)?;
    Ok(Json(history))
}

#[derive(Debug, Deserialize)]
struct VideoQuery {
    q: String,
    #[serde(default = "default_max_results")]
    max_results: usize,
}

fn default_max_results() -> usize {
    5
}

/// GET /videos?q=..&max_results=..
async fn videos_handler(
    State(state): State<AppState>,
    Query(query): Query<VideoQuery>,
) -> ApiResult<impl IntoResponse> {
    if query.q.trim().is_empty() {
        return Err(bad_request("query must not be empty"));
    }
    let videos = state
        .bindings
        .video
        .search(&query.q, query.max_results.min(MAX_VIDEO_RESULTS))
        .await
        .map_err(|e| error_response(e.into()))?;
    Ok(Json(videos))
}

async fn video_details_handler(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let details = state
        .bindings
        .video
        .video_details(&video_id)
        .await
        .map_err(|e| error_response(e.into()))?
        .ok_or_else(|| error_response(ServiceError::NotFound(format!("video {}", video_id))))?;
    let readable = details.readable_duration();
    Ok(Json(json!({
        "details": details,
        "readable_duration": readable,
    })))
}

#[derive(Debug, Deserialize)]
struct ChannelQuery {
    subject: String,
}

/// GET /channels?subject=..: recommended educational channels.
async fn channels_handler(
    State(state): State<AppState>,
    Query(query): Query<ChannelQuery>,
) -> ApiResult<impl IntoResponse> {
    if query.subject.trim().is_empty() {
        return Err(bad_request("subject must not be empty"));
    }
    let channels = state
        .bindings
        .video
        .educational_channels(query.subject.trim())
        .await
        .map_err(|e| error_response(e.into()))?;
    Ok(Json(channels))
}

#[derive(Debug, Deserialize)]
struct TtsBody {
    text: String,
    #[serde(default)]
    voice_id: Option<String>,
}

/// POST /tts: synthesize arbitrary text.
async fn tts_handler(
    State(state): State<AppState>,
    Json(body): Json<TtsBody>,
) -> ApiResult<impl IntoResponse> {
    let clip = state
        .bindings
        .tts
        .synthesize(&body.text, body.voice_id.as_deref())
        .await
        .map_err(|e| error_response(e.into()))?;
    Ok(Json(audio_json(&clip)))
}

async fn voices_handler(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let voices = state
        .bindings
        .tts
        .list_voices()
        .await
        .map_err(|e| error_response(e.into()))?;
    Ok(Json(voices))
}

async fn documents_handler(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let documents = state
        .bindings
        .docs
        .list_documents()
        .await
        .map_err(|e| error_response(e.into()))?;
    Ok(Json(documents))
}

fn audio_json(clip: &crate::interfaces::AudioClip) -> Value {
    json!({
        "mime_type": clip.mime_type,
        "bytes": clip.data.len(),
        "audio_base64": base64::engine::general_purpose::STANDARD.encode(&clip.data),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{CapabilityResolver, CredentialSet};
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let bindings = CapabilityResolver::demo()
            .unwrap()
            .resolve_all(&CredentialSet::new());
        app_router(AppState::new(bindings))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = test_app();
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], crate::VERSION);
        assert_eq!(json["service"], "learnpath");
    }

    #[tokio::test]
    async fn test_capabilities_endpoint_reports_demo() {
        let response = test_app()
            .oneshot(Request::builder().uri("/capabilities").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["demo_mode"], true);
        let bindings = json["bindings"].as_array().unwrap();
        assert_eq!(bindings.len(), 7);
        assert!(bindings.iter().all(|b| b["mode"] == "demo"));
        assert_eq!(bindings[0]["capability"], "content_gen");
    }

    #[tokio::test]
    async fn test_sign_in_and_failures() {
        let app = test_app();
        let response = app
            .clone()
            .oneshot(post_json(
                "/auth/signin",
                json!({"email": "demo@example.com", "password": "demo123"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["user_id"], "demo_user_123");

        let response = app
            .oneshot(post_json(
                "/auth/signin",
                json!({"email": "demo@example.com", "password": "wrong"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_sign_up_conflict() {
        let response = test_app()
            .oneshot(post_json(
                "/auth/signup",
                json!({"email": "demo@example.com", "password": "secret1", "name": "Dup"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_create_and_list_paths() {
        let app = test_app();
        let response = app
            .clone()
            .oneshot(post_json(
                "/users/demo_user_123/paths",
                json!({"goal": "Learn Rust macros", "duration_days": 4, "difficulty": "intermediate"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let plan = body_json(response).await;
        assert_eq!(plan["daily_plans"].as_array().unwrap().len(), 4);
        assert_eq!(plan["type"], "normal");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/users/demo_user_123/paths")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let list = body_json(response).await;
        assert_eq!(list.as_array().unwrap().len(), 2);
        assert!(list[0]["completion_percentage"].as_f64().unwrap() > 33.0);
    }

    #[tokio::test]
    async fn test_invalid_goal_is_bad_request() {
        let response = test_app()
            .oneshot(post_json("/users/u1/paths", json!({"goal": "x", "duration_days": 3})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_progress_out_of_range() {
        let response = test_app()
            .oneshot(post_json(
                "/users/demo_user_123/paths/path_demo_python/progress",
                json!({"day": 12, "completed": true}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/users/demo_user_123/paths/path_nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_export_sets_download_headers() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/users/demo_user_123/paths/path_demo_python/export?format=json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        assert!(response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains("Python_programming_basics_learning_path.json"));
    }

    #[tokio::test]
    async fn test_notify_and_history() {
        let app = test_app();
        let response = app
            .clone()
            .oneshot(post_json(
                "/users/demo_user_123/paths/path_demo_python/notify",
                json!({"kind": "motivation", "phone_number": "+15555550199", "channel": "sms"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let receipt = body_json(response).await;
        assert!(receipt["id"].as_str().unwrap().starts_with("demo-"));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/users/demo_user_123/notifications")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let history = body_json(response).await;
        assert_eq!(history[0]["kind"], "motivation");
    }

    #[tokio::test]
    async fn test_videos_and_tts() {
        let app = test_app();
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/videos?q=rust&max_results=2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);

        let response = app
            .oneshot(post_json("/tts", json!({"text": "Hello learner"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let audio = body_json(response).await;
        assert_eq!(audio["mime_type"], "audio/mpeg");
        assert_eq!(audio["audio_base64"], "");
    }

    #[tokio::test]
    async fn test_estimate_endpoint() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/estimate?goal=web%20development&difficulty=intermediate")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["recommended_days"], 21);
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_enhance_day_endpoint() {
        let app = test_app();
        let response = app
            .clone()
            .oneshot(post_json(
                "/users/demo_user_123/paths/path_demo_python/days/1/enhance",
                json!({"feedback": "shorter sessions"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["day"], 1);

        let response = app
            .oneshot(post_json(
                "/users/demo_user_123/paths/path_demo_python/days/8/enhance",
                json!({"feedback": "x"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_playlist_endpoint() {
        let app = test_app();
        let response = app
            .clone()
            .oneshot(post_json(
                "/users/demo_user_123/paths",
                json!({"goal": "Learn Rust macros", "duration_days": 3}),
            ))
            .await
            .unwrap();
        let path_id = body_json(response).await["id"].as_str().unwrap().to_string();

        let response = app
            .oneshot(get_request(&format!(
                "/users/demo_user_123/paths/{}/playlist",
                path_id
            )))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let playlist = body_json(response).await;
        assert_eq!(playlist["title"], "Learning Path: Learn Rust macros");
        assert_eq!(playlist["entries"].as_array().unwrap().len(), 6);
        assert_eq!(playlist["entries"][0]["day"], 1);
        assert!(playlist["entries"][0]["video_id"].is_string());
    }

    #[tokio::test]
    async fn test_schedule_then_cancel_reminders() {
        let app = test_app();
        let uri = "/users/demo_user_123/paths/path_demo_python/reminders";
        let cancel = || {
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(Body::empty())
                .unwrap()
        };

        let response = app.clone().oneshot(cancel()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .clone()
            .oneshot(post_json(uri, json!({"phone_number": "+15555550199", "time": "08:15"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["active"], true);

        let response = app.oneshot(cancel()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let settings = body_json(response).await;
        assert_eq!(settings["active"], false);
        assert_eq!(settings["reminder_time"], "08:15");
    }

    #[tokio::test]
    async fn test_test_notification_endpoint() {
        let app = test_app();
        let response = app
            .clone()
            .oneshot(post_json(
                "/notifications/test",
                json!({"phone_number": "+15555550199", "method": "voice"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["channel"], "voice");

        let response = app
            .oneshot(post_json("/notifications/test", json!({"phone_number": "555"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_video_details_and_channels() {
        let app = test_app();
        let response = app.clone().oneshot(get_request("/videos/abc123")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["details"]["video_id"], "abc123");
        assert_eq!(json["readable_duration"], "10m 30s");

        let response = app
            .clone()
            .oneshot(get_request("/channels?subject=Rust"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let channels = body_json(response).await;
        assert_eq!(channels.as_array().unwrap().len(), 2);
        assert_eq!(channels[0]["title"], "Rust Education Hub");

        let response = app.oneshot(get_request("/channels?subject=%20")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_error_status_mapping() {
        let status = |err: AdapterError| error_response(ServiceError::Adapter(err)).0;
        assert_eq!(status(AdapterError::Render("bad".into())), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status(AdapterError::InvalidInput("bad".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status(AdapterError::Conflict("dup".into())), StatusCode::CONFLICT);
        assert_eq!(status(AdapterError::RateLimited("YouTube")), StatusCode::BAD_GATEWAY);
    }
}
