//! Google Gemini content generator.
//!
//! Calls `models/{model}:generateContent` with a JSON response MIME type and
//! parses the returned text as a plan. Regular plans use the fast model,
//! adaptive plans the larger one. Transport failures, 429s and 5xx responses
//! are retried with exponential backoff; other 4xx responses fail at once.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::capabilities::{AdapterMode, Capability, Credential};
use crate::config::Settings;
use crate::interfaces::adapter::{AdapterError, CapabilityAdapter};
use crate::interfaces::content::{
    ContentGenerator, DailyPlan, LearnerContext, LearningPlan, PlanKind, PlanRequest,
};

const VENDOR: &str = "Gemini";

/// Live [`ContentGenerator`] backed by the Gemini API.
pub struct GeminiContentGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
    adaptive_model: String,
    api_key: Credential,
    fingerprint: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl GeminiContentGenerator {
    pub fn new(client: reqwest::Client, settings: &Settings, api_key: Credential) -> Self {
        let fingerprint = api_key.fingerprint();
        Self {
            client,
            base_url: settings.endpoints.gemini.trim_end_matches('/').to_string(),
            model: settings.gemini_model.clone(),
            adaptive_model: settings.gemini_adaptive_model.clone(),
            api_key,
            fingerprint,
            max_retries: 2,
            retry_delay: Duration::from_secs(1),
        }
    }

    /// Override the retry policy.
    pub fn with_retry(mut self, max_retries: u32, initial_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = initial_delay;
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    /// Run one prompt and return the concatenated text parts.
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, AdapterError> {
        let body = json!({
            "contents": [{"role": "user", "parts": [{"text": prompt}]}],
            "generationConfig": {"responseMimeType": "application/json"},
        });
        let endpoint = self.endpoint(model);

        let mut last_error: Option<AdapterError> = None;
        let mut retry_delay = self.retry_delay;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                log::warn!("Gemini API retry attempt {} after {:?}", attempt, retry_delay);
                tokio::time::sleep(retry_delay).await;
                retry_delay *= 2;
            }

            let response = match self
                .client
                .post(&endpoint)
                .header(super::http::GOOGLE_API_KEY, self.api_key.expose())
                .json(&body)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    last_error = Some(e.into());
                    continue;
                }
            };

            let status = response.status();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                last_error = Some(AdapterError::RateLimited(VENDOR));
                continue;
            }

            let text = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    last_error = Some(e.into());
                    continue;
                }
            };

            if status.is_server_error() {
                last_error = Some(AdapterError::Api {
                    vendor: VENDOR,
                    status: status.as_u16(),
                    message: super::http::error_message(&text),
                });
                continue;
            }

            if status.is_client_error() {
                return Err(AdapterError::Api {
                    vendor: VENDOR,
                    status: status.as_u16(),
                    message: super::http::error_message(&text),
                });
            }

            let response_json: Value =
                serde_json::from_str(&text).map_err(|e| AdapterError::decode(VENDOR, e))?;
            if let Some(usage) = response_json.get("usageMetadata") {
                log::debug!("Gemini usage: {}", usage);
            }
            return extract_text(&response_json);
        }

        Err(last_error.unwrap_or_else(|| AdapterError::Api {
            vendor: VENDOR,
            status: 0,
            message: "call failed after all retries".to_string(),
        }))
    }
}

/// Concatenate `candidates[0].content.parts[*].text`.
fn extract_text(response: &Value) -> Result<String, AdapterError> {
    if let Some(error) = response.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown Gemini API error");
        return Err(AdapterError::Api {
            vendor: VENDOR,
            status: 200,
            message: message.to_string(),
        });
    }

    let text: String = response
        .pointer("/candidates/0/content/parts")
        .and_then(|p| p.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = response
            .pointer("/candidates/0/finishReason")
            .and_then(|r| r.as_str())
            .unwrap_or("no candidates");
        return Err(AdapterError::decode(VENDOR, format!("empty response ({})", reason)));
    }
    Ok(text)
}

/// Models sometimes wrap JSON in a Markdown fence despite the MIME type.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

/// Parse model output into a plan. Request fields win over whatever the
/// model echoed back.
fn parse_plan(text: &str, request: &PlanRequest, kind: PlanKind) -> Result<LearningPlan, AdapterError> {
    let mut value: Value =
        serde_json::from_str(strip_code_fence(text)).map_err(|e| AdapterError::decode(VENDOR, e))?;
    let obj = value
        .as_object_mut()
        .ok_or_else(|| AdapterError::decode(VENDOR, "plan is not a JSON object"))?;

    obj.insert("goal".into(), json!(request.goal));
    obj.insert("duration_days".into(), json!(request.duration_days));
    obj.insert("difficulty".into(), json!(request.difficulty));
    obj.insert("type".into(), json!(kind));
    obj.insert("created_with_ai".into(), json!(true));
    for key in ["id", "user_id", "created_at", "document_url"] {
        obj.remove(key);
    }

    serde_json::from_value(value).map_err(|e| AdapterError::decode(VENDOR, e))
}

fn plan_prompt(request: &PlanRequest) -> String {
    let approach = if request.include_practice {
        "with hands-on practice exercises"
    } else {
        "focused on theory and concepts"
    };
    let goal = &request.goal;
    format!(
        r#"Create a comprehensive {days}-day learning path for: "{goal}"
Difficulty level: {difficulty}
Learning approach: {approach}

Focus only on {goal}-related concepts and practical skills. Use real examples,
specific frameworks and concrete exercises. Do not include HTML or placeholder text.

Respond with a JSON object of this shape:
{{
  "goal": "{goal}",
  "duration_days": {days},
  "difficulty": "{difficulty}",
  "description": "What the learner will achieve",
  "daily_plans": [
    {{
      "day": 1,
      "title": "Day title",
      "objectives": ["objective 1", "objective 2"],
      "content": "Detailed content for the day",
      "activities": ["activity 1", "activity 2"],
      "estimated_time": "2-3 hours",
      "resources": ["resource 1", "resource 2"],
      "key_concepts": ["concept 1", "concept 2"]
    }}
  ]
}}

Include exactly {days} entries in daily_plans, each building on the previous day."#,
        days = request.duration_days,
        difficulty = request.difficulty,
    )
}

fn adaptive_prompt(request: &PlanRequest, context: &LearnerContext) -> String {
    let or = |v: &Option<String>, default: &'static str| -> String {
        v.as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(default)
            .to_string()
    };
    let goal = &request.goal;
    format!(
        r#"Create an adaptive {days}-day learning path for: "{goal}"
Difficulty level: {difficulty}

Learner context:
- Previous learning: {previous}
- Learning style: {style}
- Available time per day: {time}
- Specific interests: {interests}
- Current skill level: {level}

Adapt content to this context. Include checkpoints for assessment, alternative
approaches for struggling or fast learners, metacognitive prompts, spaced
repetition and active recall.

Respond with a JSON object of this shape:
{{
  "goal": "{goal}",
  "duration_days": {days},
  "difficulty": "{difficulty}",
  "description": "Adaptive learning path description",
  "learning_strategy": "How the path adapts",
  "adaptation_points": ["Day 3: Assessment checkpoint"],
  "daily_plans": [
    {{
      "day": 1,
      "title": "Day title",
      "objectives": ["objective 1"],
      "content": "Context-aware content",
      "activities": ["activity with alternatives"],
      "estimated_time": "Flexible 1-3 hours",
      "resources": ["resource"],
      "key_concepts": ["concept"],
      "checkpoint": "Assessment or reflection point",
      "alternatives": ["If struggling", "If progressing quickly"],
      "metacognitive_element": "What the learner learns about learning"
    }}
  ]
}}

Include exactly {days} entries in daily_plans."#,
        days = request.duration_days,
        difficulty = request.difficulty,
        previous = or(&context.previous_learning, "None specified"),
        style = or(&context.learning_style, "Mixed"),
        time = or(&context.time_per_day, "1-2 hours"),
        interests = or(&context.interests, "General"),
        level = or(&context.current_level, "Beginner"),
    )
}

impl CapabilityAdapter for GeminiContentGenerator {
    fn name(&self) -> &str {
        "Gemini"
    }

    fn capability(&self) -> Capability {
        Capability::ContentGen
    }

    fn mode(&self) -> AdapterMode {
        AdapterMode::Live
    }

    fn credential_fingerprint(&self) -> Option<&str> {
        Some(&self.fingerprint)
    }
}

#[async_trait]
impl ContentGenerator for GeminiContentGenerator {
    async fn generate_plan(&self, request: &PlanRequest) -> Result<LearningPlan, AdapterError> {
        log::debug!(
            "Gemini generate_plan: model={}, days={}, difficulty={}",
            self.model,
            request.duration_days,
            request.difficulty
        );
        let text = self.generate(&self.model, &plan_prompt(request)).await?;
        parse_plan(&text, request, PlanKind::Normal)
    }

    async fn generate_adaptive_plan(
        &self,
        request: &PlanRequest,
        context: &LearnerContext,
    ) -> Result<LearningPlan, AdapterError> {
        log::debug!(
            "Gemini generate_adaptive_plan: model={}, days={}",
            self.adaptive_model,
            request.duration_days
        );
        let text = self
            .generate(&self.adaptive_model, &adaptive_prompt(request, context))
            .await?;
        parse_plan(&text, request, PlanKind::Adaptive)
    }

    async fn enhance_day(&self, day: &DailyPlan, feedback: &str) -> Result<DailyPlan, AdapterError> {
        if feedback.trim().is_empty() {
            return Ok(day.clone());
        }
        let original = serde_json::to_string_pretty(day).map_err(|e| AdapterError::decode(VENDOR, e))?;
        let prompt = format!(
            "Enhance this daily learning plan based on learner feedback.\n\n\
             Original plan:\n{}\n\nLearner feedback: {}\n\n\
             Keep the learning objectives and return the enhanced plan in the same JSON format.",
            original,
            feedback.trim()
        );
        let text = self.generate(&self.model, &prompt).await?;
        let mut enhanced: DailyPlan = serde_json::from_str(strip_code_fence(&text))
            .map_err(|e| AdapterError::decode(VENDOR, e))?;
        enhanced.day = day.day;
        Ok(enhanced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::content::Difficulty;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn generator(server: &MockServer) -> GeminiContentGenerator {
        let mut settings = Settings::default();
        settings.endpoints.gemini = server.uri();
        let key = Credential::parse(Capability::ContentGen, "key123").unwrap().unwrap();
        GeminiContentGenerator::new(reqwest::Client::new(), &settings, key)
            .with_retry(2, Duration::from_millis(1))
    }

    fn candidate(text: &str) -> Value {
        json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}, "finishReason": "STOP"}],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 20}
        })
    }

    #[tokio::test]
    async fn test_generate_plan_parses_candidate_text() {
        let server = MockServer::start().await;
        let plan_json = json!({
            "goal": "ignored",
            "duration_days": 99,
            "difficulty": "Beginner",
            "description": "Ownership and borrowing",
            "daily_plans": [{"day": 1, "title": "Ownership", "objectives": ["Move semantics"]}]
        });
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "key123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate(&plan_json.to_string())))
            .expect(1)
            .mount(&server)
            .await;

        let request = PlanRequest::new("Learn Rust ownership", 1, Difficulty::Intermediate);
        let plan = generator(&server).generate_plan(&request).await.unwrap();
        assert_eq!(plan.goal, "Learn Rust ownership");
        assert_eq!(plan.duration_days, 1);
        assert_eq!(plan.difficulty, Difficulty::Intermediate);
        assert_eq!(plan.kind, PlanKind::Normal);
        assert!(plan.created_with_ai);
        assert_eq!(plan.daily_plans[0].title, "Ownership");
    }

    #[tokio::test]
    async fn test_adaptive_plan_uses_adaptive_model() {
        let server = MockServer::start().await;
        let fenced = format!(
            "```json\n{}\n```",
            json!({"description": "d", "adaptation_points": ["Day 3: check"], "daily_plans": []})
        );
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-pro:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate(&fenced)))
            .mount(&server)
            .await;

        let request = PlanRequest::new("Learn Rust ownership", 3, Difficulty::Beginner).adaptive();
        let plan = generator(&server)
            .generate_adaptive_plan(&request, &LearnerContext::default())
            .await
            .unwrap();
        assert_eq!(plan.kind, PlanKind::Adaptive);
        assert_eq!(plan.adaptation_points, vec!["Day 3: check".to_string()]);
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(
                json!({"error": {"code": 400, "message": "API key not valid"}}),
            ))
            .expect(1)
            .mount(&server)
            .await;

        let request = PlanRequest::new("Learn Rust ownership", 1, Difficulty::Beginner);
        let err = generator(&server).generate_plan(&request).await.unwrap_err();
        match err {
            AdapterError::Api { status, message, .. } => {
                assert_eq!(status, 400);
                assert_eq!(message, "API key not valid");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_server_errors_are_retried_then_surface() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let request = PlanRequest::new("Learn Rust ownership", 1, Difficulty::Beginner);
        let err = generator(&server).generate_plan(&request).await.unwrap_err();
        assert!(matches!(err, AdapterError::Api { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_enhance_day_with_empty_feedback_skips_network() {
        let server = MockServer::start().await;
        let day = DailyPlan {
            day: 2,
            title: "Borrowing".to_string(),
            ..Default::default()
        };
        let same = generator(&server).enhance_day(&day, "  ").await.unwrap();
        assert_eq!(same, day);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fence(" {\"a\":1} "), "{\"a\":1}");
    }
}
