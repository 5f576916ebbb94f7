//! Response handling shared by the live adapters.

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::interfaces::adapter::AdapterError;

/// Header carrying Google API keys, kept out of request URLs.
pub(crate) const GOOGLE_API_KEY: &str = "x-goog-api-key";

/// Longest slice of an error body kept in `AdapterError::Api`.
const MAX_ERROR_BODY: usize = 500;

/// Send a request and turn non-2xx responses into `AdapterError`.
pub(crate) async fn send(vendor: &'static str, request: RequestBuilder) -> Result<Response, AdapterError> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(AdapterError::RateLimited(vendor));
    }
    let body = response.text().await.unwrap_or_default();
    Err(AdapterError::Api {
        vendor,
        status: status.as_u16(),
        message: error_message(&body),
    })
}

/// Send a request and decode a JSON body.
pub(crate) async fn send_json<T: DeserializeOwned>(
    vendor: &'static str,
    request: RequestBuilder,
) -> Result<T, AdapterError> {
    let response = send(vendor, request).await?;
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| AdapterError::decode(vendor, e))
}

/// Pull `error.message` (or a string `error`) out of a JSON error body,
/// falling back to the raw text.
pub(crate) fn error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        let message = json
            .get("error")
            .and_then(|e| e.get("message").or(Some(e)))
            .and_then(|m| m.as_str())
            .or_else(|| json.get("message").and_then(|m| m.as_str()))
            .or_else(|| json.get("detail").and_then(|d| d.get("message")).and_then(|m| m.as_str()));
        if let Some(message) = message {
            return message.to_string();
        }
    }
    let end = body
        .char_indices()
        .nth(MAX_ERROR_BODY)
        .map(|(i, _)| i)
        .unwrap_or(body.len());
    body[..end].to_string()
}
