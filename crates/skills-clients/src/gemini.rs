//! Text generation via the Gemini `generateContent` REST endpoint.

use serde_json::{Value, json};
use tracing::{debug, error};

use skills_core::ports::{BoxFuture, TextGenerator};
use skills_core::{CoreError, CoreResult};

use crate::{endpoint_url, http_client};

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: Option<String>) -> Self {
        Self {
            http: http_client(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: model
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> CoreResult<String> {
        let url = endpoint_url(
            &self.base_url,
            &format!("models/{}:generateContent", self.model),
        );
        let payload = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!("gemini transport error: {}", e);
                CoreError::Upstream("AI service error".into())
            })?;

        let status = response.status();
        let body = response.json::<Value>().await.map_err(|e| {
            error!("gemini returned unreadable body ({}): {}", status, e);
            CoreError::Upstream("AI service error".into())
        })?;

        if !status.is_success() {
            let message = body
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            error!("gemini request failed with {}: {}", status, message);
            return Err(CoreError::Upstream("AI service error".into()));
        }

        let text = candidate_text(&body);
        debug!(model = %self.model, chars = text.len(), "gemini completion received");
        Ok(text)
    }
}

impl TextGenerator for GeminiClient {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, CoreResult<String>> {
        Box::pin(self.complete(prompt))
    }
}

/// Concatenated text parts of the first candidate; empty when there is none.
fn candidate_text(body: &Value) -> String {
    body.pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default()
}
