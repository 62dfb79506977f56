//! Chat-completions client for AI step generation.
//!
//! Unlike sentiment classification there is no safe local fallback for
//! step text, so upstream failures surface to the caller.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::config::GenerationSettings;

use super::prompt::breakdown_prompt;

/// Default chat completions API base URL.
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Model used for task breakdown.
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Hard timeout per generation request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A generated step suggestion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratedStep {
    pub description: String,
    pub materials: Option<String>,
}

/// Step generation errors.
#[derive(Debug, Error)]
pub enum StepError {
    /// No API key configured; the operation cannot run at all.
    #[error("Server configuration error: Missing OpenAI API key.")]
    MissingApiKey,

    /// The upstream service rejected or failed the request (502-equivalent).
    #[error("Failed to generate steps from AI service.")]
    Upstream(String),

    /// The upstream call succeeded but the payload was unusable.
    #[error("AI service returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// AI step generation service.
pub struct StepGenerator {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl StepGenerator {
    /// Create a generator with the default endpoint and model.
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Create a generator pointed at a custom base URL.
    pub fn with_base_url(api_key: Option<String>, base_url: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url,
            model: DEFAULT_MODEL.to_string(),
            api_key,
        }
    }

    /// Create a generator from application configuration.
    pub fn from_settings(settings: &GenerationSettings) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: settings.base_url.clone(),
            model: settings.model.clone(),
            api_key: settings.api_key.clone(),
        }
    }

    /// Generate 3-6 actionable steps for a task title.
    pub async fn generate(&self, task_title: &str) -> Result<Vec<GeneratedStep>, StepError> {
        let api_key = self.api_key.as_ref().ok_or(StepError::MissingApiKey)?;

        let url = format!("{}/chat/completions", self.base_url);
        let prompt = breakdown_prompt(task_title);

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&json!({
                "model": self.model,
                "messages": [{ "role": "user", "content": prompt }],
                "response_format": { "type": "json_object" },
                "temperature": 0.5,
            }))
            .send()
            .await
            .map_err(|e| StepError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, body, "Chat completions request failed");
            return Err(StepError::Upstream(format!("status {}", status)));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| StepError::InvalidResponse(e.to_string()))?;

        let content = completion
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| StepError::InvalidResponse("empty completion".to_string()))?;

        let payload: StepsPayload = serde_json::from_str(content)
            .map_err(|e| StepError::InvalidResponse(format!("steps JSON did not parse: {}", e)))?;

        if payload.steps.is_empty() {
            return Err(StepError::InvalidResponse("no steps in response".to_string()));
        }

        Ok(payload.steps)
    }
}

/// Chat completions response envelope.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: String,
}

/// The strict shape the model is asked to produce.
#[derive(Debug, Deserialize)]
struct StepsPayload {
    steps: Vec<GeneratedStep>,
}
