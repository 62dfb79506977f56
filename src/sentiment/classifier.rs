//! Hugging Face inference client with ordered model fallback.

use std::time::Duration;

use serde_json::{json, Value};
use thiserror::Error;

use crate::config::SentimentSettings;

use super::labels::interpret_response;
use super::rules::rule_based_sentiment;
use super::Sentiment;

/// Default inference API base URL (model name is appended).
const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co/models";

/// Primary model, tried first.
const PRIMARY_MODEL: &str = "nlptown/bert-base-multilingual-uncased-sentiment";

/// Backup models, tried in order after the primary fails.
const BACKUP_MODELS: &[&str] = &[
    "SamLowe/roberta-base-go_emotions",
    "cardiffnlp/twitter-roberta-base-sentiment-latest",
    "distilbert-base-uncased-finetuned-sst-2-english",
];

/// Hard timeout per inference request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Sentiment classification service.
///
/// `classify` never fails: every remote error is absorbed and the
/// rule-based fallback guarantees a result.
pub struct SentimentClassifier {
    http: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

/// A failed attempt against a single model.
#[derive(Debug, Error)]
enum AttemptError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Model returned status {0}")]
    Status(u16),

    #[error("Response body was not JSON: {0}")]
    Body(String),
}

impl SentimentClassifier {
    /// Create a classifier. With no token, every call goes straight to the
    /// rule-based fallback.
    pub fn new(api_token: Option<String>) -> Self {
        Self::with_base_url(api_token, DEFAULT_BASE_URL.to_string())
    }

    /// Create a classifier pointed at a custom inference base URL.
    pub fn with_base_url(api_token: Option<String>, base_url: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url,
            api_token,
        }
    }

    /// Create a classifier from application configuration.
    pub fn from_settings(settings: &SentimentSettings) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: settings.base_url.clone(),
            api_token: settings.api_token.clone(),
        }
    }

    /// Classify free text as positive, negative, or neutral.
    pub async fn classify(&self, text: &str) -> Sentiment {
        let token = match &self.api_token {
            Some(token) => token,
            None => {
                tracing::debug!("No inference API token configured, using rule-based fallback");
                return rule_based_sentiment(text);
            }
        };

        let models = std::iter::once(PRIMARY_MODEL).chain(BACKUP_MODELS.iter().copied());

        for (attempt, model) in models.enumerate() {
            match self.query_model(token, model, text).await {
                Ok(value) => {
                    tracing::debug!(model, attempt, "Inference succeeded");
                    return interpret_response(&value);
                }
                Err(e) => {
                    tracing::warn!(model, attempt, error = %e, "Inference attempt failed");
                }
            }
        }

        tracing::warn!("All inference models failed, using rule-based fallback");
        rule_based_sentiment(text)
    }

    /// Issue one inference request and return the raw JSON body.
    async fn query_model(
        &self,
        token: &str,
        model: &str,
        text: &str,
    ) -> Result<Value, AttemptError> {
        let url = format!("{}/{}", self.base_url, model);

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", token))
            .json(&json!({ "inputs": text }))
            .send()
            .await
            .map_err(|e| AttemptError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError::Status(status.as_u16()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| AttemptError::Body(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_token_uses_rule_based_fallback() {
        let classifier = SentimentClassifier::new(None);
        assert_eq!(
            classifier.classify("This was great and fun").await,
            Sentiment::Positive
        );
        assert_eq!(
            classifier.classify("This was terrible and hard").await,
            Sentiment::Negative
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_falls_back() {
        // Port 1 refuses connections; every model attempt fails and the
        // classifier must still resolve via the keyword rules.
        let classifier = SentimentClassifier::with_base_url(
            Some("hf_test_token".to_string()),
            "http://127.0.0.1:1/models".to_string(),
        );
        assert_eq!(
            classifier.classify("I am happy and proud of this").await,
            Sentiment::Positive
        );
    }

    #[tokio::test]
    async fn test_fallback_result_is_always_valid() {
        let classifier = SentimentClassifier::new(None);
        let result = classifier.classify("The cat sat there").await;
        assert_eq!(result, Sentiment::Neutral);
    }
}
