//! Request-level error taxonomy.
//!
//! Handlers are framework-agnostic: each error variant carries its HTTP
//! status equivalent and a human-readable message, and the routing layer
//! serializes `body()` as the JSON response.

use serde_json::{json, Value};
use thiserror::Error;

use crate::steps::StepError;
use crate::storage::DatabaseError;

/// Error returned by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed input, rejected before any side effect.
    #[error("{0}")]
    Validation(String),

    /// Missing or unowned resource. Ownership failures use the same
    /// message as true misses so handlers never leak other users' data.
    #[error("{0}")]
    NotFound(String),

    /// Purchase would overdraw the balance.
    #[error("Insufficient Kaiblooms points.")]
    InsufficientPoints,

    /// Upstream AI service failure with no local fallback.
    #[error("{0}")]
    Upstream(String),

    /// Unexpected internal failure; details are logged, not surfaced.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status code equivalent.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Validation(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::InsufficientPoints => 400,
            ApiError::Upstream(_) => 502,
            ApiError::Internal(_) => 500,
        }
    }

    /// JSON error body for the wire.
    pub fn body(&self) -> Value {
        json!({ "error": self.to_string() })
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::NotFound(msg),
            other => {
                tracing::error!(error = %other, "Database error");
                ApiError::Internal("An unknown error occurred".to_string())
            }
        }
    }
}

impl From<StepError> for ApiError {
    fn from(err: StepError) -> Self {
        match err {
            StepError::MissingApiKey => ApiError::Internal(err.to_string()),
            StepError::Upstream(detail) => {
                tracing::error!(detail, "AI service error");
                ApiError::Upstream("Failed to generate steps from AI service.".to_string())
            }
            StepError::InvalidResponse(detail) => {
                tracing::error!(detail, "AI service returned unusable payload");
                ApiError::Internal("AI service returned an empty response.".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::Validation("bad".to_string()).status_code(), 400);
        assert_eq!(ApiError::NotFound("gone".to_string()).status_code(), 404);
        assert_eq!(ApiError::InsufficientPoints.status_code(), 400);
        assert_eq!(ApiError::Upstream("x".to_string()).status_code(), 502);
        assert_eq!(ApiError::Internal("x".to_string()).status_code(), 500);
    }

    #[test]
    fn test_body_shape() {
        let body = ApiError::InsufficientPoints.body();
        assert_eq!(body["error"], "Insufficient Kaiblooms points.");
    }

    #[test]
    fn test_database_error_does_not_leak_detail() {
        let err: ApiError =
            DatabaseError::QueryFailed("secret table broke".to_string()).into();
        assert_eq!(err.status_code(), 500);
        assert!(!err.to_string().contains("secret"));
    }
}
