//! Wire request and response types.
//!
//! Field names are camelCase on the wire to match the client; timestamps
//! serialize as RFC 3339 strings.

use serde::{Deserialize, Serialize};

use crate::storage::NewStep;

/// `POST /tasks` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: String,
    pub estimated_minutes: i64,
    #[serde(default)]
    pub steps: Option<Vec<NewStep>>,
}

/// A step completion toggle inside `POST /tasks/update`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepToggle {
    pub id: i64,
    pub completed: bool,
}

/// `POST /tasks/update` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub task_id: i64,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub steps: Option<Vec<StepToggle>>,
}

/// `POST /tasks/generate-steps` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateStepsRequest {
    pub title: String,
}

/// `POST /reflections` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReflectionRequest {
    pub task_id: i64,
    pub emoji_rating: i64,
    pub reflection_text: String,
}

/// `POST /collectibles/purchase` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub collectible_type_id: i64,
}

/// `POST /collectibles/purchase` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    pub success: bool,
    pub new_points: i64,
}

/// `POST /settings/clear-data` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearDataResponse {
    pub success: bool,
    pub message: String,
}
