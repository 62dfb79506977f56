//! Storage module for database access.

pub mod database;
pub mod economy_store;
pub mod reflection_store;
pub mod schema;
pub mod settings_store;
pub mod task_store;

pub use database::{Database, DatabaseError};
pub use economy_store::{
    CollectibleType, EconomyStore, OwnedCollectible, UserProgress, POINT_REWARD,
};
pub use reflection_store::{Reflection, ReflectionLog, ReflectionStore};
pub use settings_store::{SettingsPatch, SettingsStore, UserSettings};
pub use task_store::{NewStep, Task, TaskStep, TaskStore, TaskWithSteps};

use chrono::{DateTime, Utc};

/// Parse an RFC 3339 timestamp column.
pub(crate) fn parse_datetime(value: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::DeserializationError(format!("Invalid date: {}", e)))
}
