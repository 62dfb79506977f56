//! Settings endpoints, plus the destructive clear-data operation.

use crate::storage::{
    Database, EconomyStore, SettingsPatch, SettingsStore, TaskStore, UserSettings,
};

use super::error::ApiError;
use super::types::ClearDataResponse;

/// `GET /settings` — the user's preferences, created with defaults on
/// first fetch.
pub fn get_settings(db: &Database, user_id: i64) -> Result<UserSettings, ApiError> {
    let store = SettingsStore::new(db.connection());
    Ok(store.get_or_create_settings(user_id)?)
}

/// `POST /settings` — apply a partial update and return the full record.
pub fn update_settings(
    db: &Database,
    user_id: i64,
    patch: &SettingsPatch,
) -> Result<UserSettings, ApiError> {
    if let Some(interval) = patch.break_reminder_interval {
        if !(15..=60).contains(&interval) {
            return Err(ApiError::Validation(
                "Break reminder interval must be between 15 and 60 minutes.".to_string(),
            ));
        }
    }

    let store = SettingsStore::new(db.connection());
    Ok(store.update_settings(user_id, patch)?)
}

/// `POST /settings/clear-data` — delete the user's tasks (steps and
/// reflections cascade) and zero their points, atomically. Settings and
/// purchased collectibles survive.
pub fn clear_data(db: &mut Database, user_id: i64) -> Result<ClearDataResponse, ApiError> {
    let tx = db.transaction()?;
    {
        let tasks = TaskStore::new(&tx);
        let removed = tasks.delete_tasks_for_user(user_id)?;

        let economy = EconomyStore::new(&tx);
        economy.reset_points(user_id)?;

        tracing::info!(user_id, removed, "Cleared user data");
    }
    tx.commit()
        .map_err(|e| ApiError::Internal(format!("Failed to clear data: {}", e)))?;

    Ok(ClearDataResponse {
        success: true,
        message: "All user data has been cleared.".to_string(),
    })
}
