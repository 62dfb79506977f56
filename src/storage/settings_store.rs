//! User settings persistence.
//!
//! One row per user, created lazily with defaults on first fetch. Updates
//! are partial: only the provided fields change.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::storage::database::DatabaseError;
use crate::storage::parse_datetime;

/// A user's preference record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub user_id: i64,
    pub grade: Option<String>,
    pub classes: Option<Vec<String>>,
    pub bigger_text: bool,
    pub haptic_buzz: bool,
    pub kaibeat_playlist_url: Option<String>,
    pub notifications_enabled: bool,
    pub break_reminders_enabled: bool,
    pub break_reminder_interval: i64,
    pub celebration_notifications_enabled: bool,
    pub daily_checkin_enabled: bool,
    pub updated_at: DateTime<Utc>,
}

/// Partial settings update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub grade: Option<String>,
    pub classes: Option<Vec<String>>,
    pub bigger_text: Option<bool>,
    pub haptic_buzz: Option<bool>,
    pub kaibeat_playlist_url: Option<String>,
    pub notifications_enabled: Option<bool>,
    pub break_reminders_enabled: Option<bool>,
    pub break_reminder_interval: Option<i64>,
    pub celebration_notifications_enabled: Option<bool>,
    pub daily_checkin_enabled: Option<bool>,
}

/// Settings store.
pub struct SettingsStore<'a> {
    conn: &'a Connection,
}

impl<'a> SettingsStore<'a> {
    /// Create a new settings store with the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Get a user's settings, if a row exists.
    pub fn get_settings(&self, user_id: i64) -> Result<Option<UserSettings>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT user_id, grade, classes_json, bigger_text, haptic_buzz,
                        kaibeat_playlist_url, notifications_enabled, break_reminders_enabled,
                        break_reminder_interval, celebration_notifications_enabled,
                        daily_checkin_enabled, updated_at
                 FROM user_settings WHERE user_id = ?1",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let result = stmt.query_row(params![user_id], |row| {
            Ok(SettingsRow {
                user_id: row.get(0)?,
                grade: row.get(1)?,
                classes_json: row.get(2)?,
                bigger_text: row.get(3)?,
                haptic_buzz: row.get(4)?,
                kaibeat_playlist_url: row.get(5)?,
                notifications_enabled: row.get(6)?,
                break_reminders_enabled: row.get(7)?,
                break_reminder_interval: row.get(8)?,
                celebration_notifications_enabled: row.get(9)?,
                daily_checkin_enabled: row.get(10)?,
                updated_at: row.get(11)?,
            })
        });

        match result {
            Ok(row) => Ok(Some(row.into_settings()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Get a user's settings, creating the defaults row if absent.
    pub fn get_or_create_settings(&self, user_id: i64) -> Result<UserSettings, DatabaseError> {
        if let Some(settings) = self.get_settings(user_id)? {
            return Ok(settings);
        }

        let now = Utc::now();
        self.conn
            .execute(
                "INSERT INTO user_settings (user_id, updated_at) VALUES (?1, ?2)",
                params![user_id, now.to_rfc3339()],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(UserSettings {
            user_id,
            grade: None,
            classes: None,
            bigger_text: false,
            haptic_buzz: false,
            kaibeat_playlist_url: None,
            notifications_enabled: false,
            break_reminders_enabled: false,
            break_reminder_interval: 30,
            celebration_notifications_enabled: false,
            daily_checkin_enabled: false,
            updated_at: now,
        })
    }

    /// Apply a partial update and return the refreshed record.
    pub fn update_settings(
        &self,
        user_id: i64,
        patch: &SettingsPatch,
    ) -> Result<UserSettings, DatabaseError> {
        let mut settings = self.get_or_create_settings(user_id)?;

        if let Some(grade) = &patch.grade {
            settings.grade = Some(grade.clone());
        }
        if let Some(classes) = &patch.classes {
            settings.classes = Some(classes.clone());
        }
        if let Some(bigger_text) = patch.bigger_text {
            settings.bigger_text = bigger_text;
        }
        if let Some(haptic_buzz) = patch.haptic_buzz {
            settings.haptic_buzz = haptic_buzz;
        }
        if let Some(url) = &patch.kaibeat_playlist_url {
            settings.kaibeat_playlist_url = Some(url.clone());
        }
        if let Some(enabled) = patch.notifications_enabled {
            settings.notifications_enabled = enabled;
        }
        if let Some(enabled) = patch.break_reminders_enabled {
            settings.break_reminders_enabled = enabled;
        }
        if let Some(interval) = patch.break_reminder_interval {
            settings.break_reminder_interval = interval;
        }
        if let Some(enabled) = patch.celebration_notifications_enabled {
            settings.celebration_notifications_enabled = enabled;
        }
        if let Some(enabled) = patch.daily_checkin_enabled {
            settings.daily_checkin_enabled = enabled;
        }
        settings.updated_at = Utc::now();

        let classes_json = settings
            .classes
            .as_ref()
            .map(|classes| {
                serde_json::to_string(classes)
                    .map_err(|e| DatabaseError::SerializationError(e.to_string()))
            })
            .transpose()?;

        self.conn
            .execute(
                "UPDATE user_settings SET grade = ?2, classes_json = ?3, bigger_text = ?4,
                 haptic_buzz = ?5, kaibeat_playlist_url = ?6, notifications_enabled = ?7,
                 break_reminders_enabled = ?8, break_reminder_interval = ?9,
                 celebration_notifications_enabled = ?10, daily_checkin_enabled = ?11,
                 updated_at = ?12
                 WHERE user_id = ?1",
                params![
                    user_id,
                    settings.grade,
                    classes_json,
                    settings.bigger_text,
                    settings.haptic_buzz,
                    settings.kaibeat_playlist_url,
                    settings.notifications_enabled,
                    settings.break_reminders_enabled,
                    settings.break_reminder_interval,
                    settings.celebration_notifications_enabled,
                    settings.daily_checkin_enabled,
                    settings.updated_at.to_rfc3339(),
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(settings)
    }
}

/// Intermediate struct for reading settings rows from database.
struct SettingsRow {
    user_id: i64,
    grade: Option<String>,
    classes_json: Option<String>,
    bigger_text: bool,
    haptic_buzz: bool,
    kaibeat_playlist_url: Option<String>,
    notifications_enabled: bool,
    break_reminders_enabled: bool,
    break_reminder_interval: i64,
    celebration_notifications_enabled: bool,
    daily_checkin_enabled: bool,
    updated_at: String,
}

impl SettingsRow {
    fn into_settings(self) -> Result<UserSettings, DatabaseError> {
        let classes = self
            .classes_json
            .map(|json| serde_json::from_str::<Vec<String>>(&json))
            .transpose()
            .map_err(|e| {
                DatabaseError::DeserializationError(format!("Invalid classes JSON: {}", e))
            })?;

        Ok(UserSettings {
            user_id: self.user_id,
            grade: self.grade,
            classes,
            bigger_text: self.bigger_text,
            haptic_buzz: self.haptic_buzz,
            kaibeat_playlist_url: self.kaibeat_playlist_url,
            notifications_enabled: self.notifications_enabled,
            break_reminders_enabled: self.break_reminders_enabled,
            break_reminder_interval: self.break_reminder_interval,
            celebration_notifications_enabled: self.celebration_notifications_enabled,
            daily_checkin_enabled: self.daily_checkin_enabled,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    #[test]
    fn test_lazy_defaults() {
        let db = Database::open_in_memory().unwrap();
        let store = SettingsStore::new(db.connection());

        assert!(store.get_settings(1).unwrap().is_none());

        let settings = store.get_or_create_settings(1).unwrap();
        assert_eq!(settings.break_reminder_interval, 30);
        assert!(!settings.notifications_enabled);
        assert!(settings.grade.is_none());
    }

    #[test]
    fn test_partial_update_leaves_other_fields() {
        let db = Database::open_in_memory().unwrap();
        let store = SettingsStore::new(db.connection());

        store
            .update_settings(
                1,
                &SettingsPatch {
                    grade: Some("9th".to_string()),
                    classes: Some(vec!["Math".to_string(), "History".to_string()]),
                    ..Default::default()
                },
            )
            .unwrap();

        let updated = store
            .update_settings(
                1,
                &SettingsPatch {
                    notifications_enabled: Some(true),
                    break_reminder_interval: Some(45),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.grade.as_deref(), Some("9th"));
        assert_eq!(updated.classes.as_ref().map(|c| c.len()), Some(2));
        assert!(updated.notifications_enabled);
        assert_eq!(updated.break_reminder_interval, 45);
    }
}
