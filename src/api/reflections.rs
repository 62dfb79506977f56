//! Reflection endpoints: submit a post-task reflection and list the log.
//!
//! Sentiment classification happens before the database transaction is
//! opened so a slow inference call never holds the write lock.

use crate::sentiment::SentimentClassifier;
use crate::storage::{Database, EconomyStore, Reflection, ReflectionLog, ReflectionStore, TaskStore, POINT_REWARD};

use super::error::ApiError;
use super::types::CreateReflectionRequest;

/// `POST /reflections` — validate, classify, then store the reflection
/// and award points in one transaction.
pub async fn create_reflection(
    db: &mut Database,
    classifier: &SentimentClassifier,
    user_id: i64,
    input: &CreateReflectionRequest,
) -> Result<Reflection, ApiError> {
    if !(1..=5).contains(&input.emoji_rating) {
        return Err(ApiError::Validation(
            "Emoji rating must be between 1 and 5.".to_string(),
        ));
    }
    if input.reflection_text.trim().is_empty() {
        return Err(ApiError::Validation(
            "Reflection text cannot be empty.".to_string(),
        ));
    }

    // Ownership check before spending time on classification
    {
        let store = TaskStore::new(db.connection());
        if store.get_task(input.task_id, user_id)?.is_none() {
            return Err(ApiError::NotFound(
                "Task not found or access denied.".to_string(),
            ));
        }
    }

    let sentiment = classifier.classify(&input.reflection_text).await;

    let tx = db.immediate_transaction()?;
    let reflection = {
        // Re-verify inside the transaction; the task may have been
        // deleted while classification ran.
        let tasks = TaskStore::new(&tx);
        if tasks.get_task(input.task_id, user_id)?.is_none() {
            return Err(ApiError::NotFound(
                "Task not found or access denied.".to_string(),
            ));
        }

        let reflections = ReflectionStore::new(&tx);
        let reflection = reflections.insert_reflection(
            input.task_id,
            input.emoji_rating,
            &input.reflection_text,
            sentiment,
        )?;

        let economy = EconomyStore::new(&tx);
        match economy.add_points(user_id, POINT_REWARD)? {
            Some(total) => tracing::info!(user_id, total, "Awarded reflection points"),
            None => tracing::warn!(
                user_id,
                "User progress record not found. Could not award points."
            ),
        }

        reflection
    };
    tx.commit()
        .map_err(|e| ApiError::Internal(format!("Failed to save reflection: {}", e)))?;

    Ok(reflection)
}

/// `GET /reflections/log` — the user's reflections with task titles,
/// newest first.
pub fn list_reflection_logs(db: &Database, user_id: i64) -> Result<Vec<ReflectionLog>, ApiError> {
    let store = ReflectionStore::new(db.connection());
    Ok(store.list_logs(user_id)?)
}
