//! Task endpoints: list, create, update, AI step generation.

use crate::steps::{GeneratedStep, StepGenerator};
use crate::storage::{Database, EconomyStore, TaskStore, TaskWithSteps, POINT_REWARD};

use super::error::ApiError;
use super::types::{CreateTaskRequest, GenerateStepsRequest, UpdateTaskRequest};

/// `GET /tasks` — all of the user's tasks with steps, newest first.
pub fn list_tasks(db: &Database, user_id: i64) -> Result<Vec<TaskWithSteps>, ApiError> {
    let store = TaskStore::new(db.connection());
    Ok(store.list_tasks_with_steps(user_id)?)
}

/// `POST /tasks` — create a task, optionally with steps, in one
/// transaction. 201-equivalent on success.
pub fn create_task(
    db: &mut Database,
    user_id: i64,
    input: &CreateTaskRequest,
) -> Result<TaskWithSteps, ApiError> {
    if input.title.trim().is_empty() {
        return Err(ApiError::Validation(
            "Task title cannot be empty.".to_string(),
        ));
    }
    if input.estimated_minutes <= 0 {
        return Err(ApiError::Validation(
            "Estimated minutes must be a positive number.".to_string(),
        ));
    }
    if let Some(steps) = &input.steps {
        if steps.iter().any(|s| s.description.trim().is_empty()) {
            return Err(ApiError::Validation(
                "Step description cannot be empty.".to_string(),
            ));
        }
    }

    let tx = db.transaction()?;
    let result = {
        let store = TaskStore::new(&tx);
        let task = store.insert_task(user_id, &input.title, input.estimated_minutes)?;
        let steps = match &input.steps {
            Some(new_steps) if !new_steps.is_empty() => store.insert_steps(task.id, new_steps)?,
            _ => Vec::new(),
        };
        TaskWithSteps { task, steps }
    };
    tx.commit()
        .map_err(|e| ApiError::Internal(format!("Failed to create task: {}", e)))?;

    Ok(result)
}

/// `POST /tasks/update` — apply completion and step toggles, award points
/// on the incomplete-to-complete transition, and return the refreshed task.
pub fn update_task(
    db: &mut Database,
    user_id: i64,
    input: &UpdateTaskRequest,
) -> Result<TaskWithSteps, ApiError> {
    let tx = db.immediate_transaction()?;
    let result = {
        let store = TaskStore::new(&tx);

        if let Some(completed) = input.completed {
            let transitioned = store.set_task_completed(input.task_id, user_id, completed)?;

            if completed && transitioned {
                let economy = EconomyStore::new(&tx);
                match economy.add_points(user_id, POINT_REWARD)? {
                    Some(total) => {
                        tracing::info!(user_id, total, "Awarded task completion points")
                    }
                    None => tracing::warn!(
                        user_id,
                        "User progress record not found. Could not award points."
                    ),
                }
            }
        }

        if let Some(toggles) = &input.steps {
            for toggle in toggles {
                store.set_step_completed(toggle.id, input.task_id, toggle.completed)?;
            }
        }

        store
            .get_task_with_steps(input.task_id, user_id)?
            .ok_or_else(|| ApiError::NotFound("Task not found or access denied.".to_string()))?
    };
    tx.commit()
        .map_err(|e| ApiError::Internal(format!("Failed to update task: {}", e)))?;

    Ok(result)
}

/// `POST /tasks/generate-steps` — break a task title into 3-6 actionable
/// steps via the AI service. No database access.
pub async fn generate_steps(
    generator: &StepGenerator,
    input: &GenerateStepsRequest,
) -> Result<Vec<GeneratedStep>, ApiError> {
    if input.title.trim().is_empty() {
        return Err(ApiError::Validation(
            "Task title cannot be empty.".to_string(),
        ));
    }

    Ok(generator.generate(&input.title).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::StepToggle;
    use crate::storage::NewStep;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_create_task_with_steps() {
        let mut db = db();
        let input = CreateTaskRequest {
            title: "Pack for school".to_string(),
            estimated_minutes: 15,
            steps: Some(vec![
                NewStep {
                    description: "Find your backpack.".to_string(),
                    materials: Some("Backpack".to_string()),
                },
                NewStep {
                    description: "Put your homework inside.".to_string(),
                    materials: None,
                },
            ]),
        };

        let created = create_task(&mut db, 1, &input).unwrap();
        assert_eq!(created.steps.len(), 2);
        assert_eq!(created.steps[0].order_index, 0);
        assert!(!created.task.completed);

        let listed = list_tasks(&db, 1).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].steps.len(), 2);
    }

    #[test]
    fn test_create_task_rejects_bad_input() {
        let mut db = db();

        let empty_title = CreateTaskRequest {
            title: "  ".to_string(),
            estimated_minutes: 10,
            steps: None,
        };
        assert!(matches!(
            create_task(&mut db, 1, &empty_title),
            Err(ApiError::Validation(_))
        ));

        let bad_minutes = CreateTaskRequest {
            title: "Task".to_string(),
            estimated_minutes: 0,
            steps: None,
        };
        assert!(matches!(
            create_task(&mut db, 1, &bad_minutes),
            Err(ApiError::Validation(_))
        ));

        assert!(list_tasks(&db, 1).unwrap().is_empty());
    }

    #[test]
    fn test_update_unknown_task_is_not_found() {
        let mut db = db();
        let input = UpdateTaskRequest {
            task_id: 99,
            completed: Some(true),
            steps: None,
        };
        assert!(matches!(
            update_task(&mut db, 1, &input),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_completion_awards_points_once() {
        let mut db = db();
        EconomyStore::new(db.connection())
            .get_or_create_progress(1)
            .unwrap();

        let created = create_task(
            &mut db,
            1,
            &CreateTaskRequest {
                title: "Do laundry".to_string(),
                estimated_minutes: 30,
                steps: None,
            },
        )
        .unwrap();

        let input = UpdateTaskRequest {
            task_id: created.task.id,
            completed: Some(true),
            steps: None,
        };

        let updated = update_task(&mut db, 1, &input).unwrap();
        assert!(updated.task.completed);
        assert_eq!(
            EconomyStore::new(db.connection())
                .get_progress(1)
                .unwrap()
                .unwrap()
                .kaiblooms_points,
            15
        );

        // Marking complete again must not award again
        update_task(&mut db, 1, &input).unwrap();
        assert_eq!(
            EconomyStore::new(db.connection())
                .get_progress(1)
                .unwrap()
                .unwrap()
                .kaiblooms_points,
            15
        );
    }

    #[test]
    fn test_completion_without_progress_row_still_updates_task() {
        let mut db = db();
        let created = create_task(
            &mut db,
            1,
            &CreateTaskRequest {
                title: "No progress yet".to_string(),
                estimated_minutes: 5,
                steps: None,
            },
        )
        .unwrap();

        let updated = update_task(
            &mut db,
            1,
            &UpdateTaskRequest {
                task_id: created.task.id,
                completed: Some(true),
                steps: None,
            },
        )
        .unwrap();

        assert!(updated.task.completed);
    }

    #[test]
    fn test_step_toggles_scoped_to_task() {
        let mut db = db();
        let mine = create_task(
            &mut db,
            1,
            &CreateTaskRequest {
                title: "Mine".to_string(),
                estimated_minutes: 5,
                steps: Some(vec![NewStep {
                    description: "Step one".to_string(),
                    materials: None,
                }]),
            },
        )
        .unwrap();
        let other = create_task(
            &mut db,
            1,
            &CreateTaskRequest {
                title: "Other".to_string(),
                estimated_minutes: 5,
                steps: Some(vec![NewStep {
                    description: "Unrelated".to_string(),
                    materials: None,
                }]),
            },
        )
        .unwrap();

        // Toggle references a step id from a different task: no effect
        let updated = update_task(
            &mut db,
            1,
            &UpdateTaskRequest {
                task_id: mine.task.id,
                completed: None,
                steps: Some(vec![StepToggle {
                    id: other.steps[0].id,
                    completed: true,
                }]),
            },
        )
        .unwrap();
        assert!(!updated.steps[0].completed);

        let refreshed = update_task(
            &mut db,
            1,
            &UpdateTaskRequest {
                task_id: mine.task.id,
                completed: None,
                steps: Some(vec![StepToggle {
                    id: mine.steps[0].id,
                    completed: true,
                }]),
            },
        )
        .unwrap();
        assert!(refreshed.steps[0].completed);
    }

    #[tokio::test]
    async fn test_generate_steps_validates_title() {
        let generator = StepGenerator::new(Some("sk-test".to_string()));
        let result = generate_steps(
            &generator,
            &GenerateStepsRequest {
                title: "".to_string(),
            },
        )
        .await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }
}
