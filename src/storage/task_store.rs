//! Task and step persistence.
//!
//! Tasks are owned by exactly one user; every read and write here is scoped
//! by `user_id` so one user can never see or touch another user's rows.
//! Steps never outlive their task (cascade delete via foreign key).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::storage::database::DatabaseError;
use crate::storage::parse_datetime;

/// A task as stored, without its steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub estimated_minutes: i64,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// A single step belonging to a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStep {
    pub id: i64,
    pub task_id: i64,
    pub description: String,
    pub materials: Option<String>,
    pub order_index: i64,
    pub completed: bool,
}

/// A task together with its steps, ordered by `order_index`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskWithSteps {
    #[serde(flatten)]
    pub task: Task,
    pub steps: Vec<TaskStep>,
}

/// A step description to insert alongside a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStep {
    pub description: String,
    pub materials: Option<String>,
}

/// Task store for persisting tasks and their steps.
pub struct TaskStore<'a> {
    conn: &'a Connection,
}

impl<'a> TaskStore<'a> {
    /// Create a new task store with the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a new task for the user and return the stored row.
    pub fn insert_task(
        &self,
        user_id: i64,
        title: &str,
        estimated_minutes: i64,
    ) -> Result<Task, DatabaseError> {
        let created_at = Utc::now();

        self.conn
            .execute(
                "INSERT INTO tasks (user_id, title, estimated_minutes, completed, created_at)
                 VALUES (?1, ?2, ?3, 0, ?4)",
                params![user_id, title, estimated_minutes, created_at.to_rfc3339()],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(Task {
            id: self.conn.last_insert_rowid(),
            user_id,
            title: title.to_string(),
            estimated_minutes,
            completed: false,
            created_at,
        })
    }

    /// Insert steps for a task, assigning `order_index` by position.
    pub fn insert_steps(
        &self,
        task_id: i64,
        steps: &[NewStep],
    ) -> Result<Vec<TaskStep>, DatabaseError> {
        let mut inserted = Vec::with_capacity(steps.len());

        let mut stmt = self
            .conn
            .prepare(
                "INSERT INTO task_steps (task_id, description, materials, order_index, completed)
                 VALUES (?1, ?2, ?3, ?4, 0)",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        for (index, step) in steps.iter().enumerate() {
            stmt.execute(params![
                task_id,
                step.description,
                step.materials,
                index as i64
            ])
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

            inserted.push(TaskStep {
                id: self.conn.last_insert_rowid(),
                task_id,
                description: step.description.clone(),
                materials: step.materials.clone(),
                order_index: index as i64,
                completed: false,
            });
        }

        Ok(inserted)
    }

    /// Get a task by id, scoped to its owner.
    pub fn get_task(&self, task_id: i64, user_id: i64) -> Result<Option<Task>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, user_id, title, estimated_minutes, completed, created_at
                 FROM tasks WHERE id = ?1 AND user_id = ?2",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let result = stmt.query_row(params![task_id, user_id], |row| {
            Ok(TaskRow {
                id: row.get(0)?,
                user_id: row.get(1)?,
                title: row.get(2)?,
                estimated_minutes: row.get(3)?,
                completed: row.get(4)?,
                created_at: row.get(5)?,
            })
        });

        match result {
            Ok(row) => Ok(Some(row.into_task()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Get the steps of a task, ordered by `order_index` ascending.
    pub fn steps_for_task(&self, task_id: i64) -> Result<Vec<TaskStep>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, task_id, description, materials, order_index, completed
                 FROM task_steps WHERE task_id = ?1 ORDER BY order_index ASC",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![task_id], |row| {
                Ok(TaskStep {
                    id: row.get(0)?,
                    task_id: row.get(1)?,
                    description: row.get(2)?,
                    materials: row.get(3)?,
                    order_index: row.get(4)?,
                    completed: row.get(5)?,
                })
            })
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut steps = Vec::new();
        for row in rows {
            steps.push(row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?);
        }

        Ok(steps)
    }

    /// Get a task with its steps, scoped to its owner.
    pub fn get_task_with_steps(
        &self,
        task_id: i64,
        user_id: i64,
    ) -> Result<Option<TaskWithSteps>, DatabaseError> {
        match self.get_task(task_id, user_id)? {
            Some(task) => {
                let steps = self.steps_for_task(task.id)?;
                Ok(Some(TaskWithSteps { task, steps }))
            }
            None => Ok(None),
        }
    }

    /// List all of a user's tasks with their steps.
    ///
    /// Tasks come back newest-first, steps ordered by `order_index`. Two
    /// queries and an in-memory grouping rather than a row-per-step join.
    pub fn list_tasks_with_steps(&self, user_id: i64) -> Result<Vec<TaskWithSteps>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, user_id, title, estimated_minutes, completed, created_at
                 FROM tasks WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![user_id], |row| {
                Ok(TaskRow {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    title: row.get(2)?,
                    estimated_minutes: row.get(3)?,
                    completed: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut tasks = Vec::new();
        for row in rows {
            let row = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            tasks.push(row.into_task()?);
        }

        let mut step_stmt = self
            .conn
            .prepare(
                "SELECT s.id, s.task_id, s.description, s.materials, s.order_index, s.completed
                 FROM task_steps s
                 INNER JOIN tasks t ON t.id = s.task_id
                 WHERE t.user_id = ?1
                 ORDER BY s.order_index ASC",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let step_rows = step_stmt
            .query_map(params![user_id], |row| {
                Ok(TaskStep {
                    id: row.get(0)?,
                    task_id: row.get(1)?,
                    description: row.get(2)?,
                    materials: row.get(3)?,
                    order_index: row.get(4)?,
                    completed: row.get(5)?,
                })
            })
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut steps_by_task: HashMap<i64, Vec<TaskStep>> = HashMap::new();
        for row in step_rows {
            let step = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            steps_by_task.entry(step.task_id).or_default().push(step);
        }

        Ok(tasks
            .into_iter()
            .map(|task| {
                let steps = steps_by_task.remove(&task.id).unwrap_or_default();
                TaskWithSteps { task, steps }
            })
            .collect())
    }

    /// Set a task's completion flag, scoped to its owner.
    ///
    /// Returns `true` only when the flag actually changed, so callers can
    /// award completion points exactly once per transition.
    pub fn set_task_completed(
        &self,
        task_id: i64,
        user_id: i64,
        completed: bool,
    ) -> Result<bool, DatabaseError> {
        let rows_affected = self
            .conn
            .execute(
                "UPDATE tasks SET completed = ?3
                 WHERE id = ?1 AND user_id = ?2 AND completed != ?3",
                params![task_id, user_id, completed],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(rows_affected > 0)
    }

    /// Set a step's completion flag, scoped to the given task.
    pub fn set_step_completed(
        &self,
        step_id: i64,
        task_id: i64,
        completed: bool,
    ) -> Result<(), DatabaseError> {
        self.conn
            .execute(
                "UPDATE task_steps SET completed = ?3 WHERE id = ?1 AND task_id = ?2",
                params![step_id, task_id, completed],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    /// Delete all of a user's tasks. Steps and reflections cascade.
    pub fn delete_tasks_for_user(&self, user_id: i64) -> Result<usize, DatabaseError> {
        self.conn
            .execute("DELETE FROM tasks WHERE user_id = ?1", params![user_id])
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))
    }
}

/// Intermediate struct for reading task rows from database.
struct TaskRow {
    id: i64,
    user_id: i64,
    title: String,
    estimated_minutes: i64,
    completed: bool,
    created_at: String,
}

impl TaskRow {
    fn into_task(self) -> Result<Task, DatabaseError> {
        Ok(Task {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            estimated_minutes: self.estimated_minutes,
            completed: self.completed,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}
